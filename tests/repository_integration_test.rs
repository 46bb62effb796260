// ==========================================
// Repository 集成测试
// ==========================================
// 测试目标: rusqlite 仓储实现(批次持久化/快照查询/计数)
// ==========================================


use hr_admin::domain::import::{ImportBatch, ImportRow, ValidationIssue, ValidationResult};
use hr_admin::domain::org::StagedRecord;
use hr_admin::domain::types::{BatchStatus, EntityType};
use hr_admin::repository::{ImportRecordStore, ImportRecordStoreImpl};
use chrono::Utc;
use std::collections::HashMap;
use test_helpers::{create_test_db, insert_org_record};

fn sample_batch() -> ImportBatch {
    let rows = vec![ImportRow {
        row_number: 2,
        fields: HashMap::from([
            ("code".to_string(), "HR".to_string()),
            ("name".to_string(), "People Ops".to_string()),
        ]),
    }];
    let numbers: Vec<usize> = rows.iter().map(|r| r.row_number).collect();
    let issues = vec![ValidationIssue::warning(2, "name", "People Ops", "超出最大长度 5".to_string())];

    ImportBatch {
        batch_id: "batch-test-001".to_string(),
        entity_type: EntityType::Departments,
        company_code: "AUR-CORP".to_string(),
        status: BatchStatus::Staging,
        total_rows: rows.len(),
        successful_record_count: 0,
        failed_record_count: 0,
        skipped_record_count: 0,
        imported_record_ids: Vec::new(),
        chunk_errors: Vec::new(),
        staging_data: rows,
        validation_result: ValidationResult::from_issues(&numbers, issues),
        created_at: Utc::now(),
        committed_at: None,
        rollback_eligible_until: Some(Utc::now() + chrono::Duration::days(30)),
    }
}

#[tokio::test]
async fn test_batch_roundtrip() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ImportRecordStoreImpl::new(&db_path).unwrap();

    let batch = sample_batch();
    repo.insert_import_batch(&batch).await.unwrap();

    let loaded = repo.get_batch(&batch.batch_id).await.unwrap().expect("批次应存在");
    assert_eq!(loaded.batch_id, batch.batch_id);
    assert_eq!(loaded.entity_type, EntityType::Departments);
    assert_eq!(loaded.status, BatchStatus::Staging);
    assert_eq!(loaded.total_rows, 1);
    // 行集与校验快照完整还原
    assert_eq!(loaded.staging_data[0].get("code"), "HR");
    assert_eq!(loaded.validation_result.warning_count, 1);

    assert!(repo.get_batch("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_finalize_updates_status_and_counts() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ImportRecordStoreImpl::new(&db_path).unwrap();

    let mut batch = sample_batch();
    repo.insert_import_batch(&batch).await.unwrap();

    let committed_at = Utc::now();
    batch.status = BatchStatus::Failed;
    batch.successful_record_count = 1;
    batch.failed_record_count = 2;
    batch.skipped_record_count = 3;
    batch.imported_record_ids = vec!["id-1".to_string()];
    batch.chunk_errors = vec!["分块 1: database is locked".to_string()];
    batch.committed_at = Some(committed_at);
    batch.rollback_eligible_until = Some(committed_at + chrono::Duration::days(30));
    repo.finalize_import_batch(&batch).await.unwrap();

    let loaded = repo.get_batch(&batch.batch_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, BatchStatus::Failed);
    assert_eq!(loaded.successful_record_count, 1);
    assert_eq!(loaded.failed_record_count, 2);
    assert_eq!(loaded.skipped_record_count, 3);
    assert_eq!(loaded.chunk_errors.len(), 1);
    // 回滚窗口严格晚于提交时间
    assert!(loaded.rollback_eligible_until.unwrap() > loaded.committed_at.unwrap());
}

#[tokio::test]
async fn test_finalize_missing_batch_errors() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ImportRecordStoreImpl::new(&db_path).unwrap();

    let batch = sample_batch();
    let result = repo.finalize_import_batch(&batch).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_batch_insert_returns_ids_in_order() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ImportRecordStoreImpl::new(&db_path).unwrap();

    let records: Vec<StagedRecord> = (0..3)
        .map(|i| StagedRecord {
            entity_type: EntityType::Departments,
            company_code: "AUR-CORP".to_string(),
            code: format!("D{}", i),
            payload: serde_json::json!({ "code": format!("D{}", i) }),
            source_row: i + 2,
        })
        .collect();

    let ids = repo.batch_insert_records("batch-x", &records).await.unwrap();
    assert_eq!(ids.len(), 3);

    let count = repo
        .count_records(EntityType::Departments, &[])
        .await
        .unwrap();
    assert_eq!(count, 3);

    // 公司范围计数
    let scoped = repo
        .count_records(EntityType::Departments, &["AUR-CORP".to_string()])
        .await
        .unwrap();
    assert_eq!(scoped, 3);
    let other = repo
        .count_records(EntityType::Departments, &["OTHER".to_string()])
        .await
        .unwrap();
    assert_eq!(other, 0);
}

#[tokio::test]
async fn test_fetch_existing_refs_registration_order() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = rusqlite::Connection::open(&db_path).unwrap();

    // 注册顺序决定裸编码回退的"先注册者优先"
    insert_org_record(&conn, "positions", "AUR-WEST", "MGR-001").unwrap();
    insert_org_record(&conn, "positions", "AUR-EAST", "MGR-001").unwrap();

    let repo = ImportRecordStoreImpl::new(&db_path).unwrap();
    let refs = repo
        .fetch_existing_refs(&[EntityType::Positions], &[])
        .await
        .unwrap();

    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].company_code, "AUR-WEST");
    assert_eq!(refs[1].company_code, "AUR-EAST");
}

#[tokio::test]
async fn test_list_company_codes() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    insert_org_record(&conn, "companies", "AUR-CORP", "AUR-CORP").unwrap();
    insert_org_record(&conn, "companies", "AUR-WEST", "AUR-WEST").unwrap();
    insert_org_record(&conn, "departments", "AUR-CORP", "HR").unwrap();

    let repo = ImportRecordStoreImpl::new(&db_path).unwrap();
    let codes = repo.list_company_codes().await.unwrap();
    assert_eq!(codes, vec!["AUR-CORP".to_string(), "AUR-WEST".to_string()]);
}
