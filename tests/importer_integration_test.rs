// ==========================================
// OrgDataImporter 集成测试
// ==========================================
// 测试目标: 验证完整的组织数据导入流程(文件 → 记录库)
// ==========================================


use hr_admin::api::ImportApi;
use hr_admin::domain::types::BatchStatus;
use hr_admin::logging;
use test_helpers::{count_records, create_test_db, insert_org_record, seed_reference_data};

/// 预置公司/部门/职务,使 positions 通过就绪门禁
fn seed_org_baseline(conn: &rusqlite::Connection) {
    insert_org_record(conn, "companies", "AUR-CORP", "AUR-CORP").unwrap();
    insert_org_record(conn, "companies", "AUR-WEST", "AUR-WEST").unwrap();
    insert_org_record(conn, "departments", "AUR-CORP", "HR").unwrap();
    insert_org_record(conn, "departments", "AUR-CORP", "FIN").unwrap();
    insert_org_record(conn, "departments", "AUR-CORP", "ENG").unwrap();
    insert_org_record(conn, "jobs", "AUR-CORP", "J-MGR").unwrap();
    insert_org_record(conn, "jobs", "AUR-CORP", "J-ENG").unwrap();
}

#[tokio::test]
async fn test_import_departments_end_to_end() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("建库失败");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    seed_reference_data(&conn).unwrap();
    // departments 的必需前置是 companies
    insert_org_record(&conn, "companies", "AUR-CORP", "AUR-CORP").unwrap();

    let api = ImportApi::new(db_path.clone());
    let response = api
        .import_file("tests/fixtures/test_departments.csv", "departments", "AUR-CORP")
        .await
        .expect("导入应成功完成(行级错误不中止管道)");

    // 5 行: OPS 缺名称 + MKT 成本中心模式不符 → 跳过 2 行
    assert_eq!(response.total_rows, 5);
    assert_eq!(response.imported, 3);
    assert_eq!(response.skipped, 2);
    assert_eq!(response.failed, 0);
    assert_eq!(response.status, BatchStatus::Committed);

    // 引号内逗号不拆分字段
    let fin_payload: String = conn
        .query_row(
            "SELECT payload_json FROM org_record WHERE entity_type='departments' AND code='FIN'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(fin_payload.contains("Finance, Treasury & Risk"));

    assert_eq!(count_records(&conn, "departments"), 3);
}

#[tokio::test]
async fn test_import_positions_with_references() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("建库失败");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    seed_reference_data(&conn).unwrap();
    seed_org_baseline(&conn);

    // 预置可被引用的岗位: 本公司 CEO-001 + 姊妹公司 WEST-OPS-001
    let ceo_id = insert_org_record(&conn, "positions", "AUR-CORP", "CEO-001").unwrap();
    let west_id = insert_org_record(&conn, "positions", "AUR-WEST", "WEST-OPS-001").unwrap();

    let api = ImportApi::new(db_path.clone());
    let response = api
        .import_file("tests/fixtures/test_positions.csv", "positions", "AUR-CORP")
        .await
        .expect("导入应成功完成");

    // 4 行: BAD-001 必需引用(部门 NOPE)未找到 → 失败 1 行
    assert_eq!(response.total_rows, 4);
    assert_eq!(response.imported, 3);
    assert_eq!(response.failed, 1);
    assert_eq!(response.skipped, 0);
    // 无分块失败 → 批次 COMMITTED,行级失败体现在计数
    assert_eq!(response.status, BatchStatus::Committed);

    // 裸编码与复合键应解析到同一个预置岗位
    let hrd_payload: String = conn
        .query_row(
            "SELECT payload_json FROM org_record WHERE entity_type='positions' AND code='HRD-001'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let fin_payload: String = conn
        .query_row(
            "SELECT payload_json FROM org_record WHERE entity_type='positions' AND code='FIN-001'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(hrd_payload.contains(&ceo_id), "裸编码应解析到 CEO-001");
    assert!(fin_payload.contains(&ceo_id), "复合键应解析到同一记录");

    // 跨公司引用(集团内)经全域回退解析
    let eng_payload: String = conn
        .query_row(
            "SELECT payload_json FROM org_record WHERE entity_type='positions' AND code='ENG-001'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(eng_payload.contains(&west_id), "集团内跨公司引用应解析成功");

    // 失败行不落库
    let bad_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM org_record WHERE entity_type='positions' AND code='BAD-001'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(bad_count, 0);

    // 报告包含必需引用失败明细
    assert!(response.report.contains("department_code"));
}

#[tokio::test]
async fn test_prerequisite_gate_blocks_import() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("建库失败");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    seed_reference_data(&conn).unwrap();
    // 故意不预置 departments/jobs

    let api = ImportApi::new(db_path.clone());
    insert_org_record(&conn, "companies", "AUR-CORP", "AUR-CORP").unwrap();

    let result = api
        .import_file("tests/fixtures/test_positions.csv", "positions", "AUR-CORP")
        .await;

    let err = result.expect_err("前置缺失应中止管道");
    let message = err.to_string();
    assert!(message.contains("departments"), "错误应指出缺失的前置: {}", message);

    // 门禁在暂存之前,不应留下任何批次
    let batch_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM import_batch", [], |row| row.get(0))
        .unwrap();
    assert_eq!(batch_count, 0);
}

#[tokio::test]
async fn test_import_employees_reference_fields() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("建库失败");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    seed_reference_data(&conn).unwrap();
    seed_org_baseline(&conn);
    insert_org_record(&conn, "positions", "AUR-CORP", "CEO-001").unwrap();
    insert_org_record(&conn, "positions", "AUR-CORP", "HRD-001").unwrap();
    insert_org_record(&conn, "positions", "AUR-CORP", "ENG-001").unwrap();

    let api = ImportApi::new(db_path.clone());
    let response = api
        .import_file("tests/fixtures/test_employees.csv", "employees", "AUR-CORP")
        .await
        .expect("导入应成功完成");

    // 4 行: E-0003 邮箱非法 + E-0004 国籍用了国家名称 → 跳过 2 行
    assert_eq!(response.total_rows, 4);
    assert_eq!(response.imported, 2);
    assert_eq!(response.skipped, 2);
    assert_eq!(response.status, BatchStatus::Committed);

    // 归一告警不阻断: E-0001 性别 F → female
    assert!(response.warning_count > 0);
    let ada_payload: String = conn
        .query_row(
            "SELECT payload_json FROM org_record WHERE entity_type='employees' AND code='E-0001'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(ada_payload.contains("\"gender\":\"female\""), "落库值应为规范形: {}", ada_payload);

    // 报告对国家名称给出编码建议
    assert!(response.report.contains("US"));
}
