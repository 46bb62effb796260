// ==========================================
// 人力资源管理系统 - 导入仓储实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::import::{ImportBatch, ImportRow, ValidationResult};
use crate::domain::org::{ExistingRecord, StagedRecord};
use crate::domain::types::{BatchStatus, EntityType};
use crate::repository::error::RepositoryError;
use crate::repository::import_repo::ImportRecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// ImportRecordStoreImpl
// ==========================================
pub struct ImportRecordStoreImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRecordStoreImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, RepositoryError> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建(测试/共享连接场景)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行 → ImportBatch(JSON 字段反序列化)
    fn batch_from_row(row: &Row<'_>) -> Result<ImportBatch, RepositoryError> {
        let entity_type_raw: String = row.get(1)?;
        let status_raw: String = row.get(3)?;
        let imported_ids_json: String = row.get(8)?;
        let chunk_errors_json: String = row.get(9)?;
        let staging_json: String = row.get(10)?;
        let validation_json: String = row.get(11)?;
        let created_at_raw: String = row.get(12)?;
        let committed_at_raw: Option<String> = row.get(13)?;
        let rollback_raw: Option<String> = row.get(14)?;

        let entity_type: EntityType = entity_type_raw
            .parse()
            .map_err(RepositoryError::SerializationError)?;
        let status: BatchStatus = status_raw
            .parse()
            .map_err(RepositoryError::SerializationError)?;
        let staging_data: Vec<ImportRow> = serde_json::from_str(&staging_json)?;
        let validation_result: ValidationResult = serde_json::from_str(&validation_json)?;
        let imported_record_ids: Vec<String> = serde_json::from_str(&imported_ids_json)?;
        let chunk_errors: Vec<String> = serde_json::from_str(&chunk_errors_json)?;

        Ok(ImportBatch {
            batch_id: row.get(0)?,
            entity_type,
            company_code: row.get(2)?,
            status,
            total_rows: row.get::<_, i64>(4)? as usize,
            successful_record_count: row.get::<_, i64>(5)? as usize,
            failed_record_count: row.get::<_, i64>(6)? as usize,
            skipped_record_count: row.get::<_, i64>(7)? as usize,
            imported_record_ids,
            chunk_errors,
            staging_data,
            validation_result,
            created_at: parse_utc(&created_at_raw)?,
            committed_at: committed_at_raw.as_deref().map(parse_utc).transpose()?,
            rollback_eligible_until: rollback_raw.as_deref().map(parse_utc).transpose()?,
        })
    }
}

const BATCH_COLUMNS: &str = "batch_id, entity_type, company_code, status, total_rows, \
     successful_records, failed_records, skipped_records, imported_ids_json, \
     chunk_errors_json, staging_json, validation_json, created_at, committed_at, \
     rollback_eligible_until";

fn parse_utc(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(format!("时间解析失败 ({}): {}", raw, e)))
}

/// IN (?,?,...) 占位串
fn placeholders(count: usize) -> String {
    std::iter::repeat("?")
        .take(count)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl ImportRecordStore for ImportRecordStoreImpl {
    async fn count_records(
        &self,
        entity_type: EntityType,
        company_codes: &[String],
    ) -> Result<i64, RepositoryError> {
        let conn = self.lock()?;

        if company_codes.is_empty() {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM org_record WHERE entity_type = ?1",
                params![entity_type.as_str()],
                |row| row.get(0),
            )?;
            return Ok(count);
        }

        let sql = format!(
            "SELECT COUNT(*) FROM org_record WHERE entity_type = ? AND UPPER(company_code) IN ({})",
            placeholders(company_codes.len())
        );
        let mut args: Vec<String> = vec![entity_type.as_str().to_string()];
        args.extend(company_codes.iter().map(|c| c.to_uppercase()));

        let count: i64 =
            conn.query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))?;
        Ok(count)
    }

    async fn list_company_codes(&self) -> Result<Vec<String>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT code FROM org_record WHERE entity_type = 'companies' ORDER BY code",
        )?;
        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(codes)
    }

    async fn fetch_existing_refs(
        &self,
        entity_types: &[EntityType],
        company_codes: &[String],
    ) -> Result<Vec<ExistingRecord>, RepositoryError> {
        if entity_types.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;

        // rowid 升序 = 注册顺序("先注册者优先"回退语义的依据)
        let mut sql = format!(
            "SELECT record_id, entity_type, company_code, code FROM org_record \
             WHERE entity_type IN ({})",
            placeholders(entity_types.len())
        );
        let mut args: Vec<String> = entity_types
            .iter()
            .map(|et| et.as_str().to_string())
            .collect();

        if !company_codes.is_empty() {
            sql.push_str(&format!(
                " AND UPPER(company_code) IN ({})",
                placeholders(company_codes.len())
            ));
            args.extend(company_codes.iter().map(|c| c.to_uppercase()));
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        records
            .into_iter()
            .map(|(record_id, entity_type_raw, company_code, code)| {
                Ok(ExistingRecord {
                    record_id,
                    entity_type: entity_type_raw
                        .parse()
                        .map_err(RepositoryError::SerializationError)?,
                    company_code,
                    code,
                })
            })
            .collect()
    }

    async fn batch_insert_records(
        &self,
        batch_id: &str,
        records: &[StagedRecord],
    ) -> Result<Vec<String>, RepositoryError> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;

        let mut ids = Vec::with_capacity(records.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO org_record (
                    record_id, entity_type, company_code, code,
                    payload_json, batch_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;

            for record in records {
                let record_id = Uuid::new_v4().to_string();
                stmt.execute(params![
                    record_id,
                    record.entity_type.as_str(),
                    record.company_code,
                    record.code,
                    serde_json::to_string(&record.payload)?,
                    batch_id,
                    Utc::now().to_rfc3339(),
                ])?;
                ids.push(record_id);
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;
        Ok(ids)
    }

    async fn insert_import_batch(&self, batch: &ImportBatch) -> Result<(), RepositoryError> {
        let conn = self.lock()?;

        conn.execute(
            &format!("INSERT INTO import_batch ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)", BATCH_COLUMNS),
            params![
                batch.batch_id,
                batch.entity_type.as_str(),
                batch.company_code,
                batch.status.to_string(),
                batch.total_rows as i64,
                batch.successful_record_count as i64,
                batch.failed_record_count as i64,
                batch.skipped_record_count as i64,
                serde_json::to_string(&batch.imported_record_ids)?,
                serde_json::to_string(&batch.chunk_errors)?,
                serde_json::to_string(&batch.staging_data)?,
                serde_json::to_string(&batch.validation_result)?,
                batch.created_at.to_rfc3339(),
                batch.committed_at.map(|t| t.to_rfc3339()),
                batch.rollback_eligible_until.map(|t| t.to_rfc3339()),
            ],
        )?;

        Ok(())
    }

    async fn finalize_import_batch(&self, batch: &ImportBatch) -> Result<(), RepositoryError> {
        let conn = self.lock()?;

        let updated = conn.execute(
            r#"
            UPDATE import_batch SET
                status = ?2,
                successful_records = ?3,
                failed_records = ?4,
                skipped_records = ?5,
                imported_ids_json = ?6,
                chunk_errors_json = ?7,
                committed_at = ?8,
                rollback_eligible_until = ?9
            WHERE batch_id = ?1
            "#,
            params![
                batch.batch_id,
                batch.status.to_string(),
                batch.successful_record_count as i64,
                batch.failed_record_count as i64,
                batch.skipped_record_count as i64,
                serde_json::to_string(&batch.imported_record_ids)?,
                serde_json::to_string(&batch.chunk_errors)?,
                batch.committed_at.map(|t| t.to_rfc3339()),
                batch.rollback_eligible_until.map(|t| t.to_rfc3339()),
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!(
                "批次不存在: {}",
                batch.batch_id
            )));
        }

        Ok(())
    }

    async fn get_batch(&self, batch_id: &str) -> Result<Option<ImportBatch>, RepositoryError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM import_batch WHERE batch_id = ?1",
            BATCH_COLUMNS
        ))?;

        let mut rows = stmt.query(params![batch_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::batch_from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn get_recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, RepositoryError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM import_batch ORDER BY created_at DESC LIMIT ?1",
            BATCH_COLUMNS
        ))?;

        let mut rows = stmt.query(params![limit as i64])?;
        let mut batches = Vec::new();
        while let Some(row) = rows.next()? {
            batches.push(Self::batch_from_row(row)?);
        }
        Ok(batches)
    }
}
