// ==========================================
// 人力资源管理系统 - 参照数据仓储实现
// ==========================================
// 职责: ref_currency / ref_lookup 表的只读访问
// ==========================================

use crate::importer::error::ImportError;
use crate::importer::fuzzy::ReferenceCandidate;
use crate::importer::reference_data::ReferenceDataRepository;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ReferenceDataRepositoryImpl
// ==========================================
pub struct ReferenceDataRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceDataRepositoryImpl {
    pub fn new(db_path: &str) -> Result<Self, ImportError> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ImportError> {
        self.conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))
    }
}

#[async_trait]
impl ReferenceDataRepository for ReferenceDataRepositoryImpl {
    async fn list_currencies(&self) -> Result<Vec<ReferenceCandidate>, ImportError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT code, display_name FROM ref_currency ORDER BY code")?;
        let currencies = stmt
            .query_map([], |row| {
                Ok(ReferenceCandidate {
                    code: row.get(0)?,
                    display_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(currencies)
    }

    async fn list_lookup_codes(
        &self,
        category: &str,
    ) -> Result<Vec<ReferenceCandidate>, ImportError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT code, display_name FROM ref_lookup WHERE category = ?1 ORDER BY code",
        )?;
        let codes = stmt
            .query_map(params![category], |row| {
                Ok(ReferenceCandidate {
                    code: row.get(0)?,
                    display_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(codes)
    }
}
