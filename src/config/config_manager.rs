// ==========================================
// 人力资源管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::importer::error::ImportError;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 分块大小默认值
pub const DEFAULT_CHUNK_SIZE: usize = 50;
/// 回滚窗口默认天数
pub const DEFAULT_ROLLBACK_RETENTION_DAYS: i64 = 30;
/// 模糊匹配默认最大编辑距离
pub const DEFAULT_FUZZY_MAX_DISTANCE: usize = 3;
/// 查找类目模糊匹配默认最大编辑距离
pub const DEFAULT_LOOKUP_FUZZY_MAX_DISTANCE: usize = 2;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ImportError> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ImportError> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ImportError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取并解析数值配置,缺失或留空时用默认值
    fn get_parsed_or<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, ImportError> {
        match self.get_config_value(key)? {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim().parse::<T>().map_err(|_| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw,
                    message: "无法解析为数值".to_string(),
                })
            }
            _ => Ok(default),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_chunk_size(&self) -> Result<usize, ImportError> {
        let value = self.get_parsed_or("import/chunk_size", DEFAULT_CHUNK_SIZE)?;
        // 0 视为误配,回落默认
        Ok(if value == 0 { DEFAULT_CHUNK_SIZE } else { value })
    }

    async fn get_rollback_retention_days(&self) -> Result<i64, ImportError> {
        let value =
            self.get_parsed_or("import/rollback_retention_days", DEFAULT_ROLLBACK_RETENTION_DAYS)?;
        Ok(if value <= 0 { DEFAULT_ROLLBACK_RETENTION_DAYS } else { value })
    }

    async fn get_fuzzy_max_distance(&self) -> Result<usize, ImportError> {
        self.get_parsed_or("import/fuzzy_max_distance", DEFAULT_FUZZY_MAX_DISTANCE)
    }

    async fn get_lookup_fuzzy_max_distance(&self) -> Result<usize, ImportError> {
        self.get_parsed_or(
            "import/lookup_fuzzy_max_distance",
            DEFAULT_LOOKUP_FUZZY_MAX_DISTANCE,
        )
    }

    async fn get_group_companies(&self) -> Result<Vec<String>, ImportError> {
        match self.get_config_value("import/group_companies")? {
            Some(raw) => Ok(raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_config_db(conn: &Connection) {
        conn.execute_batch(
            r#"
            CREATE TABLE config_scope (
                scope_id TEXT PRIMARY KEY,
                scope_type TEXT NOT NULL,
                scope_key TEXT NOT NULL
            );
            INSERT INTO config_scope VALUES ('global', 'GLOBAL', 'global');
            CREATE TABLE config_kv (
                scope_id TEXT NOT NULL REFERENCES config_scope(scope_id),
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (scope_id, key)
            );
            "#,
        )
        .unwrap();
    }

    fn manager_with(pairs: &[(&str, &str)]) -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        setup_config_db(&conn);
        for (key, value) in pairs {
            conn.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
                params![key, value],
            )
            .unwrap();
        }
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_missing() {
        let config = manager_with(&[]);
        assert_eq!(config.get_chunk_size().await.unwrap(), 50);
        assert_eq!(config.get_rollback_retention_days().await.unwrap(), 30);
        assert_eq!(config.get_fuzzy_max_distance().await.unwrap(), 3);
        assert_eq!(config.get_lookup_fuzzy_max_distance().await.unwrap(), 2);
        assert!(config.get_group_companies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overrides() {
        let config = manager_with(&[
            ("import/chunk_size", "100"),
            ("import/rollback_retention_days", "7"),
            ("import/group_companies", "AUR-CORP, AUR-WEST"),
        ]);
        assert_eq!(config.get_chunk_size().await.unwrap(), 100);
        assert_eq!(config.get_rollback_retention_days().await.unwrap(), 7);
        assert_eq!(
            config.get_group_companies().await.unwrap(),
            vec!["AUR-CORP".to_string(), "AUR-WEST".to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalid_value_rejected() {
        let config = manager_with(&[("import/chunk_size", "fifty")]);
        assert!(matches!(
            config.get_chunk_size().await,
            Err(ImportError::ConfigValueError { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_chunk_size_falls_back() {
        let config = manager_with(&[("import/chunk_size", "0")]);
        assert_eq!(config.get_chunk_size().await.unwrap(), 50);
    }
}
