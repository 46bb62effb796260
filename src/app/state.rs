// ==========================================
// 人力资源管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use crate::api::ImportApi;
use crate::db::{open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::init_schema;
use std::sync::Arc;

/// 应用状态
///
/// 包含API实例和共享资源,在外层(Web/CLI)作为全局状态管理
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建应用状态
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// - 建表幂等执行;schema_version 不符仅告警,不做自动迁移
    pub fn new(db_path: String) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = open_sqlite_connection(&db_path)?;
        init_schema(&conn)?;

        match read_schema_version(&conn)? {
            Some(version) if version != CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    found = version,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库 schema 版本与代码不一致"
                );
            }
            None => {
                tracing::warn!("数据库缺少 schema_version 表");
            }
            _ => {}
        }
        drop(conn);

        Ok(Self {
            import_api: Arc::new(ImportApi::new(db_path.clone())),
            db_path,
        })
    }
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("HR_ADMIN_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 使用用户数据目录;先给默认回退值,能拿到 data_dir 再覆盖
    let mut path = PathBuf::from(".");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("hr-admin-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("hr-admin");
        }

        // 确保目录存在
        let _ = std::fs::create_dir_all(&path);
    }

    path.join("hr_admin.db").display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意：AppState::new() 的测试需要真实的数据库文件
    // 这些测试在集成测试中进行
}
