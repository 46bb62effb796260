// ==========================================
// 人力资源管理系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库连接失败: {0}")]
    ConnectionError(String),

    #[error("数据库查询失败: {0}")]
    QueryError(String),

    #[error("数据库事务失败: {0}")]
    TransactionError(String),

    #[error("记录不存在: {0}")]
    NotFound(String),

    #[error("数据序列化失败: {0}")]
    SerializationError(String),

    #[error("锁获取失败: {0}")]
    LockError(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => {
                RepositoryError::NotFound("查询无结果".to_string())
            }
            other => RepositoryError::QueryError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

impl From<RepositoryError> for crate::importer::error::ImportError {
    fn from(err: RepositoryError) -> Self {
        crate::importer::error::ImportError::DatabaseQueryError(err.to_string())
    }
}
