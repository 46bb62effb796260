// ==========================================
// 人力资源管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户友好的错误消息
// 红线: 所有错误信息必须包含显式原因(可解释性)
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 业务规则错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("前置数据缺失: {0}")]
    PrerequisitesNotMet(String),

    // ===== 数据访问错误 =====
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ===== 导入错误 =====
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从下层错误转换
// 目的: 将技术错误转换为用户友好的业务错误
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::PrerequisitesNotMet { entity_type, missing } => {
                ApiError::PrerequisitesNotMet(format!(
                    "{} 需要先导入: {}",
                    entity_type,
                    missing.join(", ")
                ))
            }
            ImportError::UnknownEntityType(msg) => ApiError::InvalidInput(msg),
            ImportError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            ImportError::CyclicDependency(msg) => {
                ApiError::InternalError(format!("实体依赖配置存在环: {}", msg))
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
