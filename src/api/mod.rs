// ==========================================
// 人力资源管理系统 - API 层
// ==========================================
// 职责: 面向外层(Web/CLI)的业务接口
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{
    BatchSummary, ImportApi, ImportApiResponse, ReadinessApiResponse, ValidateApiResponse,
};
