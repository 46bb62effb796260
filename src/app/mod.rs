// ==========================================
// 人力资源管理系统 - 应用层
// ==========================================
// 职责: 应用级共享状态与默认路径
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
