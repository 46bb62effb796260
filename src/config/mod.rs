// ==========================================
// 人力资源管理系统 - 配置层
// ==========================================
// 职责: 系统配置读取
// 存储: config_kv 表 (key-value + scope)
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

pub use config_manager::{
    ConfigManager, DEFAULT_CHUNK_SIZE, DEFAULT_FUZZY_MAX_DISTANCE,
    DEFAULT_LOOKUP_FUZZY_MAX_DISTANCE, DEFAULT_ROLLBACK_RETENTION_DAYS,
};
pub use import_config_trait::ImportConfigReader;
