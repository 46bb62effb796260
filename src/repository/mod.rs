// ==========================================
// 人力资源管理系统 - 数据仓储层
// ==========================================
// 职责: 数据访问(rusqlite),不含业务规则
// ==========================================

pub mod error;
pub mod import_repo;
pub mod import_repo_impl;
pub mod reference_data_repo;
pub mod schema;

pub use error::RepositoryError;
pub use import_repo::ImportRecordStore;
pub use import_repo_impl::ImportRecordStoreImpl;
pub use reference_data_repo::ReferenceDataRepositoryImpl;
pub use schema::init_schema;
