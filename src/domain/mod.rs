// ==========================================
// 人力资源管理系统 - 领域模型层
// ==========================================
// 依据: HR_Master_Spec.md - PART A/B 数据体系
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含管道逻辑
// ==========================================

pub mod import;
pub mod org;
pub mod types;

// 重导出核心类型
pub use import::{
    ChunkOutcome, ImportBatch, ImportOutcome, ImportRow, ValidationIssue, ValidationResult,
};
pub use org::{ExistingRecord, StagedRecord};
pub use types::{
    BatchStatus, EntityType, FieldType, IssueSeverity, ReferenceFieldKind,
};
