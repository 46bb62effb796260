// ==========================================
// 人力资源管理系统 - 导入层
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 1.1 管道主流程
// ==========================================
// 职责: 外部电子表格数据 → 安全落库的记录
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod batch_committer;
pub mod countries;
pub mod error;
pub mod external_validator;
pub mod field_validator;
pub mod file_parser;
pub mod fuzzy;
pub mod normalizers;
pub mod org_importer_impl;
pub mod org_importer_trait;
pub mod reference_data;
pub mod reference_resolver;
pub mod report;
pub mod schema;

// 重导出核心类型
pub use batch_committer::BatchImportCommitter;
pub use error::{ImportError, ImportPipelineResult};
pub use external_validator::ExternalValidator;
pub use field_validator::FieldValidator;
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use fuzzy::{FuzzyMatcher, ReferenceCandidate, DEFAULT_MAX_DISTANCE};
pub use normalizers::{NormalizeOutcome, ReferenceValidators};
pub use org_importer_impl::OrgDataImporterImpl;
pub use org_importer_trait::OrgDataImporter;
pub use reference_data::{ReferenceCategory, ReferenceDataCatalog, ReferenceDataRepository};
pub use reference_resolver::{
    CrossReferenceResolver, ResolutionOutcome, ResolvedReference, COMPOUND_KEY_SEPARATOR,
};
pub use report::{render_batch_report, render_validation_report};
pub use schema::{schema_for, EntitySchema, FieldRule, ResolveTarget};
