// ==========================================
// 人力资源管理系统 - 组织数据导入 Trait
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 导入管道
// 职责: 定义组织数据导入接口（不包含实现）
// ==========================================

use crate::domain::import::{ImportOutcome, ValidationResult};
use crate::domain::types::EntityType;
use crate::engine::dependency_graph::ReadinessReport;
use crate::importer::error::ImportError;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// OrgDataImporter Trait
// ==========================================
// 用途: 组织数据导入主接口
// 实现者: OrgDataImporterImpl
#[async_trait]
pub trait OrgDataImporter: Send + Sync {
    /// 从 CSV/Excel 文件导入组织数据
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv / .xlsx）
    /// - entity_type: 导入实体类型
    /// - company_code: 当前所属公司代码
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 导入结果（批次、分块明细、解析问题）
    /// - Err: 结构性错误(文件不可解析/前置缺失/数据库错误)
    ///
    /// # 导入流程
    /// 1. 前置就绪门禁(依赖图 + 实时计数)
    /// 2. 文件解析
    /// 3. 数据集校验(外部校验器可选,失败透明回退本地)
    /// 4. 暂存批次
    /// 5. 引用解析 + 分块提交 + 终态化
    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ImportOutcome, ImportError>;

    /// 从原始分隔文本导入(Web 上传路径)
    async fn import_from_text(
        &self,
        text: &str,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ImportOutcome, ImportError>;

    /// 仅校验,不暂存不落库(干跑)
    async fn validate_text(
        &self,
        text: &str,
        entity_type: EntityType,
    ) -> Result<ValidationResult, ImportError>;

    /// 前置就绪度检查
    async fn check_readiness(
        &self,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ReadinessReport, ImportError>;
}
