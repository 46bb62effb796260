// ==========================================
// 组织数据导入API
// ==========================================
// 职责: 封装组织数据导入相关功能
// ==========================================

use crate::api::error::ApiError;
use crate::config::ConfigManager;
use crate::domain::types::{BatchStatus, EntityType};
use crate::engine::dependency_graph::EntityDependencyGraph;
use crate::importer::{
    render_batch_report, render_validation_report, OrgDataImporter, OrgDataImporterImpl,
    ReferenceDataCatalog, UniversalFileParser,
};
use crate::importer::file_parser::FileParser;
use crate::repository::{ImportRecordStore, ImportRecordStoreImpl, ReferenceDataRepositoryImpl};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// 通用文件解析适配(按扩展名选择 CSV/Excel)
struct AutoFileParser;

impl FileParser for AutoFileParser {
    fn parse_to_rows(
        &self,
        file_path: &Path,
    ) -> Result<Vec<crate::domain::import::ImportRow>, crate::importer::ImportError> {
        UniversalFileParser.parse(file_path)
    }
}

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 批次ID
    pub batch_id: String,
    /// 批次状态 (COMMITTED / FAILED)
    pub status: BatchStatus,
    /// 暂存总行数
    pub total_rows: usize,
    /// 成功落库的记录数
    pub imported: usize,
    /// 失败行数(引用解析失败 + 分块失败)
    pub failed: usize,
    /// 校验阶段跳过的行数
    pub skipped: usize,
    /// 校验错误/警告数
    pub error_count: usize,
    pub warning_count: usize,
    /// 批次结果报告(纯文本,可直接下载)
    pub report: String,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 干跑校验响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateApiResponse {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_count: usize,
    pub warning_count: usize,
    /// 校验报告(纯文本,可直接下载)
    pub report: String,
}

/// 就绪度检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessApiResponse {
    pub entity_type: String,
    pub met: bool,
    pub missing: Vec<String>,
    pub optional_missing: Vec<String>,
    /// 展示分层(每层实体的前置都在更早层)
    pub tiers: Vec<Vec<String>>,
}

/// 批次摘要(列表页)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub entity_type: String,
    pub company_code: String,
    pub status: BatchStatus,
    pub total_rows: usize,
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,
    pub committed_at: Option<String>,
    pub rollback_eligible_until: Option<String>,
    /// 当前是否仍可回滚
    pub rollback_eligible: bool,
}

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 导入组织数据文件
    ///
    /// # 参数
    /// - file_path: 文件路径(.csv / .xlsx)
    /// - entity_type: 实体类型名(companies/departments/...)
    /// - company_code: 当前所属公司代码
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入结果(计数完整,无歧义)
    /// - Err(ApiError): 结构性错误
    pub async fn import_file(
        &self,
        file_path: &str,
        entity_type: &str,
        company_code: &str,
    ) -> Result<ImportApiResponse, ApiError> {
        let entity_type = parse_entity_type(entity_type)?;
        let importer = self.create_importer()?;

        let outcome = importer
            .import_from_file(file_path, entity_type, company_code)
            .await?;

        let report = render_batch_report(&outcome.batch, &outcome.resolution_issues, Utc::now());

        Ok(ImportApiResponse {
            batch_id: outcome.batch.batch_id.clone(),
            status: outcome.batch.status,
            total_rows: outcome.batch.total_rows,
            imported: outcome.batch.successful_record_count,
            failed: outcome.batch.failed_record_count,
            skipped: outcome.batch.skipped_record_count,
            error_count: outcome.batch.validation_result.error_count,
            warning_count: outcome.batch.validation_result.warning_count,
            report,
            elapsed_ms: outcome.elapsed_time.as_millis() as i64,
        })
    }

    /// 导入原始分隔文本(Web 上传路径)
    pub async fn import_text(
        &self,
        text: &str,
        entity_type: &str,
        company_code: &str,
    ) -> Result<ImportApiResponse, ApiError> {
        let entity_type = parse_entity_type(entity_type)?;
        let importer = self.create_importer()?;

        let outcome = importer
            .import_from_text(text, entity_type, company_code)
            .await?;

        let report = render_batch_report(&outcome.batch, &outcome.resolution_issues, Utc::now());

        Ok(ImportApiResponse {
            batch_id: outcome.batch.batch_id.clone(),
            status: outcome.batch.status,
            total_rows: outcome.batch.total_rows,
            imported: outcome.batch.successful_record_count,
            failed: outcome.batch.failed_record_count,
            skipped: outcome.batch.skipped_record_count,
            error_count: outcome.batch.validation_result.error_count,
            warning_count: outcome.batch.validation_result.warning_count,
            report,
            elapsed_ms: outcome.elapsed_time.as_millis() as i64,
        })
    }

    /// 仅校验,不落库(干跑)
    pub async fn validate_text(
        &self,
        text: &str,
        entity_type: &str,
    ) -> Result<ValidateApiResponse, ApiError> {
        let entity_type = parse_entity_type(entity_type)?;
        let importer = self.create_importer()?;

        let result = importer.validate_text(text, entity_type).await?;
        let report = render_validation_report(entity_type, Utc::now(), &result, &[]);

        Ok(ValidateApiResponse {
            total_rows: result.total_rows,
            valid_rows: result.valid_row_count,
            error_count: result.error_count,
            warning_count: result.warning_count,
            report,
        })
    }

    /// 前置就绪度检查
    pub async fn check_readiness(
        &self,
        entity_type: &str,
        company_code: &str,
    ) -> Result<ReadinessApiResponse, ApiError> {
        let entity_type = parse_entity_type(entity_type)?;
        let importer = self.create_importer()?;
        let graph = EntityDependencyGraph::standard()?;

        let report = importer.check_readiness(entity_type, company_code).await?;

        Ok(ReadinessApiResponse {
            entity_type: entity_type.to_string(),
            met: report.met,
            missing: report.missing.iter().map(|e| e.to_string()).collect(),
            optional_missing: report
                .optional_missing
                .iter()
                .map(|e| e.to_string())
                .collect(),
            tiers: graph
                .tiers()
                .iter()
                .map(|tier| tier.iter().map(|e| e.to_string()).collect())
                .collect(),
        })
    }

    /// 最近批次列表
    pub async fn list_recent_batches(&self, limit: usize) -> Result<Vec<BatchSummary>, ApiError> {
        let repo = ImportRecordStoreImpl::new(&self.db_path)?;

        let limit = limit.clamp(1, 100);
        let now = Utc::now();
        let batches = repo.get_recent_batches(limit).await?;

        Ok(batches
            .into_iter()
            .map(|b| BatchSummary {
                rollback_eligible: b.is_rollback_eligible(now),
                batch_id: b.batch_id,
                entity_type: b.entity_type.to_string(),
                company_code: b.company_code,
                status: b.status,
                total_rows: b.total_rows,
                imported: b.successful_record_count,
                failed: b.failed_record_count,
                skipped: b.skipped_record_count,
                committed_at: b.committed_at.map(|t| t.to_rfc3339()),
                rollback_eligible_until: b.rollback_eligible_until.map(|t| t.to_rfc3339()),
            })
            .collect())
    }

    /// 生成已存批次的结果报告(下载)
    pub async fn render_batch_report(&self, batch_id: &str) -> Result<String, ApiError> {
        let repo = ImportRecordStoreImpl::new(&self.db_path)?;

        let batch = repo
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("批次不存在: {}", batch_id)))?;

        Ok(render_batch_report(&batch, &[], Utc::now()))
    }

    /// 创建 OrgDataImporter 实例
    fn create_importer(
        &self,
    ) -> Result<OrgDataImporterImpl<ImportRecordStoreImpl, ConfigManager>, ApiError> {
        let repo = Arc::new(ImportRecordStoreImpl::new(&self.db_path)?);
        let config = ConfigManager::new(&self.db_path)?;
        let ref_repo = Arc::new(ReferenceDataRepositoryImpl::new(&self.db_path)?);
        let catalog = Arc::new(ReferenceDataCatalog::new(ref_repo));
        let graph = EntityDependencyGraph::standard()?;

        Ok(OrgDataImporterImpl::new(
            repo,
            config,
            Box::new(AutoFileParser),
            graph,
            catalog,
            None, // 外部校验器默认不启用
        ))
    }
}

fn parse_entity_type(raw: &str) -> Result<EntityType, ApiError> {
    EntityType::from_str(raw).map_err(ApiError::InvalidInput)
}
