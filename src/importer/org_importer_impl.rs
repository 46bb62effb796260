// ==========================================
// 人力资源管理系统 - 组织数据导入器实现
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 1.1 管道主流程
// ==========================================
// 职责: 整合导入流程,从文件到记录库
// 流程: 门禁 → 解析 → 校验 → 暂存 → 解析引用 → 分块提交
// 并发约定: 单批次单流水,批次之间无共享可变状态
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{ImportOutcome, ImportRow, ValidationResult};
use crate::domain::types::EntityType;
use crate::engine::dependency_graph::{EntityDependencyGraph, ReadinessReport};
use crate::importer::batch_committer::BatchImportCommitter;
use crate::importer::error::ImportError;
use crate::importer::external_validator::ExternalValidator;
use crate::importer::field_validator::FieldValidator;
use crate::importer::file_parser::{CsvParser, FileParser};
use crate::importer::normalizers::ReferenceValidators;
use crate::importer::reference_data::ReferenceDataCatalog;
use crate::importer::reference_resolver::CrossReferenceResolver;
use crate::importer::schema::{schema_for, EntitySchema};
use crate::repository::import_repo::ImportRecordStore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// OrgDataImporterImpl - 组织数据导入器实现
// ==========================================
pub struct OrgDataImporterImpl<R, C>
where
    R: ImportRecordStore,
    C: ImportConfigReader,
{
    // 数据访问层
    repo: Arc<R>,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    dependency_graph: EntityDependencyGraph,
    catalog: Arc<ReferenceDataCatalog>,

    // 可选外部校验器(失败透明回退本地)
    external_validator: Option<Box<dyn ExternalValidator>>,
}

impl<R, C> OrgDataImporterImpl<R, C>
where
    R: ImportRecordStore,
    C: ImportConfigReader,
{
    /// 创建新的 OrgDataImporter 实例
    ///
    /// # 参数
    /// - repo: 记录库仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - dependency_graph: 实体依赖图(构造期已拒绝环)
    /// - catalog: 参照数据目录(归本次导入器实例所有)
    /// - external_validator: 可选外部校验器
    pub fn new(
        repo: Arc<R>,
        config: C,
        file_parser: Box<dyn FileParser>,
        dependency_graph: EntityDependencyGraph,
        catalog: Arc<ReferenceDataCatalog>,
        external_validator: Option<Box<dyn ExternalValidator>>,
    ) -> Self {
        Self {
            repo,
            config,
            file_parser,
            dependency_graph,
            catalog,
            external_validator,
        }
    }

    /// 管道主流程(解析完成之后的公共路径)
    async fn run_pipeline(
        &self,
        rows: Vec<ImportRow>,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ImportOutcome, ImportError> {
        // === 步骤 1: 前置就绪门禁 ===
        debug!("步骤 1: 前置就绪门禁");
        let readiness = self.check_readiness_inner(entity_type, company_code).await?;
        if !readiness.met {
            return Err(ImportError::PrerequisitesNotMet {
                entity_type: entity_type.to_string(),
                missing: readiness.missing.iter().map(|e| e.to_string()).collect(),
            });
        }

        // === 步骤 2: 数据集校验 ===
        debug!("步骤 2: 数据集校验");
        // 独立校验轮次之间清空参照缓存
        self.catalog.clear().await;
        let schema = schema_for(entity_type);
        let validation = self.validate_rows(entity_type, &rows, &schema).await?;
        info!(
            total = validation.total_rows,
            valid = validation.valid_row_count,
            errors = validation.error_count,
            warnings = validation.warning_count,
            "数据集校验完成"
        );

        // === 步骤 3: 暂存批次 ===
        debug!("步骤 3: 暂存批次");
        let chunk_size = self.config.get_chunk_size().await?;
        let retention_days = self.config.get_rollback_retention_days().await?;
        let committer =
            BatchImportCommitter::new(Arc::clone(&self.repo), chunk_size, retention_days);
        let batch = committer
            .stage(entity_type, company_code, rows, validation)
            .await?;

        // === 步骤 4: 构建引用解析快照 ===
        debug!("步骤 4: 构建引用解析快照");
        let resolver = self.build_resolver(&schema, company_code).await?;

        // === 步骤 5: 分块提交 ===
        debug!("步骤 5: 分块提交");
        let normalizers = self.reference_validators().await?;
        let outcome = committer
            .commit(batch, &schema, &resolver, &normalizers)
            .await?;

        info!(
            batch_id = %outcome.batch.batch_id,
            status = %outcome.batch.status,
            success = outcome.batch.successful_record_count,
            failed = outcome.batch.failed_record_count,
            skipped = outcome.batch.skipped_record_count,
            elapsed_ms = outcome.elapsed_time.as_millis() as i64,
            "组织数据导入完成"
        );

        Ok(outcome)
    }

    /// 数据集校验: 外部校验器优先,调用失败回退本地
    async fn validate_rows(
        &self,
        entity_type: EntityType,
        rows: &[ImportRow],
        schema: &EntitySchema,
    ) -> Result<ValidationResult, ImportError> {
        if let Some(external) = &self.external_validator {
            match external.validate(entity_type, rows, schema).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!(error = %e, "外部校验器调用失败,回退本地校验");
                }
            }
        }

        let validator = FieldValidator::new(self.reference_validators().await?);
        validator.validate_dataset(rows, schema).await
    }

    /// 按当前配置构建参照校验器
    async fn reference_validators(&self) -> Result<ReferenceValidators, ImportError> {
        Ok(ReferenceValidators::new(
            Arc::clone(&self.catalog),
            self.config.get_fuzzy_max_distance().await?,
            self.config.get_lookup_fuzzy_max_distance().await?,
        ))
    }

    /// 构建交叉引用解析器
    ///
    /// 集团口径: 配置白名单优先;未配置时取记录库中已注册公司全集
    async fn build_resolver(
        &self,
        schema: &EntitySchema,
        company_code: &str,
    ) -> Result<CrossReferenceResolver, ImportError> {
        let mut group = self.config.get_group_companies().await?;
        if group.is_empty() {
            group = self.repo.list_company_codes().await?;
        }

        let target_types: Vec<EntityType> = schema
            .resolvable_fields()
            .map(|(_, _, target)| target.target)
            .collect();

        let records = if target_types.is_empty() {
            Vec::new()
        } else {
            self.repo.fetch_existing_refs(&target_types, &group).await?
        };

        Ok(CrossReferenceResolver::new(&records, company_code, &group))
    }

    /// 就绪度检查(内部公共路径)
    async fn check_readiness_inner(
        &self,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ReadinessReport, ImportError> {
        let dep = self
            .dependency_graph
            .dependencies()
            .iter()
            .find(|d| d.entity_type == entity_type)
            .ok_or_else(|| ImportError::UnknownEntityType(entity_type.to_string()))?;

        let mut counts: HashMap<EntityType, i64> = HashMap::new();
        let scope = vec![company_code.to_string()];
        for prereq in dep.required.iter().chain(dep.optional.iter()) {
            // 公司本身全局计数,其余按当前公司口径
            let count = if *prereq == EntityType::Companies {
                self.repo.count_records(*prereq, &[]).await?
            } else {
                self.repo.count_records(*prereq, &scope).await?
            };
            counts.insert(*prereq, count);
        }

        self.dependency_graph.check_readiness(entity_type, &counts)
    }
}

#[async_trait::async_trait]
impl<R, C> crate::importer::org_importer_trait::OrgDataImporter for OrgDataImporterImpl<R, C>
where
    R: ImportRecordStore + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ImportOutcome, ImportError> {
        let path = file_path.as_ref();
        info!(
            file = %path.display(),
            entity_type = %entity_type,
            company = company_code,
            "开始导入组织数据"
        );

        let rows = self.file_parser.parse_to_rows(path)?;
        info!(total_rows = rows.len(), "文件解析完成");

        self.run_pipeline(rows, entity_type, company_code).await
    }

    async fn import_from_text(
        &self,
        text: &str,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ImportOutcome, ImportError> {
        let rows = CsvParser::decode_text(text)?;
        info!(total_rows = rows.len(), entity_type = %entity_type, "文本解析完成");

        self.run_pipeline(rows, entity_type, company_code).await
    }

    async fn validate_text(
        &self,
        text: &str,
        entity_type: EntityType,
    ) -> Result<ValidationResult, ImportError> {
        let rows = CsvParser::decode_text(text)?;
        self.catalog.clear().await;
        let schema = schema_for(entity_type);
        self.validate_rows(entity_type, &rows, &schema).await
    }

    async fn check_readiness(
        &self,
        entity_type: EntityType,
        company_code: &str,
    ) -> Result<ReadinessReport, ImportError> {
        self.check_readiness_inner(entity_type, company_code).await
    }
}
