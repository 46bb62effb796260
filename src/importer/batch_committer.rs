// ==========================================
// 人力资源管理系统 - 批次提交引擎
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 6. 暂存与分块提交
// ==========================================
// 状态机: staging → committed | failed,无其它迁移;
// 批次不重试不续作,新尝试即新批次
// 流程: 暂存 → 分区 → 转换(引用解析) → 分块落库 → 终态化
// 红线:
// - 分块失败不中止后续分块,逐块独立记录
// - 任一分块失败 → 批次 FAILED(计数保留,多数成功也不例外)
// - 回滚窗口由本引擎建立,回滚本身是带外操作
// ==========================================

use crate::domain::import::{
    ChunkOutcome, ImportBatch, ImportOutcome, ImportRow, ValidationIssue, ValidationResult,
};
use crate::domain::org::StagedRecord;
use crate::domain::types::{BatchStatus, EntityType};
use crate::importer::error::ImportError;
use crate::importer::normalizers::{NormalizeOutcome, ReferenceValidators};
use crate::importer::reference_resolver::{
    CrossReferenceResolver, ResolutionOutcome, COMPOUND_KEY_SEPARATOR,
};
use crate::importer::schema::EntitySchema;
use crate::repository::import_repo::ImportRecordStore;
use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// BatchImportCommitter
// ==========================================
pub struct BatchImportCommitter<R>
where
    R: ImportRecordStore,
{
    repo: Arc<R>,
    chunk_size: usize,        // 每分块行数(默认 50)
    retention_days: i64,      // 回滚窗口天数(默认 30)
}

impl<R> BatchImportCommitter<R>
where
    R: ImportRecordStore,
{
    pub fn new(repo: Arc<R>, chunk_size: usize, retention_days: i64) -> Self {
        Self {
            repo,
            chunk_size: chunk_size.max(1),
            retention_days,
        }
    }

    /// 暂存: 创建 STAGING 批次,内嵌完整行集与校验快照
    ///
    /// 回滚窗口先按暂存时间乐观计算,提交时校正为实际提交时间
    pub async fn stage(
        &self,
        entity_type: EntityType,
        company_code: &str,
        rows: Vec<ImportRow>,
        validation: ValidationResult,
    ) -> Result<ImportBatch, ImportError> {
        let now = Utc::now();
        let batch = ImportBatch {
            batch_id: Uuid::new_v4().to_string(),
            entity_type,
            company_code: company_code.to_string(),
            status: BatchStatus::Staging,
            total_rows: rows.len(),
            successful_record_count: 0,
            failed_record_count: 0,
            skipped_record_count: 0,
            imported_record_ids: Vec::new(),
            chunk_errors: Vec::new(),
            staging_data: rows,
            validation_result: validation,
            created_at: now,
            committed_at: None,
            rollback_eligible_until: Some(now + Duration::days(self.retention_days)),
        };

        self.repo.insert_import_batch(&batch).await?;
        info!(
            batch_id = %batch.batch_id,
            entity_type = %batch.entity_type,
            total_rows = batch.total_rows,
            "批次已暂存"
        );

        Ok(batch)
    }

    /// 提交: 分区 → 转换 → 分块落库 → 终态化
    pub async fn commit(
        &self,
        mut batch: ImportBatch,
        schema: &EntitySchema,
        resolver: &CrossReferenceResolver,
        normalizers: &ReferenceValidators,
    ) -> Result<ImportOutcome, ImportError> {
        if batch.status != BatchStatus::Staging {
            return Err(ImportError::IllegalBatchState {
                batch_id: batch.batch_id.clone(),
                status: batch.status.to_string(),
                operation: "commit".to_string(),
            });
        }

        let start_time = Instant::now();

        // === 分区: 校验 ERROR 行跳过,仅告警的行照常提交 ===
        let error_rows = batch.validation_result.error_rows();
        let (eligible, skipped): (Vec<&ImportRow>, Vec<&ImportRow>) = batch
            .staging_data
            .iter()
            .partition(|row| !error_rows.contains(&row.row_number));

        let skipped_count = skipped.len();
        debug!(
            batch_id = %batch.batch_id,
            eligible = eligible.len(),
            skipped = skipped_count,
            "分区完成"
        );

        // === 转换: 外部列名 → 内部记录形态,引用键 → 内部 ID ===
        let mut staged_records = Vec::new();
        let mut resolution_issues = Vec::new();
        let mut resolution_failed_rows = 0usize;

        for row in &eligible {
            match self
                .transform_row(row, schema, &batch.company_code, resolver, normalizers)
                .await?
            {
                TransformOutcome::Ready { record, warnings } => {
                    resolution_issues.extend(warnings);
                    staged_records.push(record);
                }
                TransformOutcome::Failed { issues } => {
                    resolution_failed_rows += 1;
                    resolution_issues.extend(issues);
                }
            }
        }

        if resolution_failed_rows > 0 {
            warn!(
                batch_id = %batch.batch_id,
                failed = resolution_failed_rows,
                "部分行引用解析失败,转为失败行"
            );
        }

        // === 分块落库: 固定分块,块间互不中止 ===
        let total_to_commit = staged_records.len();
        let mut chunk_outcomes = Vec::new();
        let mut imported_ids = Vec::new();
        let mut chunk_failed_rows = 0usize;
        let mut processed = 0usize;

        for (chunk_index, chunk) in staged_records.chunks(self.chunk_size).enumerate() {
            match self.repo.batch_insert_records(&batch.batch_id, chunk).await {
                Ok(ids) => {
                    processed += chunk.len();
                    info!(
                        batch_id = %batch.batch_id,
                        chunk = chunk_index,
                        inserted = ids.len(),
                        progress = format!("{}/{}", processed, total_to_commit),
                        "分块落库成功"
                    );
                    imported_ids.extend(ids.iter().cloned());
                    chunk_outcomes.push(ChunkOutcome {
                        chunk_index,
                        attempted: chunk.len(),
                        inserted_ids: ids,
                        error: None,
                    });
                }
                Err(e) => {
                    processed += chunk.len();
                    chunk_failed_rows += chunk.len();
                    warn!(
                        batch_id = %batch.batch_id,
                        chunk = chunk_index,
                        error = %e,
                        "分块落库失败,继续后续分块"
                    );
                    chunk_outcomes.push(ChunkOutcome {
                        chunk_index,
                        attempted: chunk.len(),
                        inserted_ids: Vec::new(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        // === 终态化: 任一分块失败即 FAILED ===
        let all_chunks_ok = chunk_outcomes.iter().all(ChunkOutcome::is_success);
        let committed_at = Utc::now();

        batch.status = if all_chunks_ok {
            BatchStatus::Committed
        } else {
            BatchStatus::Failed
        };
        batch.successful_record_count = imported_ids.len();
        batch.failed_record_count = resolution_failed_rows + chunk_failed_rows;
        batch.skipped_record_count = skipped_count;
        batch.imported_record_ids = imported_ids;
        batch.chunk_errors = chunk_outcomes
            .iter()
            .filter_map(|c| {
                c.error
                    .as_ref()
                    .map(|e| format!("分块 {}: {}", c.chunk_index, e))
            })
            .collect();
        batch.committed_at = Some(committed_at);
        // 校正回滚窗口为实际提交时间起算
        batch.rollback_eligible_until = Some(committed_at + Duration::days(self.retention_days));

        self.repo.finalize_import_batch(&batch).await?;

        info!(
            batch_id = %batch.batch_id,
            status = %batch.status,
            success = batch.successful_record_count,
            failed = batch.failed_record_count,
            skipped = batch.skipped_record_count,
            "批次终态化完成"
        );

        Ok(ImportOutcome {
            batch,
            chunk_outcomes,
            resolution_issues,
            elapsed_time: start_time.elapsed(),
        })
    }

    /// 单行转换: 构造内部 payload 并解析引用字段
    async fn transform_row(
        &self,
        row: &ImportRow,
        schema: &EntitySchema,
        company_code: &str,
        resolver: &CrossReferenceResolver,
        normalizers: &ReferenceValidators,
    ) -> Result<TransformOutcome, ImportError> {
        let mut payload = Map::new();
        let mut warnings = Vec::new();
        let mut failures = Vec::new();

        // 普通字段: 参照字段写入规范形,其余原样(空值 → NULL)
        for (field, rule) in &schema.fields {
            let raw = row.get(field).trim();
            if raw.is_empty() {
                payload.insert(field.clone(), Value::Null);
                continue;
            }

            let value = match &rule.reference {
                Some(kind) => match normalizers.validate(kind, raw).await? {
                    NormalizeOutcome::Normalized { canonical } => canonical,
                    // Invalid 不应出现(分区已剔除),保底原样落库
                    _ => raw.to_string(),
                },
                None => raw.to_string(),
            };
            payload.insert(field.clone(), Value::String(value));
        }

        // 引用字段: 解析为内部 ID
        for (field, _rule, target) in schema.resolvable_fields() {
            let raw = row.get(field).trim();
            if raw.is_empty() {
                payload.insert(target.id_field.to_string(), Value::Null);
                continue;
            }

            match resolver.resolve(target.target, raw) {
                ResolutionOutcome::Resolved(hit) => {
                    if hit.ambiguous {
                        warnings.push(
                            ValidationIssue::warning(
                                row.row_number,
                                field,
                                raw,
                                format!("裸编码在多家公司存在,已取先注册者({})", hit.company_code),
                            )
                            .with_suggestion(format!(
                                "{}{}{}",
                                hit.company_code, COMPOUND_KEY_SEPARATOR, raw
                            )),
                        );
                    }
                    payload.insert(target.id_field.to_string(), Value::String(hit.record_id));
                }
                ResolutionOutcome::NotFound => {
                    if target.required {
                        failures.push(ValidationIssue::error(
                            row.row_number,
                            field,
                            raw,
                            format!("必需引用未找到: {} 中不存在 {}", target.target, raw),
                        ));
                    } else {
                        warnings.push(ValidationIssue::warning(
                            row.row_number,
                            field,
                            raw,
                            format!("可选引用未找到,置空: {}", raw),
                        ));
                        payload.insert(target.id_field.to_string(), Value::Null);
                    }
                }
                ResolutionOutcome::CrossCompanyDenied { target_company } => {
                    // 跨公司策略违规一律硬失败,与引用是否必需无关
                    failures.push(ValidationIssue::error(
                        row.row_number,
                        field,
                        raw,
                        format!(
                            "跨公司引用不被允许: {} → {}",
                            company_code, target_company
                        ),
                    ));
                }
            }
        }

        if !failures.is_empty() {
            return Ok(TransformOutcome::Failed { issues: failures });
        }

        let code = row.get(schema.natural_key).trim().to_string();
        Ok(TransformOutcome::Ready {
            record: StagedRecord {
                entity_type: schema.entity_type,
                company_code: company_code.to_string(),
                code,
                payload: Value::Object(payload),
                source_row: row.row_number,
            },
            warnings,
        })
    }
}

/// 单行转换结果
enum TransformOutcome {
    Ready {
        record: StagedRecord,
        warnings: Vec<ValidationIssue>,
    },
    Failed {
        issues: Vec<ValidationIssue>,
    },
}
