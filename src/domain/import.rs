// ==========================================
// 人力资源管理系统 - 导入领域模型
// ==========================================
// 依据: HR_Master_Spec.md - PART B 导入体系
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 批次与校验结构
// 依据: data_dictionary_v0.2.md - import_batch 表
// ==========================================

use crate::domain::types::{BatchStatus, EntityType, IssueSeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// ImportRow - 解析后的原始行
// ==========================================
// 用途: 文件解析产物,字段名已小写+下划线归一
// 生命周期: 仅在一次导入流程内(随批次快照持久化)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRow {
    /// 展示行号 = 数据行下标 + 2(表头占一行,显示从 1 开始)
    pub row_number: usize,
    /// 列名 → 原始值(可能为空串)
    pub fields: HashMap<String, String>,
}

impl ImportRow {
    /// 取字段值(缺列视同空串)
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }
}

// ==========================================
// ValidationIssue - 单条校验问题
// ==========================================
// 红线: 创建后不可变;一行可有多条问题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row: usize,                 // 展示行号
    pub field: String,              // 字段名
    pub raw_value: String,          // 原始值
    pub severity: IssueSeverity,    // 严重级别
    pub message: String,            // 问题描述
    pub suggestion: Option<String>, // 修正建议(模糊匹配产物)
}

impl ValidationIssue {
    pub fn error(row: usize, field: &str, raw_value: &str, message: String) -> Self {
        Self {
            row,
            field: field.to_string(),
            raw_value: raw_value.to_string(),
            severity: IssueSeverity::Error,
            message,
            suggestion: None,
        }
    }

    pub fn warning(row: usize, field: &str, raw_value: &str, message: String) -> Self {
        Self {
            row,
            field: field.to_string(),
            raw_value: raw_value.to_string(),
            severity: IssueSeverity::Warning,
            message,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

// ==========================================
// ValidationResult - 数据集级校验结果
// ==========================================
// 红线: 每轮校验整体重算,禁止增量修补
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub total_rows: usize,      // 数据集总行数
    pub valid_row_count: usize, // 无 ERROR 级问题的行数
    pub error_count: usize,     // ERROR 级问题条数
    pub warning_count: usize,   // WARNING 级问题条数
    pub issues: Vec<ValidationIssue>, // 有序问题列表
}

impl ValidationResult {
    /// 由问题列表整体汇总(行号集合来自 rows,而非 issues,
    /// 否则无问题的行无法计入 valid_row_count)
    pub fn from_issues(row_numbers: &[usize], issues: Vec<ValidationIssue>) -> Self {
        let error_rows: HashSet<usize> = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .map(|i| i.row)
            .collect();

        let error_count = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .count();
        let warning_count = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count();

        let valid_row_count = row_numbers
            .iter()
            .filter(|n| !error_rows.contains(n))
            .count();

        Self {
            total_rows: row_numbers.len(),
            valid_row_count,
            error_count,
            warning_count,
            issues,
        }
    }

    /// 含 ERROR 级问题的行号集合(分区步骤使用)
    pub fn error_rows(&self) -> HashSet<usize> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .map(|i| i.row)
            .collect()
    }

    /// 是否存在 ERROR 级问题
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

// ==========================================
// ChunkOutcome - 单个分块的落库结果
// ==========================================
// 红线: 分块失败不回滚其它分块,逐块独立记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutcome {
    pub chunk_index: usize,        // 分块序号(0 起)
    pub attempted: usize,          // 本块行数
    pub inserted_ids: Vec<String>, // 成功插入的记录 ID
    pub error: Option<String>,     // 失败原因(None = 成功)
}

impl ChunkOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// ==========================================
// ImportBatch - 导入批次(唯一持久化工件)
// ==========================================
// 状态机: staging → committed | failed,单向,不可重开
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,            // 批次 ID(UUID)
    pub entity_type: EntityType,     // 导入实体类型
    pub company_code: String,        // 当前所属公司(域)
    pub status: BatchStatus,         // 批次状态
    pub total_rows: usize,           // 暂存行数
    pub successful_record_count: usize, // 落库成功行数
    pub failed_record_count: usize,  // 落库失败行数(分块失败/引用解析失败)
    pub skipped_record_count: usize, // 校验阶段被排除的行数
    pub imported_record_ids: Vec<String>, // 已插入记录 ID(跨分块,顺序不保证)
    pub chunk_errors: Vec<String>,   // 分块级错误明细
    pub staging_data: Vec<ImportRow>, // 完整解析行集快照
    pub validation_result: ValidationResult, // 校验结果快照
    pub created_at: DateTime<Utc>,   // 暂存时间
    pub committed_at: Option<DateTime<Utc>>, // 提交完成时间
    pub rollback_eligible_until: Option<DateTime<Utc>>, // 回滚窗口截止
}

impl ImportBatch {
    /// 当前时刻是否仍在回滚窗口内
    pub fn is_rollback_eligible(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, BatchStatus::Committed | BatchStatus::Failed)
            && self
                .rollback_eligible_until
                .map(|deadline| now < deadline)
                .unwrap_or(false)
    }
}

// ==========================================
// ImportOutcome - 一次导入尝试的完整结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub batch: ImportBatch,
    pub chunk_outcomes: Vec<ChunkOutcome>,
    /// 转换阶段的引用解析问题(效果等同校验问题,但于转换期发现;
    /// 不并入校验快照——快照只做整体重算,不做增量修补)
    pub resolution_issues: Vec<ValidationIssue>,
    pub elapsed_time: std::time::Duration,
}
