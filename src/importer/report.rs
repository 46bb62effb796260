// ==========================================
// 人力资源管理系统 - 校验/失败报告生成
// ==========================================
// 职责: 生成可下载的纯文本报告
// 结构约定: 头部块(导入类型/时间) → 汇总计数 →
//           按行分组的问题明细(每问题一行) → 固定指引尾部
// ==========================================

use crate::domain::import::{ImportBatch, ValidationIssue, ValidationResult};
use crate::domain::types::EntityType;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const REPORT_FOOTER: &str = "\
────────────────────────────────────────
处理指引:
1. 修正上述 ERROR 级问题后重新上传文件
2. WARNING 级问题不阻断导入,但建议按建议值修正
3. 建议列中的值可直接复制使用
4. 如需跨公司引用,请使用 \"公司代码:实体编码\" 复合键
";

/// 生成校验报告(干跑或提交前)
pub fn render_validation_report(
    entity_type: EntityType,
    generated_at: DateTime<Utc>,
    result: &ValidationResult,
    extra_issues: &[ValidationIssue],
) -> String {
    let mut out = String::new();

    // 头部块
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "数据导入校验报告");
    let _ = writeln!(out, "导入类型: {}", entity_type);
    let _ = writeln!(out, "生成时间: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out);

    // 汇总计数
    let _ = writeln!(out, "总行数:   {}", result.total_rows);
    let _ = writeln!(out, "有效行数: {}", result.valid_row_count);
    let _ = writeln!(out, "错误数:   {}", result.error_count);
    let _ = writeln!(out, "警告数:   {}", result.warning_count);
    let _ = writeln!(out);

    // 按行分组明细
    let mut by_row: BTreeMap<usize, Vec<&ValidationIssue>> = BTreeMap::new();
    for issue in result.issues.iter().chain(extra_issues.iter()) {
        by_row.entry(issue.row).or_default().push(issue);
    }

    if by_row.is_empty() {
        let _ = writeln!(out, "全部行通过校验。");
    } else {
        for (row, issues) in &by_row {
            let _ = writeln!(out, "第 {} 行:", row);
            for issue in issues {
                match &issue.suggestion {
                    Some(suggestion) => {
                        let _ = writeln!(
                            out,
                            "  [{}] {}: {} (建议: {})",
                            issue.severity, issue.field, issue.message, suggestion
                        );
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "  [{}] {}: {}",
                            issue.severity, issue.field, issue.message
                        );
                    }
                }
            }
        }
    }

    let _ = writeln!(out);
    out.push_str(REPORT_FOOTER);
    out
}

/// 生成批次结果报告(提交后,含分块错误)
pub fn render_batch_report(
    batch: &ImportBatch,
    resolution_issues: &[ValidationIssue],
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "数据导入批次报告");
    let _ = writeln!(out, "批次 ID:  {}", batch.batch_id);
    let _ = writeln!(out, "导入类型: {}", batch.entity_type);
    let _ = writeln!(out, "所属公司: {}", batch.company_code);
    let _ = writeln!(out, "批次状态: {}", batch.status);
    let _ = writeln!(out, "生成时间: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out);

    let _ = writeln!(out, "总行数:   {}", batch.total_rows);
    let _ = writeln!(out, "成功落库: {}", batch.successful_record_count);
    let _ = writeln!(out, "失败行数: {}", batch.failed_record_count);
    let _ = writeln!(out, "跳过行数: {}", batch.skipped_record_count);
    if let Some(deadline) = batch.rollback_eligible_until {
        let _ = writeln!(
            out,
            "回滚窗口: {} 之前",
            deadline.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    let _ = writeln!(out);

    if !batch.chunk_errors.is_empty() {
        let _ = writeln!(out, "分块错误:");
        for error in &batch.chunk_errors {
            let _ = writeln!(out, "  {}", error);
        }
        let _ = writeln!(out);
    }

    // 校验快照与转换期问题合并展示(均按行分组)
    let mut by_row: BTreeMap<usize, Vec<&ValidationIssue>> = BTreeMap::new();
    for issue in batch
        .validation_result
        .issues
        .iter()
        .chain(resolution_issues.iter())
    {
        by_row.entry(issue.row).or_default().push(issue);
    }

    if !by_row.is_empty() {
        let _ = writeln!(out, "问题明细:");
        for (row, issues) in &by_row {
            let _ = writeln!(out, "第 {} 行:", row);
            for issue in issues {
                match &issue.suggestion {
                    Some(suggestion) => {
                        let _ = writeln!(
                            out,
                            "  [{}] {}: {} (建议: {})",
                            issue.severity, issue.field, issue.message, suggestion
                        );
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "  [{}] {}: {}",
                            issue.severity, issue.field, issue.message
                        );
                    }
                }
            }
        }
        let _ = writeln!(out);
    }

    out.push_str(REPORT_FOOTER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report_structure() {
        let issues = vec![
            ValidationIssue::error(3, "country", "United States", "国家需使用 ISO 代码而非名称: United States".to_string())
                .with_suggestion("US".to_string()),
            ValidationIssue::warning(3, "name", "x", "超出最大长度".to_string()),
            ValidationIssue::error(5, "email", "bad", "邮箱格式不正确: bad".to_string()),
        ];
        let result = ValidationResult::from_issues(&[2, 3, 4, 5], issues);

        let report =
            render_validation_report(EntityType::Companies, Utc::now(), &result, &[]);

        // 头部块
        assert!(report.contains("导入类型: companies"));
        // 汇总
        assert!(report.contains("总行数:   4"));
        assert!(report.contains("错误数:   2"));
        // 按行分组,问题各占一行
        let row3_pos = report.find("第 3 行:").unwrap();
        let row5_pos = report.find("第 5 行:").unwrap();
        assert!(row3_pos < row5_pos);
        assert!(report.contains("(建议: US)"));
        // 固定尾部
        assert!(report.contains("处理指引"));
    }

    #[test]
    fn test_clean_report_mentions_all_pass() {
        let result = ValidationResult::from_issues(&[2, 3], Vec::new());
        let report =
            render_validation_report(EntityType::Departments, Utc::now(), &result, &[]);
        assert!(report.contains("全部行通过校验"));
    }
}
