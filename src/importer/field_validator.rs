// ==========================================
// 人力资源管理系统 - 字段校验引擎
// ==========================================
// 依据: Org_Field_Rules_v0.2.md - 校验顺序与短路规则
// 职责: 逐字段结构校验 + 参照数据校验 + 数据集汇总
// ==========================================
// 校验顺序(每字段,命中 ERROR 即短路):
// 1. 必填  2. 参照语义  3. 类型  4. 长度(仅 WARNING)
// 5. 正则  6. 枚举(无参照语义时)
// 归一命中时额外产出一条 WARNING,并继续后续检查
// ==========================================

use crate::domain::import::{ImportRow, ValidationIssue, ValidationResult};
use crate::importer::error::ImportError;
use crate::importer::normalizers::{NormalizeOutcome, ReferenceValidators};
use crate::importer::schema::{EntitySchema, FieldRule};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashSet;

/// 接受的日期格式,ISO 优先
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y", "%m/%d/%Y"];

/// 枚举建议最多列出的取值个数
const ENUM_SUGGESTION_LIMIT: usize = 5;

// ==========================================
// FieldValidator
// ==========================================
pub struct FieldValidator {
    reference: ReferenceValidators,
    email_pattern: Regex,
}

impl FieldValidator {
    pub fn new(reference: ReferenceValidators) -> Self {
        Self {
            reference,
            // local@domain.tld 基本形
            email_pattern: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
                .expect("邮箱正则非法"),
        }
    }

    /// 校验单字段
    ///
    /// # 参数
    /// - field: 字段名(已归一)
    /// - raw: 原始值(可能为空串)
    /// - rule: 字段规则
    /// - row_number: 展示行号(数据下标 + 2)
    ///
    /// # 返回
    /// - 问题列表: 至多一条 ERROR,可叠加归一 WARNING
    pub async fn validate_field(
        &self,
        field: &str,
        raw: &str,
        rule: &FieldRule,
        row_number: usize,
    ) -> Result<Vec<ValidationIssue>, ImportError> {
        let mut issues = Vec::new();
        let value = raw.trim();

        // 1. 必填检查
        if value.is_empty() {
            if rule.required {
                issues.push(ValidationIssue::error(
                    row_number,
                    field,
                    raw,
                    "必填字段不能为空".to_string(),
                ));
            }
            // 空值无需继续类型/参照检查
            return Ok(issues);
        }

        // 2. 参照数据检查(schema 定义期已选定语义)
        if let Some(kind) = &rule.reference {
            match self.reference.validate(kind, value).await? {
                NormalizeOutcome::Valid => {}
                NormalizeOutcome::Normalized { canonical } => {
                    issues.push(ValidationIssue::warning(
                        row_number,
                        field,
                        raw,
                        format!("将归一为 {}", canonical),
                    ));
                }
                NormalizeOutcome::Invalid { message, suggestion } => {
                    let mut issue = ValidationIssue::error(row_number, field, raw, message);
                    if let Some(s) = suggestion {
                        issue = issue.with_suggestion(s);
                    }
                    issues.push(issue);
                    return Ok(issues);
                }
            }
        }

        // 3. 类型检查
        if let Some(message) = self.type_error(value, rule) {
            issues.push(ValidationIssue::error(row_number, field, raw, message));
            return Ok(issues);
        }

        // 4. 长度检查(超长容忍,仅 WARNING)
        if let Some(limit) = rule.max_length {
            if value.chars().count() > limit {
                issues.push(ValidationIssue::warning(
                    row_number,
                    field,
                    raw,
                    format!("超出最大长度 {}(实际 {})", limit, value.chars().count()),
                ));
            }
        }

        // 5. 正则检查
        if let Some(pattern) = &rule.pattern {
            if !pattern.is_match(value) {
                issues.push(ValidationIssue::error(
                    row_number,
                    field,
                    raw,
                    format!("格式不符合要求: {}", pattern.as_str()),
                ));
                return Ok(issues);
            }
        }

        // 6. 枚举检查(无参照语义时)
        if rule.reference.is_none() {
            if let Some(allowed) = &rule.allowed_values {
                let hit = allowed.iter().any(|v| v.eq_ignore_ascii_case(value));
                if !hit {
                    let suggestion = allowed
                        .iter()
                        .take(ENUM_SUGGESTION_LIMIT)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ");
                    issues.push(
                        ValidationIssue::error(
                            row_number,
                            field,
                            raw,
                            format!("取值不在允许范围内: {}", value),
                        )
                        .with_suggestion(suggestion),
                    );
                    return Ok(issues);
                }
            }
        }

        Ok(issues)
    }

    /// 校验整个数据集(每轮整体重算)
    pub async fn validate_dataset(
        &self,
        rows: &[ImportRow],
        schema: &EntitySchema,
    ) -> Result<ValidationResult, ImportError> {
        let mut issues = Vec::new();
        let mut seen_keys: HashSet<String> = HashSet::new();

        for row in rows {
            for (field, rule) in &schema.fields {
                let raw = row.get(field);
                issues.extend(self.validate_field(field, raw, rule, row.row_number).await?);
            }

            // 自然键批次内查重(后出现者记 ERROR)
            let key = row.get(schema.natural_key).trim().to_uppercase();
            if !key.is_empty() && !seen_keys.insert(key) {
                issues.push(ValidationIssue::error(
                    row.row_number,
                    schema.natural_key,
                    row.get(schema.natural_key),
                    "批次内重复编码".to_string(),
                ));
            }
        }

        let row_numbers: Vec<usize> = rows.iter().map(|r| r.row_number).collect();
        Ok(ValidationResult::from_issues(&row_numbers, issues))
    }

    /// 类型检查,返回错误消息(None = 通过)
    fn type_error(&self, value: &str, rule: &FieldRule) -> Option<String> {
        use crate::domain::types::FieldType;

        match rule.field_type {
            FieldType::Text | FieldType::Enum => None,
            FieldType::Date => {
                let parsed = DATE_FORMATS
                    .iter()
                    .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok());
                if parsed {
                    None
                } else {
                    Some(format!("日期格式不正确(应为 YYYY-MM-DD): {}", value))
                }
            }
            FieldType::Email => {
                if self.email_pattern.is_match(value) {
                    None
                } else {
                    Some(format!("邮箱格式不正确: {}", value))
                }
            }
            FieldType::Number => {
                if value.parse::<f64>().is_ok() {
                    None
                } else {
                    Some(format!("应为数值: {}", value))
                }
            }
        }
    }
}
