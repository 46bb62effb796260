// ==========================================
// 人力资源管理系统 - 领域类型定义
// ==========================================
// 依据: HR_Master_Spec.md - PART B 导入体系
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 0.2 严重级别体系
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 导入实体类型 (Import Entity Type)
// ==========================================
// 红线: 静态注册表,运行期不可扩展
// 序列化格式: snake_case (与数据库/文件名一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Companies,   // 公司(所属域)
    Grades,      // 职级
    Departments, // 部门
    Jobs,        // 职务
    Positions,   // 岗位
    Employees,   // 员工
}

impl EntityType {
    /// 全部实体类型（按注册顺序）
    pub const ALL: [EntityType; 6] = [
        EntityType::Companies,
        EntityType::Grades,
        EntityType::Departments,
        EntityType::Jobs,
        EntityType::Positions,
        EntityType::Employees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Companies => "companies",
            EntityType::Grades => "grades",
            EntityType::Departments => "departments",
            EntityType::Jobs => "jobs",
            EntityType::Positions => "positions",
            EntityType::Employees => "employees",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "companies" => Ok(EntityType::Companies),
            "grades" => Ok(EntityType::Grades),
            "departments" => Ok(EntityType::Departments),
            "jobs" => Ok(EntityType::Jobs),
            "positions" => Ok(EntityType::Positions),
            "employees" => Ok(EntityType::Employees),
            other => Err(format!("未知实体类型: {}", other)),
        }
    }
}

// ==========================================
// 校验问题严重级别 (Issue Severity)
// ==========================================
// 红线: ERROR 阻断行提交,WARNING/INFO 仅提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Error,   // 阻断该行
    Warning, // 提示,不阻断
    Info,    // 信息
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Error => write!(f, "ERROR"),
            IssueSeverity::Warning => write!(f, "WARNING"),
            IssueSeverity::Info => write!(f, "INFO"),
        }
    }
}

// ==========================================
// 字段类型 (Field Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,   // 文本
    Date,   // 日期(ISO 优先)
    Email,  // 邮箱
    Number, // 数值(词法判定)
    Enum,   // 枚举(allowed_values)
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Date => write!(f, "date"),
            FieldType::Email => write!(f, "email"),
            FieldType::Number => write!(f, "number"),
            FieldType::Enum => write!(f, "enum"),
        }
    }
}

// ==========================================
// 参照数据字段语义 (Reference Field Kind)
// ==========================================
// 红线: 在 schema 定义时一次性解析,禁止逐值重新推断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceFieldKind {
    Country,        // 国家/国籍 (ISO-3166 alpha-2)
    Currency,       // 币种 (参照库加载)
    Gender,         // 性别 (固定词表归一)
    MaritalStatus,  // 婚姻状况 (固定词表归一)
    Lookup(String), // 任意查找类目 (参照库按类目加载)
}

impl fmt::Display for ReferenceFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceFieldKind::Country => write!(f, "country"),
            ReferenceFieldKind::Currency => write!(f, "currency"),
            ReferenceFieldKind::Gender => write!(f, "gender"),
            ReferenceFieldKind::MaritalStatus => write!(f, "marital_status"),
            ReferenceFieldKind::Lookup(category) => write!(f, "lookup:{}", category),
        }
    }
}

// ==========================================
// 导入批次状态 (Batch Status)
// ==========================================
// 红线: 单向迁移 staging → committed|failed,批次不可重开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Staging,   // 已暂存,未落库
    Committed, // 全部分块成功
    Failed,    // 任一分块失败(计数保留)
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Staging => write!(f, "STAGING"),
            BatchStatus::Committed => write!(f, "COMMITTED"),
            BatchStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STAGING" => Ok(BatchStatus::Staging),
            "COMMITTED" => Ok(BatchStatus::Committed),
            "FAILED" => Ok(BatchStatus::Failed),
            other => Err(format!("未知批次状态: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_roundtrip() {
        for et in EntityType::ALL {
            assert_eq!(et.as_str().parse::<EntityType>().unwrap(), et);
        }
    }

    #[test]
    fn test_entity_type_unknown() {
        assert!("projects".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_batch_status_display_parse() {
        assert_eq!("COMMITTED".parse::<BatchStatus>().unwrap(), BatchStatus::Committed);
        assert_eq!(BatchStatus::Staging.to_string(), "STAGING");
    }

    #[test]
    fn test_severity_ordering() {
        // ERROR 排序在 WARNING 之前(报表按严重度展示)
        assert!(IssueSeverity::Error < IssueSeverity::Warning);
    }
}
