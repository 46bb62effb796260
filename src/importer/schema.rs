// ==========================================
// 人力资源管理系统 - 导入字段规则 (Schema)
// ==========================================
// 依据: Org_Field_Rules_v0.2.md - 实体字段规则全集
// ==========================================
// 红线:
// - 规则静态定义,一次管道运行期内不可变
// - 参照语义与外键目标在 schema 构造期一次性解析
// - 正则在 schema 构造期编译,禁止逐值编译
// ==========================================

use crate::domain::types::{EntityType, FieldType, ReferenceFieldKind};
use regex::Regex;

// ==========================================
// ResolveTarget - 引用字段的外键目标
// ==========================================
#[derive(Debug, Clone)]
pub struct ResolveTarget {
    pub target: EntityType,       // 被引用实体类型
    pub required: bool,           // 必需引用: 解析失败整行失败
    pub allow_compound: bool,     // 允许 "公司代码:实体代码" 复合键
    pub id_field: &'static str,   // 内部记录形态中的 ID 字段名
}

// ==========================================
// FieldRule - 单字段规则
// ==========================================
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub required: bool,
    pub field_type: FieldType,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub allowed_values: Option<Vec<String>>,
    pub reference: Option<ReferenceFieldKind>,
    pub resolve: Option<ResolveTarget>,
}

impl FieldRule {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            required: false,
            field_type,
            max_length: None,
            pattern: None,
            allowed_values: None,
            reference: None,
            resolve: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, limit: usize) -> Self {
        self.max_length = Some(limit);
        self
    }

    /// 模式在 schema 构造期编译;规则表为静态文本,编译失败属编程错误
    fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(Regex::new(pattern).unwrap_or_else(|e| {
            panic!("字段规则正则非法 ({}): {}", pattern, e);
        }));
        self
    }

    fn allowed(mut self, values: &[&str]) -> Self {
        self.allowed_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    fn reference(mut self, kind: ReferenceFieldKind) -> Self {
        self.reference = Some(kind);
        self
    }

    fn resolves_to(
        mut self,
        target: EntityType,
        required: bool,
        allow_compound: bool,
        id_field: &'static str,
    ) -> Self {
        self.resolve = Some(ResolveTarget {
            target,
            required,
            allow_compound,
            id_field,
        });
        self
    }
}

// ==========================================
// EntitySchema - 实体字段规则集
// ==========================================
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub entity_type: EntityType,
    /// 自然键字段名(落库记录的 code 来源)
    pub natural_key: &'static str,
    /// 字段名 → 规则,保持声明顺序(报表与校验顺序一致)
    pub fields: Vec<(String, FieldRule)>,
}

impl EntitySchema {
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rule)| rule)
    }

    /// 声明了外键目标的字段
    pub fn resolvable_fields(&self) -> impl Iterator<Item = (&str, &FieldRule, &ResolveTarget)> {
        self.fields.iter().filter_map(|(name, rule)| {
            rule.resolve
                .as_ref()
                .map(|target| (name.as_str(), rule, target))
        })
    }
}

/// 实体编码通用模式(大写字母/数字/下划线/连字符)
const CODE_PATTERN: &str = r"^[A-Z0-9_-]+$";

/// 取实体类型的静态 schema
pub fn schema_for(entity_type: EntityType) -> EntitySchema {
    let field = |name: &str, rule: FieldRule| (name.to_string(), rule);

    match entity_type {
        EntityType::Companies => EntitySchema {
            entity_type,
            natural_key: "code",
            fields: vec![
                field(
                    "code",
                    FieldRule::new(FieldType::Text)
                        .required()
                        .max_length(20)
                        .pattern(CODE_PATTERN),
                ),
                field("name", FieldRule::new(FieldType::Text).required().max_length(100)),
                field(
                    "country",
                    FieldRule::new(FieldType::Text).reference(ReferenceFieldKind::Country),
                ),
                field(
                    "currency",
                    FieldRule::new(FieldType::Text).reference(ReferenceFieldKind::Currency),
                ),
                field("founded_date", FieldRule::new(FieldType::Date)),
                field("contact_email", FieldRule::new(FieldType::Email)),
                field("headcount_cap", FieldRule::new(FieldType::Number)),
            ],
        },
        EntityType::Grades => EntitySchema {
            entity_type,
            natural_key: "code",
            fields: vec![
                field(
                    "code",
                    FieldRule::new(FieldType::Text)
                        .required()
                        .max_length(20)
                        .pattern(CODE_PATTERN),
                ),
                field("name", FieldRule::new(FieldType::Text).required().max_length(100)),
                field("min_salary", FieldRule::new(FieldType::Number)),
                field("max_salary", FieldRule::new(FieldType::Number)),
                field(
                    "currency",
                    FieldRule::new(FieldType::Text).reference(ReferenceFieldKind::Currency),
                ),
            ],
        },
        EntityType::Departments => EntitySchema {
            entity_type,
            natural_key: "code",
            fields: vec![
                field(
                    "code",
                    FieldRule::new(FieldType::Text)
                        .required()
                        .max_length(20)
                        .pattern(CODE_PATTERN),
                ),
                field("name", FieldRule::new(FieldType::Text).required().max_length(100)),
                field(
                    "cost_center",
                    FieldRule::new(FieldType::Text).pattern(r"^CC-[0-9]{4}$"),
                ),
            ],
        },
        EntityType::Jobs => EntitySchema {
            entity_type,
            natural_key: "code",
            fields: vec![
                field(
                    "code",
                    FieldRule::new(FieldType::Text)
                        .required()
                        .max_length(20)
                        .pattern(CODE_PATTERN),
                ),
                field("title", FieldRule::new(FieldType::Text).required().max_length(100)),
                field(
                    "grade_code",
                    FieldRule::new(FieldType::Text).resolves_to(
                        EntityType::Grades,
                        false,
                        false,
                        "grade_id",
                    ),
                ),
                field(
                    "job_family",
                    FieldRule::new(FieldType::Text)
                        .reference(ReferenceFieldKind::Lookup("job_family".to_string())),
                ),
                field("description", FieldRule::new(FieldType::Text).max_length(500)),
            ],
        },
        EntityType::Positions => EntitySchema {
            entity_type,
            natural_key: "code",
            fields: vec![
                field(
                    "code",
                    FieldRule::new(FieldType::Text)
                        .required()
                        .max_length(20)
                        .pattern(CODE_PATTERN),
                ),
                field("title", FieldRule::new(FieldType::Text).required().max_length(100)),
                field(
                    "department_code",
                    FieldRule::new(FieldType::Text).required().resolves_to(
                        EntityType::Departments,
                        true,
                        false,
                        "department_id",
                    ),
                ),
                field(
                    "job_code",
                    FieldRule::new(FieldType::Text).required().resolves_to(
                        EntityType::Jobs,
                        true,
                        false,
                        "job_id",
                    ),
                ),
                field(
                    "grade_code",
                    FieldRule::new(FieldType::Text).resolves_to(
                        EntityType::Grades,
                        false,
                        false,
                        "grade_id",
                    ),
                ),
                field(
                    "reports_to",
                    // 允许跨公司汇报线,故支持复合键
                    FieldRule::new(FieldType::Text).resolves_to(
                        EntityType::Positions,
                        false,
                        true,
                        "reports_to_position_id",
                    ),
                ),
                field("headcount", FieldRule::new(FieldType::Number)),
                field("effective_date", FieldRule::new(FieldType::Date)),
            ],
        },
        EntityType::Employees => EntitySchema {
            entity_type,
            natural_key: "employee_no",
            fields: vec![
                field(
                    "employee_no",
                    FieldRule::new(FieldType::Text)
                        .required()
                        .max_length(20)
                        .pattern(CODE_PATTERN),
                ),
                field("first_name", FieldRule::new(FieldType::Text).required().max_length(60)),
                field("last_name", FieldRule::new(FieldType::Text).required().max_length(60)),
                field("email", FieldRule::new(FieldType::Email).required()),
                field(
                    "gender",
                    FieldRule::new(FieldType::Text).reference(ReferenceFieldKind::Gender),
                ),
                field(
                    "marital_status",
                    FieldRule::new(FieldType::Text).reference(ReferenceFieldKind::MaritalStatus),
                ),
                field(
                    "nationality",
                    FieldRule::new(FieldType::Text).reference(ReferenceFieldKind::Country),
                ),
                field("date_of_birth", FieldRule::new(FieldType::Date)),
                field("hire_date", FieldRule::new(FieldType::Date).required()),
                field(
                    "position_code",
                    FieldRule::new(FieldType::Text).required().resolves_to(
                        EntityType::Positions,
                        true,
                        false,
                        "position_id",
                    ),
                ),
                field(
                    "employment_type",
                    FieldRule::new(FieldType::Enum)
                        .allowed(&["full_time", "part_time", "contract", "intern"]),
                ),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_has_schema_with_natural_key() {
        for et in EntityType::ALL {
            let schema = schema_for(et);
            // 自然键字段必须存在且必填
            let rule = schema.rule(schema.natural_key).expect("自然键字段缺失");
            assert!(rule.required, "{} 自然键应为必填", et);
        }
    }

    #[test]
    fn test_positions_resolvable_fields() {
        let schema = schema_for(EntityType::Positions);
        let targets: Vec<_> = schema.resolvable_fields().collect();
        assert_eq!(targets.len(), 4);

        let (_, _, reports_to) = targets
            .iter()
            .find(|(name, _, _)| *name == "reports_to")
            .unwrap();
        assert!(reports_to.allow_compound);
        assert!(!reports_to.required);

        let (_, _, dept) = targets
            .iter()
            .find(|(name, _, _)| *name == "department_code")
            .unwrap();
        assert!(dept.required);
    }

    #[test]
    fn test_reference_kinds_resolved_statically() {
        let schema = schema_for(EntityType::Employees);
        assert_eq!(
            schema.rule("nationality").unwrap().reference,
            Some(ReferenceFieldKind::Country)
        );
        assert_eq!(
            schema.rule("marital_status").unwrap().reference,
            Some(ReferenceFieldKind::MaritalStatus)
        );
        // 普通枚举字段不挂参照语义
        assert!(schema.rule("employment_type").unwrap().reference.is_none());
    }

    #[test]
    fn test_patterns_compiled() {
        let schema = schema_for(EntityType::Departments);
        let rule = schema.rule("cost_center").unwrap();
        let pattern = rule.pattern.as_ref().unwrap();
        assert!(pattern.is_match("CC-1024"));
        assert!(!pattern.is_match("1024"));
    }
}
