// ==========================================
// 人力资源管理系统 - 参照字段归一器
// ==========================================
// 依据: Org_Field_Rules_v0.2.md - 参照字段语义
// ==========================================
// 职责: 按 ReferenceFieldKind 分派的归一策略,
//       每个策略实现同一份 normalize(raw) → 有效|归一|无效 契约
// 红线: 策略在 schema 定义期选定,禁止按字段名逐值查表分派
// ==========================================

use crate::domain::types::ReferenceFieldKind;
use crate::importer::error::ImportPipelineResult;
use crate::importer::fuzzy::{FuzzyMatcher, ReferenceCandidate};
use crate::importer::reference_data::{ReferenceCategory, ReferenceDataCatalog};
use std::sync::Arc;

/// 货币口语别名表(非 ISO 常见写法,在模糊匹配之前确定性命中)
const CURRENCY_ALIASES: &[(&str, &str)] = &[
    ("dollar", "USD"),
    ("dollars", "USD"),
    ("us dollar", "USD"),
    ("us dollars", "USD"),
    ("pound", "GBP"),
    ("pounds", "GBP"),
    ("sterling", "GBP"),
    ("euro", "EUR"),
    ("euros", "EUR"),
    ("yen", "JPY"),
    ("yuan", "CNY"),
    ("rmb", "CNY"),
    ("tt dollar", "TTD"),
    ("tt dollars", "TTD"),
    ("rupee", "INR"),
    ("rupees", "INR"),
];

/// 性别规范词表 → {male, female, other}
const GENDER_VOCABULARY: &[(&str, &str)] = &[
    ("m", "male"),
    ("male", "male"),
    ("man", "male"),
    ("f", "female"),
    ("female", "female"),
    ("woman", "female"),
    ("other", "other"),
    ("non-binary", "other"),
    ("nonbinary", "other"),
    ("non binary", "other"),
    ("nb", "other"),
    ("x", "other"),
];

/// 婚姻状况规范词表 → snake_case 规范形
const MARITAL_VOCABULARY: &[(&str, &str)] = &[
    ("single", "single"),
    ("s", "single"),
    ("married", "married"),
    ("m", "married"),
    ("divorced", "divorced"),
    ("d", "divorced"),
    ("widowed", "widowed"),
    ("w", "widowed"),
    ("separated", "separated"),
    ("domestic_partnership", "domestic_partnership"),
    ("domestic partnership", "domestic_partnership"),
    ("common_law", "common_law"),
    ("common law", "common_law"),
];

/// 婚姻状况规范形全集(无效时作建议)
const MARITAL_CANONICAL: &[&str] = &[
    "single",
    "married",
    "divorced",
    "widowed",
    "separated",
    "domestic_partnership",
    "common_law",
];

// ==========================================
// NormalizeOutcome - 归一结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// 原值即规范形,静默通过
    Valid,
    /// 有效但与规范形不同(调用方记 WARNING "将归一为 X")
    Normalized { canonical: String },
    /// 无效(调用方记 ERROR,附建议)
    Invalid {
        message: String,
        suggestion: Option<String>,
    },
}

// ==========================================
// ReferenceValidators - 参照字段校验分派器
// ==========================================
pub struct ReferenceValidators {
    catalog: Arc<ReferenceDataCatalog>,
    fuzzy_max_distance: usize,        // 常规参照字段编辑距离上限
    lookup_fuzzy_max_distance: usize, // 查找类目更严格的上限
}

impl ReferenceValidators {
    pub fn new(
        catalog: Arc<ReferenceDataCatalog>,
        fuzzy_max_distance: usize,
        lookup_fuzzy_max_distance: usize,
    ) -> Self {
        Self {
            catalog,
            fuzzy_max_distance,
            lookup_fuzzy_max_distance,
        }
    }

    /// 按字段语义分派归一
    pub async fn validate(
        &self,
        kind: &ReferenceFieldKind,
        raw: &str,
    ) -> ImportPipelineResult<NormalizeOutcome> {
        match kind {
            ReferenceFieldKind::Country => {
                let countries = self.catalog.load(&ReferenceCategory::Country).await?;
                Ok(self.validate_country(raw, &countries))
            }
            ReferenceFieldKind::Currency => {
                let currencies = self.catalog.load(&ReferenceCategory::Currency).await?;
                Ok(self.validate_currency(raw, &currencies))
            }
            ReferenceFieldKind::Gender => Ok(normalize_by_vocabulary(
                raw,
                GENDER_VOCABULARY,
                "性别无法识别,应为 male / female / other",
            )),
            ReferenceFieldKind::MaritalStatus => Ok(normalize_by_vocabulary(
                raw,
                MARITAL_VOCABULARY,
                &format!("婚姻状况无法识别,应为 {}", MARITAL_CANONICAL.join(" / ")),
            )),
            ReferenceFieldKind::Lookup(category) => {
                let codes = self
                    .catalog
                    .load(&ReferenceCategory::Lookup(category.clone()))
                    .await?;
                Ok(self.validate_lookup(raw, category, &codes))
            }
        }
    }

    /// 国家: 仅接受 ISO-3166 alpha-2 编码
    ///
    /// - 编码精确命中 → 通过(大小写差异按归一处理)
    /// - 命中国家*名称* → 无效,直接建议对应编码
    /// - 其余 → 对编码+名称合集做模糊匹配
    fn validate_country(&self, raw: &str, countries: &[ReferenceCandidate]) -> NormalizeOutcome {
        let needle = raw.trim();
        let upper = needle.to_uppercase();

        if let Some(hit) = countries.iter().find(|c| c.code == upper) {
            return if hit.code == needle {
                NormalizeOutcome::Valid
            } else {
                NormalizeOutcome::Normalized {
                    canonical: hit.code.clone(),
                }
            };
        }

        if let Some(hit) = countries
            .iter()
            .find(|c| c.display_name.eq_ignore_ascii_case(needle))
        {
            return NormalizeOutcome::Invalid {
                message: format!("国家需使用 ISO 代码而非名称: {}", hit.display_name),
                suggestion: Some(hit.code.clone()),
            };
        }

        match FuzzyMatcher::find_closest(needle, countries, self.fuzzy_max_distance) {
            Some(hit) => NormalizeOutcome::Invalid {
                message: format!("无效的国家代码: {}", needle),
                suggestion: Some(hit.code.clone()),
            },
            None => NormalizeOutcome::Invalid {
                message: format!("无效的国家代码: {}", needle),
                suggestion: None,
            },
        }
    }

    /// 币种: 以参照目录所载集合为准
    ///
    /// - 编码精确命中 → 通过/归一
    /// - 展示名精确命中 → 归一为编码
    /// - 口语别名表确定性命中 → 无效,建议别名对应编码
    /// - 其余 → 模糊匹配
    fn validate_currency(&self, raw: &str, currencies: &[ReferenceCandidate]) -> NormalizeOutcome {
        let needle = raw.trim();
        let upper = needle.to_uppercase();
        let lower = needle.to_lowercase();

        if let Some(hit) = currencies.iter().find(|c| c.code == upper) {
            return if hit.code == needle {
                NormalizeOutcome::Valid
            } else {
                NormalizeOutcome::Normalized {
                    canonical: hit.code.clone(),
                }
            };
        }

        if let Some(hit) = currencies
            .iter()
            .find(|c| c.display_name.eq_ignore_ascii_case(needle))
        {
            return NormalizeOutcome::Normalized {
                canonical: hit.code.clone(),
            };
        }

        if let Some((_, code)) = CURRENCY_ALIASES.iter().find(|(alias, _)| *alias == lower) {
            return NormalizeOutcome::Invalid {
                message: format!("币种需使用 ISO 代码: {}", needle),
                suggestion: Some((*code).to_string()),
            };
        }

        match FuzzyMatcher::find_closest(needle, currencies, self.fuzzy_max_distance) {
            Some(hit) => NormalizeOutcome::Invalid {
                message: format!("无效的币种代码: {}", needle),
                suggestion: Some(hit.code.clone()),
            },
            None => NormalizeOutcome::Invalid {
                message: format!("无效的币种代码: {}", needle),
                suggestion: None,
            },
        }
    }

    /// 查找类目: 对类目编码做不区分大小写匹配,
    /// 未命中时用更严格的编辑距离(lookup_fuzzy_max_distance)给建议
    fn validate_lookup(
        &self,
        raw: &str,
        category: &str,
        codes: &[ReferenceCandidate],
    ) -> NormalizeOutcome {
        let needle = raw.trim();

        if let Some(hit) = codes.iter().find(|c| c.code.eq_ignore_ascii_case(needle)) {
            return if hit.code == needle {
                NormalizeOutcome::Valid
            } else {
                NormalizeOutcome::Normalized {
                    canonical: hit.code.clone(),
                }
            };
        }

        match FuzzyMatcher::find_closest(needle, codes, self.lookup_fuzzy_max_distance) {
            Some(hit) => NormalizeOutcome::Invalid {
                message: format!("无效的 {} 编码: {}", category, needle),
                suggestion: Some(hit.code.clone()),
            },
            None => NormalizeOutcome::Invalid {
                message: format!("无效的 {} 编码: {}", category, needle),
                suggestion: None,
            },
        }
    }
}

/// 固定词表归一(性别/婚姻状况共用)
fn normalize_by_vocabulary(
    raw: &str,
    vocabulary: &[(&str, &str)],
    invalid_message: &str,
) -> NormalizeOutcome {
    let needle = raw.trim().to_lowercase();

    match vocabulary.iter().find(|(alias, _)| *alias == needle) {
        Some((_, canonical)) => {
            if *canonical == raw.trim() {
                NormalizeOutcome::Valid
            } else {
                NormalizeOutcome::Normalized {
                    canonical: (*canonical).to_string(),
                }
            }
        }
        None => NormalizeOutcome::Invalid {
            message: format!("{}: {}", invalid_message, raw.trim()),
            suggestion: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use crate::importer::reference_data::ReferenceDataRepository;
    use async_trait::async_trait;

    struct StaticRepo;

    #[async_trait]
    impl ReferenceDataRepository for StaticRepo {
        async fn list_currencies(&self) -> Result<Vec<ReferenceCandidate>, ImportError> {
            Ok(vec![
                ReferenceCandidate::new("USD", "US Dollar"),
                ReferenceCandidate::new("EUR", "Euro"),
                ReferenceCandidate::new("TTD", "Trinidad and Tobago Dollar"),
            ])
        }

        async fn list_lookup_codes(
            &self,
            _category: &str,
        ) -> Result<Vec<ReferenceCandidate>, ImportError> {
            Ok(vec![
                ReferenceCandidate::new("FULL_TIME", "Full Time"),
                ReferenceCandidate::new("PART_TIME", "Part Time"),
            ])
        }
    }

    fn validators() -> ReferenceValidators {
        let catalog = Arc::new(ReferenceDataCatalog::new(Arc::new(StaticRepo)));
        ReferenceValidators::new(catalog, 3, 2)
    }

    #[tokio::test]
    async fn test_country_exact_code_passes() {
        let v = validators();
        let outcome = v.validate(&ReferenceFieldKind::Country, "US").await.unwrap();
        assert_eq!(outcome, NormalizeOutcome::Valid);
    }

    #[tokio::test]
    async fn test_country_lowercase_normalized() {
        let v = validators();
        let outcome = v.validate(&ReferenceFieldKind::Country, "us").await.unwrap();
        assert_eq!(
            outcome,
            NormalizeOutcome::Normalized { canonical: "US".to_string() }
        );
    }

    #[tokio::test]
    async fn test_country_name_invalid_with_code_suggestion() {
        let v = validators();
        let outcome = v
            .validate(&ReferenceFieldKind::Country, "United States")
            .await
            .unwrap();
        match outcome {
            NormalizeOutcome::Invalid { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("US"));
            }
            other => panic!("应判无效: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_currency_alias_before_fuzzy() {
        let v = validators();
        let outcome = v
            .validate(&ReferenceFieldKind::Currency, "tt dollars")
            .await
            .unwrap();
        match outcome {
            NormalizeOutcome::Invalid { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("TTD"));
            }
            other => panic!("应判无效: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_currency_display_name_normalized() {
        let v = validators();
        let outcome = v
            .validate(&ReferenceFieldKind::Currency, "us dollar")
            .await
            .unwrap();
        // 展示名精确命中优先于别名表
        assert_eq!(
            outcome,
            NormalizeOutcome::Normalized { canonical: "USD".to_string() }
        );
    }

    #[tokio::test]
    async fn test_gender_vocabulary() {
        let v = validators();
        assert_eq!(
            v.validate(&ReferenceFieldKind::Gender, "M").await.unwrap(),
            NormalizeOutcome::Normalized { canonical: "male".to_string() }
        );
        assert_eq!(
            v.validate(&ReferenceFieldKind::Gender, "female").await.unwrap(),
            NormalizeOutcome::Valid
        );
        assert!(matches!(
            v.validate(&ReferenceFieldKind::Gender, "unknown").await.unwrap(),
            NormalizeOutcome::Invalid { .. }
        ));
    }

    #[tokio::test]
    async fn test_marital_status_snake_case() {
        let v = validators();
        assert_eq!(
            v.validate(&ReferenceFieldKind::MaritalStatus, "Domestic Partnership")
                .await
                .unwrap(),
            NormalizeOutcome::Normalized { canonical: "domestic_partnership".to_string() }
        );
        assert_eq!(
            v.validate(&ReferenceFieldKind::MaritalStatus, "s").await.unwrap(),
            NormalizeOutcome::Normalized { canonical: "single".to_string() }
        );
    }

    #[tokio::test]
    async fn test_lookup_tighter_distance() {
        let v = validators();
        // 距离 1: FULL_TIME → FULL_TIM 命中
        let near = v
            .validate(&ReferenceFieldKind::Lookup("employment_type".to_string()), "FULL_TIM")
            .await
            .unwrap();
        assert!(matches!(
            near,
            NormalizeOutcome::Invalid { suggestion: Some(ref s), .. } if s == "FULL_TIME"
        ));

        // 距离 3: 超过查找类目上限 2,无建议
        let far = v
            .validate(&ReferenceFieldKind::Lookup("employment_type".to_string()), "FULL_T")
            .await
            .unwrap();
        assert!(matches!(far, NormalizeOutcome::Invalid { suggestion: None, .. }));
    }
}
