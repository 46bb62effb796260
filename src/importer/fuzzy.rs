// ==========================================
// 人力资源管理系统 - 模糊匹配器
// ==========================================
// 职责: 在规范参照集内为任意输入找最接近候选("您是否想输入")
// 匹配优先级逐级短路,编辑距离为最后手段
// ==========================================

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

/// 默认最大编辑距离
pub const DEFAULT_MAX_DISTANCE: usize = 3;

// ==========================================
// ReferenceCandidate - 参照候选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCandidate {
    pub code: String,         // 规范编码(如 "US" / "USD")
    pub display_name: String, // 展示名(如 "United States")
}

impl ReferenceCandidate {
    pub fn new(code: &str, display_name: &str) -> Self {
        Self {
            code: code.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

// ==========================================
// FuzzyMatcher
// ==========================================
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    /// 在候选集中找最接近输入的候选
    ///
    /// # 匹配优先级(首个命中即返回)
    /// 1. 编码精确匹配(不区分大小写)
    /// 2. 展示名精确匹配(不区分大小写)
    /// 3. 编码为输入的前缀,或展示名以输入开头
    /// 4. 展示名与输入互为子串(不区分大小写)
    /// 5. 最小编辑距离(对编码与展示名分别计算取较小),
    ///    仅当最小值 ≤ max_distance 时接受;并列取先注册者
    ///
    /// # 返回
    /// - Some(&candidate): 命中
    /// - None: 所有级别均未命中
    pub fn find_closest<'a>(
        input: &str,
        candidates: &'a [ReferenceCandidate],
        max_distance: usize,
    ) -> Option<&'a ReferenceCandidate> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        // 级别 1: 编码精确匹配
        if let Some(hit) = candidates.iter().find(|c| c.code.to_lowercase() == needle) {
            return Some(hit);
        }

        // 级别 2: 展示名精确匹配
        if let Some(hit) = candidates
            .iter()
            .find(|c| c.display_name.to_lowercase() == needle)
        {
            return Some(hit);
        }

        // 级别 3: 前缀匹配
        if let Some(hit) = candidates.iter().find(|c| {
            let code = c.code.to_lowercase();
            let name = c.display_name.to_lowercase();
            needle.starts_with(&code) || name.starts_with(&needle)
        }) {
            return Some(hit);
        }

        // 级别 4: 子串匹配
        if let Some(hit) = candidates.iter().find(|c| {
            let name = c.display_name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        }) {
            return Some(hit);
        }

        // 级别 5: 最小编辑距离(并列取先注册者)
        let mut best: Option<(&ReferenceCandidate, usize)> = None;
        for candidate in candidates {
            let code_distance = levenshtein(&needle, &candidate.code.to_lowercase());
            let name_distance = levenshtein(&needle, &candidate.display_name.to_lowercase());
            let distance = code_distance.min(name_distance);

            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((candidate, distance)),
            }
        }

        match best {
            Some((candidate, distance)) if distance <= max_distance => Some(candidate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currencies() -> Vec<ReferenceCandidate> {
        vec![
            ReferenceCandidate::new("USD", "US Dollar"),
            ReferenceCandidate::new("EUR", "Euro"),
            ReferenceCandidate::new("GBP", "Pound Sterling"),
            ReferenceCandidate::new("TTD", "Trinidad and Tobago Dollar"),
        ]
    }

    #[test]
    fn test_exact_code_match_wins() {
        let set = currencies();
        let hit = FuzzyMatcher::find_closest("usd", &set, DEFAULT_MAX_DISTANCE).unwrap();
        assert_eq!(hit.code, "USD");
    }

    #[test]
    fn test_exact_name_match() {
        let set = currencies();
        let hit = FuzzyMatcher::find_closest("EURO", &set, DEFAULT_MAX_DISTANCE).unwrap();
        assert_eq!(hit.code, "EUR");
    }

    #[test]
    fn test_name_prefix_match() {
        let set = currencies();
        // "Pound" 为 "Pound Sterling" 的前缀
        let hit = FuzzyMatcher::find_closest("pound", &set, DEFAULT_MAX_DISTANCE).unwrap();
        assert_eq!(hit.code, "GBP");
    }

    #[test]
    fn test_substring_match() {
        let set = currencies();
        let hit = FuzzyMatcher::find_closest("Tobago", &set, DEFAULT_MAX_DISTANCE).unwrap();
        assert_eq!(hit.code, "TTD");
    }

    #[test]
    fn test_edit_distance_typo() {
        let set = currencies();
        // "USE" 距 "USD" 编辑距离 1
        let hit = FuzzyMatcher::find_closest("USE", &set, DEFAULT_MAX_DISTANCE).unwrap();
        assert_eq!(hit.code, "USD");
    }

    #[test]
    fn test_no_match_beyond_distance() {
        let set = currencies();
        assert!(FuzzyMatcher::find_closest("yen of japan", &set, 2).is_none());
    }

    #[test]
    fn test_empty_input() {
        let set = currencies();
        assert!(FuzzyMatcher::find_closest("  ", &set, DEFAULT_MAX_DISTANCE).is_none());
    }

    #[test]
    fn test_tie_break_first_registered() {
        let set = vec![
            ReferenceCandidate::new("AB1", "Alpha"),
            ReferenceCandidate::new("AB2", "Beta"),
        ];
        // "AB0" 与两者距离均为 1,取先注册者
        let hit = FuzzyMatcher::find_closest("AB0", &set, DEFAULT_MAX_DISTANCE).unwrap();
        assert_eq!(hit.code, "AB1");
    }

    #[test]
    fn test_exact_match_never_displaced() {
        // 输入与某候选编码完全一致时,必须返回该候选本身
        let set = vec![
            ReferenceCandidate::new("SG", "Singapore"),
            ReferenceCandidate::new("SGP", "Singapore (legacy)"),
        ];
        let hit = FuzzyMatcher::find_closest("sg", &set, DEFAULT_MAX_DISTANCE).unwrap();
        assert_eq!(hit.code, "SG");
    }
}
