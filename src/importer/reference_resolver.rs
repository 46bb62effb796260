// ==========================================
// 人力资源管理系统 - 交叉引用解析器
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 5. 引用解析
// ==========================================
// 职责: 把人工录入的自然键解析为内部记录 ID
// 键格式:
// - 裸编码 "HR001": 优先当前公司,其次全域回退(先注册者优先,
//   命中回退且多公司同码时标记歧义,由上层记 WARNING 建议复合键)
// - 复合键 "AUR-CORP:CEO-001": 显式指明所属公司,支持跨公司引用
// 红线: 跨公司引用必须通过集团策略校验,不允许则该行硬失败
// ==========================================

use crate::domain::org::ExistingRecord;
use crate::domain::types::EntityType;
use std::collections::{HashMap, HashSet};

/// 复合键分隔符
pub const COMPOUND_KEY_SEPARATOR: char = ':';

// ==========================================
// ResolvedReference - 解析成功的引用
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub record_id: String,
    pub company_code: String, // 目标记录所属公司
    pub via_fallback: bool,   // 经全域裸编码回退命中
    pub ambiguous: bool,      // 回退命中且同码存在于多家公司
}

// ==========================================
// ResolutionOutcome - 解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(ResolvedReference),
    /// 未找到(必需引用 → 行失败;可选引用 → WARNING + NULL)
    NotFound,
    /// 目标在集团策略之外的公司
    CrossCompanyDenied { target_company: String },
}

/// 裸编码索引项
struct BareEntry {
    record_id: String,
    company_code: String,
    companies_seen: HashSet<String>, // 同码出现过的公司(歧义判定)
}

// ==========================================
// CrossReferenceResolver
// ==========================================
// 快照式: 由一次性读取的已落库记录构建索引,解析期不访库
pub struct CrossReferenceResolver {
    current_company: String,
    permitted_companies: HashSet<String>, // 集团内公司(含当前公司),大写
    compound_index: HashMap<(EntityType, String, String), (String, String)>,
    bare_index: HashMap<(EntityType, String), BareEntry>,
}

impl CrossReferenceResolver {
    /// 由已落库记录快照构建
    ///
    /// # 参数
    /// - records: 相关实体类型的已落库记录(集团范围)
    /// - current_company: 当前导入所属公司代码
    /// - group_companies: 集团内全部公司代码(跨公司策略白名单)
    pub fn new(
        records: &[ExistingRecord],
        current_company: &str,
        group_companies: &[String],
    ) -> Self {
        let mut permitted: HashSet<String> =
            group_companies.iter().map(|c| c.to_uppercase()).collect();
        permitted.insert(current_company.to_uppercase());

        let mut compound_index = HashMap::new();
        let mut bare_index: HashMap<(EntityType, String), BareEntry> = HashMap::new();

        for record in records {
            let company = record.company_code.to_uppercase();
            let code = record.code.to_uppercase();

            compound_index
                .entry((record.entity_type, company.clone(), code.clone()))
                .or_insert_with(|| (record.record_id.clone(), record.company_code.clone()));

            // 裸编码: 先注册者优先,后续同码只累计歧义信息
            match bare_index.entry((record.entity_type, code)) {
                std::collections::hash_map::Entry::Vacant(slot) => {
                    let mut companies_seen = HashSet::new();
                    companies_seen.insert(company.clone());
                    slot.insert(BareEntry {
                        record_id: record.record_id.clone(),
                        company_code: record.company_code.clone(),
                        companies_seen,
                    });
                }
                std::collections::hash_map::Entry::Occupied(mut slot) => {
                    slot.get_mut().companies_seen.insert(company.clone());
                }
            }
        }

        Self {
            current_company: current_company.to_string(),
            permitted_companies: permitted,
            compound_index,
            bare_index,
        }
    }

    /// 解析一个引用键
    ///
    /// # 算法
    /// 1. 含分隔符 → 拆为 (公司代码, 实体编码),查复合索引
    /// 2. 否则先查 (当前公司, 编码)(同公司优先)
    /// 3. 未命中再查全域裸编码索引(先注册者优先)
    /// 4. 目标公司 ≠ 当前公司时校验集团策略
    pub fn resolve(&self, entity_type: EntityType, raw_key: &str) -> ResolutionOutcome {
        let key = raw_key.trim();
        if key.is_empty() {
            return ResolutionOutcome::NotFound;
        }

        if let Some((company_part, code_part)) = key.split_once(COMPOUND_KEY_SEPARATOR) {
            let company = company_part.trim().to_uppercase();
            let code = code_part.trim().to_uppercase();

            return match self.compound_index.get(&(entity_type, company, code)) {
                Some((record_id, company_code)) => self.policy_check(ResolvedReference {
                    record_id: record_id.clone(),
                    company_code: company_code.clone(),
                    via_fallback: false,
                    ambiguous: false,
                }),
                None => ResolutionOutcome::NotFound,
            };
        }

        let code = key.to_uppercase();
        let current = self.current_company.to_uppercase();

        // 同公司优先
        if let Some((record_id, company_code)) =
            self.compound_index.get(&(entity_type, current, code.clone()))
        {
            return ResolutionOutcome::Resolved(ResolvedReference {
                record_id: record_id.clone(),
                company_code: company_code.clone(),
                via_fallback: false,
                ambiguous: false,
            });
        }

        // 全域回退(先注册者优先)
        match self.bare_index.get(&(entity_type, code)) {
            Some(entry) => self.policy_check(ResolvedReference {
                record_id: entry.record_id.clone(),
                company_code: entry.company_code.clone(),
                via_fallback: true,
                ambiguous: entry.companies_seen.len() > 1,
            }),
            None => ResolutionOutcome::NotFound,
        }
    }

    /// 跨公司策略: 目标公司必须在集团白名单内
    fn policy_check(&self, resolved: ResolvedReference) -> ResolutionOutcome {
        let target = resolved.company_code.to_uppercase();
        if target != self.current_company.to_uppercase()
            && !self.permitted_companies.contains(&target)
        {
            return ResolutionOutcome::CrossCompanyDenied {
                target_company: resolved.company_code,
            };
        }
        ResolutionOutcome::Resolved(resolved)
    }
}
