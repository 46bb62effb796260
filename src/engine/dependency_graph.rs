// ==========================================
// 人力资源管理系统 - 实体依赖图引擎
// ==========================================
// 依据: HR_Master_Spec.md - PART B1 导入顺序
// ==========================================
// 职责: 静态描述实体间前置关系,计算就绪度与展示分层
// 红线:
// - 依赖关系必须无环,构造期拒绝,禁止运行期才暴露
// - 门禁只看实时计数;分层仅用于展示排序,不做正确性依据
//   (层归属不能证明数据真实存在)
// ==========================================

use crate::domain::types::EntityType;
use crate::importer::error::ImportError;
use std::collections::HashMap;

// ==========================================
// EntityDependency - 单实体的前置声明
// ==========================================
#[derive(Debug, Clone)]
pub struct EntityDependency {
    pub entity_type: EntityType,
    pub required: Vec<EntityType>, // 必需前置: 计数为 0 即不就绪
    pub optional: Vec<EntityType>, // 可选前置: 仅用于提示,不阻断
}

// ==========================================
// ReadinessReport - 就绪度检查结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    pub met: bool,                          // 全部必需前置均有数据
    pub missing: Vec<EntityType>,           // 缺数据的必需前置
    pub optional_missing: Vec<EntityType>,  // 缺数据的可选前置(提示用)
}

// ==========================================
// EntityDependencyGraph
// ==========================================
pub struct EntityDependencyGraph {
    dependencies: Vec<EntityDependency>,
    tiers: Vec<Vec<EntityType>>,
}

impl EntityDependencyGraph {
    /// 由依赖声明表构造
    ///
    /// # 返回
    /// - Ok(graph): 关系无环,分层已派生
    /// - Err(CyclicDependency): 存在环(必需与可选边合并判定)
    pub fn new(dependencies: Vec<EntityDependency>) -> Result<Self, ImportError> {
        let tiers = derive_tiers(&dependencies)?;
        Ok(Self { dependencies, tiers })
    }

    /// 系统内置依赖表
    pub fn standard() -> Result<Self, ImportError> {
        use EntityType::*;
        Self::new(vec![
            EntityDependency {
                entity_type: Companies,
                required: vec![],
                optional: vec![],
            },
            EntityDependency {
                entity_type: Grades,
                required: vec![Companies],
                optional: vec![],
            },
            EntityDependency {
                entity_type: Departments,
                required: vec![Companies],
                optional: vec![],
            },
            EntityDependency {
                entity_type: Jobs,
                required: vec![Companies],
                optional: vec![Grades],
            },
            EntityDependency {
                entity_type: Positions,
                required: vec![Companies, Departments, Jobs],
                optional: vec![Grades],
            },
            EntityDependency {
                entity_type: Employees,
                required: vec![Companies, Departments, Positions],
                optional: vec![Jobs],
            },
        ])
    }

    /// 就绪度检查
    ///
    /// # 参数
    /// - entity_type: 待导入实体类型
    /// - existing_counts: 各实体类型的已落库记录数(实时查询)
    ///
    /// # 返回
    /// - ReadinessReport: met=false 时 missing 列出缺数据的必需前置
    pub fn check_readiness(
        &self,
        entity_type: EntityType,
        existing_counts: &HashMap<EntityType, i64>,
    ) -> Result<ReadinessReport, ImportError> {
        let dep = self
            .dependencies
            .iter()
            .find(|d| d.entity_type == entity_type)
            .ok_or_else(|| ImportError::UnknownEntityType(entity_type.to_string()))?;

        let count_of = |et: EntityType| existing_counts.get(&et).copied().unwrap_or(0);

        let missing: Vec<EntityType> = dep
            .required
            .iter()
            .copied()
            .filter(|et| count_of(*et) <= 0)
            .collect();

        let optional_missing: Vec<EntityType> = dep
            .optional
            .iter()
            .copied()
            .filter(|et| count_of(*et) <= 0)
            .collect();

        Ok(ReadinessReport {
            met: missing.is_empty(),
            missing,
            optional_missing,
        })
    }

    /// 展示分层: 每层实体的全部前置都在更早的层
    pub fn tiers(&self) -> &[Vec<EntityType>] {
        &self.tiers
    }

    pub fn dependencies(&self) -> &[EntityDependency] {
        &self.dependencies
    }
}

/// Kahn 分层: 逐层摘除入度为 0 的节点;有剩余节点即存在环
fn derive_tiers(dependencies: &[EntityDependency]) -> Result<Vec<Vec<EntityType>>, ImportError> {
    // 前置边合并必需与可选(可选前置同样要求无环)
    let mut prereqs: HashMap<EntityType, Vec<EntityType>> = HashMap::new();
    for dep in dependencies {
        let edges = prereqs.entry(dep.entity_type).or_default();
        edges.extend(dep.required.iter().copied());
        edges.extend(dep.optional.iter().copied());
    }

    let mut remaining: Vec<EntityType> = dependencies.iter().map(|d| d.entity_type).collect();
    let mut placed: Vec<EntityType> = Vec::new();
    let mut tiers: Vec<Vec<EntityType>> = Vec::new();

    while !remaining.is_empty() {
        let tier: Vec<EntityType> = remaining
            .iter()
            .copied()
            .filter(|et| {
                prereqs
                    .get(et)
                    .map(|edges| edges.iter().all(|p| placed.contains(p) || !remaining.contains(p)))
                    .unwrap_or(true)
            })
            .collect();

        if tier.is_empty() {
            let cycle_members: Vec<String> =
                remaining.iter().map(|et| et.to_string()).collect();
            return Err(ImportError::CyclicDependency(cycle_members.join(" → ")));
        }

        remaining.retain(|et| !tier.contains(et));
        placed.extend(tier.iter().copied());
        tiers.push(tier);
    }

    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use EntityType::*;

    fn counts(pairs: &[(EntityType, i64)]) -> HashMap<EntityType, i64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_standard_graph_is_acyclic() {
        let graph = EntityDependencyGraph::standard().unwrap();
        // companies 必在首层
        assert!(graph.tiers()[0].contains(&Companies));
    }

    #[test]
    fn test_readiness_missing_required() {
        let graph = EntityDependencyGraph::standard().unwrap();
        let report = graph
            .check_readiness(
                Positions,
                &counts(&[(Companies, 1), (Departments, 0), (Jobs, 3)]),
            )
            .unwrap();

        assert!(!report.met);
        assert_eq!(report.missing, vec![Departments]);
    }

    #[test]
    fn test_readiness_all_met() {
        let graph = EntityDependencyGraph::standard().unwrap();
        let report = graph
            .check_readiness(
                Positions,
                &counts(&[(Companies, 2), (Departments, 4), (Jobs, 3)]),
            )
            .unwrap();

        assert!(report.met);
        assert!(report.missing.is_empty());
        // 可选前置缺数据仅提示
        assert_eq!(report.optional_missing, vec![Grades]);
    }

    #[test]
    fn test_zero_prerequisites_always_ready() {
        let graph = EntityDependencyGraph::standard().unwrap();
        let report = graph.check_readiness(Companies, &HashMap::new()).unwrap();
        assert!(report.met);
    }

    #[test]
    fn test_optional_counts_never_block() {
        let graph = EntityDependencyGraph::standard().unwrap();
        // grades 为 0 不阻断 positions
        let report = graph
            .check_readiness(
                Positions,
                &counts(&[(Companies, 1), (Departments, 1), (Jobs, 1), (Grades, 0)]),
            )
            .unwrap();
        assert!(report.met);
    }

    #[test]
    fn test_cyclic_configuration_rejected() {
        let result = EntityDependencyGraph::new(vec![
            EntityDependency {
                entity_type: Departments,
                required: vec![Positions],
                optional: vec![],
            },
            EntityDependency {
                entity_type: Positions,
                required: vec![Departments],
                optional: vec![],
            },
        ]);

        assert!(matches!(result, Err(ImportError::CyclicDependency(_))));
    }

    #[test]
    fn test_cycle_through_optional_edge_rejected() {
        let result = EntityDependencyGraph::new(vec![
            EntityDependency {
                entity_type: Jobs,
                required: vec![],
                optional: vec![Grades],
            },
            EntityDependency {
                entity_type: Grades,
                required: vec![Jobs],
                optional: vec![],
            },
        ]);

        assert!(matches!(result, Err(ImportError::CyclicDependency(_))));
    }

    #[test]
    fn test_tiers_respect_prerequisites() {
        let graph = EntityDependencyGraph::standard().unwrap();
        let tier_of = |et: EntityType| {
            graph
                .tiers()
                .iter()
                .position(|tier| tier.contains(&et))
                .unwrap()
        };

        assert!(tier_of(Companies) < tier_of(Departments));
        assert!(tier_of(Departments) < tier_of(Positions));
        assert!(tier_of(Positions) < tier_of(Employees));
        assert!(tier_of(Grades) < tier_of(Jobs));
    }

    #[test]
    fn test_unknown_entity_rejected() {
        let graph = EntityDependencyGraph::new(vec![EntityDependency {
            entity_type: Companies,
            required: vec![],
            optional: vec![],
        }])
        .unwrap();

        assert!(graph.check_readiness(Employees, &HashMap::new()).is_err());
    }
}
