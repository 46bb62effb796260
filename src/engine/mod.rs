// ==========================================
// 人力资源管理系统 - 引擎层
// ==========================================
// 职责: 实现业务规则,不拼 SQL
// 红线: Engine 不拼 SQL,规则结果必须可解释(missing 列表)
// ==========================================

pub mod dependency_graph;

// 重导出核心引擎
pub use dependency_graph::{EntityDependency, EntityDependencyGraph, ReadinessReport};
