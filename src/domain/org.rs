// ==========================================
// 人力资源管理系统 - 组织领域模型
// ==========================================
// 依据: HR_Master_Spec.md - PART A 组织结构
// 依据: data_dictionary_v0.2.md - org_record 表
// ==========================================
// 红线: 记录存储按"键值记录库"抽象,不绑定具体查询语言
// ==========================================

use crate::domain::types::EntityType;
use serde::{Deserialize, Serialize};

// ==========================================
// ExistingRecord - 已落库记录的引用视图
// ==========================================
// 用途: 交叉引用解析器的快照输入(只读)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingRecord {
    pub record_id: String,    // 内部标识(UUID)
    pub entity_type: EntityType,
    pub company_code: String, // 所属公司(域)代码
    pub code: String,         // 自然键(人工录入的编码)
}

// ==========================================
// StagedRecord - 转换后的待落库记录
// ==========================================
// 用途: 提交引擎分块插入的单位;payload 为内部字段形态
// (外部列名已映射,引用字段已替换为内部 ID)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedRecord {
    pub entity_type: EntityType,
    pub company_code: String,
    pub code: String,                  // 自然键
    pub payload: serde_json::Value,    // 内部记录形态(JSON 对象)
    pub source_row: usize,             // 来源展示行号(审计用)
}
