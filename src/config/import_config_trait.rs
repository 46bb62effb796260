// ==========================================
// 人力资源管理系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportError;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取分块大小(每次落库调用的行数)
    ///
    /// # 默认值
    /// - 50
    async fn get_chunk_size(&self) -> Result<usize, ImportError>;

    /// 获取回滚窗口天数(批次提交后可回滚的保留期)
    ///
    /// # 默认值
    /// - 30
    async fn get_rollback_retention_days(&self) -> Result<i64, ImportError>;

    /// 获取模糊匹配最大编辑距离(常规参照字段)
    ///
    /// # 默认值
    /// - 3
    async fn get_fuzzy_max_distance(&self) -> Result<usize, ImportError>;

    /// 获取查找类目的模糊匹配最大编辑距离(更严格)
    ///
    /// # 默认值
    /// - 2
    async fn get_lookup_fuzzy_max_distance(&self) -> Result<usize, ImportError>;

    /// 获取集团公司代码列表(跨公司引用策略白名单)
    ///
    /// # 默认值
    /// - 空列表(按记录库中已注册公司口径)
    async fn get_group_companies(&self) -> Result<Vec<String>, ImportError>;
}
