// ==========================================
// 人力资源管理系统 - 导入仓储 Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================
// 存储抽象: 键值记录库——消费的操作仅为
// 计数 / 按键读取 / 批量插入返回 ID / 按 ID 更新
// ==========================================

use crate::domain::import::ImportBatch;
use crate::domain::org::{ExistingRecord, StagedRecord};
use crate::domain::types::EntityType;
use crate::repository::error::RepositoryError;
use async_trait::async_trait;

// ==========================================
// ImportRecordStore Trait
// ==========================================
// 用途: 组织记录与导入批次的数据访问
// 实现者: ImportRecordStoreImpl（rusqlite）
#[async_trait]
pub trait ImportRecordStore: Send + Sync {
    // ===== 前置计数查询 =====

    /// 统计某实体类型在给定公司范围内的已落库记录数
    ///
    /// # 参数
    /// - entity_type: 实体类型
    /// - company_codes: 公司范围(空切片 = 不限公司)
    async fn count_records(
        &self,
        entity_type: EntityType,
        company_codes: &[String],
    ) -> Result<i64, RepositoryError>;

    /// 读取已注册的全部公司代码(集团策略默认口径)
    async fn list_company_codes(&self) -> Result<Vec<String>, RepositoryError>;

    // ===== 引用快照 =====

    /// 读取引用解析所需的已落库记录快照
    ///
    /// # 参数
    /// - entity_types: 相关实体类型
    /// - company_codes: 集团公司范围(空切片 = 不限公司)
    async fn fetch_existing_refs(
        &self,
        entity_types: &[EntityType],
        company_codes: &[String],
    ) -> Result<Vec<ExistingRecord>, RepositoryError>;

    // ===== 批量写入 =====

    /// 批量插入组织记录(单分块,事务化)
    ///
    /// # 返回
    /// - Ok(Vec<String>): 生成的记录 ID(与输入同序)
    /// - Err: 数据库错误(该分块整体回滚,由调用方记为分块失败)
    async fn batch_insert_records(
        &self,
        batch_id: &str,
        records: &[StagedRecord],
    ) -> Result<Vec<String>, RepositoryError>;

    // ===== 批次管理 =====

    /// 写入暂存批次(status=STAGING,含完整行集与校验快照)
    async fn insert_import_batch(&self, batch: &ImportBatch) -> Result<(), RepositoryError>;

    /// 终态化批次(status/计数/ID 列表/提交时间/回滚窗口)
    async fn finalize_import_batch(&self, batch: &ImportBatch) -> Result<(), RepositoryError>;

    /// 按 ID 读取批次
    async fn get_batch(&self, batch_id: &str) -> Result<Option<ImportBatch>, RepositoryError>;

    /// 最近批次列表
    async fn get_recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, RepositoryError>;
}
