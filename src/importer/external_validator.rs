// ==========================================
// 人力资源管理系统 - 外部校验器接口
// ==========================================
// 职责: 可选的外部(如 AI)校验协作方接口
// 契约: 返回与本地校验完全一致的 ValidationResult 形态;
//       调用失败时管道透明回退本地 FieldValidator,
//       下游契约不变
// ==========================================

use crate::domain::import::{ImportRow, ValidationResult};
use crate::domain::types::EntityType;
use crate::importer::error::ImportError;
use crate::importer::schema::EntitySchema;
use async_trait::async_trait;

// ==========================================
// ExternalValidator Trait
// ==========================================
#[async_trait]
pub trait ExternalValidator: Send + Sync {
    /// 校验整个数据集
    ///
    /// # 返回
    /// - Ok(ValidationResult): 与本地校验同形态的结果
    /// - Err: 调用失败(网络/配额等),由管道回退本地校验
    async fn validate(
        &self,
        entity_type: EntityType,
        rows: &[ImportRow],
        schema: &EntitySchema,
    ) -> Result<ValidationResult, ImportError>;
}
