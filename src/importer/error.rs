// ==========================================
// 人力资源管理系统 - 导入模块错误类型
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 7. 错误分级
// 工具: thiserror 派生宏
// ==========================================
// 分级原则:
// - 结构性错误(文件不可解析/配置非法)中止管道
// - 行级/分块级错误就地恢复,由 ValidationIssue / ChunkOutcome 承载
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误(结构性,中止) =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 依赖配置错误(结构性,初始化期捕获) =====
    #[error("实体依赖配置存在环: {0}")]
    CyclicDependency(String),

    #[error("未注册的实体类型: {0}")]
    UnknownEntityType(String),

    // ===== 前置条件错误 =====
    #[error("前置实体数据缺失: {entity_type} 需要先导入 {missing:?}")]
    PrerequisitesNotMet {
        entity_type: String,
        missing: Vec<String>,
    },

    // ===== 批次状态错误 =====
    #[error("批次状态非法: {batch_id} 当前为 {status}，不允许 {operation}")]
    IllegalBatchState {
        batch_id: String,
        status: String,
        operation: String,
    },

    // ===== 数据库错误 =====
    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 配置错误 =====
    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseQueryError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::InternalError(format!("JSON 序列化失败: {}", err))
    }
}

/// Result 类型别名
pub type ImportPipelineResult<T> = Result<T, ImportError>;
