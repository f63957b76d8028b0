//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 收件人文件读取失败
    #[error("failed to read recipient list '{path}': {source}")]
    ReadFailed {
        /// 文件路径
        path: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 收件人列表为空
    #[error("recipient list '{path}' contains no lines")]
    Empty {
        /// 文件路径
        path: String,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
