//! BroadcasterConfig - Config Loader output
//!
//! 描述完整的运行配置：传输通道、发送节奏、存储、历史归档、观察者通道。

use serde::{Deserialize, Serialize};

/// 完整的运行配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcasterConfig {
    /// 传输通道
    #[serde(default)]
    pub transport: TransportConfig,

    /// 发送节奏
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// 本地存储
    #[serde(default)]
    pub storage: StorageConfig,

    /// 外部历史归档服务
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// 观察者广播通道
    #[serde(default)]
    pub observer: ObserverConfig,
}

/// 传输类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// HTTP 网关
    #[default]
    Gateway,
    /// 内存 mock（不发送任何消息）
    Mock,
}

/// 传输配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,

    /// 网关地址
    #[serde(default = "default_gateway_url")]
    pub base_url: String,

    /// 国家区号，用于替换号码开头的 0
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// 单次请求超时 (毫秒)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            base_url: default_gateway_url(),
            country_code: default_country_code(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_country_code() -> String {
    "62".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// 发送节奏配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// 每个收件人处理前的固定等待 (毫秒)
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,

    /// 最后一个进度事件之后、"完成" 事件之前的等待 (毫秒)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: default_send_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_send_interval_ms() -> u64 {
    7_500
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite 数据库文件
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "broadcaster.db".to_string()
}

/// 历史归档配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub enabled: bool,

    /// 服务地址，调用 `POST {base_url}/store`
    #[serde(default)]
    pub base_url: String,

    /// 凭证 header 名称
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// 凭证
    #[serde(default)]
    pub api_key: String,

    /// 请求超时 (毫秒)
    #[serde(default = "default_archive_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            api_key_header: default_api_key_header(),
            api_key: String::new(),
            timeout_ms: default_archive_timeout_ms(),
        }
    }
}

fn default_api_key_header() -> String {
    "lp3i-api-key".to_string()
}

fn default_archive_timeout_ms() -> u64 {
    10_000
}

/// 观察者通道配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// 广播通道容量，慢订阅者超出后丢失旧事件
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    1024
}
