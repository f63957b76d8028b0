//! # Config Loader
//!
//! 群发配置加载：文件 -> `BroadcasterConfig` -> 校验。
//!
//! 格式由扩展名决定 (`.toml` / `.json`)，缺省的字段取默认值，
//! 校验失败与解析失败一样返回 `ContractError`。
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("broadcaster.toml")).unwrap();
//! println!("Interval: {}ms", config.dispatch.send_interval_ms);
//! ```

mod parser;
mod validator;

pub use contracts::BroadcasterConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// 配置入口 (无状态)
pub struct ConfigLoader;

impl ConfigLoader {
    /// 读取、解析并校验配置文件
    pub fn load_from_path(path: &Path) -> Result<BroadcasterConfig, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// 解析并校验配置文本
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<BroadcasterConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// 重新校验 (CLI 覆盖参数之后)
    pub fn validate(config: &BroadcasterConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    pub fn to_toml(config: &BroadcasterConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("cannot encode config as TOML: {e}")))
    }

    pub fn to_json(config: &BroadcasterConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("cannot encode config as JSON: {e}")))
    }
}
