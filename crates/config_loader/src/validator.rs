//! 配置校验模块
//!
//! 校验规则：
//! - country_code 为非空纯数字
//! - transport.kind = gateway 时 base_url 为合法 http(s) 地址
//! - archive 启用时 base_url 合法且 api_key 非空
//! - observer.channel_capacity > 0
//! - storage.database_path 非空

use contracts::{BroadcasterConfig, ContractError, TransportKind};
use url::Url;

/// 校验 BroadcasterConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &BroadcasterConfig) -> Result<(), ContractError> {
    validate_transport(config)?;
    validate_archive(config)?;
    validate_storage(config)?;
    validate_observer(config)?;
    Ok(())
}

/// 校验传输配置
fn validate_transport(config: &BroadcasterConfig) -> Result<(), ContractError> {
    let transport = &config.transport;

    let code = &transport.country_code;
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ContractError::config_validation(
            "transport.country_code",
            format!("country_code must be non-empty digits, got '{code}'"),
        ));
    }

    if transport.kind == TransportKind::Gateway {
        validate_http_url("transport.base_url", &transport.base_url)?;
    }

    Ok(())
}

/// 校验归档配置 (仅在启用时)
fn validate_archive(config: &BroadcasterConfig) -> Result<(), ContractError> {
    let archive = &config.archive;
    if !archive.enabled {
        return Ok(());
    }

    validate_http_url("archive.base_url", &archive.base_url)?;

    if archive.api_key_header.trim().is_empty() {
        return Err(ContractError::config_validation(
            "archive.api_key_header",
            "api_key_header cannot be empty",
        ));
    }
    if archive.api_key.is_empty() {
        return Err(ContractError::config_validation(
            "archive.api_key",
            "api_key cannot be empty when archive is enabled",
        ));
    }
    Ok(())
}

/// 校验存储配置
fn validate_storage(config: &BroadcasterConfig) -> Result<(), ContractError> {
    if config.storage.database_path.trim().is_empty() {
        return Err(ContractError::config_validation(
            "storage.database_path",
            "database_path cannot be empty",
        ));
    }
    Ok(())
}

/// 校验观察者通道
fn validate_observer(config: &BroadcasterConfig) -> Result<(), ContractError> {
    if config.observer.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            "observer.channel_capacity",
            "channel_capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ContractError> {
    let url = Url::parse(value).map_err(|e| {
        ContractError::config_validation(field, format!("invalid URL '{value}': {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ContractError::config_validation(
            field,
            format!("unsupported scheme '{other}', expected http or https"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_enabled() -> BroadcasterConfig {
        let mut config = BroadcasterConfig::default();
        config.archive.enabled = true;
        config.archive.base_url = "https://chat.example.com".into();
        config.archive.api_key = "k".into();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&BroadcasterConfig::default()).is_ok());
        assert!(validate(&archive_enabled()).is_ok());
    }

    #[test]
    fn test_invalid_country_code() {
        let mut config = BroadcasterConfig::default();
        config.transport.country_code = "+62".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("country_code"), "got: {err}");
    }

    #[test]
    fn test_gateway_url_required() {
        let mut config = BroadcasterConfig::default();
        config.transport.base_url = "not a url".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("transport.base_url"), "got: {err}");
    }

    #[test]
    fn test_mock_transport_skips_url_check() {
        let mut config = BroadcasterConfig::default();
        config.transport.kind = TransportKind::Mock;
        config.transport.base_url = String::new();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_archive_scheme() {
        let mut config = archive_enabled();
        config.archive.base_url = "ftp://chat.example.com".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("unsupported scheme"), "got: {err}");
    }

    #[test]
    fn test_archive_api_key_required() {
        let mut config = archive_enabled();
        config.archive.api_key = String::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("archive.api_key"), "got: {err}");
    }

    #[test]
    fn test_disabled_archive_not_checked() {
        let mut config = BroadcasterConfig::default();
        config.archive.base_url = "nonsense".into();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_database_path() {
        let mut config = BroadcasterConfig::default();
        config.storage.database_path = "  ".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_channel_capacity() {
        let mut config = BroadcasterConfig::default();
        config.observer.channel_capacity = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("channel_capacity"), "got: {err}");
    }
}
