//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use contracts::{BroadcasterConfig, TransportKind};

use crate::cli::ValidateArgs;
use crate::settings::DEFAULT_CONFIG_FILE;

/// Below this the gateway is likely to throttle the session
const MIN_SAFE_INTERVAL_MS: u64 = 3000;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    transport: String,
    gateway_url: String,
    country_code: String,
    send_interval_ms: u64,
    settle_delay_ms: u64,
    database_path: String,
    archive_enabled: bool,
}

/// Execute the `validate` command
pub fn run_validate(config_path: Option<&Path>, args: &ValidateArgs) -> Result<()> {
    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    info!(config = %path.display(), "Validating configuration");

    let result = validate_config(path);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(path: &Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", path.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(path) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    transport: format!("{:?}", config.transport.kind).to_lowercase(),
                    gateway_url: config.transport.base_url.clone(),
                    country_code: config.transport.country_code.clone(),
                    send_interval_ms: config.dispatch.send_interval_ms,
                    settle_delay_ms: config.dispatch.settle_delay_ms,
                    database_path: config.storage.database_path.clone(),
                    archive_enabled: config.archive.enabled,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &BroadcasterConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.transport.kind == TransportKind::Mock {
        warnings.push("transport.kind is mock - no messages will be sent".to_string());
    }
    if config.dispatch.send_interval_ms < MIN_SAFE_INTERVAL_MS {
        warnings.push(format!(
            "dispatch.send_interval_ms = {} is below {}ms - the session may be throttled",
            config.dispatch.send_interval_ms, MIN_SAFE_INTERVAL_MS
        ));
    }
    if !config.archive.enabled {
        warnings.push("archive disabled - rendered messages are not archived".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Transport: {} ({})", summary.transport, summary.gateway_url);
            println!("  Country code: {}", summary.country_code);
            println!(
                "  Pacing: {}ms interval, {}ms settle",
                summary.send_interval_ms, summary.settle_delay_ms
            );
            println!("  Database: {}", summary.database_path);
            println!("  Archive: {}", if summary.archive_enabled { "on" } else { "off" });
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let file =
            write_config("[transport]\nkind = \"mock\"\n\n[dispatch]\nsend_interval_ms = 500\n");
        let result = validate_config(file.path());

        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert_eq!(warnings.len(), 3);
        assert_eq!(result.summary.unwrap().transport, "mock");
    }

    #[test]
    fn test_invalid_config() {
        let file = write_config("[transport]\ncountry_code = \"+62\"\n");
        let result = validate_config(file.path());
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(Path::new("/no/such/broadcaster.toml"));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
