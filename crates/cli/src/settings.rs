//! Configuration resolution shared by all commands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use config_loader::{BroadcasterConfig, ConfigLoader};
use contracts::{TransportConfig, TransportKind};

use crate::cli::TemplateArgs;
use crate::error::CliError;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "broadcaster.toml";

/// Explicit path, else `./broadcaster.toml`, else built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<BroadcasterConfig> {
    let path = match path {
        Some(path) if !path.exists() => {
            return Err(CliError::config_not_found(path.display().to_string()).into());
        }
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            debug!("No configuration file, using defaults");
            Ok(BroadcasterConfig::default())
        }
    }
}

/// Database path: CLI override or config value
pub fn database_path(config: &BroadcasterConfig, db: Option<&Path>) -> PathBuf {
    db.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.storage.database_path))
}

/// Force the mock transport
pub fn use_mock_transport(config: &mut TransportConfig) {
    config.kind = TransportKind::Mock;
}

impl TemplateArgs {
    /// Inline text or file content; blank templates are rejected
    pub fn load(&self) -> Result<String> {
        let template = match (&self.template, &self.template_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                CliError::template(format!("cannot read {}: {e}", path.display()))
            })?,
            (None, None) => return Err(CliError::template("no template given").into()),
        };
        if template.trim().is_empty() {
            return Err(CliError::template("template is empty").into());
        }
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_explicit_config_is_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_explicit_config_loaded() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dispatch]\nsend_interval_ms = 10").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.dispatch.send_interval_ms, 10);
        assert_eq!(
            database_path(&config, Some(Path::new("x.db"))),
            PathBuf::from("x.db")
        );
        assert_eq!(database_path(&config, None), PathBuf::from("broadcaster.db"));
    }

    #[test]
    fn test_template_sources() {
        let inline = TemplateArgs {
            template: Some("Hi &fullname".into()),
            template_file: None,
        };
        assert_eq!(inline.load().unwrap(), "Hi &fullname");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "From file &var1").unwrap();
        let from_file = TemplateArgs {
            template: None,
            template_file: Some(file.path().to_path_buf()),
        };
        assert_eq!(from_file.load().unwrap(), "From file &var1");

        let blank = TemplateArgs {
            template: Some("   ".into()),
            template_file: None,
        };
        assert!(blank.load().is_err());
    }
}
