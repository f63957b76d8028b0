//! # Broadcaster CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 群发活动执行 (send) 与预览 (preview)
//! - 配置验证
//! - 投递历史与自动回复规则管理

mod backend;
mod cli;
mod commands;
mod error;
mod settings;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_autoreply, run_history, run_preview, run_send, run_validate};
use observability::ObservabilityConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Broadcaster CLI starting"
    );

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Send(args) => run_send(config, args).await,
        Commands::Preview(args) => run_preview(config, args),
        Commands::Validate(args) => run_validate(config, args),
        Commands::History(args) => run_history(config, args).await,
        Commands::Autoreply(args) => run_autoreply(config, args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
    })
}
