//! CLI argument definitions using clap.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Broadcaster - rate-limited bulk message broadcasting
#[derive(Parser, Debug)]
#[command(
    name = "broadcaster",
    author,
    version,
    about = "Rate-limited bulk message broadcaster",
    long_about = "Parses a recipient list, renders a message template per recipient and \n\
                  sends it through a messaging gateway at a fixed rate, recording every \n\
                  delivery outcome."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BROADCASTER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "BROADCASTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Configuration file (TOML or JSON); defaults to ./broadcaster.toml when present
    #[arg(short, long, global = true, env = "BROADCASTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a broadcast campaign
    Send(SendArgs),

    /// Render the template for every recipient without sending
    Preview(PreviewArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Inspect or clear the delivery history
    History(HistoryArgs),

    /// Manage keyword auto-reply rules
    Autoreply(AutoreplyArgs),
}

/// Message template source
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("message").required(true).args(["template", "template_file"])))]
pub struct TemplateArgs {
    /// Message template text (`&fullname`, `&firstname`, `&whatsapp`, `&var1`...)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Read the message template from a file
    #[arg(long)]
    pub template_file: Option<PathBuf>,
}

/// Arguments for the `send` command
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Recipient list, one `name,address[,extra...]` per line
    #[arg(short, long)]
    pub recipients: PathBuf,

    #[command(flatten)]
    pub template: TemplateArgs,

    /// Campaign title (forwarded to the history archive)
    #[arg(long)]
    pub title: Option<String>,

    /// First archive tag
    #[arg(long, default_value = "")]
    pub identity: String,

    /// Second archive tag
    #[arg(long, default_value = "")]
    pub pmb: String,

    /// Attach a local file (sent inline, MIME type guessed from the name)
    #[arg(long, conflicts_with = "attach_url")]
    pub attach: Option<PathBuf>,

    /// Attach a remote file fetched for every recipient
    #[arg(long, requires = "attach_name")]
    pub attach_url: Option<String>,

    /// Filename shown to receivers (required with --attach-url)
    #[arg(long)]
    pub attach_name: Option<String>,

    /// Override the guessed MIME type
    #[arg(long)]
    pub attach_mime: Option<String>,

    /// Use the in-memory mock transport instead of the configured gateway
    #[arg(long)]
    pub mock: bool,

    /// Override the inter-send interval in milliseconds
    #[arg(long, env = "BROADCASTER_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Override the database path
    #[arg(long, env = "BROADCASTER_DB")]
    pub db: Option<PathBuf>,

    /// Print observer events as JSON lines
    #[arg(long)]
    pub json_events: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BROADCASTER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `preview` command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Recipient list
    #[arg(short, long)]
    pub recipients: PathBuf,

    #[command(flatten)]
    pub template: TemplateArgs,

    /// Show at most this many recipients (0 = all)
    #[arg(long, default_value = "0")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `history` command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Override the database path
    #[arg(long, env = "BROADCASTER_DB", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List recorded outcomes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every recorded outcome
    Clear,
}

/// Arguments for the `autoreply` command
#[derive(Args, Debug)]
pub struct AutoreplyArgs {
    /// Override the database path
    #[arg(long, env = "BROADCASTER_DB", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: AutoreplyCommand,
}

#[derive(Subcommand, Debug)]
pub enum AutoreplyCommand {
    /// Add a rule
    Add {
        /// Trigger text (normalized before saving)
        trigger: String,
        /// Reply body
        message: String,
    },
    /// List rules
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a rule by id
    Delete { id: i64 },
    /// Show the reply an inbound text would receive
    Match { text: String },
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
