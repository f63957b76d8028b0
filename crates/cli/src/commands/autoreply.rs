//! `autoreply` command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use dispatcher::{AutoResponder, SqliteStore};

use crate::cli::{AutoreplyArgs, AutoreplyCommand};
use crate::settings;

/// Execute the `autoreply` command
pub async fn run_autoreply(config_path: Option<&Path>, args: &AutoreplyArgs) -> Result<()> {
    let config = settings::load_config(config_path)?;
    let db_path = settings::database_path(&config, args.db.as_deref());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let responder = AutoResponder::new(Arc::new(store));

    match &args.command {
        AutoreplyCommand::Add { trigger, message } => {
            let rule = responder.save_rule(trigger, message).await?;
            info!(id = rule.id, trigger = %rule.trigger, "Auto-reply rule saved");
            println!("Saved rule #{} ({})", rule.id, rule.trigger);
        }
        AutoreplyCommand::List { json } => {
            let rules = responder.list_rules().await?;
            if *json {
                let json =
                    serde_json::to_string_pretty(&rules).context("Failed to serialize rules")?;
                println!("{json}");
            } else if rules.is_empty() {
                println!("No auto-reply rules");
            } else {
                for rule in rules {
                    println!("{:>4}  {}  =>  {}", rule.id, rule.trigger, rule.message);
                }
            }
        }
        AutoreplyCommand::Delete { id } => {
            if responder.delete_rule(*id).await? {
                println!("Deleted rule #{id}");
            } else {
                anyhow::bail!("No auto-reply rule with id {id}");
            }
        }
        AutoreplyCommand::Match { text } => match responder.reply_for(text).await? {
            Some(reply) => println!("{reply}"),
            None => println!("(no matching rule)"),
        },
    }
    Ok(())
}
