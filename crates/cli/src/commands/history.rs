//! `history` command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use contracts::{OutcomeStore, StoredOutcome};
use dispatcher::SqliteStore;

use crate::cli::{HistoryArgs, HistoryCommand};
use crate::settings;

/// Execute the `history` command
pub async fn run_history(config_path: Option<&Path>, args: &HistoryArgs) -> Result<()> {
    let config = settings::load_config(config_path)?;
    let db_path = settings::database_path(&config, args.db.as_deref());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match &args.command {
        HistoryCommand::List { json } => {
            let rows = store.select_all().await?;
            if *json {
                let json =
                    serde_json::to_string_pretty(&rows).context("Failed to serialize history")?;
                println!("{json}");
            } else {
                print_history(&rows);
            }
        }
        HistoryCommand::Clear => {
            let removed = store.delete_all().await?;
            info!(removed, db = %db_path.display(), "Delivery history cleared");
            println!("Removed {removed} outcome(s)");
        }
    }
    Ok(())
}

fn print_history(rows: &[StoredOutcome]) {
    if rows.is_empty() {
        println!("No outcomes recorded");
        return;
    }
    let delivered = rows.iter().filter(|r| r.outcome.delivered).count();
    for row in rows {
        let mark = if row.outcome.delivered { "✓" } else { "✗" };
        println!(
            "{:>5} {} {} <{}>",
            row.id, mark, row.outcome.recipient_name, row.outcome.destination_address
        );
    }
    println!("\n{delivered}/{} delivered", rows.len());
}
