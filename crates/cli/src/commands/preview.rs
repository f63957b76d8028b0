//! `preview` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use ingestion::AddressFormatter;

use crate::cli::PreviewArgs;
use crate::settings;

/// One rendered recipient
#[derive(Serialize)]
struct PreviewItem {
    index: usize,
    name: String,
    address: String,
    chat_id: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unbound_tokens: Vec<String>,
}

#[derive(Serialize)]
struct PreviewOutput {
    total: usize,
    placeholders: usize,
    sentinel_addresses: usize,
    recipients: Vec<PreviewItem>,
}

/// Execute the `preview` command (no transport, store or archive)
pub fn run_preview(config_path: Option<&Path>, args: &PreviewArgs) -> Result<()> {
    let config = settings::load_config(config_path)?;
    let formatter = AddressFormatter::new(config.transport.country_code.clone());
    let template = args.template.load()?;
    let raw = ingestion::read_raw(&args.recipients)?;

    let output = build_preview(&template, &raw, &formatter, args.limit);
    if output.total == 0 {
        anyhow::bail!("Recipient list {} is empty", args.recipients.display());
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize preview")?;
        println!("{json}");
    } else {
        print_preview(&output);
    }
    Ok(())
}

fn build_preview(
    template: &str,
    raw: &str,
    formatter: &AddressFormatter,
    limit: usize,
) -> PreviewOutput {
    let (records, summary) = ingestion::parse_with_summary(raw);
    let take = if limit == 0 { records.len() } else { limit };

    let recipients = records
        .iter()
        .take(take)
        .enumerate()
        .map(|(index, record)| PreviewItem {
            index: index + 1,
            name: record.name.clone(),
            address: record.address.clone(),
            chat_id: formatter.chat_id(&record.address),
            message: template::render(template, record),
            unbound_tokens: template::unbound_tokens(template, record),
        })
        .collect();

    PreviewOutput {
        total: summary.total,
        placeholders: summary.placeholders,
        sentinel_addresses: summary.sentinel_addresses,
        recipients,
    }
}

fn print_preview(output: &PreviewOutput) {
    println!(
        "Recipients: {} ({} placeholder, {} without address)\n",
        output.total, output.placeholders, output.sentinel_addresses
    );
    for item in &output.recipients {
        println!("#{} {} <{}>", item.index, item.name, item.chat_id);
        for line in item.message.lines() {
            println!("    {line}");
        }
        if !item.unbound_tokens.is_empty() {
            println!("    ⚠ unbound: {}", item.unbound_tokens.join(", "));
        }
    }
    if output.recipients.len() < output.total {
        println!("\n... {} more", output.total - output.recipients.len());
    }
}
