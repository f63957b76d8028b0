//! `send` command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use contracts::{Attachment, AttachmentSource, BroadcastRequest, ObserverEvent, ProgressObserver};
use dispatcher::{
    AttachmentLoader, BroadcastEngine, BroadcastObserver, CampaignController, CampaignPhase,
    ConfiguredArchive, DispatcherError, EngineConfig, FanoutObserver, LogObserver, SqliteStore,
};
use ingestion::AddressFormatter;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::TransportBackend;
use crate::cli::SendArgs;
use crate::error::CliError;
use crate::settings;

/// Execute the `send` command
pub async fn run_send(config_path: Option<&Path>, args: &SendArgs) -> Result<()> {
    let mut config = settings::load_config(config_path)?;

    // Apply CLI overrides
    if args.mock {
        info!("Using mock transport");
        settings::use_mock_transport(&mut config.transport);
    }
    if let Some(interval) = args.interval_ms {
        info!(interval_ms = interval, "Overriding send interval from CLI");
        config.dispatch.send_interval_ms = interval;
    }
    let db_path = settings::database_path(&config, args.db.as_deref());
    config.storage.database_path = db_path.display().to_string();
    config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let raw = ingestion::read_raw(&args.recipients)?;
    let request = build_request(args)?;

    let transport = Arc::new(TransportBackend::from_config(&config.transport)?);
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?,
    );
    let archive = Arc::new(ConfiguredArchive::from_config(&config.archive)?);

    let hub = BroadcastObserver::new(config.observer.channel_capacity);
    let printer = spawn_event_printer(hub.subscribe(), args.json_events);
    let observer: Arc<dyn ProgressObserver> = Arc::new(FanoutObserver::new(vec![
        Arc::new(hub.clone()),
        Arc::new(LogObserver),
    ]));

    let engine = BroadcastEngine::builder(transport, store, archive)
        .observer(observer)
        .formatter(AddressFormatter::new(config.transport.country_code.clone()))
        .config(EngineConfig::from(&config.dispatch))
        .attachments(AttachmentLoader::new(Duration::from_millis(
            config.transport.request_timeout_ms,
        ))?)
        .build()?;
    let controller = CampaignController::new(engine);

    let total = match controller.submit(&raw, request).await {
        Ok(total) => total,
        Err(e @ (DispatcherError::TransportNotReady { .. } | DispatcherError::EmptyRecipients)) => {
            return Err(CliError::rejected(e.to_string()).into());
        }
        Err(e) => return Err(e).context("Failed to start broadcast"),
    };
    info!(
        total,
        interval_ms = config.dispatch.send_interval_ms,
        "Broadcast running, press Ctrl+C to stop"
    );

    let mut phases = controller.subscribe_phase();
    tokio::select! {
        _ = phases.wait_for(|phase| *phase == CampaignPhase::Idle) => {}
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, finishing current recipient...");
            controller.stop();
        }
    }

    let report = controller
        .wait()
        .await?
        .context("Broadcast task disappeared")?;
    let summary = controller.engine().summary();
    let counters = controller.engine().metrics();

    // Last senders dropped here, which ends the printer task
    drop(controller);
    drop(hub);
    if let Err(e) = printer.await {
        warn!(error = %e, "Event printer failed");
    }

    info!(
        processed = report.processed,
        delivered = report.delivered,
        cancelled = report.cancelled,
        send_failures = counters.send_failures,
        archive_failures = counters.archive_failures,
        "Broadcast finished"
    );
    if !args.json_events {
        println!();
        print!("{summary}");
        if report.cancelled {
            println!("Stopped after {} of {} recipients", report.processed, report.total);
        }
    }
    Ok(())
}

/// Assemble the campaign request from CLI arguments
fn build_request(args: &SendArgs) -> Result<BroadcastRequest> {
    let mut request =
        BroadcastRequest::new(args.template.load()?).with_tags(&args.identity, &args.pmb);
    if let Some(title) = &args.title {
        request = request.with_title(title);
    }
    if let Some(attachment) = build_attachment(args)? {
        request = request.with_attachment(attachment);
    }
    Ok(request)
}

fn build_attachment(args: &SendArgs) -> Result<Option<Attachment>> {
    let (filename, source) = match (&args.attach, &args.attach_url) {
        (Some(path), _) => {
            let bytes = std::fs::read(path).map_err(|source| CliError::AttachmentRead {
                path: path.display().to_string(),
                source,
            })?;
            let filename = args.attach_name.clone().unwrap_or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            (filename, AttachmentSource::Inline(STANDARD.encode(bytes)))
        }
        (None, Some(url)) => (
            args.attach_name.clone().unwrap_or_default(),
            AttachmentSource::Url(url.clone()),
        ),
        (None, None) => return Ok(None),
    };

    let mime_type = args.attach_mime.clone().unwrap_or_else(|| {
        mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });
    Ok(Some(Attachment::new(filename, mime_type, source)?))
}

/// Print observer events until every publisher is dropped
fn spawn_event_printer(
    mut rx: broadcast::Receiver<ObserverEvent>,
    json: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) if json => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Failed to serialize event"),
                },
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event printer lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn print_event(event: &ObserverEvent) {
    match event {
        ObserverEvent::Info { message, .. } => println!("{message}"),
        ObserverEvent::Percent { counter, total } => println!("  [{counter}/{total}]"),
        ObserverEvent::Logging(message) => println!("  · {message}"),
        ObserverEvent::Send(_) => {}
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::io::Write;

    fn send_args(extra: &[&str]) -> SendArgs {
        let mut argv = vec!["broadcaster", "send", "-r", "list.txt", "-t", "Hi &fullname"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Send(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_request_from_args() {
        let args = send_args(&["--title", "Promo", "--identity", "00001", "--pmb", "2025"]);
        let request = build_request(&args).unwrap();
        assert_eq!(request.template, "Hi &fullname");
        assert_eq!(request.title.as_deref(), Some("Promo"));
        assert_eq!(request.identity, "00001");
        assert!(request.attachment.is_none());
    }

    #[test]
    fn test_local_attachment_inlined_with_guessed_mime() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"hi").unwrap();
        let path = file.path().display().to_string();

        let attachment = build_attachment(&send_args(&["--attach", path.as_str()]))
            .unwrap()
            .unwrap();
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.source, AttachmentSource::Inline("aGk=".into()));
        assert!(attachment.filename.ends_with(".png"));
    }

    #[test]
    fn test_url_attachment() {
        let attachment = build_attachment(&send_args(&[
            "--attach-url",
            "https://example.com/brochure",
            "--attach-name",
            "brochure.pdf",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(attachment.mime_type, "application/pdf");
        assert_eq!(
            attachment.source,
            AttachmentSource::Url("https://example.com/brochure".into())
        );
    }

    #[tokio::test]
    async fn test_send_with_mock_transport_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let recipients = dir.path().join("list.txt");
        std::fs::write(&recipients, "Alice,081234567890\nBob\n").unwrap();
        let config = dir.path().join("broadcaster.toml");
        std::fs::write(
            &config,
            "[transport]\nkind = \"mock\"\n\n[dispatch]\nsend_interval_ms = 1\nsettle_delay_ms = 1\n",
        )
        .unwrap();
        let db = dir.path().join("history.db");

        let mut args = send_args(&["--json-events"]);
        args.recipients = recipients;
        args.db = Some(db.clone());

        run_send(Some(config.as_path()), &args).await.unwrap();

        let store = SqliteStore::open(&db).unwrap();
        let rows = contracts::OutcomeStore::select_all(&store).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.outcome.delivered));
        assert_eq!(rows[1].outcome.destination_address, "0000000000");
    }
}
