//! CROSSLINE: cross-provider sports market reconciliation.
//!
//! Entry point. Loads configuration, initialises structured logging, builds
//! one snapshot source per enabled provider and runs reconciliation passes,
//! printing each report as JSON on stdout.
//!
//! Usage: `crossline [config.toml]`

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crossline::aliases::AliasTable;
use crossline::config::AppConfig;
use crossline::engine::{ReconciliationReport, Reconciler};
use crossline::matching::Matcher;
use crossline::merge::MergeEngine;
use crossline::platforms::{EventSource, SnapshotSource};
use crossline::pricing::BestPriceSelector;
use crossline::strategy::edge::EdgeDetector;
use crossline::strategy::kelly::KellyCalculator;
use crossline::strategy::OpportunityDetector;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        sports = ?cfg.reconciler.sports,
        providers = cfg.enabled_providers().count(),
        "CROSSLINE starting up"
    );

    // -- Initialise components -------------------------------------------

    let aliases = Arc::new(AliasTable::load(cfg.aliases.path.as_deref())?);

    let sources: Vec<Box<dyn EventSource>> = cfg
        .enabled_providers()
        .map(|p| {
            Box::new(SnapshotSource::new(&p.name, &p.snapshot, Arc::clone(&aliases))) as Box<dyn EventSource>
        })
        .collect();
    if sources.is_empty() {
        warn!("No providers enabled; reports will be empty");
    }

    let reconciler = Reconciler::new(
        sources,
        MergeEngine::new(Matcher::new(aliases, cfg.match_config()), cfg.fee_schedule()),
        BestPriceSelector::new(cfg.max_quote_age()),
        OpportunityDetector::new(
            EdgeDetector::new(cfg.edge_config()),
            KellyCalculator::new(cfg.kelly_config()),
        ),
    );

    // -- Single pass -----------------------------------------------------

    let Some(interval_secs) = cfg.reconciler.interval_secs else {
        for report in reconciler.run_all(&cfg.reconciler.sports).await.values() {
            print_report(report)?;
        }
        return Ok(());
    };

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(interval_secs, "Entering main loop. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for report in reconciler.run_all(&cfg.reconciler.sports).await.values() {
                    if let Err(e) = print_report(report) {
                        error!(error = %e, "Failed to write report, continuing");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("CROSSLINE shut down cleanly.");
    Ok(())
}

/// Write one report to stdout as a JSON document.
fn print_report(report: &ReconciliationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{json}");
    info!(summary = %report, "Report written");
    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout
/// carries only reports.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crossline=info"));

    let json_logging = std::env::var("CROSSLINE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
