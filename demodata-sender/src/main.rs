// Demodata Sender - Command line front end
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Demodata Sender
//!
//! Synthesizes one factory telemetry snapshot and delivers it.
//!
//! ## Usage
//!
//! ```bash
//! # Send a snapshot for the current time using ./arc.json
//! demodata-sender
//!
//! # Reproducible payload for a given instant, printed only
//! demodata-sender --at 2024-05-01T15:32:00+09:00 --seed 7 --dry-run --pretty
//!
//! # Explicit transport configuration and a custom layout
//! demodata-sender --config /etc/demodata/arc.json --layout plant.json
//! ```

use chrono::{DateTime, FixedOffset};
use clap::Parser;
use demodata::{now_in_factory_zone, FactoryLayout, Snapshot, Synthesizer};
use demodata_sender::{resolve_config_path, HttpTransport, RetryStrategy, Sender, TransportConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Factory telemetry snapshot sender
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transport configuration file (defaults to ./arc.json)
    #[arg(short, long, env = "ARC_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Factory layout file (defaults to the built-in three-line plant)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Seed for a reproducible snapshot
    #[arg(short, long)]
    seed: Option<u64>,

    /// Snapshot timestamp, RFC 3339 (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    at: Option<DateTime<FixedOffset>>,

    /// Print the payload instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Indent the printed payload
    #[arg(long)]
    pretty: bool,

    /// Delivery attempts before giving up
    #[arg(long, default_value = "3")]
    attempts: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Demodata Sender v{}", env!("CARGO_PKG_VERSION"));

    let snapshot = match build_snapshot(&args) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Invalid factory layout: {}", e);
            return ExitCode::from(2);
        }
    };

    if args.dry_run {
        let json = if args.pretty {
            snapshot.to_json_pretty()
        } else {
            snapshot.to_json()
        };
        return match json {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize snapshot: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config_path = resolve_config_path(args.config.as_deref());
    let config = match TransportConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load transport configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let transport = match HttpTransport::new(&config) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Failed to build transport: {}", e);
            return ExitCode::from(2);
        }
    };
    info!("Sending to {}", transport.url());

    let sender = Sender::new(transport).with_strategy(RetryStrategy::delivery(args.attempts));
    match sender.send_snapshot(&snapshot) {
        Ok(report) => {
            info!(
                "Successfully sent to the endpoint ({} attempt(s), {:.2}s)",
                report.attempts,
                report.elapsed.as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_snapshot(args: &Args) -> demodata::Result<Snapshot> {
    let layout = match &args.layout {
        Some(path) => FactoryLayout::from_json_file(path)?,
        None => FactoryLayout::builtin(),
    };
    let synthesizer = Synthesizer::new(layout)?;

    let ts = args.at.unwrap_or_else(now_in_factory_zone);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let snapshot = synthesizer.synthesize(&ts, &mut rng);
    info!(
        "Synthesized snapshot at {} ({}s interval, {} machines)",
        demodata::snapshot::format_ts(&snapshot.ts),
        snapshot.interval_sec,
        snapshot.machine_count()
    );
    Ok(snapshot)
}
