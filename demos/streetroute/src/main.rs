//! streetroute — command-line front end for the street routing core.
//!
//! Loads a street network and an address file named by a TOML config, then
//! answers one query and prints the answer as JSON:
//!
//! ```text
//! streetroute --config demos/streetroute/data/config.toml suggest "10 RUE"
//! streetroute --config demos/streetroute/data/config.toml route "10 RUE" "25 AVENUE"
//! streetroute --config demos/streetroute/data/config.toml find-node --lat 0.9 --lon 1.1
//! streetroute --config demos/streetroute/data/config.toml batch demos/streetroute/data/pairs.csv
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr so
//! stdout stays machine-readable.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sr_core::Projection;
use sr_query::{QueryError, RouteService, ServiceConfig, SnapshotBuilder};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Service configuration (TOML).
    #[arg(long, short, default_value = "streetroute.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Address labels starting with (or containing) TEXT
    Suggest { text: String },
    /// Every address starting with TEXT, with its position
    Location { text: String },
    /// Nearest street node to a position
    FindNode {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Shortest route between two addresses
    Route { start: String, end: String },
    /// Route every `start,end` row of a CSV file
    Batch { pairs: PathBuf },
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind:  sr_query::ErrorKind,
}

impl From<&QueryError> for ErrorBody {
    fn from(e: &QueryError) -> Self {
        Self { error: e.to_string(), kind: e.kind() }
    }
}

#[derive(Deserialize)]
struct PairRow {
    start: String,
    end:   String,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a query result; a query failure is reported as a JSON error body
/// and a non-zero exit code rather than an `anyhow` error.
fn emit<T: Serialize>(result: Result<T, QueryError>) -> Result<ExitCode> {
    match result {
        Ok(value) => {
            print_json(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            print_json(&ErrorBody::from(&e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // 1. Configuration.
    let config = ServiceConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let projection: Box<dyn Projection> = config.projection.build()?;

    // 2. Routing snapshot.
    let t0 = Instant::now();
    let snapshot = SnapshotBuilder::from_config(&config, &*projection)?.build()?;
    info!(
        nodes = snapshot.graph.node_count(),
        edges = snapshot.graph.edge_count(),
        addresses = snapshot.addresses.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "routing data ready"
    );

    let service = RouteService::new(snapshot, projection, config);

    // 3. Query.
    match args.command {
        Command::Suggest { text } => emit(Ok(service.suggest(&text))),
        Command::Location { text } => emit(Ok(service.location(&text))),
        Command::FindNode { lat, lon } => emit(service.find_node(lat, lon)),
        Command::Route { start, end } => emit(service.find_route(&start, &end)),
        Command::Batch { pairs } => {
            let mut reader = csv::Reader::from_path(&pairs)
                .with_context(|| format!("opening {}", pairs.display()))?;
            let rows = reader
                .deserialize::<PairRow>()
                .map(|row| row.map(|r| (r.start, r.end)))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("reading {}", pairs.display()))?;

            let t0 = Instant::now();
            let results = service.route_batch(&rows);
            let failed = results.iter().filter(|r| r.is_err()).count();
            info!(
                routes = results.len(),
                failed,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "batch finished"
            );

            let bodies: Vec<serde_json::Value> = results
                .iter()
                .map(|r| match r {
                    Ok(resp) => serde_json::to_value(resp),
                    Err(e) => serde_json::to_value(ErrorBody::from(e)),
                })
                .collect::<Result<_, _>>()?;
            print_json(&bodies)?;
            Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}
