//! petvet CLI - fetch the pet collection, resolve each pet's vet, print rows.
//!
//! ```text
//! main() -> load config -> HttpPetService -> aggregate_with(..) ──> oneshot
//!                                                                      │
//!                                                 print rows / report ◄┘
//! ```
//!
//! Rows go to stdout, one `<pet name>\t<vet name, title>` per line, or as a
//! JSON array with `--json`. Logs and the `--report` summary go to stderr
//! (or the configured log file) so stdout stays machine-readable.

mod output;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use petvet_config::PetVetConfig;
use petvet_engine::{AggregateOptions, Aggregation, ResultOrder, aggregate_with};
use petvet_providers::HttpPetService;
use petvet_providers::endpoints::parse_base_url;

#[derive(Parser)]
#[command(name = "petvet")]
#[command(version, about = "List every pet alongside its veterinarian")]
struct Cli {
    /// Service root, e.g. https://host/api
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Cap concurrent vet fetches (0 = uncapped)
    #[arg(long, value_name = "N")]
    max_in_flight: Option<usize>,
    /// Row order: primary (pet list order) or completion
    #[arg(long, value_parser = parse_order)]
    order: Option<ResultOrder>,
    /// Print rows as a JSON array
    #[arg(long)]
    json: bool,
    /// Summarize dropped pets on stderr
    #[arg(long)]
    report: bool,
    /// Config file to read instead of ~/.petvet/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn parse_order(raw: &str) -> Result<ResultOrder, String> {
    ResultOrder::parse(raw).ok_or_else(|| format!("unknown order {raw:?}"))
}

fn load_config(explicit: Option<&Path>) -> Result<PetVetConfig> {
    match explicit {
        Some(path) => PetVetConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(PetVetConfig::load()?.unwrap_or_default()),
    }
}

fn init_tracing(config: &PetVetConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut init_warnings = Vec::new();
    if let Some(path) = config.log_file() {
        match open_log_file(path) {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                    .with(env_filter)
                    .init();
                tracing::info!(path = %path.display(), "Logging initialized");
                return;
            }
            Err(e) => init_warnings.push(format!(
                "Failed to open log file {}: {e}",
                path.display()
            )),
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    let mut settings = config.service_settings()?;
    if let Some(raw) = cli.base_url.as_deref() {
        settings.base_url = parse_base_url(raw)?;
    }

    let mut options: AggregateOptions = config.aggregate_options()?;
    if let Some(limit) = cli.max_in_flight {
        options = options.with_max_in_flight(limit);
    }
    if let Some(order) = cli.order {
        options = options.with_order(order);
    }

    let service = Arc::new(HttpPetService::new(&settings)?);
    tracing::debug!(base_url = %service.base_url(), "Starting aggregation");

    let (tx, rx) = oneshot::channel::<Aggregation>();
    let handle = aggregate_with(service, options, move |aggregation| {
        // Receiver only disappears if main already bailed.
        let _ = tx.send(aggregation);
    });

    let aggregation = rx
        .await
        .context("aggregation ended without delivering a result")?;
    handle.await.context("aggregation task failed")?;

    let mut stdout = io::stdout().lock();
    if cli.json {
        output::write_json(&mut stdout, &aggregation.rows)?;
    } else {
        output::write_rows(&mut stdout, &aggregation.rows)?;
    }
    stdout.flush()?;

    if cli.report {
        let mut stderr = io::stderr().lock();
        output::write_report(&mut stderr, &aggregation)?;
    }

    Ok(())
}
