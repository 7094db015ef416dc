use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use neo_hec_relay::{FlattenMode, NeoHecRelay, RelayConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neo-hec-relay")]
#[command(about = "Relay NASA Near-Earth-Object feed records to a Splunk HTTP Event Collector")]
#[command(version = "0.1.0")]
struct Cli {
    /// First date to fetch (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last date to fetch, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Splunk index to write events to
    #[arg(long)]
    index: Option<String>,

    /// Post only NEO records, without the date entries
    #[arg(long)]
    records_only: bool,

    /// Skip TLS certificate verification when posting to HEC
    #[arg(long)]
    accept_invalid_certs: bool,

    /// Print the planned windows and exit without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging; stdout is reserved for per-event status lines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RelayConfig::from_env().context("Failed to load relay configuration")?;
    if let Some(start_date) = cli.start_date {
        config.run.start_date = start_date;
    }
    if let Some(end_date) = cli.end_date {
        config.run.end_date = end_date;
    }
    if let Some(index) = cli.index {
        config.run.index = index;
    }
    if cli.records_only {
        config.run.flatten_mode = FlattenMode::RecordsOnly;
    }
    if cli.accept_invalid_certs {
        config.hec.accept_invalid_certs = true;
    }

    info!(
        "Starting NEO relay for {} to {} into index {}",
        config.run.start_date, config.run.end_date, config.run.index
    );

    let relay = NeoHecRelay::new(config).context("Failed to create relay")?;

    if cli.dry_run {
        for window in relay.windows()? {
            println!("{}", window);
        }
        return Ok(());
    }

    match relay.run().await {
        Ok(summary) => {
            info!(
                "Posted {} events across {} windows ({} failed)",
                summary.posted(),
                summary.windows.len(),
                summary.failed()
            );
            Ok(())
        }
        Err(e) => {
            error!("Relay failed: {}", e);
            Err(e.into())
        }
    }
}
