use chrono::NaiveDate;
use clap::Parser;
use neo_hec_relay::{build_neo_url, flatten_feed, NeoFeedClient, RelayConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "preview-feed")]
#[command(about = "Fetch one NEO feed window and show what would be posted, without posting")]
#[command(version = "0.1.0")]
struct Cli {
    /// First date to fetch (YYYY-MM-DD), defaults to the configured run start
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last date to fetch (YYYY-MM-DD), defaults to one full window after the start
    #[arg(long)]
    end_date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging; stdout carries only the preview
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = RelayConfig::from_env()?;

    let start = cli.start_date.unwrap_or(config.run.start_date);
    let end = match cli.end_date {
        Some(end) => end,
        None => start
            .checked_add_signed(chrono::Duration::days(config.run.window_days))
            .unwrap_or(NaiveDate::MAX),
    };

    let url = build_neo_url(&config.neo.base_url, config.api_key()?, start, end)?;
    let client = NeoFeedClient::new(config.neo.timeout_secs)?;

    info!("Previewing NEO feed for {} to {}", start, end);
    let feed = client.fetch(&url).await?;

    println!("📅 {} to {}", start, end);
    for day in feed.days() {
        println!("  {}: {} NEOs", day.date, day.records.len());
    }

    let elements = flatten_feed(feed, config.run.flatten_mode);
    println!(
        "🚀 {} events would be posted to index {}",
        elements.len(),
        config.run.index
    );

    Ok(())
}
