mod driver;
mod fetch;
mod parser;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

#[derive(Parser)]
#[command(name = "adp_scraper", about = "ADP audio-described title catalog scraper")]
struct Cli {
    /// Listing page to start from
    #[arg(long, default_value = "1")]
    start_page: u32,
    /// Max pages to fetch this run (default: until the listing runs out)
    #[arg(short = 'n', long)]
    limit: Option<u32>,
    /// Aggregate store file
    #[arg(long, default_value = "adp.json")]
    store: PathBuf,
    /// Directory for per-title JSON files
    #[arg(long, default_value = "adp_database")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let client = fetch::http_client()?;
    let titles = driver::Driver::new(cli.start_page)
        .run(&client, cli.limit)
        .await?;

    let total = store::persist(&cli.store, &cli.out_dir, &titles)?;
    println!("Found {} titles ({} in store)", titles.len(), total);

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Done in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
