/*!
bdbwatch - Point d'entrée : un poll du cluster, rapport JSON sur stdout

Logs sur stderr (RUST_LOG, `info` par défaut). Code de sortie non nul si le poll échoue.
*/

use anyhow::{Context, Result};
use bdbwatch::{poll_once, HttpFetcher, WatchConfig};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("An error occurred during execution: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = WatchConfig::from_env().context("invalid configuration")?;
    info!(license = %cfg.license_url, bdbs = %cfg.bdbs_url, metrics = %cfg.metrics_url, "bdbwatch starting");

    let fetcher = HttpFetcher::new(&cfg).context("failed to set up HTTP client")?;
    let report = poll_once(&fetcher, &cfg).await.context("poll cycle abandoned")?;

    let output = report.to_pretty_json().context("failed to serialize report")?;
    println!("{output}");
    Ok(())
}
