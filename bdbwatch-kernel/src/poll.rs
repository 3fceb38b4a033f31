use crate::config::WatchConfig;
use crate::fetcher::{FetchError, Fetcher};
use crate::inventory::InventoryIndex;
use crate::license::LicenseSummary;
use crate::metrics::parse_metric;
use crate::report::{Report, MEMORY_LIMIT_METRIC, TOTAL_KEYS_METRIC, USED_MEMORY_METRIC};
use serde_json::Value;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("license fetch failed")]
    License(#[source] FetchError),
    #[error("bdbs fetch failed")]
    Inventory(#[source] FetchError),
    #[error("metrics fetch failed")]
    Metrics(#[source] FetchError),
    #[error("bdbs payload from {url} is not a JSON array")]
    InventoryShape { url: String },
}

pub async fn poll_once<F: Fetcher>(fetcher: &F, cfg: &WatchConfig) -> Result<Report, PollError> {
    let (license, bdbs, metrics_text) = tokio::join!(
        fetcher.fetch_json(&cfg.license_url),
        fetcher.fetch_json(&cfg.bdbs_url),
        fetcher.fetch_text(&cfg.metrics_url),
    );
    let license = license.map_err(PollError::License)?;
    let bdbs = bdbs.map_err(PollError::Inventory)?;
    let metrics_text = metrics_text.map_err(PollError::Metrics)?;

    let summary = LicenseSummary::summarize(&license);
    summary.log();

    info!("Indexing BDBs data");
    let inventory = match &bdbs {
        Value::Array(records) => InventoryIndex::build(records),
        _ => return Err(PollError::InventoryShape { url: cfg.bdbs_url.clone() }),
    };

    let used_memory = parse_metric(&metrics_text, USED_MEMORY_METRIC);
    let memory_limit = parse_metric(&metrics_text, MEMORY_LIMIT_METRIC);
    let total_keys = parse_metric(&metrics_text, TOTAL_KEYS_METRIC);
    info!(
        databases = used_memory.len(),
        limits = memory_limit.len(),
        key_counts = total_keys.len(),
        inventory = inventory.len(),
        "metrics parsed"
    );

    let report = Report::build(summary, &inventory, &used_memory, &memory_limit, &total_keys);
    for entry in &report.databases {
        entry.log();
    }
    Ok(report)
}
