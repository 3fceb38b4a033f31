pub mod config;
pub mod fetcher;
pub mod inventory;
pub mod license;
pub mod metrics;
pub mod models;
pub mod poll;
pub mod report;

pub use config::WatchConfig;
pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use poll::{poll_once, PollError};
pub use report::Report;
