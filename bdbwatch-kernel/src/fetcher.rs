use crate::config::WatchConfig;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid JSON from {url}: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Client(_) => None,
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::InvalidJson { url, .. } => Some(url),
        }
    }
}

/// Source des trois payloads d'un poll
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    authorization: String,
}

impl HttpFetcher {
    pub fn new(cfg: &WatchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!cfg.verify_tls)
            .timeout(cfg.request_timeout)
            .user_agent(concat!("bdbwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            authorization: cfg.authorization().to_string(),
        })
    }

    async fn get(&self, url: &str, authorized: bool) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        if authorized {
            request = request.header(AUTHORIZATION, &self.authorization);
        }

        let transport = |source: reqwest::Error| FetchError::Transport { url: url.to_string(), source };
        let response = request.send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        info!("Fetching JSON data from {url}");
        let body = self.get(url, true).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::InvalidJson {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching metrics data from {url}");
        self.get(url, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(HttpFetcher::new(&WatchConfig::default()).is_ok());
    }

    #[test]
    fn test_error_messages_name_the_url() {
        let err = FetchError::Status { url: "http://x/v1/license".into(), status: 401 };
        assert_eq!(err.to_string(), "http://x/v1/license answered HTTP 401");
        assert_eq!(err.url(), Some("http://x/v1/license"));
    }
}
