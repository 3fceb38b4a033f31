use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://prodam.redisdemo.com:9443";
pub const DEFAULT_METRICS_URL: &str = "https://prodam.redisdemo.com:8070/metrics";
pub const DEFAULT_AUTHORIZATION: &str = "Basic <...>";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const LICENSE_PATH: &str = "/v1/license";
pub const BDBS_PATH: &str = "/v1/bdbs";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Clone, PartialEq)]
pub struct WatchConfig {
    pub api_base_url: String,
    pub license_url: String,
    pub bdbs_url: String,
    pub metrics_url: String,
    authorization: String,
    pub verify_tls: bool,
    pub request_timeout: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE_URL)
    }
}

impl WatchConfig {
    /// Défauts, endpoints licence et bdbs dérivés de `api_base_url`
    pub fn with_api_base(api_base_url: &str) -> Self {
        let base = api_base_url.trim_end_matches('/');
        Self {
            api_base_url: base.to_string(),
            license_url: format!("{base}{LICENSE_PATH}"),
            bdbs_url: format!("{base}{BDBS_PATH}"),
            metrics_url: DEFAULT_METRICS_URL.to_string(),
            authorization: DEFAULT_AUTHORIZATION.to_string(),
            verify_tls: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Chaque entrée via `lookup`; une valeur vide compte comme absente
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut cfg = match get("API_BASE_URL") {
            Some(base) => Self::with_api_base(base.trim()),
            None => Self::default(),
        };

        if let Some(url) = get("LICENSE_BASE_URL") {
            cfg.license_url = url;
        }
        if let Some(url) = get("BDBS_URL") {
            cfg.bdbs_url = url;
        }
        if let Some(url) = get("METRICS_URL") {
            cfg.metrics_url = url;
        }
        if let Some(auth) = get("AUTHORIZATION") {
            cfg.authorization = auth;
        }
        if let Some(raw) = get("VERIFY_TLS") {
            cfg.verify_tls = parse_bool("VERIFY_TLS", &raw)?;
        }
        if let Some(raw) = get("REQUEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECS",
                value: raw.clone(),
                reason: "expected a whole number of seconds",
            })?;
            cfg.request_timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }

    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = authorization.into();
        self
    }

    /// Valeur brute de l'en-tête `Authorization` (API de management)
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

// Jamais le credential en clair
impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("api_base_url", &self.api_base_url)
            .field("license_url", &self.license_url)
            .field("bdbs_url", &self.bdbs_url)
            .field("metrics_url", &self.metrics_url)
            .field("authorization", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected true/false",
        }),
    }
}
