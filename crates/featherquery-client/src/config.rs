//! Client configuration
//!
//! Connection settings for the feature store service. Timeouts are
//! explicit here instead of inherited from HTTP client defaults.

use std::env;
use std::time::Duration;

use featherquery_core::{Error, Result};

/// Environment variable holding the metadata service base URL
pub const ENV_BASE_URL: &str = "FEATHERQUERY_URL";
/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "FEATHERQUERY_API_KEY";
/// Environment variable holding the default feature store name
pub const ENV_STORE: &str = "FEATHERQUERY_STORE";
/// Environment variable holding the request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "FEATHERQUERY_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for talking to the feature store service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the metadata service (e.g. `https://host:8181/api`)
    pub base_url: String,

    /// Bearer token sent with every metadata request
    pub api_key: Option<String>,

    /// Per-request timeout for metadata calls
    pub request_timeout: Duration,

    /// Feature store operations run against unless rebound with
    /// `FeatureStoreClient::for_store`
    pub default_store: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, default_store: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            request_timeout: DEFAULT_TIMEOUT,
            default_store: default_store.into(),
        }
    }

    /// Sets the API key (builder pattern)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout (builder pattern)
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Loads configuration from the environment.
    ///
    /// `FEATHERQUERY_URL` and `FEATHERQUERY_STORE` are required;
    /// `FEATHERQUERY_API_KEY` and `FEATHERQUERY_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(ENV_BASE_URL)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_BASE_URL)))?;
        let default_store = env::var(ENV_STORE)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_STORE)))?;

        let mut config = Self::new(base_url, default_store);
        if let Ok(api_key) = env::var(ENV_API_KEY) {
            config.api_key = Some(api_key);
        }
        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::Config(format!("{} must be an integer, got '{}'", ENV_TIMEOUT_SECS, secs))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
