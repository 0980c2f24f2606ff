//! Metadata provider boundary
//!
//! The SDK treats the metadata service as an opaque fetch function: give it
//! a feature store name, get back the full metadata payload. The REST
//! implementation talks JSON-over-HTTPS; tests substitute in-memory
//! doubles.

use async_trait::async_trait;
use tracing::debug;

use featherquery_core::{Error, MetadataPayload, Result};

use crate::config::ClientConfig;

/// Fetches the full metadata payload for a feature store
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_metadata(&self, store: &str) -> Result<MetadataPayload>;
}

/// REST implementation of [`MetadataProvider`]
///
/// Issues `GET {base_url}/featurestores/{store}/metadata` with bearer
/// authentication and the configured request timeout.
pub struct RestMetadataProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestMetadataProvider {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Transport(e.into()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MetadataProvider for RestMetadataProvider {
    async fn fetch_metadata(&self, store: &str) -> Result<MetadataPayload> {
        let url = format!("{}/featurestores/{}/metadata", self.base_url, store);
        debug!(%url, "fetching feature store metadata");

        let mut request = self.http.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Rest {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<MetadataPayload>()
            .await
            .map_err(|e| Error::Transport(e.into()))
    }
}
