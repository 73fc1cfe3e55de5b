//! HTTP access for remote metadata documents and artifact probes

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_SECS, PROBE_TIMEOUT_SECS, USER_AGENT};
use crate::version::error::RegistryError;

/// Trait for the network operations the builder performs
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` with GET and returns the body as text
    ///
    /// # Returns
    /// * `Ok(String)` - Response body of a successful request
    /// * `Err(RegistryError)` - Network failure or non-success status
    async fn fetch_text(&self, url: &str) -> Result<String, RegistryError>;

    /// Checks that `url` exists with a HEAD request
    ///
    /// # Returns
    /// * `Ok(())` - The server answered with a success status
    /// * `Err(RegistryError)` - Network failure or non-success status
    async fn probe(&self, url: &str) -> Result<(), RegistryError>;
}

/// Fetcher backed by a shared reqwest client
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(fetch_timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(fetch_timeout)
                .build()
                .expect("Failed to create HTTP client"),
            probe_timeout,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(FETCH_TIMEOUT_SECS),
            Duration::from_secs(PROBE_TIMEOUT_SECS),
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, RegistryError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Server returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.text().await.map_err(|e| {
            warn!("Failed to read response body from {}: {}", url, e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }

    async fn probe(&self, url: &str) -> Result<(), RegistryError> {
        debug!("HEAD {}", url);
        let response = self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(RegistryError::NotFound(url.to_string()))
        } else {
            Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )))
        }
    }
}
