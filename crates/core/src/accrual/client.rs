//! HTTP client for the accrual service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use tracing::debug;

use super::types::{AccrualError, AccrualSnapshot, classify_response};
use super::AccrualSource;

/// Reqwest-backed [`AccrualSource`].
///
/// Carries its own request timeout; the ledger service applies a second,
/// outer deadline derived from the inbound request.
#[derive(Debug, Clone)]
pub struct AccrualClient {
    client: reqwest::Client,
    base_url: String,
}

impl AccrualClient {
    /// Creates a client for the accrual service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an [`AccrualError::Unreachable`] if the underlying HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, AccrualError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AccrualError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AccrualSource for AccrualClient {
    async fn fetch(&self, order_number: &str) -> Result<AccrualSnapshot, AccrualError> {
        let url = format!("{}/api/orders/{order_number}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AccrualError::Unreachable(e.to_string()))?;

        let status_code = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let body = response
            .bytes()
            .await
            .map_err(|e| AccrualError::Unreachable(e.to_string()))?;

        debug!(order_number, status_code, "accrual service replied");
        classify_response(status_code, retry_after_secs, &body)
    }
}
