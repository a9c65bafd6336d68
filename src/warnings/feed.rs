use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::models::EmergencyWarning;
use crate::{HandsUpError, Result};

/// A source of emergency warnings
#[async_trait]
pub trait WarningFeed: Send + Sync {
    /// Name shown in logs and error messages
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<EmergencyWarning>>;
}

/// HTTP client with retries on transient failures
pub fn http_client(request_timeout: Duration, max_retries: u32) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(request_timeout)
        .user_agent(concat!("HandsUp/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HandsUpError::network(format!("Failed to create HTTP client: {}", e)))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
