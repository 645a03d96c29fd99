//! HTTP clients for the pricing, cart and waitlist services.
//!
//! All three share one request pipeline: a `reqwest` client with default
//! headers (bearer token, JSON accept) and a per-request timeout, endpoint
//! URLs built from path segments so IDs are always percent-encoded, and
//! uniform status handling.

mod cart;
mod pricing;
mod waitlist;

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;
use url::Url;

pub use cart::{CartClient, CartLineConfirmation, CartLineRequest};
pub use pricing::PricingClient;
pub use waitlist::{WaitlistClient, WaitlistRequest};

/// Errors that can occur when calling an external service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be built from the given configuration.
    #[error("Invalid service configuration: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// Shared Client
// =============================================================================

/// A base URL plus a configured `reqwest` client.
#[derive(Debug, Clone)]
pub(crate) struct ServiceClient {
    client: reqwest::Client,
    base: Url,
}

impl ServiceClient {
    /// Build a client for `base`.
    pub(crate) fn new(
        base: Url,
        bearer_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        if base.cannot_be_a_base() {
            return Err(ServiceError::InvalidConfig(format!(
                "{base} cannot be used as a base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ServiceError::InvalidConfig(format!("Invalid token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base })
    }

    /// Endpoint URL for `segments` below the base path.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ServiceError::InvalidConfig(format!("{} cannot be used as a base URL", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) const fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Fail on rate limiting and non-success statuses.
    pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ServiceError::RateLimited(retry_after));
        }

        if !status.is_success() {
            let url = response.url().clone();
            let message = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                url = %url,
                body = %message.chars().take(200).collect::<String>(),
                "Service returned non-success status"
            );
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        Ok(response)
    }

    /// Check the status and decode a JSON body.
    pub(crate) async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let text = Self::check(response).await?.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse service response"
            );
            ServiceError::Parse(e.to_string())
        })
    }
}
