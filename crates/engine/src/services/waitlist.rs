//! Waitlist service client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use optionset_core::{CustomerId, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

use super::{ServiceClient, ServiceError};
use crate::config::EngineConfig;

/// Captured purchase intent for an out-of-stock product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistRequest {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub customer_id: Option<CustomerId>,
    pub requested_at: DateTime<Utc>,
}

/// Client for `POST {base}/waitlist`.
#[derive(Debug, Clone)]
pub struct WaitlistClient {
    inner: ServiceClient,
}

impl WaitlistClient {
    /// Create a client for the waitlist service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL cannot be a base or the HTTP client fails to
    /// build.
    pub fn new(
        base_url: Url,
        bearer_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            inner: ServiceClient::new(base_url, bearer_token, timeout)?,
        })
    }

    /// Create a client from the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns error if `OPTIONSET_WAITLIST_URL` is not configured or the
    /// HTTP client fails to build.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ServiceError> {
        let base = config.waitlist_url.clone().ok_or_else(|| {
            ServiceError::InvalidConfig("OPTIONSET_WAITLIST_URL is not set".to_string())
        })?;
        Self::new(base, config.bearer_token(), config.http_timeout)
    }

    /// Register interest in a product or variant.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the service rejects it.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn join(&self, request: &WaitlistRequest) -> Result<(), ServiceError> {
        let url = self.inner.endpoint(&["waitlist"])?;
        let response = self.inner.http().post(url).json(request).send().await?;
        ServiceClient::check(response).await?;

        info!("Waitlist request recorded");
        Ok(())
    }
}
