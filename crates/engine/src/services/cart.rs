//! Cart service client.

use std::time::Duration;

use optionset_core::{AddonId, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;
use uuid::Uuid;

use super::{ServiceClient, ServiceError};
use crate::config::EngineConfig;

/// A line to add to the cart.
///
/// `variant_id` is always the resolved variant, never the raw selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineRequest {
    pub product_id: ProductId,
    /// Absent for products sold without a variant catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    #[serde(default)]
    pub addon_selections: Vec<AddonId>,
}

/// Cart service acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLineConfirmation {
    /// ID of the created cart line.
    pub line_id: String,
}

/// Client for `POST {base}/cart/lines`.
#[derive(Debug, Clone)]
pub struct CartClient {
    inner: ServiceClient,
}

impl CartClient {
    /// Create a client for the cart service at `base_url`.
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
    /// Returns error if `OPTIONSET_CART_URL` is not configured or the HTTP
    /// client fails to build.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ServiceError> {
        let base = config
            .cart_url
            .clone()
            .ok_or_else(|| ServiceError::InvalidConfig("OPTIONSET_CART_URL is not set".to_string()))?;
        Self::new(base, config.bearer_token(), config.http_timeout)
    }

    /// Add a line to the cart.
    ///
    /// Each call carries a fresh `Idempotency-Key` so the service can drop
    /// retried duplicates.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the service rejects the line.
    #[instrument(
        skip(self, line),
        fields(product_id = %line.product_id, quantity = line.quantity)
    )]
    pub async fn add_line(&self, line: &CartLineRequest) -> Result<CartLineConfirmation, ServiceError> {
        let url = self.inner.endpoint(&["cart", "lines"])?;
        let idempotency_key = Uuid::new_v4();

        let response = self
            .inner
            .http()
            .post(url)
            .header("Idempotency-Key", idempotency_key.to_string())
            .json(line)
            .send()
            .await?;
        let confirmation: CartLineConfirmation = ServiceClient::read_json(response).await?;

        info!(
            line_id = %confirmation.line_id,
            %idempotency_key,
            "Cart line added"
        );
        Ok(confirmation)
    }
}
