//! Pricing service client.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::{ServiceClient, ServiceError};
use crate::config::EngineConfig;
use crate::discount::{Discount, DiscountKey, DiscountSource};

#[derive(Debug, Deserialize)]
struct DiscountsResponse {
    #[serde(default)]
    discounts: Vec<Discount>,
}

/// Client for `GET {base}/products/{id}/discounts`.
#[derive(Debug, Clone)]
pub struct PricingClient {
    inner: ServiceClient,
}

impl PricingClient {
    /// Create a client for the pricing service at `base_url`.
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
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ServiceError> {
        Self::new(
            config.pricing_url.clone(),
            config.bearer_token(),
            config.http_timeout,
        )
    }

    /// Fetch the ordered discount stack for a product, variant and customer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the service answers with a
    /// non-success status, or the body is not a discount list.
    #[instrument(skip(self), fields(product_id = %key.product_id))]
    pub async fn discounts(&self, key: &DiscountKey) -> Result<Vec<Discount>, ServiceError> {
        let mut url = self
            .inner
            .endpoint(&["products", key.product_id.as_str(), "discounts"])?;

        let filters: Vec<(&str, &str)> = [
            ("variant_id", key.variant_id.as_ref().map(|v| v.as_str())),
            ("customer_id", key.customer_id.as_ref().map(|c| c.as_str())),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect();
        if !filters.is_empty() {
            url.query_pairs_mut().extend_pairs(filters);
        }

        let response = self.inner.http().get(url).send().await?;
        let body: DiscountsResponse = ServiceClient::read_json(response).await?;

        debug!(count = body.discounts.len(), "Fetched discounts");
        Ok(body.discounts)
    }
}

impl DiscountSource for PricingClient {
    async fn fetch_discounts(&self, key: &DiscountKey) -> Result<Vec<Discount>, ServiceError> {
        self.discounts(key).await
    }
}
