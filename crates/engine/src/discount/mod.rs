//! Externally computed discounts and their asynchronous lookup.
//!
//! Discounts arrive pre-computed and pre-ordered from the pricing service.
//! The engine never derives a discounted price itself; it only applies the
//! last element of the stack (see [`crate::pricing`]).

mod fetcher;

use std::future::Future;
use std::sync::Arc;

use optionset_core::{CustomerId, DiscountId, ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

pub use fetcher::DiscountFetcher;

/// How the pricing service computed a discount. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
    #[serde(other)]
    Other,
}

/// A promotional price adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: DiscountId,
    #[serde(default)]
    pub title: String,
    /// Calculation type.
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    /// Percentage or amount, depending on `kind`.
    pub value: Decimal,
    /// Price the service started from.
    pub original_price: Decimal,
    /// Price after this and every earlier discount in the stack.
    pub discounted_price: Decimal,
}

/// What a discount list applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscountKey {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub customer_id: Option<CustomerId>,
}

impl DiscountKey {
    /// Key for a product and optional variant/customer.
    #[must_use]
    pub const fn new(
        product_id: ProductId,
        variant_id: Option<VariantId>,
        customer_id: Option<CustomerId>,
    ) -> Self {
        Self {
            product_id,
            variant_id,
            customer_id,
        }
    }
}

/// Anything that can produce the discount stack for a key.
pub trait DiscountSource: Send + Sync + 'static {
    /// Fetch the ordered discount list for `key`.
    fn fetch_discounts(
        &self,
        key: &DiscountKey,
    ) -> impl Future<Output = Result<Vec<Discount>, ServiceError>> + Send;
}

/// A discount list delivered by [`DiscountFetcher`].
#[derive(Debug, Clone)]
pub struct DiscountUpdate {
    /// Request generation this answers.
    pub generation: u64,
    pub key: DiscountKey,
    pub discounts: Arc<Vec<Discount>>,
    /// Served from the response cache without a network call.
    pub cached: bool,
}
