//! Selection session.
//!
//! [`SelectionSession`] owns one product and the customer's selection for it,
//! and runs the whole pipeline after every change: resolve the variant,
//! annotate availability, compute the price and evaluate purchasability. All
//! selection surfaces (main panel, quick-buy, purchase button) go through it.
//!
//! A session is rebuilt from scratch when the product changes.
//!
//! The async [`SelectionSession::add_to_cart`] and
//! [`SelectionSession::join_waitlist`] check the state locally before calling
//! the cart or waitlist service, so a refused action never reaches the wire.

use std::collections::BTreeSet;

use chrono::Utc;
use optionset_core::{
    AddonId, CustomerId, OptionId, ProductId, PurchasabilityState, ValueId, VariantId,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::availability::{OptionAvailability, annotate};
use crate::catalog::{Addon, Product};
use crate::discount::{Discount, DiscountKey};
use crate::error::{self, PurchaseError, SelectionError};
use crate::pricing::{PriceQuote, PriceRange, compute_price, price_range};
use crate::purchasability::{Purchasability, evaluate};
use crate::selection::SelectionState;
use crate::services::{
    CartClient, CartLineConfirmation, CartLineRequest, WaitlistClient, WaitlistRequest,
};

/// Everything the UI needs to render the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionView {
    pub product_id: ProductId,
    pub selection: SelectionState,
    /// Resolved variant, if any.
    pub variant_id: Option<VariantId>,
    /// Resolved variant title (e.g., "Red / M").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_title: Option<String>,
    /// Per-option, per-value selectability.
    pub options: Vec<OptionAvailability>,
    /// Options still waiting for a value.
    pub missing_options: Vec<OptionId>,
    pub selected_addons: Vec<AddonId>,
    pub price: PriceQuote,
    /// Span of variant prices while the selection is incomplete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    pub state: PurchasabilityState,
}

/// Discounts plus the variant they were fetched for.
#[derive(Debug, Clone)]
struct AppliedDiscounts {
    variant_id: Option<VariantId>,
    discounts: Vec<Discount>,
}

/// Selection state and derived data for one product.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    product: Product,
    selection: SelectionState,
    addons: BTreeSet<AddonId>,
    customer: Option<CustomerId>,
    discounts: Option<AppliedDiscounts>,
}

impl SelectionSession {
    /// Start a session with the product's initial selection.
    #[must_use]
    pub fn new(product: Product) -> Self {
        let selection = SelectionState::seed(&product);
        Self::with_selection(product, selection)
    }

    /// Start a session with an explicit selection.
    #[must_use]
    pub fn with_selection(product: Product, selection: SelectionState) -> Self {
        Self {
            product,
            selection,
            addons: BTreeSet::new(),
            customer: None,
            discounts: None,
        }
    }

    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Customer that discounts and waitlist requests are made for.
    #[must_use]
    pub const fn customer(&self) -> Option<&CustomerId> {
        self.customer.as_ref()
    }

    /// Switch the customer; discounts fetched for someone else are dropped.
    pub fn set_customer(&mut self, customer: Option<CustomerId>) {
        if self.customer == customer {
            return;
        }
        if self.discounts.take().is_some() {
            debug!(
                product_id = %self.product.id,
                old_customer = ?self.customer,
                new_customer = ?customer,
                "Customer changed; dropping discounts"
            );
        }
        self.customer = customer;
    }

    /// Choose `value` for `option` and recompute.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not exist under the option; the
    /// selection is left unchanged.
    pub fn select(&mut self, option: OptionId, value: ValueId) -> Result<SelectionView, SelectionError> {
        let before = self.resolved_variant_id();
        self.selection.select(&self.product, option, value)?;
        self.after_selection_change(before.as_ref());
        Ok(self.view())
    }

    /// Choose a value by option name/ID and value label/ID and recompute.
    ///
    /// # Errors
    ///
    /// Returns an error if no option or value matches the text.
    pub fn select_text(&mut self, option: &str, value: &str) -> Result<SelectionView, SelectionError> {
        let before = self.resolved_variant_id();
        self.selection.select_by_text(&self.product, option, value)?;
        self.after_selection_change(before.as_ref());
        Ok(self.view())
    }

    /// Remove the choice for `option` and recompute.
    pub fn clear(&mut self, option: &OptionId) -> SelectionView {
        let before = self.resolved_variant_id();
        self.selection.clear(option);
        self.after_selection_change(before.as_ref());
        self.view()
    }

    /// Toggle an add-on; returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has no such add-on.
    pub fn toggle_addon(&mut self, addon: &AddonId) -> Result<bool, SelectionError> {
        if self.product.addon(addon).is_none() {
            return Err(SelectionError::UnknownAddon(addon.clone()));
        }
        if self.addons.remove(addon) {
            Ok(false)
        } else {
            self.addons.insert(addon.clone());
            Ok(true)
        }
    }

    /// Key to request discounts for the current product, variant and
    /// customer.
    #[must_use]
    pub fn discount_key(&self) -> DiscountKey {
        DiscountKey::new(
            self.product.id.clone(),
            self.resolved_variant_id(),
            self.customer.clone(),
        )
    }

    /// Install a discount stack fetched for `key`.
    ///
    /// Returns `false`, leaving the current discounts untouched, when the key
    /// no longer matches this product, resolved variant and customer.
    pub fn set_discounts(&mut self, key: &DiscountKey, discounts: Vec<Discount>) -> bool {
        let current = self.resolved_variant_id();
        if key.product_id != self.product.id || key.variant_id != current {
            debug!(
                product_id = %self.product.id,
                key_variant = ?key.variant_id,
                current_variant = ?current,
                "Ignoring discounts for a different variant"
            );
            return false;
        }
        if key.customer_id != self.customer {
            debug!(
                product_id = %self.product.id,
                key_customer = ?key.customer_id,
                current_customer = ?self.customer,
                "Ignoring discounts for a different customer"
            );
            return false;
        }
        self.discounts = Some(AppliedDiscounts {
            variant_id: current,
            discounts,
        });
        true
    }

    /// Current discount stack (empty when none apply).
    #[must_use]
    pub fn discounts(&self) -> &[Discount] {
        self.discounts
            .as_ref()
            .map(|applied| applied.discounts.as_slice())
            .unwrap_or_default()
    }

    /// Current purchasability and the variant a purchase would add.
    #[must_use]
    pub fn purchasability(&self) -> Purchasability<'_> {
        evaluate(&self.product, &self.selection)
    }

    /// Compute the view for the current state.
    #[must_use]
    pub fn view(&self) -> SelectionView {
        let outcome = self.purchasability();
        let variant = outcome.variant;
        let addons = self.selected_addons();
        let range = (outcome.state == PurchasabilityState::NeedsSelection)
            .then(|| price_range(&self.product, addons.iter().copied()));

        SelectionView {
            product_id: self.product.id.clone(),
            selection: self.selection.clone(),
            variant_id: variant.map(|v| v.id.clone()),
            variant_title: variant
                .filter(|v| !v.slots.is_empty())
                .map(|v| v.title(&self.product)),
            options: annotate(&self.product, &self.selection),
            missing_options: self
                .selection
                .missing_options(&self.product)
                .into_iter()
                .cloned()
                .collect(),
            selected_addons: self.addons.iter().cloned().collect(),
            price: compute_price(&self.product, variant, addons, self.discounts()),
            price_range: range,
            state: outcome.state,
        }
    }

    /// Build the cart line for the current selection.
    ///
    /// # Errors
    ///
    /// Returns an error unless the state is `Available`, the quantity is at
    /// least one, and (when stock is tracked and enforced) enough units are
    /// in stock.
    pub fn purchase(&self, quantity: u32) -> Result<CartLineRequest, PurchaseError> {
        if quantity == 0 {
            return Err(PurchaseError::InvalidQuantity(quantity));
        }

        let outcome = self.purchasability();
        if outcome.state != PurchasabilityState::Available {
            return Err(PurchaseError::NotPurchasable(outcome.state));
        }

        if !self.product.sell_without_stock {
            let available = outcome.variant.map_or(
                self.product.inventory_quantity,
                |v| v.inventory_quantity,
            );
            if let Some(available) = available
                && i64::from(quantity) > available
            {
                return Err(PurchaseError::InsufficientStock {
                    requested: quantity,
                    available,
                });
            }
        }

        Ok(CartLineRequest {
            product_id: self.product.id.clone(),
            variant_id: outcome.variant.map(|v| v.id.clone()),
            quantity,
            addon_selections: self.addons.iter().cloned().collect(),
        })
    }

    /// Build the waitlist request for the current selection and customer.
    ///
    /// # Errors
    ///
    /// Returns an error unless the state is `OutOfStockWaitlist`.
    pub fn waitlist_request(&self) -> Result<WaitlistRequest, PurchaseError> {
        let outcome = self.purchasability();
        if !outcome.state.offers_waitlist() {
            return Err(PurchaseError::WaitlistUnavailable(outcome.state));
        }

        Ok(WaitlistRequest {
            product_id: self.product.id.clone(),
            variant_id: outcome.variant.map(|v| v.id.clone()),
            customer_id: self.customer.clone(),
            requested_at: Utc::now(),
        })
    }

    /// Add the current selection to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Purchase`](crate::EngineError::Purchase) if
    /// [`purchase`](Self::purchase) refuses the line, without calling the
    /// service, or [`EngineError::Service`](crate::EngineError::Service) if
    /// the cart service fails.
    #[instrument(skip(self, cart), fields(product_id = %self.product.id))]
    pub async fn add_to_cart(&self, cart: &CartClient, quantity: u32) -> error::Result<CartLineConfirmation> {
        let line = self.purchase(quantity)?;
        let confirmation = cart.add_line(&line).await?;
        info!(
            variant_id = ?line.variant_id,
            line_id = %confirmation.line_id,
            "Added to cart"
        );
        Ok(confirmation)
    }

    /// Put the customer on the waitlist for the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Purchase`](crate::EngineError::Purchase) unless
    /// the state offers the waitlist, or
    /// [`EngineError::Service`](crate::EngineError::Service) if the waitlist
    /// service fails.
    #[instrument(skip(self, waitlist), fields(product_id = %self.product.id))]
    pub async fn join_waitlist(&self, waitlist: &WaitlistClient) -> error::Result<WaitlistRequest> {
        let request = self.waitlist_request()?;
        waitlist.join(&request).await?;
        info!(variant_id = ?request.variant_id, "Joined waitlist");
        Ok(request)
    }

    fn resolved_variant_id(&self) -> Option<VariantId> {
        self.purchasability().variant.map(|v| v.id.clone())
    }

    fn selected_addons(&self) -> Vec<&Addon> {
        self.product
            .addons
            .iter()
            .filter(|a| self.addons.contains(&a.id))
            .collect()
    }

    /// Drop discounts fetched for a variant that is no longer resolved.
    fn after_selection_change(&mut self, before: Option<&VariantId>) {
        let after = self.resolved_variant_id();
        if after.as_ref() == before {
            return;
        }
        if let Some(applied) = self.discounts.take() {
            debug!(
                product_id = %self.product.id,
                stale_variant = ?applied.variant_id,
                new_variant = ?after,
                "Resolved variant changed; dropping discounts"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use optionset_core::DiscountId;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::discount::DiscountKind;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "tee",
            "title": "Tee",
            "price": "20",
            "addons": [{ "id": "wrap", "title": "Gift wrap", "price": "5" }],
            "options": [
                { "id": "color", "name": "Color", "values": [
                    { "id": "red", "label": "Red" },
                    { "id": "blue", "label": "Blue" }
                ]},
                { "id": "size", "name": "Size", "values": [
                    { "id": "s", "label": "S" },
                    { "id": "m", "label": "M" }
                ]}
            ],
            "variants": [
                { "id": "red-s", "slots": [
                    { "option_name": "Color", "value": "Red" },
                    { "option_name": "Size", "value": "S" }
                ], "inventory_quantity": 2 },
                { "id": "red-m", "slots": [
                    { "option_name": "Color", "value": "Red" },
                    { "option_name": "Size", "value": "M" }
                ], "inventory_quantity": 0, "price": "22" }
            ]
        }))
        .unwrap()
    }

    fn discount(price: &str) -> Discount {
        Discount {
            id: DiscountId::new("sale"),
            title: "Sale".to_string(),
            kind: DiscountKind::FixedAmount,
            value: Decimal::ONE,
            original_price: Decimal::new(20, 0),
            discounted_price: price.parse().unwrap(),
        }
    }

    #[test]
    fn test_new_session_seeds_selection() {
        let session = SelectionSession::new(product());
        let view = session.view();

        assert_eq!(view.variant_id, Some(VariantId::new("red-s")));
        assert_eq!(view.variant_title.as_deref(), Some("Red / S"));
        assert_eq!(view.state, PurchasabilityState::Available);
        assert!(view.missing_options.is_empty());
        assert_eq!(view.price.display.amount, Decimal::new(20, 0));
    }

    #[test]
    fn test_select_recomputes_view() {
        let mut session = SelectionSession::new(product());
        let view = session
            .select(OptionId::new("size"), ValueId::new("m"))
            .unwrap();

        assert_eq!(view.variant_id, Some(VariantId::new("red-m")));
        assert_eq!(view.state, PurchasabilityState::OutOfStockWaitlist);
        assert_eq!(view.price.display.amount, Decimal::new(22, 0));
    }

    #[test]
    fn test_invalid_select_leaves_state_untouched() {
        let mut session = SelectionSession::new(product());
        let before = session.selection().clone();
        assert!(session.select(OptionId::new("size"), ValueId::new("xl")).is_err());
        assert_eq!(session.selection(), &before);
    }

    #[test]
    fn test_clear_needs_selection() {
        let mut session = SelectionSession::new(product());
        let view = session.clear(&OptionId::new("size"));
        assert_eq!(view.state, PurchasabilityState::NeedsSelection);
        assert_eq!(view.missing_options, vec![OptionId::new("size")]);
        assert!(view.variant_id.is_none());
    }

    #[test]
    fn test_price_range_only_while_selection_incomplete() {
        let mut session = SelectionSession::new(product());
        assert!(session.view().price_range.is_none());

        session.toggle_addon(&AddonId::new("wrap")).unwrap();
        let view = session.clear(&OptionId::new("size"));
        let range = view.price_range.unwrap();
        assert_eq!(range.min.amount, Decimal::new(25, 0));
        assert_eq!(range.max.amount, Decimal::new(27, 0));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["price_range"]["max"]["amount"], "27");

        let view = session
            .select(OptionId::new("size"), ValueId::new("m"))
            .unwrap();
        assert!(view.price_range.is_none());
    }

    #[test]
    fn test_addons_and_discounts() {
        let mut session = SelectionSession::new(product());
        assert!(session.toggle_addon(&AddonId::new("wrap")).unwrap());

        let key = session.discount_key();
        assert!(session.set_discounts(&key, vec![discount("15")]));

        let view = session.view();
        assert_eq!(view.price.display.amount, Decimal::new(20, 0));
        assert_eq!(view.price.original.amount, Decimal::new(25, 0));
        assert_eq!(view.selected_addons, vec![AddonId::new("wrap")]);

        assert!(!session.toggle_addon(&AddonId::new("wrap")).unwrap());
        assert!(session.toggle_addon(&AddonId::new("engrave")).is_err());
    }

    #[test]
    fn test_discounts_dropped_when_variant_changes() {
        let mut session = SelectionSession::new(product());
        session.set_customer(Some(CustomerId::new("c1")));
        let key = session.discount_key();
        assert_eq!(key.variant_id, Some(VariantId::new("red-s")));
        assert_eq!(key.customer_id, Some(CustomerId::new("c1")));
        assert!(session.set_discounts(&key, vec![discount("15")]));

        session
            .select(OptionId::new("size"), ValueId::new("m"))
            .unwrap();
        assert!(session.discounts().is_empty());

        // A late response for the old variant is rejected.
        assert!(!session.set_discounts(&key, vec![discount("15")]));
    }

    #[test]
    fn test_discounts_for_another_customer_are_rejected() {
        let mut session = SelectionSession::new(product());
        let anonymous = session.discount_key();
        session.set_customer(Some(CustomerId::new("c1")));

        // Looked up before sign-in; the customer may have a better price.
        assert!(!session.set_discounts(&anonymous, vec![discount("15")]));
        assert!(session.discounts().is_empty());

        let key = session.discount_key();
        assert!(session.set_discounts(&key, vec![discount("15")]));
        assert_eq!(session.discounts().len(), 1);

        session.set_customer(Some(CustomerId::new("c2")));
        assert!(session.discounts().is_empty());
        assert!(!session.set_discounts(&key, vec![discount("15")]));
    }

    #[test]
    fn test_purchase_rules() {
        let mut session = SelectionSession::new(product());

        assert_eq!(
            session.purchase(0),
            Err(PurchaseError::InvalidQuantity(0))
        );
        assert_eq!(
            session.purchase(3),
            Err(PurchaseError::InsufficientStock {
                requested: 3,
                available: 2
            })
        );

        session.toggle_addon(&AddonId::new("wrap")).unwrap();
        let line = session.purchase(2).unwrap();
        assert_eq!(line.variant_id, Some(VariantId::new("red-s")));
        assert_eq!(line.addon_selections, vec![AddonId::new("wrap")]);

        session.clear(&OptionId::new("size"));
        assert_eq!(
            session.purchase(1),
            Err(PurchaseError::NotPurchasable(PurchasabilityState::NeedsSelection))
        );
    }

    #[test]
    fn test_waitlist_only_when_out_of_stock() {
        let mut session = SelectionSession::new(product());
        assert!(matches!(
            session.waitlist_request(),
            Err(PurchaseError::WaitlistUnavailable(PurchasabilityState::Available))
        ));

        session
            .select(OptionId::new("size"), ValueId::new("m"))
            .unwrap();
        session.set_customer(Some(CustomerId::new("c1")));
        let request = session.waitlist_request().unwrap();
        assert_eq!(request.variant_id, Some(VariantId::new("red-m")));
        assert_eq!(request.customer_id, Some(CustomerId::new("c1")));
    }
}
