//! Cart and discount operations.

use tracing::debug;

use super::Checkout;
use crate::collaborators::{CatalogLookup, SaleProcessor};
use crate::error::{CheckoutError, CheckoutResult};
use lats_core::{CoreError, DiscountConfig, DiscountKind};

impl<C, P> Checkout<C, P>
where
    C: CatalogLookup,
    P: SaleProcessor,
{
    /// Adds `quantity` of a variant, merging into an existing line.
    ///
    /// Price and stock are snapshotted from the session's copy of the
    /// product. Returns the line id.
    pub async fn add_to_cart(
        &self,
        product_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> CheckoutResult<String> {
        debug!(product_id = %product_id, variant_id = %variant_id, quantity, "add_to_cart");

        self.state.with_session(|s| s.ensure_idle())?;
        let product = self.product(product_id).await?;

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            Ok(s.cart.add_item(&product, variant_id, quantity)?)
        })
    }

    /// Switches a line to another variant of the same product.
    ///
    /// Fails without touching the cart if the line or variant is unknown.
    pub async fn change_variant(&self, item_id: &str, new_variant_id: &str) -> CheckoutResult<String> {
        debug!(item_id = %item_id, new_variant_id = %new_variant_id, "change_variant");

        let product_id = self.state.with_session(|s| {
            s.ensure_idle()?;
            s.cart()
                .get(item_id)
                .map(|line| line.product_id.clone())
                .ok_or_else(|| CheckoutError::from(CoreError::ItemNotFound(item_id.to_string())))
        })?;
        let product = self.product(&product_id).await?;

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            Ok(s.cart.change_variant(item_id, &product, new_variant_id)?)
        })
    }

    /// Sets a line's quantity; zero or less removes it.
    pub fn update_quantity(&self, item_id: &str, quantity: i64) -> CheckoutResult<()> {
        debug!(item_id = %item_id, quantity, "update_quantity");

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            Ok(s.cart.update_quantity(item_id, quantity)?)
        })
    }

    /// Removes a line. Returns whether it existed.
    pub fn remove_item(&self, item_id: &str) -> CheckoutResult<bool> {
        debug!(item_id = %item_id, "remove_item");

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            Ok(s.cart.remove_item(item_id))
        })
    }

    pub fn clear_cart(&self) -> CheckoutResult<()> {
        debug!("clear_cart");

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.cart.clear();
            Ok(())
        })
    }

    /// Parses and applies the discount typed by the operator.
    ///
    /// Blank text removes the discount. Returns the discount now in effect.
    pub fn set_discount(&self, kind: DiscountKind, text: &str) -> CheckoutResult<Option<DiscountConfig>> {
        debug!(?kind, text = %text, "set_discount");

        if !self.config.discounts_enabled {
            return Err(CheckoutError::DiscountsDisabled);
        }
        let discount = DiscountConfig::parse(kind, text, self.config.currency_decimals)?;

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.discount = discount;
            Ok(discount)
        })
    }

    pub fn clear_discount(&self) -> CheckoutResult<()> {
        debug!("clear_discount");

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.discount = None;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{catalog, checkout, MockProcessor};
    use super::*;
    use crate::state::PosConfig;
    use lats_core::{Money, ValidationError};

    #[tokio::test]
    async fn test_re_add_merges_into_one_line() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());

        let first = checkout.add_to_cart("ip13", "128", 1).await.unwrap();
        let second = checkout.add_to_cart("ip13", "128", 2).await.unwrap();
        assert_eq!(first, second);

        let snapshot = checkout.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 3);
        assert_eq!(snapshot.items[0].total_price, Money::from_minor(300_000));

        // the product was fetched once, then served from the session cache
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_product_or_variant() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());

        let err = checkout.add_to_cart("nope", "v", 1).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::ProductNotFound(_))));

        let err = checkout.add_to_cart("ip13", "1tb", 1).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::VariantNotFound { .. })));

        let err = checkout.add_to_cart("ip13", "128", 0).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::Validation(_))));
        assert!(checkout.snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn test_quantity_to_zero_removes_line() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());
        let id = checkout.add_to_cart("case", "blk", 2).await.unwrap();

        checkout.update_quantity(&id, 0).unwrap();
        assert!(checkout.snapshot().items.is_empty());

        // removing something already gone is a no-op
        checkout.update_quantity(&id, -1).unwrap();
        assert!(!checkout.remove_item(&id).unwrap());
    }

    #[tokio::test]
    async fn test_change_variant_rekeys_and_reprices() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());
        let id = checkout.add_to_cart("ip13", "128", 2).await.unwrap();

        let new_id = checkout.change_variant(&id, "256").await.unwrap();
        assert_eq!(new_id, "ip13:256");

        let items = checkout.snapshot().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ip13:256");
        assert_eq!(items[0].variant_name, "256GB");
        assert_eq!(items[0].unit_price, Money::from_minor(120_000));
        assert_eq!(items[0].available_quantity, 2);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_change_variant_merges_into_existing_line() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());
        let small = checkout.add_to_cart("ip13", "128", 1).await.unwrap();
        checkout.add_to_cart("ip13", "256", 1).await.unwrap();

        checkout.change_variant(&small, "256").await.unwrap();

        let items = checkout.snapshot().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ip13:256");
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_change_variant_failure_leaves_cart_untouched() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());
        let id = checkout.add_to_cart("ip13", "128", 1).await.unwrap();
        let before = checkout.snapshot();

        let err = checkout.change_variant(&id, "1tb").await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::VariantNotFound { .. })));

        let err = checkout.change_variant("missing:line", "256").await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::ItemNotFound(_))));

        assert_eq!(checkout.snapshot(), before);
    }

    #[tokio::test]
    async fn test_discount_parsing_and_clamping() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());
        checkout.add_to_cart("case", "blk", 2).await.unwrap(); // 30 000

        // fixed discount above the subtotal is clamped
        checkout.set_discount(DiscountKind::Fixed, "50000").unwrap();
        let totals = checkout.totals();
        assert_eq!(totals.discount_amount, Money::from_minor(30_000));
        assert!(totals.total.is_zero());

        // percentage applies before VAT
        checkout.set_discount(DiscountKind::Percentage, "10").unwrap();
        let totals = checkout.totals();
        assert_eq!(totals.discount_amount, Money::from_minor(3_000));
        assert_eq!(totals.tax, Money::from_minor(4_320));
        assert_eq!(totals.total, Money::from_minor(31_320));

        // blank clears
        assert_eq!(checkout.set_discount(DiscountKind::Fixed, " ").unwrap(), None);
        assert!(checkout.totals().discount_amount.is_zero());
    }

    #[tokio::test]
    async fn test_invalid_discount_keeps_previous() {
        let catalog = catalog();
        let checkout = checkout(&catalog, &MockProcessor::accepting());
        checkout.set_discount(DiscountKind::Fixed, "1000").unwrap();

        let err = checkout.set_discount(DiscountKind::Fixed, "-5").unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::Validation(ValidationError::Negative { .. }))
        ));
        assert_eq!(
            checkout.snapshot().discount,
            Some(DiscountConfig::fixed(Money::from_minor(1000)))
        );
    }

    #[tokio::test]
    async fn test_discounts_disabled() {
        let config = PosConfig {
            discounts_enabled: false,
            ..Default::default()
        };
        let checkout = Checkout::new(catalog(), MockProcessor::accepting(), config);
        let err = checkout.set_discount(DiscountKind::Percentage, "5").unwrap_err();
        assert!(matches!(err, CheckoutError::DiscountsDisabled));
    }
}
