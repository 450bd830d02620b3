//! Sale submission and catalog refresh.
//!
//! ## Submission
//! ```text
//! submit_sale()
//!      │
//!      ├── already in flight? ───────────────────────► AlreadyInFlight (no effects)
//!      │
//!      ├── in_flight = true   (reset by InFlightGuard on every exit)
//!      │
//!      ├── prepare_sale(): EmptyCart / InsufficientStock /
//!      │                   MissingCustomer / MissingPaymentMethod ──► Err, no effects
//!      │
//!      ├── SaleProcessor::process_sale(request).await   (lock not held)
//!      │        │
//!      │        ├── Err(msg) ──► SaleError::Processing(msg), no effects, no retry
//!      │        │
//!      │        └── Ok(record) ──► complete_sale(): stock patch, clear cart,
//!      │                           discount, walk-in contact
//!      ▼
//! Completed(record)
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use super::Checkout;
use crate::collaborators::{CatalogLookup, SaleProcessor};
use crate::error::CheckoutResult;
use crate::state::CheckoutState;
use lats_core::{prepare_sale, SaleError, SaleRecord};

/// Result of a submission attempt that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The sale was accepted and the session reset for the next customer.
    Completed(SaleRecord),

    /// Another submission from this session is still outstanding. Nothing
    /// was sent and nothing changed.
    AlreadyInFlight,
}

/// Clears the in-flight flag when the submission ends, including when the
/// submitting future is dropped mid-await.
struct InFlightGuard<'a> {
    state: &'a CheckoutState,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.with_session_mut(|s| s.finish_submission());
    }
}

impl<C, P> Checkout<C, P>
where
    C: CatalogLookup,
    P: SaleProcessor,
{
    /// Validates the session, hands the sale to the processor and applies
    /// the post-sale transition.
    ///
    /// ## Errors
    /// - `SaleError::{EmptyCart, InsufficientStock, MissingCustomer, MissingPaymentMethod}`
    ///   before anything is sent
    /// - `SaleError::Processing(message)` with the processor's message verbatim
    pub async fn submit_sale(&self) -> CheckoutResult<SubmitOutcome> {
        if !self.state.with_session_mut(|s| s.begin_submission()) {
            debug!("Submission already in flight, ignoring");
            return Ok(SubmitOutcome::AlreadyInFlight);
        }
        let _guard = InFlightGuard { state: &self.state };

        let tax_rate = self.config.tax_rate();
        let sold_at = Utc::now();
        let (request, sold) = self
            .state
            .with_session(|s| {
                let customer = s.customer_details();
                let input = s.sale_input(&customer, tax_rate, &self.config.operator, sold_at);
                prepare_sale(input).map(|request| (request, s.cart().items().to_vec()))
            })
            .inspect_err(|e| warn!(error = %e, "Sale rejected before submission"))?;

        debug!(
            items = request.items.len(),
            total = request.total.minor(),
            payment_method = %request.payment_method,
            "Submitting sale"
        );

        let record = match self.processor.process_sale(&request).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Sale processing failed");
                return Err(SaleError::Processing(e.message().to_string()).into());
            }
        };

        let patched = self.state.with_session_mut(|s| s.complete_sale(&sold));

        info!(
            sale_number = %record.sale_number,
            total = record.total.minor(),
            patched_variants = patched,
            "Sale completed"
        );
        Ok(SubmitOutcome::Completed(record))
    }

    /// Re-fetches every cached product from the catalog, replacing the
    /// optimistic stock figures. Products the catalog no longer knows are
    /// dropped from the cache. Returns how many products were loaded.
    ///
    /// Cart lines keep their stock snapshot.
    pub async fn reload_inventory(&self) -> CheckoutResult<usize> {
        let product_ids = self.state.with_session(|s| s.inventory().product_ids());
        debug!(count = product_ids.len(), "Reloading inventory");

        let mut products = Vec::with_capacity(product_ids.len());
        for product_id in &product_ids {
            if let Some(product) = self.catalog.get_product(product_id).await? {
                products.push(product);
            }
        }

        let loaded = products.len();
        self.state.with_session_mut(|s| s.inventory.replace_all(products));

        info!(loaded, requested = product_ids.len(), "Inventory reloaded");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{catalog, checkout, MockCatalog, MockProcessor};
    use super::*;
    use crate::error::CheckoutError;
    use lats_core::{Customer, DiscountKind, Money, PaymentMethod, PaymentStatus};

    fn stock(checkout: &Checkout<MockCatalog, MockProcessor>, product: &str, variant: &str) -> i64 {
        checkout.state().with_session(|s| {
            s.inventory()
                .variant(product, variant)
                .map(|v| v.quantity)
                .unwrap_or(-1)
        })
    }

    async fn ready_checkout(processor: &MockProcessor) -> (MockCatalog, Checkout<MockCatalog, MockProcessor>) {
        let catalog = catalog();
        let checkout = checkout(&catalog, processor);
        checkout.add_to_cart("ip13", "128", 2).await.unwrap();
        checkout.set_walk_in_contact("Juma", Some("0754 111 222"), None).unwrap();
        checkout.set_payment_method(Some(PaymentMethod::Cash)).unwrap();
        (catalog, checkout)
    }

    #[tokio::test]
    async fn test_successful_submission_side_effects() {
        let processor = MockProcessor::accepting();
        let (_catalog, checkout) = ready_checkout(&processor).await;
        checkout.set_discount(DiscountKind::Percentage, "10").unwrap();
        checkout.set_notes("screen protector fitted").unwrap();

        let outcome = checkout.submit_sale().await.unwrap();
        match outcome {
            SubmitOutcome::Completed(record) => assert_eq!(record.sale_number, "S-1"),
            other => panic!("expected Completed, got {:?}", other),
        }

        let snapshot = checkout.snapshot();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.discount, None);
        assert_eq!(snapshot.customer.name, None);
        assert_eq!(snapshot.customer.phone, None);
        assert_eq!(snapshot.notes, None);
        assert!(!snapshot.submitting);
        // payment method is kept for the next customer
        assert_eq!(snapshot.payment_method, Some(PaymentMethod::Cash));

        // exactly the sold quantity comes off the sold variant only
        assert_eq!(stock(&checkout, "ip13", "128"), 3);
        assert_eq!(stock(&checkout, "ip13", "256"), 2);
    }

    #[tokio::test]
    async fn test_typed_contact_does_not_outlive_saved_customer_sale() {
        let processor = MockProcessor::accepting();
        let (_catalog, checkout) = ready_checkout(&processor).await;
        checkout
            .select_customer(Customer {
                id: "c-42".into(),
                name: "Neema".into(),
                phone: None,
                email: None,
                loyalty_points: 0,
                total_spent: Money::zero(),
                total_orders: 0,
                last_visit: None,
                created_at: Utc::now(),
            })
            .unwrap();

        checkout.submit_sale().await.unwrap();
        assert_eq!(processor.requests()[0].customer_name, "Neema");

        checkout.clear_customer().unwrap();
        checkout.add_to_cart("case", "blk", 1).await.unwrap();

        let err = checkout.submit_sale().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Sale(SaleError::MissingCustomer)));
        assert_eq!(processor.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_contents() {
        let processor = MockProcessor::accepting();
        let (_catalog, checkout) = ready_checkout(&processor).await;
        checkout.set_discount(DiscountKind::Fixed, "20000").unwrap();

        checkout.submit_sale().await.unwrap();

        let requests = processor.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.customer_id, None);
        assert_eq!(request.customer_name, "Juma");
        assert_eq!(request.customer_phone.as_deref(), Some("0754 111 222"));
        assert_eq!(request.items[0].variant_id, "128");
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.subtotal, Money::from_minor(200_000));
        assert_eq!(request.discount, Money::from_minor(20_000));
        assert_eq!(request.tax, Money::from_minor(28_800));
        assert_eq!(request.total, Money::from_minor(208_800));
        assert_eq!(request.payment_status, PaymentStatus::Completed);
        assert_eq!(request.sold_by, "cashier");
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_processor() {
        let processor = MockProcessor::accepting();
        let checkout = checkout(&catalog(), &processor);
        checkout.set_walk_in_contact("Juma", None, None).unwrap();
        checkout.set_payment_method(Some(PaymentMethod::Card)).unwrap();

        let err = checkout.submit_sale().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Sale(SaleError::EmptyCart)));
        assert_eq!(processor.calls(), 0);
        assert!(!checkout.snapshot().submitting);
    }

    #[tokio::test]
    async fn test_stock_guard_blocks_and_leaves_cart() {
        let processor = MockProcessor::accepting();
        let (_catalog, checkout) = ready_checkout(&processor).await;
        let id = checkout.snapshot().items[0].id.clone();
        checkout.update_quantity(&id, 6).unwrap(); // 5 available

        let before = checkout.snapshot();
        let err = checkout.submit_sale().await.unwrap_err();
        match err {
            CheckoutError::Sale(SaleError::InsufficientStock { items }) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].requested, 6);
                assert_eq!(items[0].available, 5);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }

        assert_eq!(processor.calls(), 0);
        assert_eq!(checkout.snapshot(), before);
    }

    #[tokio::test]
    async fn test_missing_customer_then_payment() {
        let processor = MockProcessor::accepting();
        let checkout = checkout(&catalog(), &processor);
        checkout.add_to_cart("case", "blk", 1).await.unwrap();

        let err = checkout.submit_sale().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Sale(SaleError::MissingCustomer)));

        checkout.set_walk_in_contact("Juma", None, None).unwrap();
        let err = checkout.submit_sale().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Sale(SaleError::MissingPaymentMethod)));
        assert_eq!(processor.calls(), 0);
    }

    #[tokio::test]
    async fn test_processor_failure_changes_nothing() {
        let processor = MockProcessor::rejecting("Insufficient stock for iPhone 13 (128GB). Available: 1, Requested: 2");
        let (_catalog, checkout) = ready_checkout(&processor).await;
        checkout.set_discount(DiscountKind::Percentage, "5").unwrap();
        let before = checkout.snapshot();

        let err = checkout.submit_sale().await.unwrap_err();
        match err {
            CheckoutError::Sale(SaleError::Processing(message)) => assert_eq!(
                message,
                "Insufficient stock for iPhone 13 (128GB). Available: 1, Requested: 2"
            ),
            other => panic!("expected Processing, got {:?}", other),
        }

        assert_eq!(checkout.snapshot(), before);
        assert_eq!(stock(&checkout, "ip13", "128"), 5);
        assert_eq!(processor.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_ignored() {
        let processor = MockProcessor::accepting().gated();
        let (_catalog, checkout) = ready_checkout(&processor).await;

        let (first, second) = tokio::join!(checkout.submit_sale(), async {
            processor.entered.notified().await;

            let second = checkout.submit_sale().await;
            let frozen = checkout.update_quantity("ip13:128", 1);
            assert!(matches!(frozen, Err(CheckoutError::SubmissionInProgress)));
            assert!(checkout.snapshot().submitting);

            processor.release.notify_one();
            second
        });

        assert!(matches!(first.unwrap(), SubmitOutcome::Completed(_)));
        assert_eq!(second.unwrap(), SubmitOutcome::AlreadyInFlight);
        assert_eq!(processor.calls(), 1);
        assert_eq!(stock(&checkout, "ip13", "128"), 3);
        assert!(!checkout.snapshot().submitting);
    }

    #[tokio::test]
    async fn test_dropped_submission_releases_flag() {
        let processor = MockProcessor::accepting().gated();
        let (_catalog, checkout) = ready_checkout(&processor).await;

        {
            let pending = checkout.submit_sale();
            tokio::pin!(pending);
            tokio::select! {
                _ = &mut pending => panic!("processor is gated"),
                _ = processor.entered.notified() => {}
            }
        }

        assert!(!checkout.snapshot().submitting);
        assert_eq!(checkout.snapshot().items.len(), 1);
    }

    #[tokio::test]
    async fn test_reload_replaces_optimistic_stock() {
        let processor = MockProcessor::accepting();
        let (catalog, checkout) = ready_checkout(&processor).await;
        checkout.add_to_cart("case", "blk", 1).await.unwrap();
        checkout.submit_sale().await.unwrap();
        assert_eq!(stock(&checkout, "ip13", "128"), 3);

        // another terminal sold more in the meantime; the case was discontinued
        catalog.set_stock("ip13", "128", 1);
        catalog.remove("case");

        assert_eq!(checkout.reload_inventory().await.unwrap(), 1);
        assert_eq!(stock(&checkout, "ip13", "128"), 1);
        assert!(checkout
            .state()
            .with_session(|s| s.inventory().get("case").is_none()));
    }
}
