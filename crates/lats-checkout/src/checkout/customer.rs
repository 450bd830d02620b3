//! Customer, payment and notes selection.

use tracing::debug;

use super::Checkout;
use crate::collaborators::{CatalogLookup, SaleProcessor};
use crate::error::CheckoutResult;
use lats_core::validation::normalize_optional;
use lats_core::{Customer, CustomerDetails, PaymentMethod};

impl<C, P> Checkout<C, P>
where
    C: CatalogLookup,
    P: SaleProcessor,
{
    /// Selects a saved customer. It stays selected across sales until cleared.
    pub fn select_customer(&self, customer: Customer) -> CheckoutResult<()> {
        debug!(customer_id = %customer.id, "select_customer");

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.saved_customer = Some(customer);
            Ok(())
        })
    }

    pub fn clear_customer(&self) -> CheckoutResult<()> {
        debug!("clear_customer");

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.saved_customer = None;
            Ok(())
        })
    }

    /// Records the walk-in name, phone and email typed at the counter.
    pub fn set_walk_in_contact(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> CheckoutResult<()> {
        debug!("set_walk_in_contact");

        let contact = CustomerDetails::walk_in(name, phone, email);
        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.contact = contact;
            Ok(())
        })
    }

    pub fn set_payment_method(&self, method: Option<PaymentMethod>) -> CheckoutResult<()> {
        debug!(?method, "set_payment_method");

        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.payment_method = method;
            Ok(())
        })
    }

    pub fn set_notes(&self, notes: &str) -> CheckoutResult<()> {
        let notes = normalize_optional(Some(notes));
        self.state.with_session_mut(|s| {
            s.ensure_idle()?;
            s.notes = notes;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{catalog, checkout, MockProcessor};
    use super::*;
    use chrono::Utc;
    use lats_core::Money;

    fn saved() -> Customer {
        Customer {
            id: "c-42".into(),
            name: "Neema".into(),
            phone: Some("0713 555 000".into()),
            email: None,
            loyalty_points: 12,
            total_spent: Money::from_minor(12_000),
            total_orders: 1,
            last_visit: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_saved_customer_wins_over_walk_in() {
        let checkout = checkout(&catalog(), &MockProcessor::accepting());
        checkout.set_walk_in_contact("Juma", None, None).unwrap();
        checkout.select_customer(saved()).unwrap();

        let customer = checkout.snapshot().customer;
        assert_eq!(customer.customer_id.as_deref(), Some("c-42"));
        assert_eq!(customer.name.as_deref(), Some("Neema"));

        checkout.clear_customer().unwrap();
        assert_eq!(checkout.snapshot().customer.name.as_deref(), Some("Juma"));
    }

    #[test]
    fn test_payment_and_notes() {
        let checkout = checkout(&catalog(), &MockProcessor::accepting());
        assert_eq!(checkout.snapshot().payment_method, None);

        checkout.set_payment_method(Some(PaymentMethod::MobileMoney)).unwrap();
        checkout.set_notes("  deliver after 5pm ").unwrap();

        let snapshot = checkout.snapshot();
        assert_eq!(snapshot.payment_method, Some(PaymentMethod::MobileMoney));
        assert_eq!(snapshot.notes.as_deref(), Some("deliver after 5pm"));

        checkout.set_notes("   ").unwrap();
        assert_eq!(checkout.snapshot().notes, None);
    }
}
