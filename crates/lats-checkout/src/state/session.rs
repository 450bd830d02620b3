//! # POS Session
//!
//! Everything one operator's checkout screen holds between clicks.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>`:
//! 1. Several async operations may touch the cart
//! 2. Only one of them may modify it at a time
//! 3. The lock is taken inside synchronous closures only, so it is never
//!    held across an `.await`
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  new ──► add/change/update lines ──► discount, customer, payment        │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                   begin_submission()  in_flight = true  │
//! │                                            │                            │
//! │                    ┌──── failure ──────────┼──────── success ───┐       │
//! │                    ▼                                            ▼       │
//! │          session untouched                     complete_sale():         │
//! │                                                • cached stock −= sold   │
//! │                                                • cart cleared           │
//! │                                                • discount cleared       │
//! │                                                • walk-in contact cleared│
//! │                    └──────── finish_submission()  in_flight = false ────┘
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CheckoutError, CheckoutResult};
use lats_core::{
    calculate_totals, Cart, CartLineItem, CartTotals, Customer, CustomerDetails, DiscountConfig,
    PaymentMethod, ProductCache, SaleInput, TaxRate,
};

/// Checkout state for one operator.
#[derive(Debug, Clone, Default)]
pub struct PosSession {
    pub(crate) cart: Cart,
    pub(crate) discount: Option<DiscountConfig>,
    pub(crate) saved_customer: Option<Customer>,
    pub(crate) contact: CustomerDetails,
    pub(crate) payment_method: Option<PaymentMethod>,
    pub(crate) notes: Option<String>,
    pub(crate) inventory: ProductCache,
    in_flight: bool,
}

impl PosSession {
    pub fn new(default_payment_method: Option<PaymentMethod>) -> Self {
        PosSession {
            payment_method: default_payment_method,
            ..Default::default()
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn discount(&self) -> Option<&DiscountConfig> {
        self.discount.as_ref()
    }

    pub fn saved_customer(&self) -> Option<&Customer> {
        self.saved_customer.as_ref()
    }

    /// Walk-in name, phone and email as typed.
    pub fn contact(&self) -> &CustomerDetails {
        &self.contact
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn inventory(&self) -> &ProductCache {
        &self.inventory
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Who the sale is for. A saved customer wins over the walk-in fields.
    pub fn customer_details(&self) -> CustomerDetails {
        match &self.saved_customer {
            Some(customer) => CustomerDetails {
                customer_id: Some(customer.id.clone()),
                name: Some(customer.name.clone()),
                phone: customer.phone.clone(),
                email: customer.email.clone(),
            },
            None => self.contact.clone(),
        }
    }

    pub fn totals(&self, tax_rate: TaxRate) -> CartTotals {
        calculate_totals(self.cart.items(), self.discount.as_ref(), tax_rate)
    }

    /// Borrowed view used to build the sale request.
    pub(crate) fn sale_input<'a>(
        &'a self,
        customer: &'a CustomerDetails,
        tax_rate: TaxRate,
        sold_by: &'a str,
        sold_at: DateTime<Utc>,
    ) -> SaleInput<'a> {
        SaleInput {
            cart: &self.cart,
            discount: self.discount.as_ref(),
            tax_rate,
            customer,
            payment_method: self.payment_method,
            sold_by,
            notes: self.notes.as_deref(),
            sold_at,
        }
    }

    /// Rejects cart edits while a sale is being processed.
    pub(crate) fn ensure_idle(&self) -> CheckoutResult<()> {
        if self.in_flight {
            Err(CheckoutError::SubmissionInProgress)
        } else {
            Ok(())
        }
    }

    /// Marks a submission as started. Returns false if one already is.
    pub(crate) fn begin_submission(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub(crate) fn finish_submission(&mut self) {
        self.in_flight = false;
    }

    /// Local state transition after the sale service accepted a sale.
    ///
    /// `sold` is the cart as it was submitted. The typed walk-in contact is
    /// always cleared; the saved customer selection and the payment method
    /// stay for the next sale.
    pub(crate) fn complete_sale(&mut self, sold: &[CartLineItem]) -> usize {
        let patched = self.inventory.apply_sale(sold);
        self.cart.clear();
        self.discount = None;
        self.notes = None;
        self.contact = CustomerDetails::default();
        patched
    }

    pub fn snapshot(&self, tax_rate: TaxRate) -> SessionSnapshot {
        SessionSnapshot {
            items: self.cart.items().to_vec(),
            totals: self.totals(tax_rate),
            discount: self.discount,
            customer: self.customer_details(),
            payment_method: self.payment_method,
            notes: self.notes.clone(),
            submitting: self.in_flight,
        }
    }
}

/// What the checkout screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    pub discount: Option<DiscountConfig>,
    pub customer: CustomerDetails,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub submitting: bool,
}

// =============================================================================
// Shared State
// =============================================================================

/// Shared handle to a [`PosSession`].
///
/// A poisoned lock is recovered rather than propagated: every mutation
/// leaves the session consistent before it can panic.
#[derive(Debug, Clone, Default)]
pub struct CheckoutState {
    session: Arc<Mutex<PosSession>>,
}

impl CheckoutState {
    pub fn new(session: PosSession) -> Self {
        CheckoutState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs `f` with read access to the session.
    ///
    /// ```rust
    /// use lats_checkout::state::{CheckoutState, PosSession};
    ///
    /// let state = CheckoutState::new(PosSession::default());
    /// assert!(state.with_session(|s| s.cart().is_empty()));
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PosSession) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Runs `f` with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PosSession) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }
}
