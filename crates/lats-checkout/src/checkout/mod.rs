//! # Checkout Controller
//!
//! The operations behind the POS checkout screen.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen Action            Checkout Method           Session Change      │
//! │  ─────────────            ───────────────           ──────────────      │
//! │                                                                         │
//! │  Tap product ───────────► add_to_cart() ──────────► line added/merged   │
//! │  Pick storage/colour ───► change_variant() ───────► line re-keyed       │
//! │  +/- quantity ──────────► update_quantity() ──────► qty set, 0 removes  │
//! │  Trash icon ────────────► remove_item()                                 │
//! │  Discount field ────────► set_discount() ─────────► parsed, validated   │
//! │  Customer picker ───────► select_customer() / set_walk_in_contact()     │
//! │  Payment buttons ───────► set_payment_method()                          │
//! │  Complete sale ─────────► submit_sale() ──────────► SaleProcessor       │
//! │  Refresh ───────────────► reload_inventory() ─────► CatalogLookup       │
//! │                                                                         │
//! │  Every mutation is refused with SubmissionInProgress while a sale is    │
//! │  being processed.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod customer;
mod sale;

pub use sale::SubmitOutcome;

use tracing::debug;

use crate::collaborators::{CatalogLookup, SaleProcessor};
use crate::error::CheckoutResult;
use crate::state::{CheckoutState, PosConfig, PosSession, SessionSnapshot};
use lats_core::{CartTotals, CoreError, Product};

/// Checkout controller for one operator session.
///
/// Generic over its collaborators so tests can inject doubles and the app
/// can inject `lats_db::Database`.
pub struct Checkout<C, P> {
    catalog: C,
    processor: P,
    config: PosConfig,
    state: CheckoutState,
}

impl<C, P> Checkout<C, P>
where
    C: CatalogLookup,
    P: SaleProcessor,
{
    /// Starts a fresh session with the configured default payment method.
    pub fn new(catalog: C, processor: P, config: PosConfig) -> Self {
        let session = PosSession::new(config.default_payment_method);
        Self::with_state(catalog, processor, config, CheckoutState::new(session))
    }

    /// Attaches to an existing session.
    pub fn with_state(catalog: C, processor: P, config: PosConfig, state: CheckoutState) -> Self {
        Checkout {
            catalog,
            processor,
            config,
            state,
        }
    }

    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Current totals under the configured VAT.
    pub fn totals(&self) -> CartTotals {
        let tax_rate = self.config.tax_rate();
        self.state.with_session(|s| s.totals(tax_rate))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let tax_rate = self.config.tax_rate();
        self.state.with_session(|s| s.snapshot(tax_rate))
    }

    /// Product as the session knows it: the cached copy if present,
    /// otherwise fetched from the catalog and cached.
    async fn product(&self, product_id: &str) -> CheckoutResult<Product> {
        if let Some(product) = self
            .state
            .with_session(|s| s.inventory().get(product_id).cloned())
        {
            return Ok(product);
        }

        debug!(product_id = %product_id, "Product not cached, fetching from catalog");
        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        self.state
            .with_session_mut(|s| s.inventory.upsert(product.clone()));
        Ok(product)
    }
}

// =============================================================================
// Test Support
// =============================================================================
