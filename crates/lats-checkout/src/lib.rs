//! # lats-checkout: POS Checkout Controller
//!
//! The stateful half of the LATS POS checkout screen: one operator session,
//! its cart and selections, and the hand-off of a finished basket to the
//! sale-processing service.
//!
//! ## Module Organization
//! ```text
//! lats_checkout
//! ├── checkout       Checkout<C, P>: cart, discount, customer, submit_sale
//! │   ├── cart
//! │   ├── customer
//! │   └── sale       single-flight submission, inventory reload
//! ├── collaborators  CatalogLookup / SaleProcessor traits
//! ├── adapters       lats_db::Database as both collaborators
//! ├── state          PosSession, CheckoutState, PosConfig
//! └── error          CheckoutError, ApiError
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lats_checkout::{adapters, Checkout, PosConfig, SubmitOutcome};
//!
//! let config = PosConfig::load(None)?;
//! let db = adapters::connect(&config).await?;
//! let checkout = Checkout::new(db.clone(), db, config);
//!
//! checkout.add_to_cart(&product_id, &variant_id, 1).await?;
//! checkout.set_walk_in_contact("Juma", Some("0754 111 222"), None)?;
//! checkout.set_payment_method(Some(PaymentMethod::Cash))?;
//!
//! if let SubmitOutcome::Completed(sale) = checkout.submit_sale().await? {
//!     println!("Sold {}", sale.sale_number);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapters;
pub mod checkout;
pub mod collaborators;
pub mod error;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{Checkout, SubmitOutcome};
pub use collaborators::{CatalogLookup, CollaboratorError, SaleProcessor};
pub use error::{ApiError, CheckoutError, CheckoutResult, ErrorCode};
pub use state::{CheckoutState, ConfigError, PosConfig, PosSession, SessionSnapshot};
