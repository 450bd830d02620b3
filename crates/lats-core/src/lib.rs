//! # lats-core: Pure Checkout Logic for LATS POS
//!
//! Everything the POS screen needs to turn a basket of product variants into a
//! priced, submittable sale, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LATS POS Checkout Flow                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 lats-checkout (controller)                      │   │
//! │  │   add_to_cart ─► change_variant ─► set_discount ─► submit_sale  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lats-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │   cart   │ │ pricing  │ │       sale       │  │   │
//! │  │   │  Money   │ │   Cart   │ │ Discount │ │  SaleRequest     │  │   │
//! │  │   │ TaxRate  │ │ LineItem │ │ Totals   │ │  readiness rules │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              lats-db (catalog + sale store, SQLite)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money in the smallest currency unit
//! - [`types`] - Catalog, customer, payment and sale record types
//! - [`cart`] - Cart line items and the deduplicating cart
//! - [`pricing`] - Discount configuration and the totals calculator
//! - [`inventory`] - Per-session catalog cache with optimistic stock patches
//! - [`sale`] - Sale request assembly and readiness checks
//! - [`validation`] - Input validation at the mutation boundary
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use lats_core::money::Money;
//! use lats_core::pricing::{calculate_totals, DiscountConfig};
//! use lats_core::types::TaxRate;
//!
//! let discount = DiscountConfig::fixed(Money::from_minor(1000));
//! let totals = calculate_totals(&[], Some(&discount), TaxRate::from_bps(1600));
//!
//! // Empty cart: every derived value is zero.
//! assert!(totals.total.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod inventory;
pub mod money;
pub mod pricing;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem};
pub use error::{CoreError, CoreResult, SaleError, StockShortfall, ValidationError};
pub use inventory::ProductCache;
pub use money::Money;
pub use pricing::{calculate_totals, CartTotals, DiscountConfig, DiscountKind};
pub use sale::{
    check_ready, prepare_sale, CustomerDetails, SaleInput, SaleRequest, SaleRequestItem,
    WALK_IN_CUSTOMER_NAME,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default VAT rate in basis points (16%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1600;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches keying mistakes (1000 typed instead of 10) before they reach
/// the stock check.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Currency spend that earns one loyalty point, in the smallest currency unit.
pub const LOYALTY_POINT_SPEND: i64 = 1000;
