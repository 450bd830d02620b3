//! # Error Types
//!
//! Domain-specific error types for lats-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lats-core errors (this file)                                          │
//! │  ├── CoreError        - Cart and catalog rule violations               │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── SaleError        - Why a sale could not be submitted              │
//! │                                                                         │
//! │  lats-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  lats-checkout errors                                                  │
//! │  ├── CheckoutError    - Everything a checkout operation can return     │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError → UI     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and catalog rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product exists but has no variant with this id.
    #[error("Variant {variant_id} not found on product {product_id}")]
    VariantNotFound {
        product_id: String,
        variant_id: String,
    },

    /// No cart line has this id.
    #[error("Cart item not found: {0}")]
    ItemNotFound(String),

    /// A variant switch was attempted with a different product than the line holds.
    ///
    /// ```text
    /// line "p1:v1"  +  change_variant(product = p2, ...)
    ///      │
    ///      ▼
    /// ProductMismatch { item_id: "p1:v1", product_id: "p2" }
    /// ```
    #[error("Cart item {item_id} does not belong to product {product_id}")]
    ProductMismatch { item_id: String, product_id: String },

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g. "12,5" where a decimal is expected).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Sale Error
// =============================================================================

/// A cart line whose quantity exceeds the stock seen when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockShortfall {
    pub item_id: String,
    pub product_name: String,
    pub variant_name: String,
    pub requested: i64,
    pub available: i64,
}

/// Why a sale could not be submitted.
///
/// ## Submission Checks (in order)
/// ```text
/// submit_sale()
///      │
///      ├── no lines?                 → EmptyCart
///      ├── qty > available anywhere? → InsufficientStock { items }
///      ├── no customer identity?     → MissingCustomer
///      ├── no payment method?        → MissingPaymentMethod
///      │
///      ▼
/// sale-processing collaborator
///      │
///      └── reported failure          → Processing(message as given)
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SaleError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock: {}", describe_shortfalls(.items))]
    InsufficientStock { items: Vec<StockShortfall> },

    #[error("Please select a customer or enter a customer name")]
    MissingCustomer,

    #[error("Please select a payment method")]
    MissingPaymentMethod,

    /// The collaborator's own message, passed through unchanged.
    #[error("{0}")]
    Processing(String),
}

fn describe_shortfalls(items: &[StockShortfall]) -> String {
    items
        .iter()
        .map(|s| {
            format!(
                "{} ({}) requested {}, available {}",
                s.product_name, s.variant_name, s.requested, s.available
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_names_items() {
        let err = SaleError::InsufficientStock {
            items: vec![
                StockShortfall {
                    item_id: "p1:v1".into(),
                    product_name: "iPhone 13".into(),
                    variant_name: "128GB".into(),
                    requested: 10,
                    available: 5,
                },
                StockShortfall {
                    item_id: "p2:v9".into(),
                    product_name: "Charger".into(),
                    variant_name: "USB-C".into(),
                    requested: 3,
                    available: 0,
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock: iPhone 13 (128GB) requested 10, available 5; \
             Charger (USB-C) requested 3, available 0"
        );
    }

    #[test]
    fn test_processing_message_is_verbatim() {
        let err = SaleError::Processing("Till session closed".into());
        assert_eq!(err.to_string(), "Till session closed");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: quantity must be positive");
    }
}
