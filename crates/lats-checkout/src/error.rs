//! # Checkout Errors
//!
//! Error types for the checkout controller and the serialisable form the UI
//! turns into an operator notification.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in LATS POS                               │
//! │                                                                         │
//! │  Checkout operation                                                     │
//! │  Result<T, CheckoutError>                                               │
//! │         │                                                               │
//! │         ├── CoreError    (cart / validation)    ──┐                    │
//! │         ├── SaleError    (readiness, processing) ─┼──► ApiError ──► UI │
//! │         ├── Collaborator (catalog unreachable)   ─┤   { code, message } │
//! │         ├── SubmissionInProgress                 ─┤                    │
//! │         └── Config / Database (startup)          ─┘                    │
//! │                                                                         │
//! │  UI:  toast(e.message)   switch (e.code) { ... }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::collaborators::CollaboratorError;
use crate::state::ConfigError;
use lats_core::{CoreError, SaleError, ValidationError};
use lats_db::DbError;

/// Errors returned by [`crate::Checkout`] operations.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sale(#[from] SaleError),

    /// The catalog collaborator failed.
    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),

    /// The cart is frozen while a sale is being processed.
    #[error("A sale is already being processed")]
    SubmissionInProgress,

    #[error("Discounts are disabled for this store")]
    DiscountsDisabled,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// API Error
// =============================================================================

/// Error as delivered to the UI.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock: iPhone 13 (128GB) requested 3, available 1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable message for the operator
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    CartError,
    EmptyCart,
    InsufficientStock,
    MissingCustomer,
    MissingPaymentMethod,
    /// The sale-processing service rejected or failed the sale.
    SaleFailed,
    /// A submission is already in flight.
    Busy,
    /// A collaborator could not be reached.
    Unavailable,
    ConfigError,
    DatabaseError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_)
            | CoreError::VariantNotFound { .. }
            | CoreError::ItemNotFound(_) => ErrorCode::NotFound,
            CoreError::ProductMismatch { .. } | CoreError::CartTooLarge { .. } => {
                ErrorCode::CartError
            }
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        let code = match &err {
            SaleError::EmptyCart => ErrorCode::EmptyCart,
            SaleError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            SaleError::MissingCustomer => ErrorCode::MissingCustomer,
            SaleError::MissingPaymentMethod => ErrorCode::MissingPaymentMethod,
            SaleError::Processing(_) => ErrorCode::SaleFailed,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Core(e) => e.into(),
            CheckoutError::Sale(e) => e.into(),
            CheckoutError::Collaborator(e) => {
                error!("Collaborator failed: {}", e);
                ApiError::new(ErrorCode::Unavailable, e.message())
            }
            CheckoutError::SubmissionInProgress => {
                ApiError::new(ErrorCode::Busy, CheckoutError::SubmissionInProgress.to_string())
            }
            CheckoutError::DiscountsDisabled => ApiError::new(
                ErrorCode::ValidationError,
                CheckoutError::DiscountsDisabled.to_string(),
            ),
            CheckoutError::Config(e) => ApiError::new(ErrorCode::ConfigError, e.to_string()),
            CheckoutError::Database(e) => {
                error!("Database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lats_core::StockShortfall;

    #[test]
    fn test_sale_errors_map_to_codes() {
        let api: ApiError = CheckoutError::from(SaleError::EmptyCart).into();
        assert_eq!(api.code, ErrorCode::EmptyCart);
        assert_eq!(api.message, "Cart is empty");

        let api: ApiError = SaleError::InsufficientStock {
            items: vec![StockShortfall {
                item_id: "p1:v1".into(),
                product_name: "iPhone 13".into(),
                variant_name: "128GB".into(),
                requested: 3,
                available: 1,
            }],
        }
        .into();
        assert_eq!(api.code, ErrorCode::InsufficientStock);
        assert!(api.message.contains("iPhone 13 (128GB)"));
    }

    #[test]
    fn test_processing_message_is_verbatim() {
        let api: ApiError =
            CheckoutError::from(SaleError::Processing("Payment gateway timeout".into())).into();
        assert_eq!(api.code, ErrorCode::SaleFailed);
        assert_eq!(api.message, "Payment gateway timeout");
    }

    #[test]
    fn test_serialized_shape() {
        let api = ApiError::from(CheckoutError::SubmissionInProgress);
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "BUSY");
        assert_eq!(json["message"], "A sale is already being processed");
    }
}
