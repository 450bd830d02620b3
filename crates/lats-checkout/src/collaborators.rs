//! # Collaborators
//!
//! The two services checkout depends on but does not own.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout                                                               │
//! │     │                                                                   │
//! │     ├── CatalogLookup::get_product(id)     product + variants + stock   │
//! │     │                                                                   │
//! │     └── SaleProcessor::process_sale(req)   SaleRecord | error message   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implement these traits to plug in a different backend or a test double.
//! `lats_db::Database` implements both (see [`crate::adapters`]).

use async_trait::async_trait;
use thiserror::Error;

use lats_core::{ProcessSaleResponse, Product, SaleRecord, SaleRequest};

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// The collaborator processed the request and said no. The message is
    /// shown to the operator as-is.
    #[error("{0}")]
    Rejected(String),

    /// The collaborator could not be reached or failed internally.
    #[error("{0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// Message shown to the operator.
    pub fn message(&self) -> &str {
        match self {
            CollaboratorError::Rejected(msg) | CollaboratorError::Unavailable(msg) => msg,
        }
    }
}

/// Converts the `{ success, sale?, error? }` envelope into a result.
pub fn sale_from_response(response: ProcessSaleResponse) -> Result<SaleRecord, CollaboratorError> {
    response.into_result().map_err(CollaboratorError::Rejected)
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Fetches a product with all of its variants and current stock.
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, CollaboratorError>;
}

/// The service that persists a sale and settles stock.
#[async_trait]
pub trait SaleProcessor: Send + Sync {
    async fn process_sale(&self, request: &SaleRequest) -> Result<SaleRecord, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_conversion() {
        let sale = SaleRecord {
            sale_number: "S-1".into(),
            ..Default::default()
        };
        let ok = sale_from_response(ProcessSaleResponse::ok(sale));
        assert_eq!(ok.unwrap().sale_number, "S-1");

        let failed =
            sale_from_response(ProcessSaleResponse::failed("Insufficient stock for Case (Black)"));
        assert_eq!(
            failed.unwrap_err(),
            CollaboratorError::Rejected("Insufficient stock for Case (Black)".into())
        );
    }
}
