//! # SQLite Collaborators
//!
//! `lats_db::Database` as the catalog and the sale processor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout<Database, Database>                                           │
//! │       │                                                                 │
//! │       ├── get_product ──► ProductRepository::get_by_id                  │
//! │       └── process_sale ─► SaleRepository::process_sale (one transaction)│
//! │                                                                         │
//! │  DbError::SaleRejected / NotFound / Validation ──► Rejected (verbatim)  │
//! │  anything else                                 ──► Unavailable          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use tracing::{error, info};

use crate::collaborators::{CatalogLookup, CollaboratorError, SaleProcessor};
use crate::error::CheckoutResult;
use crate::state::{ConfigError, PosConfig};
use lats_core::{Product, SaleRecord, SaleRequest};
use lats_db::{Database, DbConfig, DbError};

impl From<DbError> for CollaboratorError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::SaleRejected(_) | DbError::NotFound { .. } | DbError::Validation(_) => {
                CollaboratorError::Rejected(err.to_string())
            }
            other => {
                error!(error = %other, "Database collaborator failed");
                CollaboratorError::Unavailable(other.to_string())
            }
        }
    }
}

#[async_trait]
impl CatalogLookup for Database {
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, CollaboratorError> {
        Ok(self.products().get_by_id(product_id).await?)
    }
}

#[async_trait]
impl SaleProcessor for Database {
    async fn process_sale(&self, request: &SaleRequest) -> Result<SaleRecord, CollaboratorError> {
        Ok(self.sales().process_sale(request).await?)
    }
}

/// Opens the store database named by the config, creating its directory.
pub async fn connect(config: &PosConfig) -> CheckoutResult<Database> {
    let path = config
        .resolved_database_path()
        .ok_or_else(|| ConfigError::Invalid {
            key: "database_path".to_string(),
            reason: "could not determine app data directory".to_string(),
        })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(ConfigError::from)?;
    }

    info!(path = %path.display(), "Opening store database");
    let db = Database::new(DbConfig::new(path)).await?;
    Ok(db.with_business_info(config.business_info()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::test_support::{product, variant};
    use crate::checkout::{Checkout, SubmitOutcome};
    use crate::error::CheckoutError;
    use lats_core::{PaymentMethod, ReceiptContent, SaleError};

    async fn store() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&product(
                "ip13",
                "iPhone 13",
                vec![variant("ip13", "ip13-128", "128GB", 100_000, 5)],
            ))
            .await
            .unwrap();
        db
    }

    fn till(db: &Database) -> Checkout<Database, Database> {
        let checkout = Checkout::new(db.clone(), db.clone(), PosConfig::default());
        checkout.set_walk_in_contact("Juma", None, None).unwrap();
        checkout.set_payment_method(Some(PaymentMethod::MobileMoney)).unwrap();
        checkout
    }

    #[test]
    fn test_db_error_classification() {
        let rejected: CollaboratorError = DbError::SaleRejected("Sale has no items".into()).into();
        assert_eq!(rejected, CollaboratorError::Rejected("Sale has no items".into()));

        let down: CollaboratorError = DbError::PoolExhausted.into();
        assert!(matches!(down, CollaboratorError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_sale_against_sqlite() {
        let db = store().await;
        let checkout = till(&db);
        checkout.add_to_cart("ip13", "ip13-128", 2).await.unwrap();

        let outcome = checkout.submit_sale().await.unwrap();
        let record = match outcome {
            SubmitOutcome::Completed(record) => record,
            other => panic!("expected Completed, got {:?}", other),
        };
        assert!(record.sale_number.starts_with("SALE-"));
        assert_eq!(record.customer_name, "Juma");

        let stored = db.products().variant("ip13-128").await.unwrap().unwrap();
        assert_eq!(stored.quantity, 3);
        let cached = checkout
            .state()
            .with_session(|s| s.inventory().variant("ip13", "ip13-128").map(|v| v.quantity));
        assert_eq!(cached, Some(3));

        let recent = db.sales().recent(5).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].sale_number, record.sale_number);
    }

    #[tokio::test]
    async fn test_stale_stock_rejected_by_store() {
        let db = store().await;
        let checkout = till(&db);
        checkout.add_to_cart("ip13", "ip13-128", 2).await.unwrap();

        // another till sold four since this session cached the product
        db.products()
            .adjust_stock("ip13-128", -4, "Sold elsewhere", "till-2")
            .await
            .unwrap();

        let err = checkout.submit_sale().await.unwrap_err();
        match err {
            CheckoutError::Sale(SaleError::Processing(message)) => assert_eq!(
                message,
                "Insufficient stock for iPhone 13 (128GB). Available: 1, Requested: 2"
            ),
            other => panic!("expected Processing, got {:?}", other),
        }
        assert_eq!(checkout.snapshot().items.len(), 1);

        assert_eq!(checkout.reload_inventory().await.unwrap(), 1);
        let cached = checkout
            .state()
            .with_session(|s| s.inventory().variant("ip13", "ip13-128").map(|v| v.quantity));
        assert_eq!(cached, Some(1));
    }

    #[tokio::test]
    async fn test_receipt_uses_store_settings() {
        let config = PosConfig {
            store_name: "LATS Kariakoo".to_string(),
            receipt_footer: Some("Karibu tena".to_string()),
            ..Default::default()
        };
        let db = store().await.with_business_info(config.business_info());
        assert_eq!(db.business_info().name, "LATS Kariakoo");

        let checkout = till(&db);
        checkout.add_to_cart("ip13", "ip13-128", 1).await.unwrap();
        let record = match checkout.submit_sale().await.unwrap() {
            SubmitOutcome::Completed(record) => record,
            other => panic!("expected Completed, got {:?}", other),
        };

        let receipt = db.sales().receipt_for(&record.id).await.unwrap().unwrap();
        let content: ReceiptContent = serde_json::from_str(&receipt.content).unwrap();
        assert_eq!(content.business_info, config.business_info());
        assert_eq!(content.business_info.footer.as_deref(), Some("Karibu tena"));
        assert_eq!(content.sale.sale_number, record.sale_number);
    }

    #[tokio::test]
    async fn test_connect_creates_directory() {
        let dir = std::env::temp_dir().join(format!("lats-connect-{}", std::process::id()));
        let config = PosConfig {
            database_path: Some(dir.join("nested").join("lats.db")),
            ..Default::default()
        };

        let db = connect(&config).await.unwrap();
        assert!(db.health_check().await);
        assert_eq!(db.business_info(), &config.business_info());
        db.close().await;

        let _ = std::fs::remove_dir_all(&dir);
    }
}
