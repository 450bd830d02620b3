//! # Sale Repository
//!
//! The local sale-processing pipeline and sale history.
//!
//! ## process_sale: One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. each line: variant exists? stock >= qty?  ── no ──► ROLLBACK       │
//! │                 cost_price, profit = total − cost × qty                 │
//! │   2. saved customer exists?                     ── no ──► ROLLBACK       │
//! │   3. sale number  SALE-{last 8 ms digits}-{4 alnum}                     │
//! │   4. INSERT sales, sale_items                                           │
//! │   5. UPDATE variant stock (floored at 0), INSERT stock_movements        │
//! │   6. saved customer: total_spent, total_orders, loyalty points,         │
//! │      last_visit                                                         │
//! │   7. INSERT receipts  RCP-{sale_number}, business info + sale as JSON   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either the whole sale lands or nothing does.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use crate::repository::product::record_movement;
use lats_core::{
    BusinessInfo, Money, MovementType, PaymentMethod, PaymentStatus, Receipt, ReceiptContent,
    SaleRecord, SaleRecordItem, SaleRequest, StockMovement, LOYALTY_POINT_SPEND,
    WALK_IN_CUSTOMER_NAME,
};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    sale_number: String,
    customer_id: Option<String>,
    customer_name: String,
    subtotal: i64,
    discount: i64,
    tax: i64,
    total: i64,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    sold_by: String,
    sold_at: DateTime<Utc>,
    notes: Option<String>,
}

impl SaleRow {
    fn into_record(self, items: Vec<SaleRecordItem>) -> SaleRecord {
        SaleRecord {
            id: self.id,
            sale_number: self.sale_number,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            items,
            subtotal: Money::from_minor(self.subtotal),
            discount: Money::from_minor(self.discount),
            tax: Money::from_minor(self.tax),
            total: Money::from_minor(self.total),
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            sold_by: self.sold_by,
            sold_at: self.sold_at,
            notes: self.notes,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    id: String,
    product_id: String,
    variant_id: String,
    product_name: String,
    variant_name: String,
    sku: String,
    quantity: i64,
    unit_price: i64,
    total_price: i64,
    cost_price: i64,
    profit: i64,
}

impl From<SaleItemRow> for SaleRecordItem {
    fn from(row: SaleItemRow) -> Self {
        SaleRecordItem {
            id: row.id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            product_name: row.product_name,
            variant_name: row.variant_name,
            sku: row.sku,
            quantity: row.quantity,
            unit_price: Money::from_minor(row.unit_price),
            total_price: Money::from_minor(row.total_price),
            cost_price: Money::from_minor(row.cost_price),
            profit: Money::from_minor(row.profit),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    id: String,
    sale_id: String,
    receipt_number: String,
    customer_name: String,
    customer_phone: Option<String>,
    total: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        Receipt {
            id: row.id,
            sale_id: row.sale_id,
            receipt_number: row.receipt_number,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            total: Money::from_minor(row.total),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

const SALE_SELECT: &str = r#"
    SELECT id, sale_number, customer_id, customer_name, subtotal, discount, tax,
           total, payment_method, payment_status, sold_by, sold_at, notes
    FROM sales
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    business: Arc<BusinessInfo>,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository {
            pool,
            business: Arc::default(),
        }
    }

    /// Store details written into every receipt this repository issues.
    pub fn with_business_info(mut self, business: Arc<BusinessInfo>) -> Self {
        self.business = business;
        self
    }

    /// Persists a sale and everything that follows from it.
    ///
    /// ## Errors
    /// - `SaleRejected("Product variant not found: {product}")`
    /// - `SaleRejected("Insufficient stock for {product} ({variant}). Available: a, Requested: r")`
    /// - `NotFound` for an unknown saved customer
    ///
    /// Nothing is written when any step fails.
    pub async fn process_sale(&self, request: &SaleRequest) -> DbResult<SaleRecord> {
        if request.items.is_empty() {
            return Err(DbError::SaleRejected("Sale has no items".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        // 1. Stock and cost for every line. A variant listed twice is
        //    checked against what the earlier lines left.
        let mut items = Vec::with_capacity(request.items.len());
        let mut stock_before = Vec::with_capacity(request.items.len());
        let mut remaining: HashMap<&str, i64> = HashMap::new();
        for item in &request.items {
            let row: Option<(i64, i64)> = sqlx::query_as(
                "SELECT quantity, cost_price FROM product_variants WHERE id = ?1 AND product_id = ?2",
            )
            .bind(&item.variant_id)
            .bind(&item.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some((stored, cost)) = row else {
                warn!(variant_id = %item.variant_id, "Sale references unknown variant");
                return Err(DbError::SaleRejected(format!(
                    "Product variant not found: {}",
                    item.product_name
                )));
            };
            let available = remaining.get(item.variant_id.as_str()).copied().unwrap_or(stored);

            if available < item.quantity {
                warn!(variant_id = %item.variant_id, available, requested = item.quantity, "Sale exceeds stock");
                return Err(DbError::SaleRejected(format!(
                    "Insufficient stock for {} ({}). Available: {}, Requested: {}",
                    item.product_name, item.variant_name, available, item.quantity
                )));
            }

            let cost_price = Money::from_minor(cost);
            items.push(SaleRecordItem {
                id: generate_id(),
                product_id: item.product_id.clone(),
                variant_id: item.variant_id.clone(),
                product_name: item.product_name.clone(),
                variant_name: item.variant_name.clone(),
                sku: item.sku.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total_price,
                cost_price,
                profit: item.total_price - cost_price.multiply_quantity(item.quantity),
            });
            stock_before.push(available);
            remaining.insert(item.variant_id.as_str(), available - item.quantity);
        }

        // 2. Saved customer
        if let Some(customer_id) = &request.customer_id {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;
            if exists == 0 {
                return Err(DbError::not_found("Customer", customer_id.as_str()));
            }
        }

        // 3. Sale number
        let now = Utc::now();
        let record = SaleRecord {
            id: generate_id(),
            sale_number: generate_sale_number(now),
            customer_id: request.customer_id.clone(),
            customer_name: receipt_name(&request.customer_name),
            items,
            subtotal: request.subtotal,
            discount: request.discount,
            tax: request.tax,
            total: request.total,
            payment_method: request.payment_method,
            payment_status: request.payment_status,
            sold_by: request.sold_by.clone(),
            sold_at: request.sold_at,
            notes: request.notes.clone(),
        };

        debug!(sale_number = %record.sale_number, items = record.items.len(), "Inserting sale");

        // 4. Sale and lines
        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, customer_id, customer_name, customer_phone, customer_email,
                subtotal, discount, discount_type, tax, total,
                payment_method, payment_status, sold_by, sold_at, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&record.id)
        .bind(&record.sale_number)
        .bind(&record.customer_id)
        .bind(&record.customer_name)
        .bind(&request.customer_phone)
        .bind(&request.customer_email)
        .bind(record.subtotal.minor())
        .bind(record.discount.minor())
        .bind(request.discount_config.map(|d| d.to_string()))
        .bind(record.tax.minor())
        .bind(record.total.minor())
        .bind(record.payment_method)
        .bind(record.payment_status)
        .bind(&record.sold_by)
        .bind(record.sold_at)
        .bind(&record.notes)
        .execute(&mut *tx)
        .await?;

        for (position, item) in record.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, variant_id, product_name, variant_name, sku,
                    quantity, unit_price, total_price, cost_price, profit, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )
            .bind(&item.id)
            .bind(&record.id)
            .bind(&item.product_id)
            .bind(&item.variant_id)
            .bind(&item.product_name)
            .bind(&item.variant_name)
            .bind(&item.sku)
            .bind(item.quantity)
            .bind(item.unit_price.minor())
            .bind(item.total_price.minor())
            .bind(item.cost_price.minor())
            .bind(item.profit.minor())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        // 5. Stock and movements
        for (item, previous) in record.items.iter().zip(stock_before) {
            let new_quantity = (previous - item.quantity).max(0);
            sqlx::query("UPDATE product_variants SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(&item.variant_id)
                .bind(new_quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;

            let movement = StockMovement {
                id: generate_id(),
                product_id: item.product_id.clone(),
                variant_id: item.variant_id.clone(),
                movement_type: MovementType::Out,
                quantity: item.quantity,
                previous_quantity: previous,
                new_quantity,
                reason: "Sale".to_string(),
                reference: Some(record.sale_number.clone()),
                created_by: record.sold_by.clone(),
                created_at: now,
            };
            record_movement(&mut *tx, &movement).await?;
        }

        // 6. Loyalty
        if let Some(customer_id) = &record.customer_id {
            let points = record.total.minor().max(0) / LOYALTY_POINT_SPEND;
            sqlx::query(
                r#"
                UPDATE customers
                SET total_spent = total_spent + ?2,
                    total_orders = total_orders + 1,
                    loyalty_points = loyalty_points + ?3,
                    last_visit = ?4
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(record.total.minor())
            .bind(points)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // 7. Receipt
        let content = serde_json::to_string(&ReceiptContent {
            business_info: BusinessInfo::clone(&self.business),
            sale: record.clone(),
        })?;
        sqlx::query(
            r#"
            INSERT INTO receipts (
                id, sale_id, receipt_number, customer_name, customer_phone, total, content, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(generate_id())
        .bind(&record.id)
        .bind(format!("RCP-{}", record.sale_number))
        .bind(&record.customer_name)
        .bind(&request.customer_phone)
        .bind(record.total.minor())
        .bind(content)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            sale_number = %record.sale_number,
            total = record.total.minor(),
            items = record.items.len(),
            "Sale processed"
        );
        Ok(record)
    }

    /// Gets a sale with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let sql = format!("{} WHERE id = ?1", SALE_SELECT);
        let row: Option<SaleRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.items_for(&row.id).await?;
                Ok(Some(row.into_record(items)))
            }
            None => Ok(None),
        }
    }

    /// Most recent sales first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<SaleRecord>> {
        let sql = format!("{} ORDER BY sold_at DESC, rowid DESC LIMIT ?1", SALE_SELECT);
        let rows: Vec<SaleRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(&row.id).await?;
            sales.push(row.into_record(items));
        }
        Ok(sales)
    }

    /// The receipt stored for a sale.
    pub async fn receipt_for(&self, sale_id: &str) -> DbResult<Option<Receipt>> {
        let row: Option<ReceiptRow> = sqlx::query_as(
            r#"
            SELECT id, sale_id, receipt_number, customer_name, customer_phone,
                   total, content, created_at
            FROM receipts
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Receipt::from))
    }

    async fn items_for(&self, sale_id: &str) -> DbResult<Vec<SaleRecordItem>> {
        let rows: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, variant_id, product_name, variant_name, sku,
                   quantity, unit_price, total_price, cost_price, profit
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleRecordItem::from).collect())
    }
}

/// `SALE-{last 8 digits of the ms timestamp}-{4 uppercase alphanumerics}`
fn generate_sale_number(now: DateTime<Utc>) -> String {
    let timestamp = now.timestamp_millis().rem_euclid(100_000_000);
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();
    format!("SALE-{:08}-{}", timestamp, suffix)
}

fn receipt_name(customer_name: &str) -> String {
    let name = customer_name.trim();
    if name.is_empty() {
        WALK_IN_CUSTOMER_NAME.to_string()
    } else {
        name.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::fixtures::{product, variant};
    use crate::{Database, DbConfig};
    use lats_core::{prepare_sale, Cart, CustomerDetails, SaleInput, TaxRate};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&product(
                "p1",
                "iPhone 13",
                vec![
                    variant("p1", "v1", "IP13-128", 10_000, 6_000, 5),
                    variant("p1", "v2", "IP13-256", 12_000, 7_000, 1),
                ],
            ))
            .await
            .unwrap();
        db
    }

    async fn request_for(
        db: &Database,
        lines: &[(&str, i64)],
        customer: &CustomerDetails,
    ) -> SaleRequest {
        let p = db.products().get_by_id("p1").await.unwrap().unwrap();
        let mut cart = Cart::new();
        for (variant_id, qty) in lines {
            cart.add_item(&p, variant_id, *qty).unwrap();
        }
        prepare_sale(SaleInput {
            cart: &cart,
            discount: None,
            tax_rate: TaxRate::from_bps(1600),
            customer,
            payment_method: Some(PaymentMethod::Cash),
            sold_by: "cashier-1",
            notes: None,
            sold_at: Utc::now(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_process_sale_persists_everything() {
        let db = seeded().await;
        let customer = db
            .customers()
            .insert("Amina", Some("0712000111"), None)
            .await
            .unwrap();
        let details = CustomerDetails {
            customer_id: Some(customer.id.clone()),
            name: Some(customer.name.clone()),
            phone: customer.phone.clone(),
            email: None,
        };
        let request = request_for(&db, &[("v1", 2)], &details).await;

        let record = db.sales().process_sale(&request).await.unwrap();

        assert!(record.sale_number.starts_with("SALE-"));
        assert_eq!(record.total.minor(), 23_200);
        assert_eq!(record.items[0].cost_price.minor(), 6_000);
        assert_eq!(record.items[0].profit.minor(), 8_000);

        // stock and movement
        let v1 = db.products().variant("v1").await.unwrap().unwrap();
        assert_eq!(v1.quantity, 3);
        let movements = db.products().stock_movements("v1").await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Out);
        assert_eq!(movements[0].previous_quantity, 5);
        assert_eq!(movements[0].new_quantity, 3);
        assert_eq!(movements[0].reference.as_deref(), Some(record.sale_number.as_str()));

        // loyalty: 23 200 / 1000 = 23 points
        let after = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(after.total_orders, 1);
        assert_eq!(after.total_spent.minor(), 23_200);
        assert_eq!(after.loyalty_points, 23);
        assert!(after.last_visit.is_some());

        // receipt
        let receipt = db.sales().receipt_for(&record.id).await.unwrap().unwrap();
        assert_eq!(receipt.receipt_number, format!("RCP-{}", record.sale_number));
        assert_eq!(receipt.customer_name, "Amina");
        let stored: ReceiptContent = serde_json::from_str(&receipt.content).unwrap();
        assert_eq!(stored.sale.sale_number, record.sale_number);
        assert_eq!(stored.business_info, BusinessInfo::default());

        // read back
        let loaded = db.sales().get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.payment_method, PaymentMethod::Cash);
        assert_eq!(loaded.profit().minor(), 8_000);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = seeded().await;
        let walk_in = CustomerDetails::walk_in("Juma", None, None);
        // v2 has 1 in stock; build the request while stock looked fine, then sell it elsewhere
        let request = request_for(&db, &[("v1", 1), ("v2", 1)], &walk_in).await;
        db.products().adjust_stock("v2", -1, "Damaged", "manager").await.unwrap();

        let err = db.sales().process_sale(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for iPhone 13 (Variant v2). Available: 0, Requested: 1"
        );

        assert_eq!(db.products().variant("v1").await.unwrap().unwrap().quantity, 5);
        assert!(db.sales().recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_variant_checked_against_running_stock() {
        let db = seeded().await;
        let walk_in = CustomerDetails::walk_in("Juma", None, None);

        // 3 + 3 against 5 in stock
        let mut request = request_for(&db, &[("v1", 3)], &walk_in).await;
        request.items.push(request.items[0].clone());
        let err = db.sales().process_sale(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for iPhone 13 (Variant v1). Available: 2, Requested: 3"
        );
        assert_eq!(db.products().variant("v1").await.unwrap().unwrap().quantity, 5);

        // 3 + 2 sells out exactly
        let mut request = request_for(&db, &[("v1", 3)], &walk_in).await;
        let mut second = request.items[0].clone();
        second.quantity = 2;
        request.items.push(second);
        db.sales().process_sale(&request).await.unwrap();

        assert_eq!(db.products().variant("v1").await.unwrap().unwrap().quantity, 0);
        let movements = db.products().stock_movements("v1").await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].new_quantity, 2);
        assert_eq!(movements[1].previous_quantity, 2);
        assert_eq!(movements[1].new_quantity, 0);
    }

    #[tokio::test]
    async fn test_receipt_carries_business_info() {
        let business = BusinessInfo {
            name: "LATS Mobile Shop".into(),
            currency_code: "TZS".into(),
            currency_symbol: "TSh".into(),
            header: Some("Kariakoo, Dar es Salaam".into()),
            footer: Some("Asante!".into()),
        };
        let db = seeded().await.with_business_info(business.clone());
        let walk_in = CustomerDetails::walk_in("Juma", None, None);
        let request = request_for(&db, &[("v2", 1)], &walk_in).await;

        let record = db.sales().process_sale(&request).await.unwrap();

        let receipt = db.sales().receipt_for(&record.id).await.unwrap().unwrap();
        let content: ReceiptContent = serde_json::from_str(&receipt.content).unwrap();
        assert_eq!(content.business_info, business);
        assert_eq!(content.sale.sale_number, record.sale_number);
        assert_eq!(content.sale.items, record.items);
    }

    #[tokio::test]
    async fn test_unknown_variant_rejected() {
        let db = seeded().await;
        let walk_in = CustomerDetails::walk_in("Juma", None, None);
        let mut request = request_for(&db, &[("v1", 1)], &walk_in).await;
        request.items[0].variant_id = "gone".into();

        let err = db.sales().process_sale(&request).await.unwrap_err();
        assert!(matches!(&err, DbError::SaleRejected(_)));
        assert_eq!(err.to_string(), "Product variant not found: iPhone 13");
    }

    #[tokio::test]
    async fn test_unknown_customer_rolls_back() {
        let db = seeded().await;
        let ghost = CustomerDetails {
            customer_id: Some("ghost".into()),
            ..Default::default()
        };
        let request = request_for(&db, &[("v1", 1)], &ghost).await;

        let err = db.sales().process_sale(&request).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.products().variant("v1").await.unwrap().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_walk_in_receipt_and_recent_order() {
        let db = seeded().await;
        let walk_in = CustomerDetails::default();
        let mut first = request_for(&db, &[("v1", 1)], &CustomerDetails::walk_in("A", None, None)).await;
        first.customer_name = String::new();
        let first = db.sales().process_sale(&first).await.unwrap();

        let mut second = request_for(&db, &[("v1", 1)], &CustomerDetails::walk_in("B", None, None)).await;
        second.sold_at = first.sold_at + chrono::Duration::seconds(5);
        let second = db.sales().process_sale(&second).await.unwrap();

        let receipt = db.sales().receipt_for(&first.id).await.unwrap().unwrap();
        assert_eq!(receipt.customer_name, WALK_IN_CUSTOMER_NAME);
        assert_eq!(walk_in.display_name(), WALK_IN_CUSTOMER_NAME);

        let recent = db.sales().recent(10).await.unwrap();
        let numbers: Vec<_> = recent.iter().map(|s| s.sale_number.clone()).collect();
        assert_eq!(numbers, vec![second.sale_number, first.sale_number]);
    }

    #[test]
    fn test_sale_number_format() {
        let now = DateTime::parse_from_rfc3339("2025-09-26T06:26:24.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let number = generate_sale_number(now);

        let parts: Vec<_> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SALE");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[1], format!("{:08}", now.timestamp_millis() % 100_000_000));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
