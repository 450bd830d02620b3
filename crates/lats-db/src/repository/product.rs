//! # Product Repository
//!
//! Catalog storage: products, their variants, and stock movements.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator types: "iph"                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%iph%' on products.name OR product_variants.sku                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  iPhone 13        [IP13-128, IP13-256]   ← name match                   │
//! │  Case Bundle      [IPH-CASE-01]          ← SKU match                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  active products, by name, each with all variants                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use lats_core::validation::{validate_name, validate_price, validate_search_query, validate_sku};
use lats_core::{Money, MovementType, Product, ProductVariant, StockMovement, ValidationError};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: Option<String>,
    category: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            is_active: self.is_active,
            variants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    sku: String,
    name: String,
    selling_price: i64,
    cost_price: i64,
    quantity: i64,
    attributes: String,
}

impl TryFrom<VariantRow> for ProductVariant {
    type Error = DbError;

    fn try_from(row: VariantRow) -> DbResult<Self> {
        let attributes: BTreeMap<String, String> = serde_json::from_str(&row.attributes)?;
        Ok(ProductVariant {
            id: row.id,
            product_id: row.product_id,
            sku: row.sku,
            name: row.name,
            selling_price: Money::from_minor(row.selling_price),
            cost_price: Money::from_minor(row.cost_price),
            quantity: row.quantity,
            attributes,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    id: String,
    product_id: String,
    variant_id: String,
    movement_type: MovementType,
    quantity: i64,
    previous_quantity: i64,
    new_quantity: i64,
    reason: String,
    reference: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl From<MovementRow> for StockMovement {
    fn from(row: MovementRow) -> Self {
        StockMovement {
            id: row.id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            movement_type: row.movement_type,
            quantity: row.quantity,
            previous_quantity: row.previous_quantity,
            new_quantity: row.new_quantity,
            reason: row.reason,
            reference: row.reference,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "p.id, p.name, p.description, p.category, p.is_active, p.created_at, p.updated_at";

const VARIANT_COLUMNS: &str =
    "id, product_id, sku, name, selling_price, cost_price, quantity, attributes";

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product together with its variants in one transaction.
    ///
    /// Names, SKUs and prices are validated first; nothing is written if any
    /// of them is rejected.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_name("name", &product.name)?;
        for variant in &product.variants {
            validate_sku(&variant.sku)?;
            validate_name("variant name", &variant.name)?;
            validate_price("selling_price", variant.selling_price)?;
            validate_price("cost_price", variant.cost_price)?;
            if variant.quantity < 0 {
                return Err(ValidationError::Negative {
                    field: "quantity".to_string(),
                }
                .into());
            }
        }

        debug!(id = %product.id, variants = product.variants.len(), "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        for variant in &product.variants {
            let attributes = serde_json::to_string(&variant.attributes)?;
            sqlx::query(
                r#"
                INSERT INTO product_variants (
                    id, product_id, sku, name, selling_price, cost_price,
                    quantity, attributes, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&variant.id)
            .bind(&product.id)
            .bind(variant.sku.trim())
            .bind(variant.name.trim())
            .bind(variant.selling_price.minor())
            .bind(variant.cost_price.minor())
            .bind(variant.quantity)
            .bind(attributes)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a product and its variants. Inactive products are returned too,
    /// since carts and old sales may still reference them.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products p WHERE p.id = ?1", PRODUCT_COLUMNS);
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let variants = self.variants_for(&row.id).await?;
                Ok(Some(row.into_product(variants)))
            }
            None => Ok(None),
        }
    }

    /// Searches active products by name or variant SKU.
    ///
    /// An empty query lists active products by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching products");

        let rows: Vec<ProductRow> = if query.is_empty() {
            let sql = format!(
                "SELECT {} FROM products p WHERE p.is_active = 1 ORDER BY p.name LIMIT ?1",
                PRODUCT_COLUMNS
            );
            sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?
        } else {
            let pattern = format!("%{}%", query);
            let sql = format!(
                r#"
                SELECT DISTINCT {}
                FROM products p
                LEFT JOIN product_variants v ON v.product_id = p.id
                WHERE p.is_active = 1 AND (p.name LIKE ?1 OR v.sku LIKE ?1)
                ORDER BY p.name
                LIMIT ?2
                "#,
                PRODUCT_COLUMNS
            );
            sqlx::query_as(&sql)
                .bind(pattern)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
        };

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let variants = self.variants_for(&row.id).await?;
            products.push(row.into_product(variants));
        }

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a single variant.
    pub async fn variant(&self, variant_id: &str) -> DbResult<Option<ProductVariant>> {
        let sql = format!("SELECT {} FROM product_variants WHERE id = ?1", VARIANT_COLUMNS);
        let row: Option<VariantRow> = sqlx::query_as(&sql)
            .bind(variant_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductVariant::try_from).transpose()
    }

    async fn variants_for(&self, product_id: &str) -> DbResult<Vec<ProductVariant>> {
        let sql = format!(
            "SELECT {} FROM product_variants WHERE product_id = ?1 ORDER BY rowid",
            VARIANT_COLUMNS
        );
        let rows: Vec<VariantRow> = sqlx::query_as(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProductVariant::try_from).collect()
    }

    /// Applies a manual stock correction and records the movement.
    ///
    /// Stock never goes below zero.
    pub async fn adjust_stock(
        &self,
        variant_id: &str,
        delta: i64,
        reason: &str,
        created_by: &str,
    ) -> DbResult<StockMovement> {
        debug!(variant_id = %variant_id, delta = %delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let current: Option<(String, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM product_variants WHERE id = ?1")
                .bind(variant_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (product_id, previous) =
            current.ok_or_else(|| DbError::not_found("Product variant", variant_id))?;

        let new_quantity = (previous + delta).max(0);
        let now = Utc::now();

        sqlx::query("UPDATE product_variants SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(variant_id)
            .bind(new_quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let movement = StockMovement {
            id: generate_id(),
            product_id,
            variant_id: variant_id.to_string(),
            movement_type: if delta > 0 {
                MovementType::In
            } else {
                MovementType::Adjustment
            },
            quantity: (new_quantity - previous).abs(),
            previous_quantity: previous,
            new_quantity,
            reason: reason.to_string(),
            reference: None,
            created_by: created_by.to_string(),
            created_at: now,
        };
        record_movement(&mut *tx, &movement).await?;

        tx.commit().await?;
        Ok(movement)
    }

    /// Stock movements for a variant, oldest first.
    pub async fn stock_movements(&self, variant_id: &str) -> DbResult<Vec<StockMovement>> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, variant_id, movement_type, quantity,
                   previous_quantity, new_quantity, reason, reference,
                   created_by, created_at
            FROM stock_movements
            WHERE variant_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StockMovement::from).collect())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts a stock movement on an open connection or transaction.
pub(crate) async fn record_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, variant_id, movement_type, quantity,
            previous_quantity, new_quantity, reason, reference,
            created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(&movement.variant_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.previous_quantity)
    .bind(movement.new_quantity)
    .bind(&movement.reason)
    .bind(&movement.reference)
    .bind(&movement.created_by)
    .bind(movement.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn variant(
        product_id: &str,
        id: &str,
        sku: &str,
        price: i64,
        cost: i64,
        stock: i64,
    ) -> ProductVariant {
        ProductVariant {
            id: id.to_string(),
            product_id: product_id.to_string(),
            sku: sku.to_string(),
            name: format!("Variant {}", id),
            selling_price: Money::from_minor(price),
            cost_price: Money::from_minor(cost),
            quantity: stock,
            attributes: BTreeMap::new(),
        }
    }

    pub(crate) fn product(id: &str, name: &str, variants: Vec<ProductVariant>) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category: Some("Phones".to_string()),
            is_active: true,
            variants,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
