//! # Customer Repository
//!
//! Saved customers and their loyalty stats. Stats are only ever changed by
//! the sale transaction in [`super::sale`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use lats_core::validation::{normalize_optional, validate_name};
use lats_core::{Customer, Money};

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    loyalty_points: i64,
    total_spent: i64,
    total_orders: i64,
    last_visit: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            loyalty_points: row.loyalty_points,
            total_spent: Money::from_minor(row.total_spent),
            total_orders: row.total_orders,
            last_visit: row.last_visit,
            created_at: row.created_at,
        }
    }
}

const CUSTOMER_SELECT: &str = r#"
    SELECT id, name, phone, email, loyalty_points, total_spent,
           total_orders, last_visit, created_at
    FROM customers
"#;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a customer with zeroed loyalty stats.
    pub async fn insert(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Customer> {
        let customer = Customer {
            id: generate_id(),
            name: validate_name("customer name", name)?,
            phone: normalize_optional(phone),
            email: normalize_optional(email),
            loyalty_points: 0,
            total_spent: Money::zero(),
            total_orders: 0,
            last_visit: None,
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("{} WHERE id = ?1", CUSTOMER_SELECT);
        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Customer::from))
    }

    /// Looks a customer up by phone number, ignoring surrounding whitespace.
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let sql = format!("{} WHERE phone = ?1 ORDER BY created_at LIMIT 1", CUSTOMER_SELECT);
        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(phone.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Customer::from))
    }
}
