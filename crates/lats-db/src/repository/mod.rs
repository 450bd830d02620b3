//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout adapter                                                       │
//! │       │                                                                 │
//! │       │  db.products().get_by_id("p1")                                  │
//! │       │  db.sales().process_sale(&request)                              │
//! │       ▼                                                                 │
//! │  ProductRepository          CustomerRepository       SaleRepository     │
//! │  ├── insert                 ├── insert               ├── process_sale   │
//! │  ├── get_by_id              ├── get_by_id            ├── get_by_id      │
//! │  ├── search                 └── find_by_phone        ├── recent         │
//! │  ├── variant                                         └── receipt_for    │
//! │  ├── adjust_stock                                                       │
//! │  └── stock_movements                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are runtime-checked (`sqlx::query` / `query_as` with `FromRow`
//! row structs) and converted to lats-core types at the repository edge.

pub mod customer;
pub mod product;
pub mod sale;

use uuid::Uuid;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
