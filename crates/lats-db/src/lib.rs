//! # lats-db: Catalog and Sale Store for LATS POS
//!
//! SQLite storage for products, customers and completed sales, with sqlx
//! for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LATS POS Data Flow                               │
//! │                                                                         │
//! │  lats-checkout adapters (CatalogLookup / SaleProcessor)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lats-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ ProductRepo    │   │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ CustomerRepo   │   │ 0001_initial │   │   │
//! │  │   │               │    │ SaleRepo       │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product, customer and sale repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lats_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./lats.db")).await?;
//! let phones = db.products().search("iphone", 20).await?;
//! let record = db.sales().process_sale(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
