//! # State Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐       │
//! │  │     CheckoutState        │        │       PosConfig          │       │
//! │  │  Arc<Mutex<PosSession>>  │        │  store, currency, VAT,   │       │
//! │  │  cart, discount,         │        │  operator, db path       │       │
//! │  │  customer, payment,      │        │                          │       │
//! │  │  catalog cache           │        │                          │       │
//! │  └──────────────────────────┘        └──────────────────────────┘       │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • CheckoutState: exclusive access through with_session(_mut)           │
//! │  • PosConfig: read-only after load                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::{ConfigError, PosConfig};
pub use session::{CheckoutState, PosSession, SessionSnapshot};
