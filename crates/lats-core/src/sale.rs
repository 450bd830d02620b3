//! # Sale Requests
//!
//! Readiness checks and assembly of the request handed to the
//! sale-processing collaborator.
//!
//! ## Submission Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleInput (cart, discount, VAT, customer, payment, operator)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  check_ready()                                                          │
//! │  ├── EmptyCart                                                          │
//! │  ├── InsufficientStock { items }                                        │
//! │  ├── MissingCustomer                                                    │
//! │  └── MissingPaymentMethod                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  calculate_totals()  ──►  SaleRequest  ──►  SaleProcessor               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches session state; a rejected input leaves the cart as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLineItem};
use crate::error::SaleError;
use crate::money::Money;
use crate::pricing::{calculate_totals, DiscountConfig};
use crate::types::{PaymentMethod, PaymentStatus, TaxRate};
use crate::validation::normalize_optional;

/// Name recorded when a sale has no customer name of its own.
pub const WALK_IN_CUSTOMER_NAME: &str = "Walk-in Customer";

// =============================================================================
// Customer Details
// =============================================================================

/// Who the sale is for: a saved customer, a walk-in contact, or both blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerDetails {
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerDetails {
    /// A walk-in contact typed at the counter. Blank fields become `None`.
    pub fn walk_in(name: &str, phone: Option<&str>, email: Option<&str>) -> Self {
        CustomerDetails {
            customer_id: None,
            name: normalize_optional(Some(name)),
            phone: normalize_optional(phone),
            email: normalize_optional(email),
        }
    }

    /// Either a saved customer is selected or a name was entered.
    pub fn is_identified(&self) -> bool {
        self.customer_id.is_some() || self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Name printed on the sale.
    pub fn display_name(&self) -> String {
        normalize_optional(self.name.as_deref())
            .unwrap_or_else(|| WALK_IN_CUSTOMER_NAME.to_string())
    }
}

// =============================================================================
// Sale Request
// =============================================================================

/// One line of a sale request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRequestItem {
    pub product_id: String,
    pub variant_id: String,
    pub product_name: String,
    pub variant_name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

impl From<&CartLineItem> for SaleRequestItem {
    fn from(line: &CartLineItem) -> Self {
        SaleRequestItem {
            product_id: line.product_id.clone(),
            variant_id: line.variant_id.clone(),
            product_name: line.product_name.clone(),
            variant_name: line.variant_name.clone(),
            sku: line.sku.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.total_price,
        }
    }
}

/// The sale handed to the sale-processing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRequest {
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<SaleRequestItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub discount_config: Option<DiscountConfig>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub sold_by: String,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Everything the submitter reads to build a request.
#[derive(Debug, Clone, Copy)]
pub struct SaleInput<'a> {
    pub cart: &'a Cart,
    pub discount: Option<&'a DiscountConfig>,
    pub tax_rate: TaxRate,
    pub customer: &'a CustomerDetails,
    pub payment_method: Option<PaymentMethod>,
    pub sold_by: &'a str,
    pub notes: Option<&'a str>,
    pub sold_at: DateTime<Utc>,
}

/// Runs the submission checks in order, returning the first failure.
pub fn check_ready(
    cart: &Cart,
    customer: &CustomerDetails,
    payment_method: Option<PaymentMethod>,
) -> Result<(), SaleError> {
    if cart.is_empty() {
        return Err(SaleError::EmptyCart);
    }

    let shortfalls = cart.stock_shortfalls();
    if !shortfalls.is_empty() {
        return Err(SaleError::InsufficientStock { items: shortfalls });
    }

    if !customer.is_identified() {
        return Err(SaleError::MissingCustomer);
    }

    if payment_method.is_none() {
        return Err(SaleError::MissingPaymentMethod);
    }

    Ok(())
}

/// Checks readiness and builds the sale request.
pub fn prepare_sale(input: SaleInput<'_>) -> Result<SaleRequest, SaleError> {
    check_ready(input.cart, input.customer, input.payment_method)?;
    let payment_method = input.payment_method.ok_or(SaleError::MissingPaymentMethod)?;

    let totals = calculate_totals(input.cart.items(), input.discount, input.tax_rate);

    Ok(SaleRequest {
        customer_id: input.customer.customer_id.clone(),
        customer_name: input.customer.display_name(),
        customer_phone: normalize_optional(input.customer.phone.as_deref()),
        customer_email: normalize_optional(input.customer.email.as_deref()),
        items: input.cart.items().iter().map(SaleRequestItem::from).collect(),
        subtotal: totals.subtotal,
        tax: totals.tax,
        discount: totals.discount_amount,
        discount_config: input.discount.copied(),
        total: totals.total,
        payment_method,
        payment_status: PaymentStatus::Completed,
        sold_by: input.sold_by.to_string(),
        sold_at: input.sold_at,
        notes: normalize_optional(input.notes),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
