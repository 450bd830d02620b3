//! # Domain Types
//!
//! Catalog, customer, payment and sale-record types shared by every LATS crate.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │──►│ ProductVariant  │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id, sku        │   │  id, name       │       │
//! │  │  name           │   │  selling_price  │   │  loyalty_points │       │
//! │  │  variants[]     │   │  quantity       │   │  total_spent    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   SaleRecord    │   │ StockMovement   │   │    Receipt      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sale_number    │   │  variant_id     │   │  RCP-{sale_no}  │       │
//! │  │  items[]        │   │  delta, before  │   │  JSON content   │       │
//! │  │  profit / line  │   │  after          │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire shapes use camelCase so they match what the UI and the remote
//! sale-processing service exchange.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1600 bps = 16% (Tanzanian VAT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A sellable product and its variants, as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Inactive products are hidden from search but old sales still resolve.
    pub is_active: bool,
    pub variants: Vec<ProductVariant>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Looks up one of this product's variants.
    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    pub fn variant_mut(&mut self, variant_id: &str) -> Option<&mut ProductVariant> {
        self.variants.iter_mut().find(|v| v.id == variant_id)
    }

    /// Sum of stock across all variants.
    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(|v| v.quantity).sum()
    }
}

/// A concrete sellable SKU of a product (size, colour, capacity...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub selling_price: Money,
    /// Unit cost, used for profit on the sale record.
    pub cost_price: Money,
    /// Units on hand.
    pub quantity: i64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ProductVariant {
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A saved customer record with loyalty stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: i64,
    pub total_spent: Money,
    pub total_orders: i64,
    #[ts(as = "Option<String>")]
    pub last_visit: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    MobileMoney,
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::MobileMoney,
        PaymentMethod::BankTransfer,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

/// Settlement state of a sale's payment.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    /// POS sales are paid at the counter.
    #[default]
    Completed,
    Failed,
}

// =============================================================================
// Sale Record
// =============================================================================

/// A sale as persisted by the sale-processing collaborator.
///
/// Every field has a default so a sparse `{ "saleNumber": "..." }` reply
/// still deserializes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    pub sale_number: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub items: Vec<SaleRecordItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub sold_by: String,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl SaleRecord {
    /// Gross profit across all lines.
    pub fn profit(&self) -> Money {
        self.items.iter().map(|i| i.profit).sum()
    }
}

/// A sold line with frozen cost and profit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SaleRecordItem {
    pub id: String,
    pub product_id: String,
    pub variant_id: String,
    pub product_name: String,
    pub variant_name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    /// Unit cost at time of sale.
    pub cost_price: Money,
    /// `total_price - cost_price * quantity`
    pub profit: Money,
}

/// Response envelope of the sale-processing service.
///
/// ```rust
/// use lats_core::types::ProcessSaleResponse;
///
/// let reply: ProcessSaleResponse =
///     serde_json::from_str(r#"{"success":false,"error":"Till closed"}"#).unwrap();
/// assert_eq!(reply.into_result().unwrap_err(), "Till closed");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProcessSaleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<SaleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessSaleResponse {
    pub fn ok(sale: SaleRecord) -> Self {
        Self {
            success: true,
            sale: Some(sale),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            sale: None,
            error: Some(message.into()),
        }
    }

    /// Collapses the envelope into a `Result`, keeping the service's message verbatim.
    pub fn into_result(self) -> Result<SaleRecord, String> {
        match (self.success, self.sale, self.error) {
            (true, Some(sale), _) => Ok(sale),
            (true, None, _) => Err("Sale processing returned no sale".to_string()),
            (false, _, Some(message)) => Err(message),
            (false, _, None) => Err("Failed to process sale".to_string()),
        }
    }
}

// =============================================================================
// Stock Movements & Receipts
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock left with a sale.
    Out,
    /// Stock received.
    In,
    /// Manual correction.
    Adjustment,
}

/// An audit entry for a change in variant stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub variant_id: String,
    pub movement_type: MovementType,
    /// Units moved, always positive; direction is in `movement_type`.
    pub quantity: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub reason: String,
    /// Sale number for sales, free text otherwise.
    pub reference: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A stored receipt for a completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub id: String,
    pub sale_id: String,
    pub receipt_number: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub total: Money,
    /// [`ReceiptContent`] serialized as JSON.
    pub content: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Store details printed on every receipt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct BusinessInfo {
    pub name: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub header: Option<String>,
    pub footer: Option<String>,
}

/// What a receipt stores: the store it was issued by and the sale.
///
/// ```json
/// { "businessInfo": { "name": "LATS POS", ... }, "sale": { "saleNumber": "SALE-...", ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ReceiptContent {
    pub business_info: BusinessInfo,
    pub sale: SaleRecord,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_vat() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 1600);
        assert!((rate.percentage() - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_method_round_trip_strings() {
        assert_eq!("mobile_money".parse::<PaymentMethod>().unwrap(), PaymentMethod::MobileMoney);
        assert_eq!(" Cash ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("cheque".parse::<PaymentMethod>().is_err());

        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
    }

    #[test]
    fn test_sparse_sale_record_deserializes() {
        let reply: ProcessSaleResponse =
            serde_json::from_str(r#"{"success":true,"sale":{"saleNumber":"S-1"}}"#).unwrap();
        let sale = reply.into_result().unwrap();
        assert_eq!(sale.sale_number, "S-1");
        assert!(sale.items.is_empty());
        assert_eq!(sale.payment_status, PaymentStatus::Completed);
    }

    #[test]
    fn test_failed_envelope_without_message() {
        let reply = ProcessSaleResponse {
            success: false,
            sale: None,
            error: None,
        };
        assert_eq!(reply.into_result().unwrap_err(), "Failed to process sale");
    }

    #[test]
    fn test_sale_record_profit() {
        let line = |profit| SaleRecordItem {
            profit: Money::from_minor(profit),
            ..Default::default()
        };
        let sale = SaleRecord {
            items: vec![line(1500), line(-200)],
            ..Default::default()
        };
        assert_eq!(sale.profit().minor(), 1300);
    }

    #[test]
    fn test_variant_lookup() {
        let now = Utc::now();
        let product = Product {
            id: "p1".into(),
            name: "Phone Case".into(),
            description: None,
            category: None,
            is_active: true,
            variants: vec![ProductVariant {
                id: "v1".into(),
                product_id: "p1".into(),
                sku: "CASE-BLK".into(),
                name: "Black".into(),
                selling_price: Money::from_minor(15_000),
                cost_price: Money::from_minor(8_000),
                quantity: 4,
                attributes: BTreeMap::new(),
            }],
            created_at: now,
            updated_at: now,
        };
        assert!(product.variant("v1").is_some());
        assert!(product.variant("v2").is_none());
        assert_eq!(product.total_stock(), 4);
    }
}
