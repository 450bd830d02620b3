//! # Pricing
//!
//! Turns cart lines plus an optional discount into the numbers shown on the
//! POS screen and sent with the sale.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal            = Σ line.total_price                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount            = percentage: subtotal × bps / 10000              │
//! │                        fixed:      amount                              │
//! │                        then clamped to [0, subtotal]                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discounted_subtotal = subtotal − discount                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tax                 = discounted_subtotal × VAT        (after discount)│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total               = discounted_subtotal + tax                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure and total: any cart and any discount produce totals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::cart::CartLineItem;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;

/// Percentages are typed with up to two decimals ("12.5" → 1250 bps).
const PERCENT_DECIMALS: u8 = 2;

// =============================================================================
// Discount
// =============================================================================

/// Which kind of discount the operator picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl FromStr for DiscountKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed" => Ok(DiscountKind::Fixed),
            _ => Err(ValidationError::NotAllowed {
                field: "discount_type".to_string(),
                allowed: vec!["percentage".to_string(), "fixed".to_string()],
            }),
        }
    }
}

/// A discount applied to the whole cart.
///
/// Values are never negative once constructed through [`DiscountConfig::parse`].
/// Values larger than the subtotal are allowed and get clamped by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiscountConfig {
    /// Basis points of the subtotal (1000 = 10%).
    Percentage { bps: u32 },
    /// Absolute amount in the smallest currency unit.
    Fixed { amount: Money },
}

impl DiscountConfig {
    pub const fn percentage_bps(bps: u32) -> Self {
        DiscountConfig::Percentage { bps }
    }

    pub const fn fixed(amount: Money) -> Self {
        DiscountConfig::Fixed { amount }
    }

    pub fn kind(&self) -> DiscountKind {
        match self {
            DiscountConfig::Percentage { .. } => DiscountKind::Percentage,
            DiscountConfig::Fixed { .. } => DiscountKind::Fixed,
        }
    }

    /// Parses the discount value typed by the operator.
    ///
    /// ## Rules
    /// - Blank text means "no discount" (`Ok(None)`)
    /// - Percentages accept up to two decimals
    /// - Fixed amounts accept the currency's decimals
    /// - Negative or malformed text is rejected
    ///
    /// ```rust
    /// use lats_core::money::Money;
    /// use lats_core::pricing::{DiscountConfig, DiscountKind};
    ///
    /// let pct = DiscountConfig::parse(DiscountKind::Percentage, "12.5", 0).unwrap();
    /// assert_eq!(pct, Some(DiscountConfig::percentage_bps(1250)));
    ///
    /// let fixed = DiscountConfig::parse(DiscountKind::Fixed, "5000", 0).unwrap();
    /// assert_eq!(fixed, Some(DiscountConfig::fixed(Money::from_minor(5000))));
    ///
    /// assert_eq!(DiscountConfig::parse(DiscountKind::Fixed, "  ", 0).unwrap(), None);
    /// assert!(DiscountConfig::parse(DiscountKind::Fixed, "-10", 0).is_err());
    /// ```
    pub fn parse(
        kind: DiscountKind,
        text: &str,
        currency_decimals: u8,
    ) -> Result<Option<DiscountConfig>, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let decimals = match kind {
            DiscountKind::Percentage => PERCENT_DECIMALS,
            DiscountKind::Fixed => currency_decimals,
        };

        let value = Money::parse_decimal(text, decimals).ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "discount".to_string(),
                reason: format!("expected a number with at most {} decimals", decimals),
            }
        })?;

        if value.is_negative() {
            return Err(ValidationError::Negative {
                field: "discount".to_string(),
            });
        }

        let config = match kind {
            DiscountKind::Percentage => {
                let bps = u32::try_from(value.minor()).map_err(|_| ValidationError::OutOfRange {
                    field: "discount".to_string(),
                    min: 0,
                    max: i64::from(u32::MAX),
                })?;
                DiscountConfig::Percentage { bps }
            }
            DiscountKind::Fixed => DiscountConfig::Fixed { amount: value },
        };

        Ok(Some(config))
    }

    /// Discount before clamping.
    fn raw_amount(&self, subtotal: Money) -> Money {
        match *self {
            DiscountConfig::Percentage { bps } => subtotal.percentage(bps),
            DiscountConfig::Fixed { amount } => amount,
        }
    }

    /// Discount actually taken off `subtotal`, always in `[0, subtotal]`.
    pub fn amount_for(&self, subtotal: Money) -> Money {
        self.raw_amount(subtotal).clamp_to(Money::zero(), subtotal.max(Money::zero()))
    }
}

impl fmt::Display for DiscountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountConfig::Percentage { bps } => {
                write!(f, "{}.{:02}%", bps / 100, bps % 100)
            }
            DiscountConfig::Fixed { amount } => write!(f, "{}", amount),
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Derived cart figures. Recomputed from scratch whenever the cart,
/// discount or tax rate changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub discounted_subtotal: Money,
    pub tax: Money,
    pub total: Money,
    /// Effective discount as a share of the subtotal. Display only.
    pub discount_percentage: f64,
}

/// Computes cart totals.
///
/// ```rust
/// use lats_core::money::Money;
/// use lats_core::pricing::{calculate_totals, DiscountConfig};
/// use lats_core::types::TaxRate;
/// # use lats_core::cart::CartLineItem;
/// # let line = CartLineItem {
/// #     id: "p:v".into(), product_id: "p".into(), variant_id: "v".into(),
/// #     product_name: "P".into(), variant_name: "V".into(), sku: "S".into(),
/// #     quantity: 1, unit_price: Money::from_minor(10_000),
/// #     total_price: Money::from_minor(10_000), available_quantity: 5,
/// # };
///
/// // 10 000 subtotal, 10% off, 16% VAT on the remaining 9 000
/// let totals = calculate_totals(
///     &[line],
///     Some(&DiscountConfig::percentage_bps(1000)),
///     TaxRate::from_bps(1600),
/// );
/// assert_eq!(totals.discount_amount.minor(), 1_000);
/// assert_eq!(totals.tax.minor(), 1_440);
/// assert_eq!(totals.total.minor(), 10_440);
/// ```
pub fn calculate_totals(
    items: &[CartLineItem],
    discount: Option<&DiscountConfig>,
    tax_rate: TaxRate,
) -> CartTotals {
    if items.is_empty() {
        return CartTotals::default();
    }

    let subtotal: Money = items.iter().map(|i| i.total_price).sum();
    let discount_amount = discount
        .map(|d| d.amount_for(subtotal))
        .unwrap_or_else(Money::zero);
    let discounted_subtotal = subtotal - discount_amount;
    let tax = discounted_subtotal.calculate_tax(tax_rate);

    CartTotals {
        item_count: items.len(),
        total_quantity: items.iter().map(|i| i.quantity).sum(),
        subtotal,
        discount_amount,
        discounted_subtotal,
        tax,
        total: discounted_subtotal + tax,
        discount_percentage: discount_amount.ratio_percent(subtotal),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, qty: i64) -> CartLineItem {
        CartLineItem {
            id: format!("p{}:v", price),
            product_id: format!("p{}", price),
            variant_id: "v".into(),
            product_name: "Item".into(),
            variant_name: "Default".into(),
            sku: "SKU".into(),
            quantity: qty,
            unit_price: Money::from_minor(price),
            total_price: Money::from_minor(price * qty),
            available_quantity: 100,
        }
    }

    const VAT: TaxRate = TaxRate::from_bps(1600);

    #[test]
    fn test_empty_cart_is_all_zero() {
        let discount = DiscountConfig::percentage_bps(5000);
        let totals = calculate_totals(&[], Some(&discount), VAT);
        assert_eq!(totals, CartTotals::default());
    }

    #[test]
    fn test_percentage_discount_is_clamped_to_subtotal() {
        let items = [line(100_000, 1)];
        let totals = calculate_totals(&items, Some(&DiscountConfig::percentage_bps(15_000)), VAT);

        assert_eq!(totals.discount_amount.minor(), 100_000);
        assert!(totals.discounted_subtotal.is_zero());
        assert!(totals.tax.is_zero());
        assert!(totals.total.is_zero());
        assert!((totals.discount_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_percentage_clamps_to_subtotal_not_zero() {
        let items = [line(30_000_000_000_000, 1)];
        let discount = DiscountConfig::parse(DiscountKind::Percentage, "42949672.95", 0)
            .unwrap()
            .unwrap();
        let totals = calculate_totals(&items, Some(&discount), VAT);

        assert_eq!(totals.discount_amount, totals.subtotal);
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_fixed_discount_is_clamped_to_subtotal() {
        let items = [line(50_000, 1)];
        let discount = DiscountConfig::fixed(Money::from_minor(80_000));
        let totals = calculate_totals(&items, Some(&discount), VAT);

        assert_eq!(totals.discount_amount.minor(), 50_000);
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_discount_applies_before_tax() {
        let items = [line(10_000, 1)];
        let totals = calculate_totals(&items, Some(&DiscountConfig::percentage_bps(1000)), VAT);

        assert_eq!(totals.subtotal.minor(), 10_000);
        assert_eq!(totals.discount_amount.minor(), 1_000);
        assert_eq!(totals.discounted_subtotal.minor(), 9_000);
        assert_eq!(totals.tax.minor(), 1_440);
        assert_eq!(totals.total.minor(), 10_440);
        assert!((totals.discount_percentage - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_discount_and_counts() {
        let items = [line(2_500, 2), line(1_000, 3)];
        let totals = calculate_totals(&items, None, VAT);

        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 5);
        assert_eq!(totals.subtotal.minor(), 8_000);
        assert!(totals.discount_amount.is_zero());
        assert_eq!(totals.tax.minor(), 1_280);
        assert_eq!(totals.total.minor(), 9_280);
        assert_eq!(totals.discount_percentage, 0.0);
    }

    #[test]
    fn test_zero_tax_rate() {
        let items = [line(7_000, 1)];
        let totals = calculate_totals(&items, None, TaxRate::zero());
        assert_eq!(totals.total.minor(), 7_000);
    }

    #[test]
    fn test_parse_percentage_and_fixed() {
        assert_eq!(
            DiscountConfig::parse(DiscountKind::Percentage, "10", 0).unwrap(),
            Some(DiscountConfig::percentage_bps(1000))
        );
        assert_eq!(
            DiscountConfig::parse(DiscountKind::Fixed, "12.50", 2).unwrap(),
            Some(DiscountConfig::fixed(Money::from_minor(1250)))
        );
        assert!(matches!(
            DiscountConfig::parse(DiscountKind::Percentage, "-5", 0),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            DiscountConfig::parse(DiscountKind::Fixed, "12.5", 0),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            DiscountConfig::parse(DiscountKind::Percentage, "ten", 0),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_discount_kind_from_str() {
        assert_eq!("Fixed".parse::<DiscountKind>().unwrap(), DiscountKind::Fixed);
        assert!("bogus".parse::<DiscountKind>().is_err());
    }

    #[test]
    fn test_discount_serializes_tagged() {
        let json = serde_json::to_string(&DiscountConfig::percentage_bps(1250)).unwrap();
        assert_eq!(json, r#"{"type":"percentage","bps":1250}"#);
        assert_eq!(DiscountConfig::percentage_bps(1250).to_string(), "12.50%");
    }
}
