//! # Cart
//!
//! The in-memory cart of product variants rung up on the POS screen.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator Action          Cart Method            Effect                 │
//! │  ───────────────          ───────────            ──────                 │
//! │                                                                         │
//! │  Tap variant ────────────► add_item() ─────────► merge or push line    │
//! │                                                                         │
//! │  Edit quantity ──────────► update_quantity() ──► set qty, ≤ 0 removes  │
//! │                                                                         │
//! │  Pick other variant ─────► change_variant() ───► re-key / merge line   │
//! │                                                                         │
//! │  Remove ─────────────────► remove_item() ──────► drop line             │
//! │                                                                         │
//! │  Clear / sale done ──────► clear() ────────────► empty cart            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Line ids are `"{product_id}:{variant_id}"` and unique within the cart
//! - Every line has `1 <= quantity <= MAX_ITEM_QUANTITY`
//! - `total_price == unit_price * quantity` after every mutation
//! - At most `MAX_CART_ITEMS` lines

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, StockShortfall};
use crate::money::Money;
use crate::types::{Product, ProductVariant};
use crate::validation::{validate_cart_size, validate_quantity};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Line Item
// =============================================================================

/// One product variant in the cart.
///
/// Price and stock are snapshots taken when the line was created, so the
/// cart reads the same even if the catalog changes underneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineItem {
    /// `"{product_id}:{variant_id}"`
    pub id: String,
    pub product_id: String,
    pub variant_id: String,
    pub product_name: String,
    pub variant_name: String,
    pub sku: String,
    pub quantity: i64,
    /// Selling price frozen at add time.
    pub unit_price: Money,
    pub total_price: Money,
    /// Stock seen at add time. Refreshed only by a variant switch.
    pub available_quantity: i64,
}

impl CartLineItem {
    /// Builds the composite line id.
    ///
    /// ```rust
    /// use lats_core::cart::CartLineItem;
    ///
    /// assert_eq!(CartLineItem::key("p1", "v2"), "p1:v2");
    /// ```
    pub fn key(product_id: &str, variant_id: &str) -> String {
        format!("{}:{}", product_id, variant_id)
    }

    fn from_variant(product: &Product, variant: &ProductVariant, quantity: i64) -> Self {
        CartLineItem {
            id: Self::key(&product.id, &variant.id),
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            product_name: product.name.clone(),
            variant_name: variant.name.clone(),
            sku: variant.sku.clone(),
            quantity,
            unit_price: variant.selling_price,
            total_price: variant.selling_price.multiply_quantity(quantity),
            available_quantity: variant.quantity,
        }
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total_price = self.unit_price.multiply_quantity(quantity);
    }

    /// Whether the line asks for more than the stock snapshot.
    #[inline]
    pub fn exceeds_stock(&self) -> bool {
        self.quantity > self.available_quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn get(&self, item_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Adds `quantity` of a variant, merging into its existing line.
    ///
    /// ## Behavior
    /// - Line for the same product/variant exists: quantities add up
    /// - Otherwise: a new line is appended with fresh snapshots
    ///
    /// ## Errors
    /// - `VariantNotFound` if the product has no such variant
    /// - `Validation` if the quantity (or merged quantity) is out of range
    /// - `CartTooLarge` if a new line would exceed `MAX_CART_ITEMS`
    ///
    /// Returns the line id.
    pub fn add_item(
        &mut self,
        product: &Product,
        variant_id: &str,
        quantity: i64,
    ) -> CoreResult<String> {
        validate_quantity(quantity)?;

        let variant = product
            .variant(variant_id)
            .ok_or_else(|| CoreError::VariantNotFound {
                product_id: product.id.clone(),
                variant_id: variant_id.to_string(),
            })?;

        let id = CartLineItem::key(&product.id, &variant.id);
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            let merged = item.quantity + quantity;
            validate_quantity(merged)?;
            item.set_quantity(merged);
            return Ok(id);
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;

        self.items
            .push(CartLineItem::from_variant(product, variant, quantity));
        Ok(id)
    }

    /// Sets a line's quantity.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: removes the line (no-op if it doesn't exist)
    /// - otherwise: sets quantity and recomputes `total_price`
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_item(item_id);
            return Ok(());
        }

        validate_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        item.set_quantity(quantity);
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != initial_len
    }

    /// Switches a line to another variant of the same product.
    ///
    /// ## Flow
    /// ```text
    /// "p1:v1" (qty 2) ──change_variant(v2)──┬── no "p1:v2" line → re-keyed to "p1:v2",
    ///                                        │                     v2 price and stock
    ///                                        └── "p1:v2" exists  → merged into it,
    ///                                                              "p1:v1" dropped
    /// ```
    ///
    /// The cart is untouched on any error. Returns the id of the resulting line.
    pub fn change_variant(
        &mut self,
        item_id: &str,
        product: &Product,
        new_variant_id: &str,
    ) -> CoreResult<String> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        if self.items[index].product_id != product.id {
            return Err(CoreError::ProductMismatch {
                item_id: item_id.to_string(),
                product_id: product.id.clone(),
            });
        }

        let variant = product
            .variant(new_variant_id)
            .ok_or_else(|| CoreError::VariantNotFound {
                product_id: product.id.clone(),
                variant_id: new_variant_id.to_string(),
            })?;

        let quantity = self.items[index].quantity;
        let new_id = CartLineItem::key(&product.id, &variant.id);

        match self.items.iter().position(|i| i.id == new_id) {
            Some(target) if target != index => {
                let merged = self.items[target].quantity + quantity;
                validate_quantity(merged)?;

                let line = &mut self.items[target];
                line.available_quantity = variant.quantity;
                line.set_quantity(merged);
                self.items.remove(index);
            }
            _ => {
                self.items[index] = CartLineItem::from_variant(product, variant, quantity);
            }
        }

        Ok(new_id)
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines asking for more than their stock snapshot, in cart order.
    pub fn stock_shortfalls(&self) -> Vec<StockShortfall> {
        self.items
            .iter()
            .filter(|i| i.exceeds_stock())
            .map(|i| StockShortfall {
                item_id: i.id.clone(),
                product_name: i.product_name.clone(),
                variant_name: i.variant_name.clone(),
                requested: i.quantity,
                available: i.available_quantity,
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
