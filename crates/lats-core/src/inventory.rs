//! # Inventory Cache
//!
//! The catalog as this POS session last saw it.
//!
//! After a sale the cache is patched in place (optimistic decrement) instead
//! of being re-fetched; a full refresh is an explicit operation on the
//! checkout controller.
//!
//! ```text
//! fetch ──► ProductCache ──► add_to_cart snapshots stock
//!                │
//!     sale ok ───┴──► apply_sale(lines): quantity −= sold (floored at 0)
//! ```

use std::collections::HashMap;

use crate::cart::CartLineItem;
use crate::types::{Product, ProductVariant};

#[derive(Debug, Clone, Default)]
pub struct ProductCache {
    products: HashMap<String, Product>,
}

impl ProductCache {
    pub fn new() -> Self {
        ProductCache::default()
    }

    /// Replaces the whole cache with a fresh catalog load.
    pub fn replace_all(&mut self, products: impl IntoIterator<Item = Product>) {
        self.products = products.into_iter().map(|p| (p.id.clone(), p)).collect();
    }

    /// Inserts or refreshes a single product.
    pub fn upsert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    pub fn variant(&self, product_id: &str, variant_id: &str) -> Option<&ProductVariant> {
        self.get(product_id)?.variant(variant_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Product ids currently cached.
    pub fn product_ids(&self) -> Vec<String> {
        self.products.keys().cloned().collect()
    }

    /// Decrements cached stock for exactly the sold variants.
    ///
    /// Lines for products that are not cached are skipped. Stock never goes
    /// below zero. Returns how many variants were patched.
    pub fn apply_sale(&mut self, lines: &[CartLineItem]) -> usize {
        let mut patched = 0;
        for line in lines {
            let Some(variant) = self
                .products
                .get_mut(&line.product_id)
                .and_then(|p| p.variant_mut(&line.variant_id))
            else {
                continue;
            };
            variant.quantity = (variant.quantity - line.quantity).max(0);
            patched += 1;
        }
        patched
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::{product, variant};
    use crate::cart::Cart;

    #[test]
    fn test_apply_sale_decrements_only_sold_variants() {
        let p = product(
            "p1",
            vec![variant("p1", "v1", 1_000, 5), variant("p1", "v2", 1_000, 8)],
        );
        let mut cache = ProductCache::new();
        cache.upsert(p.clone());

        let mut cart = Cart::new();
        cart.add_item(&p, "v1", 2).unwrap();

        assert_eq!(cache.apply_sale(cart.items()), 1);
        assert_eq!(cache.variant("p1", "v1").unwrap().quantity, 3);
        assert_eq!(cache.variant("p1", "v2").unwrap().quantity, 8);
    }

    #[test]
    fn test_apply_sale_floors_at_zero_and_skips_unknown() {
        let p = product("p1", vec![variant("p1", "v1", 1_000, 1)]);
        let mut cart = Cart::new();
        cart.add_item(&p, "v1", 4).unwrap();

        let stranger = product("p9", vec![variant("p9", "v1", 500, 2)]);
        cart.add_item(&stranger, "v1", 1).unwrap();

        let mut cache = ProductCache::new();
        cache.replace_all([p]);

        assert_eq!(cache.apply_sale(cart.items()), 1);
        assert_eq!(cache.variant("p1", "v1").unwrap().quantity, 0);
        assert!(cache.get("p9").is_none());
    }

    #[test]
    fn test_replace_all_drops_previous_entries() {
        let mut cache = ProductCache::new();
        cache.upsert(product("old", vec![]));
        cache.replace_all([product("new", vec![])]);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("old").is_none());
        assert_eq!(cache.product_ids(), vec!["new".to_string()]);
    }
}
