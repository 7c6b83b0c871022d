//! Shopping cart state.
//!
//! [`Cart`] is a plain reducer: each method applies one cart operation in
//! place. Persisting it between requests is the caller's job; the serde
//! shape (`{"items":[{"product":..,"quantity":..}]}`) is the stored form.

use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductId, ShoppingItem};

/// One cart line. `quantity` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Line total in whole currency units.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.product.price.as_u64().saturating_mul(u64::from(self.quantity))
    }
}

/// A visitor's cart. Lines are kept in insertion order with at most one
/// line per product id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `product`, merging with an existing line.
    pub fn add_item(&mut self, product: Product) {
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    /// Drop the line for `id`. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|i| i.product.id != id);
    }

    /// Set the quantity for `id`; zero or negative removes the line.
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == id) {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.subtotal() as f64).sum()
    }

    /// Total number of units, shown on the header badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Cart total rounded to whole units, as recorded on the order.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn order_total(&self) -> u64 {
        self.total().round() as u64
    }

    /// One product snapshot per line, as recorded on the order.
    #[must_use]
    pub fn ordered_products(&self) -> Vec<Product> {
        self.items.iter().map(|i| i.product.clone()).collect()
    }

    /// Line items for the payment processor.
    #[must_use]
    pub fn shopping_items(&self, currency: &str) -> Vec<ShoppingItem> {
        self.items
            .iter()
            .map(|i| ShoppingItem {
                product_name: i.product.name.clone(),
                product_description: i.product.description.clone(),
                price_in_cents: i.product.price.cents(),
                quantity: u64::from(i.quantity),
                currency: currency.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::Price;

    fn product(id: u64, price: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: "Refurbished".to_string(),
            category: "Hardware".to_string(),
            price: Price::new(price),
            image_url: None,
        }
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_repeated_adds_merge_into_one_line() {
        let mut cart = Cart::new();
        for _ in 0..5 {
            cart.add_item(product(7, 3));
        }
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_add_twice_totals() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 10));
        cart.add_item(product(1, 10));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), 20.0);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(product(3, 1));
        cart.add_item(product(1, 1));
        cart.add_item(product(3, 1));
        let ids: Vec<u64> = cart.items().iter().map(|i| i.product.id.as_u64()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add_item(product(2, 5));
        cart.update_quantity(ProductId::new(2), 3);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), 15.0);
    }

    #[test]
    fn test_update_to_zero_or_negative_removes() {
        for q in [0, -1, -40] {
            let mut updated = Cart::new();
            updated.add_item(product(1, 10));
            updated.add_item(product(2, 5));
            let mut removed = updated.clone();

            updated.update_quantity(ProductId::new(1), q);
            removed.remove_item(ProductId::new(1));
            assert_eq!(updated, removed);
        }
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 10));
        let before = cart.clone();
        cart.update_quantity(ProductId::new(99), 4);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_one_of_two() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 10));
        cart.add_item(product(2, 5));
        cart.remove_item(ProductId::new(1));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product.id, ProductId::new(2));
        assert_eq!(cart.total(), 5.0);

        cart.remove_item(ProductId::new(1));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 10));
        cart.add_item(product(2, 5));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 120));
        cart.add_item(product(2, 35));
        cart.update_quantity(ProductId::new(2), 4);
        assert_eq!(cart.total(), 260.0);
        assert_eq!(cart.order_total(), 260);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_checkout_payloads() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 25));
        cart.add_item(product(1, 25));

        let products = cart.ordered_products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new(1));

        let items = cart.shopping_items("usd");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price_in_cents, 2500);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].currency, "usd");
        assert_eq!(items[0].product_name, "Product 1");
    }

    #[test]
    fn test_stored_form_round_trips() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 10));
        cart.add_item(product(2, 5));
        cart.update_quantity(ProductId::new(2), 3);

        let stored = serde_json::to_value(&cart).unwrap();
        assert_eq!(stored["items"][1]["quantity"], 3);
        assert_eq!(stored["items"][0]["product"]["id"], 1);

        let restored: Cart = serde_json::from_value(stored).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_missing_items_restores_empty() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert!(cart.is_empty());
    }
}
