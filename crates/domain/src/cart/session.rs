use crate::catalog::{Product, ProductId};
use crate::pricing::Totals;

use super::cart::Cart;

/// Minimal key-value persistence port for client-side state.
///
/// Mirrors browser local storage semantics: writes are best-effort and
/// fire-and-forget, reads return whatever string was last stored.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// A cart bound to a storage key, saved after every mutation.
///
/// Replaces the ambient global cart state of the storefront UI with an
/// explicitly-owned value and an explicit load/save lifecycle.
pub struct CartSession<S: KeyValueStore> {
    store: S,
    key: String,
    cart: Cart,
    recovered: bool,
}

impl<S: KeyValueStore> CartSession<S> {
    /// Loads the cart stored under `key`, or starts empty.
    ///
    /// A malformed persisted payload is treated as an empty cart: the
    /// condition is logged at `warn` and exposed through
    /// [`recovered_from_malformed`](Self::recovered_from_malformed),
    /// never raised.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let (cart, recovered) = match store.get(&key) {
            None => (Cart::new(), false),
            Some(raw) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => (cart, false),
                Err(err) => {
                    tracing::warn!(%key, error = %err, "discarding malformed cart payload");
                    (Cart::new(), true)
                }
            },
        };
        Self {
            store,
            key,
            cart,
            recovered,
        }
    }

    /// True when the persisted payload was malformed and discarded.
    pub fn recovered_from_malformed(&self) -> bool {
        self.recovered
    }

    /// The current cart value.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Adds a product and persists.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        self.cart.add_item(product, quantity);
        self.save();
    }

    /// Removes a product's line and persists.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.cart.remove_item(product_id);
        self.save();
    }

    /// Updates a line quantity and persists.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        self.cart.update_quantity(product_id, quantity);
        self.save();
    }

    /// Empties the cart and persists. Called on successful order
    /// placement or an explicit clear.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.save();
    }

    /// Derived monetary summary of the current cart.
    pub fn totals(&self) -> Totals {
        self.cart.totals()
    }

    fn save(&self) {
        match serde_json::to_string(&self.cart) {
            Ok(raw) => self.store.set(&self.key, &raw),
            Err(err) => tracing::warn!(key = %self.key, error = %err, "failed to persist cart"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        entries: RefCell<HashMap<String, String>>,
    }

    impl KeyValueStore for &MapStore {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }

        fn remove(&self, key: &str) {
            self.entries.borrow_mut().remove(key);
        }
    }

    fn product(id: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Money::from_cents(price_cents),
            list_price: None,
            category: "misc".to_string(),
            image: format!("{id}.jpg"),
            stock: 10,
            rating: 0.0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_mutations_persist_across_load() {
        let store = MapStore::default();

        let mut session = CartSession::load(&store, "cart");
        session.add_item(&product("p1", 25_00), 2);
        session.update_quantity(&ProductId::new("p1"), 3);

        let reloaded = CartSession::load(&store, "cart");
        assert!(!reloaded.recovered_from_malformed());
        assert_eq!(reloaded.cart().line(&ProductId::new("p1")).unwrap().quantity, 3);
    }

    #[test]
    fn test_missing_payload_starts_empty() {
        let store = MapStore::default();
        let session = CartSession::load(&store, "cart");
        assert!(session.cart().is_empty());
        assert!(!session.recovered_from_malformed());
    }

    #[test]
    fn test_malformed_payload_recovers_to_empty() {
        let store = MapStore::default();
        (&store).set("cart", "{not json at all");

        let session = CartSession::load(&store, "cart");
        assert!(session.cart().is_empty());
        assert!(session.recovered_from_malformed());
    }

    #[test]
    fn test_wrong_shape_payload_recovers_to_empty() {
        let store = MapStore::default();
        (&store).set("cart", r#"{"lines": 42}"#);

        let session = CartSession::load(&store, "cart");
        assert!(session.cart().is_empty());
        assert!(session.recovered_from_malformed());
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let store = MapStore::default();

        let mut session = CartSession::load(&store, "cart");
        session.add_item(&product("p1", 10_00), 1);
        session.clear();

        let reloaded = CartSession::load(&store, "cart");
        assert!(reloaded.cart().is_empty());
    }
}
