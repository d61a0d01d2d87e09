//! Per-user wishlist, persisted through the same key-value port as the cart.

use common::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::KeyValueStore;
use crate::catalog::{Product, ProductId};
use crate::money::Money;

/// Errors from wishlist mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WishlistError {
    /// The product is already on the list.
    #[error("product already in wishlist")]
    AlreadyPresent,
}

/// A saved product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: String,
}

/// A user's wishlist: an ordered set of product snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    /// Creates an empty wishlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product snapshot; duplicates are rejected.
    pub fn add(&mut self, product: &Product) -> Result<(), WishlistError> {
        if self.contains(&product.id) {
            return Err(WishlistError::AlreadyPresent);
        }
        self.items.push(WishlistItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        });
        Ok(())
    }

    /// Removes a product; no-op if absent.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product_id != product_id);
    }

    /// True when the product is on the list.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.product_id == product_id)
    }

    /// Saved items in insertion order.
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    /// Number of saved items.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Empties the list.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// A wishlist bound to a user's storage key, saved after every mutation.
pub struct WishlistSession<S: KeyValueStore> {
    store: S,
    key: String,
    wishlist: Wishlist,
}

impl<S: KeyValueStore> WishlistSession<S> {
    /// Loads the wishlist for a user, or starts empty. Malformed
    /// payloads are discarded with a warning, like the cart.
    pub fn for_user(store: S, user_id: UserId) -> Self {
        let key = format!("wishlist:{user_id}");
        let wishlist = match store.get(&key) {
            None => Wishlist::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(%key, error = %err, "discarding malformed wishlist payload");
                Wishlist::new()
            }),
        };
        Self {
            store,
            key,
            wishlist,
        }
    }

    /// The current wishlist value.
    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    /// Adds a product and persists; duplicates are rejected.
    pub fn add(&mut self, product: &Product) -> Result<(), WishlistError> {
        self.wishlist.add(product)?;
        self.save();
        Ok(())
    }

    /// Removes a product and persists.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.wishlist.remove(product_id);
        self.save();
    }

    /// Empties the list and persists.
    pub fn clear(&mut self) {
        self.wishlist.clear();
        self.save();
    }

    fn save(&self) {
        match serde_json::to_string(&self.wishlist) {
            Ok(raw) => self.store.set(&self.key, &raw),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to persist wishlist");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn product(id: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Money::from_cents(15_00),
            list_price: None,
            category: "misc".to_string(),
            image: format!("{id}.jpg"),
            stock: 3,
            rating: 0.0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut wishlist = Wishlist::new();
        let p = product("p1");

        assert!(wishlist.add(&p).is_ok());
        assert_eq!(wishlist.add(&p), Err(WishlistError::AlreadyPresent));
        assert_eq!(wishlist.count(), 1);
    }

    #[test]
    fn test_remove_then_contains() {
        let mut wishlist = Wishlist::new();
        let p = product("p1");
        wishlist.add(&p).unwrap();
        assert!(wishlist.contains(&p.id));

        wishlist.remove(&p.id);
        assert!(!wishlist.contains(&p.id));
        assert_eq!(wishlist.count(), 0);
    }

    #[test]
    fn test_session_persists_per_user() {
        let store = MapStore::default();
        let alice = UserId::new();
        let bob = UserId::new();

        let mut session = WishlistSession::for_user(&store, alice);
        session.add(&product("p1")).unwrap();

        let reloaded = WishlistSession::for_user(&store, alice);
        assert_eq!(reloaded.wishlist().count(), 1);

        let other = WishlistSession::for_user(&store, bob);
        assert_eq!(other.wishlist().count(), 0);
    }

    #[test]
    fn test_malformed_payload_starts_empty() {
        let store = MapStore::default();
        let user = UserId::new();
        (&store).set(&format!("wishlist:{user}"), "][");

        let session = WishlistSession::for_user(&store, user);
        assert_eq!(session.wishlist().count(), 0);
    }
}
