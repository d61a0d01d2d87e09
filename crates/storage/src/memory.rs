use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use common::{OrderId, UserId};
use domain::cart::KeyValueStore;
use domain::catalog::{Product, ProductId, Review};
use domain::order::{Order, OrderNumber, OrderStatus, PaymentStatus};
use domain::store::{OrderStore, ProductStore, StorageError};

/// In-memory order store for testing and the default server.
///
/// Provides the same atomicity contract as the PostgreSQL
/// implementation: inserts enforce order-number uniqueness and status
/// updates are conditional writes, both under a single write lock.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StorageError> {
        let mut orders = self.orders.write().await;
        if orders.values().any(|o| o.number() == order.number()) {
            return Err(StorageError::DuplicateOrderNumber {
                number: order.number().to_string(),
            });
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorageError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| o.number() == number)
            .cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StorageError> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(result)
    }

    async fn update_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<bool, StorageError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id()) {
            Some(stored) if stored.status() == expected => {
                *stored = order.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Order>, StorageError> {
        let mut orders = self.orders.write().await;
        Ok(orders.get_mut(&id).map(|stored| {
            stored.set_payment_status(status, now);
            stored.clone()
        }))
    }
}

/// In-memory product store for testing and the default server.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductStore {
    /// Creates a new empty product store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StorageError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StorageError> {
        let products = self.products.read().await;
        let mut result: Vec<Product> = products.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn insert(&self, product: &Product) -> Result<(), StorageError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(StorageError::Backend(format!(
                "product already exists: {}",
                product.id
            )));
        }
        products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, StorageError> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_review(
        &self,
        id: &ProductId,
        review: Review,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StorageError> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(id).map(|stored| {
            stored.add_review(review, now);
            stored.clone()
        }))
    }
}

/// Shared in-memory key-value store backing cart and wishlist sessions
/// in tests and demos, standing in for browser local storage.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}
