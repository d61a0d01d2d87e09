//! Storage ports implemented by the `storage` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use thiserror::Error;

use crate::catalog::{Product, ProductId, Review};
use crate::order::{Order, OrderNumber, OrderStatus, PaymentStatus};

/// Errors surfaced by storage implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The order number is already taken (uniqueness constraint).
    #[error("order number already exists: {number}")]
    DuplicateOrderNumber { number: String },

    /// Backend failure: connection, query, timeout.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A persisted document failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Order persistence port.
///
/// Implementations must provide two atomicity guarantees: `insert`
/// enforces the order-number uniqueness constraint, and
/// `update_if_status` is a conditional write keyed on the expected
/// current status so racing transitions cannot lose updates. Nothing
/// here retries; callers see every failure.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order atomically.
    ///
    /// Fails with [`StorageError::DuplicateOrderNumber`] when the
    /// order's number is already present.
    async fn insert(&self, order: &Order) -> Result<(), StorageError>;

    /// Loads an order by id.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, StorageError>;

    /// Loads an order by its human-readable number.
    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorageError>;

    /// Orders placed by a user, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StorageError>;

    /// Writes `order` only if the stored document's status still equals
    /// `expected`. Returns false when nothing matched, whether the
    /// order is missing or its status has moved on.
    async fn update_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<bool, StorageError>;

    /// Atomically sets the payment status on an order, by id.
    ///
    /// Returns the updated order, or None when the order is missing.
    async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Order>, StorageError>;
}

/// Catalog persistence port. The cart and order flows only read it;
/// the admin surface writes through it.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Loads a product by id.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StorageError>;

    /// All products, newest first.
    async fn list(&self) -> Result<Vec<Product>, StorageError>;

    /// Persists a new product.
    async fn insert(&self, product: &Product) -> Result<(), StorageError>;

    /// Replaces an existing product. Returns false when absent.
    async fn update(&self, product: &Product) -> Result<bool, StorageError>;

    /// Appends a review and recomputes the derived rating, atomically
    /// per product. Returns the updated product, or None when absent.
    async fn add_review(
        &self,
        id: &ProductId,
        review: Review,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StorageError>;
}
