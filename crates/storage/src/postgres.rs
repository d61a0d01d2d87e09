use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use common::{OrderId, UserId};
use domain::catalog::{Product, ProductId, Review};
use domain::order::{Order, OrderNumber, OrderStatus, PaymentStatus};
use domain::store::{OrderStore, ProductStore, StorageError};

/// Connects a pool suitable for the PostgreSQL stores.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

fn backend(err: sqlx::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

/// PostgreSQL-backed order store.
///
/// Orders are stored document-style: the full serialized record in a
/// JSONB column, plus the columns the store constrains and filters on
/// (id, unique order number, owning user, current status). Status
/// transitions are conditional single-statement updates keyed on the
/// expected current status.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order, StorageError> {
        let doc: serde_json::Value = row.try_get("doc").map_err(backend)?;
        Ok(serde_json::from_value(doc)?)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StorageError> {
        let doc = serde_json::to_value(order)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, user_id, order_status, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.number().as_str())
        .bind(order.user_id().as_uuid())
        .bind(order.status().as_str())
        .bind(&doc)
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_order_number_key")
            {
                return StorageError::DuplicateOrderNumber {
                    number: order.number().to_string(),
                };
            }
            backend(e)
        })?;

        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        let row = sqlx::query("SELECT doc FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorageError> {
        let row = sqlx::query("SELECT doc FROM orders WHERE order_number = $1")
            .bind(number.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.map(Self::row_to_order).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StorageError> {
        let rows = sqlx::query(
            "SELECT doc FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<bool, StorageError> {
        let doc = serde_json::to_value(order)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET doc = $3, order_status = $4, updated_at = $5
            WHERE id = $1 AND order_status = $2
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(expected.as_str())
        .bind(&doc)
        .bind(order.status().as_str())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Order>, StorageError> {
        // Single-statement field update; no read-modify-write window.
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET doc = jsonb_set(
                    jsonb_set(doc, '{payment_status}', to_jsonb($2::text)),
                    '{updated_at}', to_jsonb($3::timestamptz)
                ),
                updated_at = $3
            WHERE id = $1
            RETURNING doc
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Self::row_to_order).transpose()
    }
}

/// PostgreSQL-backed product store, same document-style layout as the
/// order store.
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Creates a new PostgreSQL product store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: PgRow) -> Result<Product, StorageError> {
        let doc: serde_json::Value = row.try_get("doc").map_err(backend)?;
        Ok(serde_json::from_value(doc)?)
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StorageError> {
        let row = sqlx::query("SELECT doc FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.map(Self::row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, StorageError> {
        let rows = sqlx::query("SELECT doc FROM products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn insert(&self, product: &Product) -> Result<(), StorageError> {
        let doc = serde_json::to_value(product)?;

        sqlx::query(
            r#"
            INSERT INTO products (id, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product.id.as_str())
        .bind(&doc)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, StorageError> {
        let doc = serde_json::to_value(product)?;

        let result = sqlx::query("UPDATE products SET doc = $2, updated_at = $3 WHERE id = $1")
            .bind(product.id.as_str())
            .bind(&doc)
            .bind(product.updated_at)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_review(
        &self,
        id: &ProductId,
        review: Review,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StorageError> {
        // Row-locked read-modify-write so concurrent reviews cannot
        // clobber each other's rating recomputation.
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query("SELECT doc FROM products WHERE id = $1 FOR UPDATE")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let doc: serde_json::Value = row.try_get("doc").map_err(backend)?;
        let mut product: Product = serde_json::from_value(doc)?;
        product.add_review(review, now);

        let doc = serde_json::to_value(&product)?;
        sqlx::query("UPDATE products SET doc = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_str())
            .bind(&doc)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(Some(product))
    }
}
