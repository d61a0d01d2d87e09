//! Storage backends for the storefront order engine.
//!
//! Two implementations of the `domain` storage ports: an in-memory
//! store used by tests and the default server, and a PostgreSQL store
//! keeping document-style JSONB rows with the columns the engine
//! filters and constrains on (unique order number, owning user,
//! current status).

mod memory;
mod postgres;

pub use memory::{InMemoryOrderStore, InMemoryProductStore, MemoryKeyValueStore};
pub use postgres::{PostgresOrderStore, PostgresProductStore, connect};
pub use sqlx::PgPool;
