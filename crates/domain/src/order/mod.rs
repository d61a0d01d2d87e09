//! Order aggregate and related types.

mod checkout;
mod number;
mod order;
mod service;
mod state;

pub use checkout::{CheckoutInput, CheckoutLine, ShippingAddress, ValidationError};
pub use number::OrderNumber;
pub use order::{Order, OrderLine};
pub use service::OrderService;
pub use state::{OrderStatus, PaymentMethod, PaymentStatus};

use thiserror::Error;

use crate::store::StorageError;

/// Errors reported by order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout submission rejected; nothing was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced order does not exist.
    #[error("order not found: {id}")]
    NotFound { id: String },

    /// Status-machine rule violation; persisted state is untouched.
    #[error("cannot {action} an order in the {current} state")]
    InvalidTransition {
        current: OrderStatus,
        action: &'static str,
    },

    /// Order-number collisions exhausted the retry budget.
    #[error("order creation failed after {attempts} attempts")]
    CreationFailed { attempts: u32 },

    /// Persistence-layer failure, surfaced as-is.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
