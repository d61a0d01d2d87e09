//! High-level order operations over a storage port.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};

use crate::store::{OrderStore, StorageError};

use super::OrderError;
use super::checkout::CheckoutInput;
use super::number::OrderNumber;
use super::order::Order;
use super::state::PaymentStatus;

/// Attempts before a persistent order-number collision is given up on.
const MAX_PLACEMENT_ATTEMPTS: u32 = 3;

/// Service for placing orders and driving their lifecycle.
///
/// Owns no state beyond the storage port; every call is a single
/// short-lived operation suitable for stateless request handlers.
pub struct OrderService<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and persists a checkout submission as a new order.
    ///
    /// The subtotal is recomputed from the submitted lines; on an
    /// order-number collision the number is redrawn, up to the retry
    /// budget.
    #[tracing::instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn place_order(&self, input: CheckoutInput) -> Result<Order, OrderError> {
        input.validate()?;

        for attempt in 1..=MAX_PLACEMENT_ATTEMPTS {
            let order = Order::place(OrderId::new(), OrderNumber::generate(), &input, Utc::now());
            match self.store.insert(&order).await {
                Ok(()) => {
                    metrics::counter!("orders_placed_total").increment(1);
                    tracing::info!(
                        order_id = %order.id(),
                        number = %order.number(),
                        total_cents = order.total().cents(),
                        "order placed"
                    );
                    return Ok(order);
                }
                Err(StorageError::DuplicateOrderNumber { number }) => {
                    metrics::counter!("order_number_collisions_total").increment(1);
                    tracing::warn!(%number, attempt, "order number collision, redrawing");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(OrderError::CreationFailed {
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })
    }

    /// Loads an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound { id: id.to_string() })
    }

    /// Loads an order by its human-readable number.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_number(&self, number: &OrderNumber) -> Result<Order, OrderError> {
        self.store
            .find_by_number(number)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                id: number.to_string(),
            })
    }

    /// Orders placed by a user, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    /// Cancels a processing order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<Order, OrderError> {
        let order = self.transition(id, "cancel", |o, now| o.cancel(now)).await?;
        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(order)
    }

    /// Confirms a processing order.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.transition(id, "confirm", |o, now| o.confirm(now)).await
    }

    /// Ships a confirmed order, recording the tracking number.
    #[tracing::instrument(skip(self, tracking_number))]
    pub async fn mark_shipped(
        &self,
        id: OrderId,
        tracking_number: String,
    ) -> Result<Order, OrderError> {
        self.transition(id, "ship", move |o, now| o.mark_shipped(tracking_number, now))
            .await
    }

    /// Marks a shipped order delivered.
    #[tracing::instrument(skip(self))]
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, OrderError> {
        self.transition(id, "deliver", |o, now| o.mark_delivered(now))
            .await
    }

    /// Sets the payment status; any enumerated value is accepted.
    #[tracing::instrument(skip(self))]
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        self.store
            .set_payment_status(id, status, Utc::now())
            .await?
            .ok_or_else(|| OrderError::NotFound { id: id.to_string() })
    }

    /// Loads an order, applies a transition, and writes it back
    /// conditionally on the status the transition started from.
    ///
    /// A concurrent writer that moves the status first makes the
    /// conditional write miss; the miss is reported as an invalid
    /// transition against the freshly persisted status, never as a
    /// partial write.
    async fn transition<F>(
        &self,
        id: OrderId,
        action: &'static str,
        apply: F,
    ) -> Result<Order, OrderError>
    where
        F: FnOnce(&mut Order, DateTime<Utc>) -> Result<(), OrderError>,
    {
        let mut order = self.get_order(id).await?;
        let expected = order.status();
        apply(&mut order, Utc::now())?;

        if self.store.update_if_status(&order, expected).await? {
            return Ok(order);
        }

        match self.store.get(id).await? {
            Some(current) => Err(OrderError::InvalidTransition {
                current: current.status(),
                action,
            }),
            None => Err(OrderError::NotFound { id: id.to_string() }),
        }
    }
}
