//! The persisted order record.

use chrono::{DateTime, Duration, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::catalog::ProductId;
use crate::money::Money;
use crate::pricing::Totals;

use super::OrderError;
use super::checkout::{CheckoutInput, ShippingAddress};
use super::number::OrderNumber;
use super::state::{OrderStatus, PaymentMethod, PaymentStatus};

/// Days between shipment and the estimated delivery date.
const DELIVERY_WINDOW_DAYS: i64 = 7;

/// A snapshotted order line.
///
/// Copied by value at placement time; later catalog edits cannot alter
/// a placed order's lines or totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl OrderLine {
    /// Line total: unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A placed order.
///
/// Monetary fields are computed once at placement and frozen; the
/// fulfillment status only moves through the transitions the status
/// machine allows. Orders are never deleted, only cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    number: OrderNumber,
    user_id: UserId,
    lines: Vec<OrderLine>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    status: OrderStatus,
    subtotal: Money,
    shipping: Money,
    tax: Money,
    total: Money,
    tracking_number: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Materializes an order from a validated checkout submission.
    ///
    /// Totals are recomputed here from the submitted lines; any
    /// client-side subtotal is ignored. Callers are expected to have
    /// run [`CheckoutInput::validate`] first.
    pub fn place(
        id: OrderId,
        number: OrderNumber,
        input: &CheckoutInput,
        now: DateTime<Utc>,
    ) -> Self {
        let lines: Vec<OrderLine> = input
            .lines
            .iter()
            .map(|l| OrderLine {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                unit_price: l.unit_price,
                quantity: l.quantity,
                image: l.image.clone(),
            })
            .collect();
        let totals = Totals::from_lines(lines.iter().map(|l| (l.unit_price, l.quantity)));

        Self {
            id,
            number,
            user_id: input.user_id,
            lines,
            shipping_address: input.shipping_address.clone(),
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Processing,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            total: totals.total,
            tracking_number: None,
            estimated_delivery: None,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// The human-readable order number, stable once assigned.
    pub fn number(&self) -> &OrderNumber {
        &self.number
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn estimated_delivery(&self) -> Option<DateTime<Utc>> {
        self.estimated_delivery
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Total quantity across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// Transitions. These mutate in place; writing the result back under the
// storage layer's conditional update is the service's concern.
impl Order {
    /// Confirms a processing order.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_confirm() {
            return Err(OrderError::InvalidTransition {
                current: self.status,
                action: "confirm",
            });
        }
        self.status = OrderStatus::Confirmed;
        self.touch(now);
        Ok(())
    }

    /// Cancels a processing order. Monetary fields are untouched.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidTransition {
                current: self.status,
                action: "cancel",
            });
        }
        self.status = OrderStatus::Cancelled;
        self.touch(now);
        Ok(())
    }

    /// Ships a confirmed order, recording the tracking number and an
    /// estimated delivery date seven days out.
    pub fn mark_shipped(
        &mut self,
        tracking_number: String,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if !self.status.can_ship() {
            return Err(OrderError::InvalidTransition {
                current: self.status,
                action: "ship",
            });
        }
        self.status = OrderStatus::Shipped;
        self.tracking_number = Some(tracking_number);
        self.estimated_delivery = Some(now + Duration::days(DELIVERY_WINDOW_DAYS));
        self.touch(now);
        Ok(())
    }

    /// Marks a shipped order delivered.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_deliver() {
            return Err(OrderError::InvalidTransition {
                current: self.status,
                action: "deliver",
            });
        }
        self.status = OrderStatus::Delivered;
        self.touch(now);
        Ok(())
    }

    /// Sets the payment status. The payment axis carries no ordering
    /// constraint beyond enum membership.
    pub fn set_payment_status(&mut self, status: PaymentStatus, now: DateTime<Utc>) {
        self.payment_status = status;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::checkout::CheckoutLine;

    fn checkout() -> CheckoutInput {
        CheckoutInput {
            user_id: UserId::new(),
            lines: vec![
                CheckoutLine {
                    product_id: ProductId::new("p1"),
                    name: "Desk Lamp".to_string(),
                    unit_price: Money::from_dollars(100),
                    quantity: 2,
                    image: Some("lamp.jpg".to_string()),
                },
                CheckoutLine {
                    product_id: ProductId::new("p2"),
                    name: "Bookend".to_string(),
                    unit_price: Money::from_cents(12_50),
                    quantity: 1,
                    image: None,
                },
            ],
            shipping_address: ShippingAddress {
                name: "Priya Sharma".to_string(),
                email: "priya@example.com".to_string(),
                street: "12 Lake Road".to_string(),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                postal_code: "411001".to_string(),
                country: "India".to_string(),
            },
            payment_method: PaymentMethod::Upi,
            notes: Some("leave at the door".to_string()),
        }
    }

    fn placed() -> Order {
        Order::place(
            OrderId::new(),
            OrderNumber::generate(),
            &checkout(),
            Utc::now(),
        )
    }

    #[test]
    fn test_place_recomputes_totals() {
        let order = placed();
        // 2 x $100.00 + 1 x $12.50 = $212.50; shipping $40; tax 5% = $10.63 (rounded).
        assert_eq!(order.subtotal(), Money::from_cents(212_50));
        assert_eq!(order.shipping(), Money::from_dollars(40));
        assert_eq!(order.tax(), Money::from_cents(10_63));
        assert_eq!(order.total(), order.subtotal() + order.shipping() + order.tax());
    }

    #[test]
    fn test_place_starts_processing_and_pending() {
        let order = placed();
        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert!(order.tracking_number().is_none());
        assert!(order.estimated_delivery().is_none());
    }

    #[test]
    fn test_cancel_from_processing() {
        let mut order = placed();
        order.cancel(Utc::now()).unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_cancel_twice_fails_and_keeps_state() {
        let mut order = placed();
        order.cancel(Utc::now()).unwrap();
        let err = order.cancel(Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                current: OrderStatus::Cancelled,
                action: "cancel"
            }
        ));
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_cancel_does_not_touch_money() {
        let mut order = placed();
        let total = order.total();
        order.cancel(Utc::now()).unwrap();
        assert_eq!(order.total(), total);
    }

    #[test]
    fn test_ship_requires_confirmation() {
        let mut order = placed();
        let err = order
            .mark_shipped("TRK-1".to_string(), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                current: OrderStatus::Processing,
                action: "ship"
            }
        ));
    }

    #[test]
    fn test_full_lifecycle() {
        let mut order = placed();
        let now = Utc::now();

        order.confirm(now).unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);

        order.mark_shipped("TRK-42".to_string(), now).unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.tracking_number(), Some("TRK-42"));
        assert_eq!(order.estimated_delivery(), Some(now + Duration::days(7)));

        order.mark_delivered(now).unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.status().is_terminal());
    }

    #[test]
    fn test_cancel_shipped_order_rejected() {
        let mut order = placed();
        let now = Utc::now();
        order.confirm(now).unwrap();
        order.mark_shipped("TRK-1".to_string(), now).unwrap();

        assert!(order.cancel(now).is_err());
        assert_eq!(order.status(), OrderStatus::Shipped);
    }

    #[test]
    fn test_payment_axis_is_independent() {
        let mut order = placed();
        let now = Utc::now();
        order.cancel(now).unwrap();

        // A refund can still land on a cancelled order.
        order.set_payment_status(PaymentStatus::Refunded, now);
        assert_eq!(order.payment_status(), PaymentStatus::Refunded);
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_item_count() {
        assert_eq!(placed().item_count(), 3);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let order = placed();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
