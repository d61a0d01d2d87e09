//! Order placement, lookup, and lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, UserId};
use domain::money::Money;
use domain::order::{
    CheckoutInput, CheckoutLine, Order, OrderService, PaymentMethod, PaymentStatus,
    ShippingAddress,
};
use domain::ProductId;
use domain::store::{OrderStore, ProductStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore, P: ProductStore> {
    pub orders: OrderService<S>,
    pub products: P,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub lines: Vec<OrderLineRequest>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct ShipRequest {
    pub tracking_number: String,
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub status: PaymentStatus,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub lines: Vec<OrderLineResponse>,
    pub shipping_address: ShippingAddress,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.number().to_string(),
            user_id: order.user_id().to_string(),
            status: order.status().to_string(),
            payment_status: order.payment_status().to_string(),
            payment_method: order.payment_method().to_string(),
            lines: order
                .lines()
                .iter()
                .map(|l| OrderLineResponse {
                    product_id: l.product_id.to_string(),
                    name: l.name.clone(),
                    unit_price_cents: l.unit_price.cents(),
                    quantity: l.quantity,
                    image: l.image.clone(),
                })
                .collect(),
            shipping_address: order.shipping_address().clone(),
            subtotal_cents: order.subtotal().cents(),
            shipping_cents: order.shipping().cents(),
            tax_cents: order.tax().cents(),
            total_cents: order.total().cents(),
            tracking_number: order.tracking_number().map(String::from),
            estimated_delivery: order.estimated_delivery().map(|d| d.to_rfc3339()),
            notes: order.notes().map(String::from),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /orders — validate a checkout submission and place the order.
#[tracing::instrument(skip(state, req))]
pub async fn place<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let user_id = parse_user_id(&req.user_id)?;

    let input = CheckoutInput {
        user_id,
        lines: req
            .lines
            .into_iter()
            .map(|l| CheckoutLine {
                product_id: ProductId::new(l.product_id),
                name: l.name,
                unit_price: Money::from_cents(l.unit_price_cents),
                quantity: l.quantity,
                image: l.image,
            })
            .collect(),
        shipping_address: req.shipping_address,
        payment_method: req.payment_method,
        notes: req.notes,
    };

    let order = state.orders.place_order(input).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders/:id — load an order by id.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.get_order(parse_order_id(&id)?).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// GET /users/:id/orders — the user's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state
        .orders
        .list_orders_for_user(parse_user_id(&id)?)
        .await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// POST /orders/:id/cancel — cancel a processing order.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.cancel_order(parse_order_id(&id)?).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/confirm — confirm a processing order.
#[tracing::instrument(skip(state))]
pub async fn confirm<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.confirm_order(parse_order_id(&id)?).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/ship — ship a confirmed order with a tracking number.
#[tracing::instrument(skip(state, req))]
pub async fn ship<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    Json(req): Json<ShipRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    if req.tracking_number.trim().is_empty() {
        return Err(ApiError::BadRequest("tracking_number is required".to_string()));
    }
    let order = state
        .orders
        .mark_shipped(parse_order_id(&id)?, req.tracking_number)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/deliver — mark a shipped order delivered.
#[tracing::instrument(skip(state))]
pub async fn deliver<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.mark_delivered(parse_order_id(&id)?).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/:id/payment — set the payment status.
#[tracing::instrument(skip(state, req))]
pub async fn payment<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .update_payment_status(parse_order_id(&id)?, req.status)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}

fn parse_user_id(id: &str) -> Result<UserId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid user id: {e}")))?;
    Ok(UserId::from_uuid(uuid))
}
