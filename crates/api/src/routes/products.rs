//! Catalog endpoints: storefront reads plus the admin write surface.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::UserId;
use domain::catalog::{Product, Review};
use domain::money::{Money, normalize_stock};
use domain::store::{OrderStore, ProductStore};
use domain::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

use super::orders::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price as submitted by forms; normalized to cents.
    pub price: f64,
    #[serde(default)]
    pub list_price: Option<f64>,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub stock: f64,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ReviewResponse {
    pub user_id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub date: String,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub list_price_cents: Option<i64>,
    pub category: String,
    pub image: String,
    pub stock: u32,
    pub rating: f64,
    pub reviews: Vec<ReviewResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price_cents: product.price.cents(),
            list_price_cents: product.list_price.map(|p| p.cents()),
            category: product.category.clone(),
            image: product.image.clone(),
            stock: product.stock,
            rating: product.rating,
            reviews: product
                .reviews
                .iter()
                .map(|r| ReviewResponse {
                    user_id: r.user_id.to_string(),
                    rating: r.rating,
                    comment: r.comment.clone(),
                    date: r.date.to_rfc3339(),
                })
                .collect(),
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// GET /products — all products, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

/// GET /products/:id — load one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .products
        .get(&ProductId::new(id.clone()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {id}")))?;
    Ok(Json(ProductResponse::from(&product)))
}

/// POST /products — create a product with normalized price and stock.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }

    let now = Utc::now();
    let product = Product {
        id: ProductId::new(uuid::Uuid::new_v4().to_string()),
        name: req.name,
        description: req.description,
        price: Money::from_amount(req.price),
        list_price: req.list_price.map(Money::from_amount),
        category: req.category,
        image: req.image,
        stock: normalize_stock(req.stock),
        rating: 0.0,
        reviews: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.products.insert(&product).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// PUT /products/:id — update display fields, price, and stock.
///
/// Reviews and the derived rating are untouched; they only change
/// through the review endpoint.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(id.clone());
    let mut product = state
        .products
        .get(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {id}")))?;

    product.name = req.name;
    product.description = req.description;
    product.price = Money::from_amount(req.price);
    product.list_price = req.list_price.map(Money::from_amount);
    product.category = req.category;
    product.image = req.image;
    product.set_stock(req.stock);
    product.updated_at = Utc::now();

    if !state.products.update(&product).await? {
        return Err(ApiError::NotFound(format!("product not found: {id}")));
    }
    Ok(Json(ProductResponse::from(&product)))
}

/// POST /products/:id/reviews — append a review; the rating is
/// recomputed by the store.
#[tracing::instrument(skip(state, req))]
pub async fn review<S: OrderStore, P: ProductStore>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let user_uuid = uuid::Uuid::parse_str(&req.user_id)
        .map_err(|e| ApiError::BadRequest(format!("invalid user id: {e}")))?;
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::BadRequest(format!(
            "rating must be between 1 and 5, got {}",
            req.rating
        )));
    }

    let now = Utc::now();
    let review = Review::new(UserId::from_uuid(user_uuid), req.rating, req.comment, now);
    let product = state
        .products
        .add_review(&ProductId::new(id.clone()), review, now)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {id}")))?;

    Ok(Json(ProductResponse::from(&product)))
}
