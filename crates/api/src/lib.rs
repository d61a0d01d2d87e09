//! HTTP API server for the storefront order engine.
//!
//! Exposes order placement and lifecycle endpoints plus the product
//! catalog, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::OrderService;
use domain::store::{OrderStore, ProductStore};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::{InMemoryOrderStore, InMemoryProductStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, P>(state: Arc<AppState<S, P>>, metrics_handle: PrometheusHandle) -> Router
where
    S: OrderStore + 'static,
    P: ProductStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<S, P>))
        .route("/orders/{id}", get(routes::orders::get::<S, P>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S, P>))
        .route("/orders/{id}/confirm", post(routes::orders::confirm::<S, P>))
        .route("/orders/{id}/ship", post(routes::orders::ship::<S, P>))
        .route("/orders/{id}/deliver", post(routes::orders::deliver::<S, P>))
        .route("/orders/{id}/payment", put(routes::orders::payment::<S, P>))
        .route("/users/{id}/orders", get(routes::orders::list_for_user::<S, P>))
        .route(
            "/products",
            get(routes::products::list::<S, P>).post(routes::products::create::<S, P>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<S, P>).put(routes::products::update::<S, P>),
        )
        .route(
            "/products/{id}/reviews",
            post(routes::products::review::<S, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the in-memory stores, used by tests
/// and by the server when no database is configured.
pub fn create_default_state() -> Arc<AppState<InMemoryOrderStore, InMemoryProductStore>> {
    Arc::new(AppState {
        orders: OrderService::new(InMemoryOrderStore::new()),
        products: InMemoryProductStore::new(),
    })
}
