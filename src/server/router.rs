//! Router assembly for the order API

use super::handlers::{AppState, create_order, get_order, list_orders, update_order_status};
use axum::{
    Json, Router,
    routing::{get, put},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Build the order routes
///
/// - POST /orders - Create an order
/// - GET /orders - List orders (`status`, `from`, `to` query parameters)
/// - GET /orders/{id} - Get a single order
/// - PUT /orders/{id}/status - Change an order's status
pub fn build_order_routes(state: AppState) -> Router {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
        .with_state(state)
}

/// Build health check routes
pub fn build_health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cafe-orders"
    }))
}

/// Merge health, order and custom routes under a request trace layer
pub fn build_router(state: AppState, custom_routes: Vec<Router>) -> Router {
    let mut app = build_health_routes().merge(build_order_routes(state));

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    app.layer(TraceLayer::new_for_http())
}
