//! HTTP handlers for order operations
//!
//! Handlers only translate between HTTP and [`OrderService`]; every rule lives
//! in the service. Failures are returned as [`CafeError`] and rendered by its
//! `IntoResponse` impl.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::{CafeError, CafeResult, ValidationError};
use crate::core::order::{NewOrder, Order, OrderStatus};
use crate::core::query::ListOrdersParams;
use crate::core::service::OrderService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: OrderService,
}

impl AppState {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }
}

/// Body of `PUT /orders/{id}/status`
///
/// Accepts a bare JSON string (`"Completed"`) or an object
/// (`{"status": "Completed"}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatusUpdateRequest {
    Bare(String),
    Wrapped { status: String },
}

impl StatusUpdateRequest {
    pub fn status(self) -> Result<OrderStatus, ValidationError> {
        let raw = match self {
            StatusUpdateRequest::Bare(status) => status,
            StatusUpdateRequest::Wrapped { status } => status,
        };
        raw.trim().parse()
    }
}

fn invalid_body(rejection: JsonRejection) -> CafeError {
    ValidationError::InvalidBody {
        message: rejection.body_text(),
    }
    .into()
}

fn parse_order_id(id: &str) -> CafeResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| {
        ValidationError::InvalidUuid {
            value: id.to_string(),
        }
        .into()
    })
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> CafeResult<(StatusCode, Json<Order>)> {
    let Json(input) = payload.map_err(invalid_body)?;
    let order = state.service.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> CafeResult<Json<Order>> {
    let id = parse_order_id(&id)?;
    let order = state.service.get_order(id).await?;
    Ok(Json(order))
}

/// PUT /orders/{id}/status
///
/// Answers 200 with an empty body on success.
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> CafeResult<StatusCode> {
    let id = parse_order_id(&id)?;
    let Json(request) = payload.map_err(invalid_body)?;
    let status = request.status()?;

    state.service.update_order_status(id, status).await?;
    Ok(StatusCode::OK)
}

/// GET /orders?status=&from=&to=
pub async fn list_orders(
    State(state): State<AppState>,
    params: Result<Query<ListOrdersParams>, QueryRejection>,
) -> CafeResult<Json<Vec<Order>>> {
    let Query(params) = params.map_err(|rejection| ValidationError::FieldError {
        field: "query".to_string(),
        message: rejection.body_text(),
    })?;
    let filter = params.into_filter()?;

    let orders = state.service.list_orders(&filter).await?;
    Ok(Json(orders))
}
