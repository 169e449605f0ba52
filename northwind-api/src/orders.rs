use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use northwind_core::Page;
use northwind_order::{CreateOrderRequest, OrderDetailRequest, OrderDetailResponse, OrderResponse};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/create", post(create_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/addproductstoorder", post(add_products_to_order))
        .route("/orders/{order_id}/delete", post(delete_order))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /orders?skip=&take=
pub async fn list_orders(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state.orders.list(page).await?;
    Ok(Json(orders))
}

/// GET /orders/:order_id
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.get_by_id(order_id).await?;
    Ok(Json(order))
}

/// POST /orders/create
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.create(req).await?;
    Ok(Json(order))
}

/// POST /orders/:order_id/addproductstoorder
pub async fn add_products_to_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(details): Json<Vec<OrderDetailRequest>>,
) -> Result<Json<Vec<OrderDetailResponse>>, AppError> {
    let added = state.orders.add_products_to_order(order_id, details).await?;
    Ok(Json(added))
}

/// POST /orders/:order_id/delete
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.orders.delete(order_id).await?;
    Ok(StatusCode::OK)
}
