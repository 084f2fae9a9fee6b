use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::engine::dispatch;
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::orders::NewOrder;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/:id/assign", post(assign_order))
        .route("/orders/:id/release", post(release_order))
        .route("/orders/:id/status", patch(update_order_status))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: Uuid,
    pub delivery_address: String,
    pub delivery_location: GeoPoint,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub delivery_address: String,
    pub delivery_location: GeoPoint,
}

#[derive(Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.delivery_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "delivery_address cannot be empty".to_string(),
        ));
    }

    let order = state.orders.create(
        NewOrder {
            client_id: payload.client_id,
            delivery_address: payload.delivery_address,
            delivery_location: payload.delivery_location,
        },
        &state.clients,
    )?;
    state.metrics.orders_created_total.inc();

    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.orders.list())
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders.get(id)?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.delivery_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "delivery_address cannot be empty".to_string(),
        ));
    }

    let mut order = state.orders.get(id)?;
    order.delivery_address = payload.delivery_address;
    order.delivery_location = payload.delivery_location;

    let updated = state.orders.update(order)?;
    Ok(Json(updated))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.orders.delete(id)?;
    Ok(Json(json!({ "message": "order deleted" })))
}

async fn assign_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::assign(&state, id)?;
    Ok(Json(order))
}

async fn release_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    dispatch::release(&state, id)?;
    Ok(Json(json!({ "message": "courier released" })))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::transition_order(&state, id, payload.status)?;
    Ok(Json(order))
}
