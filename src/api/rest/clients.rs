use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::client::Client;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clients", post(register_client))
        .route("/clients/:id", get(get_client))
}

#[derive(Deserialize)]
pub struct RegisterClientRequest {
    pub name: String,
}

async fn register_client(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterClientRequest>,
) -> Result<Json<Client>, AppError> {
    let client = state.clients.register(payload.name)?;
    Ok(Json(client))
}

async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let client = state.clients.get(id)?;
    Ok(Json(client))
}
