pub mod health;
pub mod journeys;
pub mod stations;

use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Station;
use crate::sync::BoardStore;

/// Body for error responses carrying diagnostic detail
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

/// Body for plain informational responses
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

pub fn router(board_store: BoardStore, stations: Arc<Vec<Station>>) -> Router {
    Router::new()
        .nest(
            "/journeys",
            journeys::router(board_store.clone(), stations.clone()),
        )
        .nest("/stations", stations::router(stations.clone()))
        .nest("/health", health::router(board_store, stations))
}
