use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Station;
use crate::sync::BoardStore;

#[derive(Clone)]
pub struct HealthState {
    pub board_store: BoardStore,
    pub stations: Arc<Vec<Station>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Whether the service is running
    pub healthy: bool,
    /// Number of configured stations
    pub stations_tracked: usize,
    /// Stations with at least one successfully committed board
    pub boards_loaded: usize,
    /// Stations whose most recent fetch failed
    pub boards_errored: usize,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    let boards = state.board_store.read().await;
    let boards_loaded = boards.values().filter(|b| b.last_update.is_some()).count();
    let boards_errored = boards.values().filter(|b| b.last_error.is_some()).count();

    Json(HealthResponse {
        healthy: true,
        stations_tracked: state.stations.len(),
        boards_loaded,
        boards_errored,
    })
}

pub fn router(board_store: BoardStore, stations: Arc<Vec<Station>>) -> Router {
    let state = HealthState {
        board_store,
        stations,
    };
    Router::new().route("/", get(health_check)).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::StationBoard;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn counts_loaded_and_errored_boards() {
        let mut boards = HashMap::new();
        boards.insert(
            1,
            StationBoard {
                journeys: Vec::new(),
                last_update: Some(Utc::now()),
                last_error: None,
            },
        );
        boards.insert(
            2,
            StationBoard {
                journeys: Vec::new(),
                last_update: None,
                last_error: Some("Network error: timeout".to_string()),
            },
        );

        let state = HealthState {
            board_store: Arc::new(RwLock::new(boards)),
            stations: Arc::new(vec![
                Station {
                    eva_id: 1,
                    label: "A".to_string(),
                },
                Station {
                    eva_id: 2,
                    label: "B".to_string(),
                },
                Station {
                    eva_id: 3,
                    label: "C".to_string(),
                },
            ]),
        };

        let Json(body) = health_check(State(state)).await;

        assert!(body.healthy);
        assert_eq!(body.stations_tracked, 3);
        assert_eq!(body.boards_loaded, 1);
        assert_eq!(body.boards_errored, 1);
    }
}
