use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{ErrorResponse, MessageResponse};
use crate::config::Station;
use crate::sync::{BoardStore, Journey};

/// Shown when a station has no committed board yet (unknown or never fetched)
const STATION_NOT_LOADED: &str = "Noch keine Verbindungen gefunden (Station nicht geladen).";
/// Shown when the upstream legitimately returned an empty board
const NO_JOURNEYS: &str = "Aktuell keine Verbindungen gefunden.";
/// Generic label for fetch failures; the stored message goes into `details`
const FETCH_ERROR: &str = "Error fetching station board data.";

#[derive(Clone)]
pub struct JourneysState {
    pub board_store: BoardStore,
    pub stations: Arc<Vec<Station>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JourneysQuery {
    /// Station identifier; defaults to the first configured station
    #[serde(rename = "evaId")]
    pub eva_id: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JourneyListResponse {
    /// When the served snapshot was committed (RFC 3339), null before the
    /// first successful fetch
    pub updated_at: Option<String>,
    pub journeys: Vec<Journey>,
}

/// Journeys for a station, served from the in-memory board cache.
///
/// Never triggers an upstream fetch: the response reflects the latest
/// committed cycle, good or bad.
#[utoipa::path(
    get,
    path = "/api/journeys",
    params(JourneysQuery),
    responses(
        (status = 200, description = "Latest committed board for the station", body = JourneyListResponse),
        (status = 404, description = "Station not loaded, or no journeys currently available", body = MessageResponse),
        (status = 500, description = "Upstream fetch failed and no journeys are cached", body = ErrorResponse)
    ),
    tag = "journeys"
)]
pub async fn get_journeys(
    State(state): State<JourneysState>,
    Query(query): Query<JourneysQuery>,
) -> Response {
    let eva_id = query
        .eva_id
        .or_else(|| state.stations.first().map(|s| s.eva_id));

    let Some(eva_id) = eva_id else {
        return not_loaded();
    };

    let boards = state.board_store.read().await;
    let Some(board) = boards.get(&eva_id) else {
        return not_loaded();
    };

    if board.journeys.is_empty() {
        if let Some(details) = &board.last_error {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: FETCH_ERROR.to_string(),
                    details: details.clone(),
                }),
            )
                .into_response();
        }

        return (
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: NO_JOURNEYS.to_string(),
            }),
        )
            .into_response();
    }

    Json(JourneyListResponse {
        updated_at: board.last_update.map(|t| t.to_rfc3339()),
        journeys: board.journeys.clone(),
    })
    .into_response()
}

fn not_loaded() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse {
            message: STATION_NOT_LOADED.to_string(),
        }),
    )
        .into_response()
}

pub fn router(board_store: BoardStore, stations: Arc<Vec<Station>>) -> Router {
    let state = JourneysState {
        board_store,
        stations,
    };
    Router::new().route("/", get(get_journeys)).with_state(state)
}
