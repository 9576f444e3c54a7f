use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Station;

#[derive(Clone)]
pub struct StationsState {
    pub stations: Arc<Vec<Station>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationListResponse {
    pub stations: Vec<Station>,
}

/// List the configured stations
#[utoipa::path(
    get,
    path = "/api/stations",
    responses(
        (status = 200, description = "Configured stations, static for the process lifetime", body = StationListResponse)
    ),
    tag = "stations"
)]
pub async fn list_stations(State(state): State<StationsState>) -> Json<StationListResponse> {
    Json(StationListResponse {
        stations: state.stations.as_ref().clone(),
    })
}

pub fn router(stations: Arc<Vec<Station>>) -> Router {
    let state = StationsState { stations };
    Router::new()
        .route("/", get(list_stations))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn lists_stations_in_configured_order() {
        let stations = Arc::new(vec![
            Station {
                eva_id: 1370165,
                label: "Innsbruck Sillpark".to_string(),
            },
            Station {
                eva_id: 8100108,
                label: "Innsbruck Hauptbahnhof".to_string(),
            },
        ]);

        let response = router(stations)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_success());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["stations"][0]["evaId"], 1370165);
        assert_eq!(body["stations"][0]["label"], "Innsbruck Sillpark");
        assert_eq!(body["stations"][1]["evaId"], 8100108);
    }
}
