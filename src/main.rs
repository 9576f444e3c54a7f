pub mod api;
mod config;
mod providers;
mod sync;

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use sync::SyncManager;

#[derive(OpenApi)]
#[openapi(
    info(title = "Station Board API", version = "0.1.0"),
    paths(
        api::journeys::get_journeys,
        api::stations::list_stations,
        api::health::health_check,
    ),
    components(schemas(
        api::ErrorResponse,
        api::MessageResponse,
        api::journeys::JourneyListResponse,
        api::stations::StationListResponse,
        api::health::HealthResponse,
        config::Station,
        sync::Journey,
        sync::DelayStatus,
    )),
    tags(
        (name = "journeys", description = "Cached station board departures"),
        (name = "stations", description = "Configured stations"),
        (name = "health", description = "Service health check")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    // Load config
    let config = Config::load("config.yaml").expect("Failed to load config");
    tracing::info!(stations = config.stations.len(), "Loaded configuration");

    // Build CORS layer based on config
    let cors_layer = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode explicitly enabled (all origins allowed) - DO NOT USE IN PRODUCTION");
        CorsLayer::permissive()
    } else if !config.cors_origins.is_empty() {
        tracing::info!(origins = ?config.cors_origins, "CORS: Restricting to configured origins");
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        panic!("CORS configuration error: Either set 'cors_origins' with allowed origins, or set 'cors_permissive: true' for development");
    };

    let stations = Arc::new(config.stations.clone());
    let port = config.port;

    // Start sync manager
    let sync_manager =
        Arc::new(SyncManager::new(config).expect("Failed to initialize sync manager"));
    let board_store = sync_manager.board_store();

    // Fetch every configured board once so the first request already sees a
    // committed entry, then hand the periodic loops to the background.
    sync_manager.sync_once().await;
    let sync_manager_clone = sync_manager.clone();
    tokio::spawn(async move {
        sync_manager_clone.start().await;
    });

    // Build the app
    let app = Router::new()
        .nest("/api", api::router(board_store, stations))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(ServeDir::new("public"))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    // Start server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind listen port");

    tracing::info!("Station board running on http://localhost:{port}");
    tracing::info!("Swagger UI: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
