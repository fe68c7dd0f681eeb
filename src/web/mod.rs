// Web server — Axum-based HTTP front door for the moderation pipeline.
//
// POST /validate_post runs one moderation and returns JSON. The front end
// lives on a different origin, so CORS is restricted to the configured
// origin list with credentials allowed.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::moderation::orchestrator::ModerationOrchestrator;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ModerationOrchestrator>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let state = AppState {
        orchestrator: Arc::new(ModerationOrchestrator::from_config(&config)?),
    };

    let app = build_router(state, &config.allowed_origins);

    let addr = format!("{bind}:{port}");
    info!(
        deadline_secs = config.race.deadline.as_secs(),
        secondary_delay_secs = config.race.secondary_delay.as_secs(),
        "Postcheck listening on http://{addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router. Public so tests can drive it with stub providers.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/validate_post", post(handlers::moderate::validate_post))
        .route("/api/categories", get(handlers::categories::list_categories))
        .route("/health", get(health));

    api.layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Wildcards are not allowed together with credentials, so methods and
    // headers mirror the preflight request instead.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
