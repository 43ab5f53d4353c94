//! HTTP gateway server built on axum.

use super::GatewayConfig;
use crate::error::PipelineError;
use crate::research::ResearchPipeline;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared handler state.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ResearchPipeline>,
}

impl GatewayState {
    pub fn new(pipeline: Arc<ResearchPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Body of `POST /api/research`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequest {
    pub biological_focus: String,
}

/// Build an axum Router with `/health` and `/api/research` routes.
pub fn router(state: GatewayState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/research", post(research_handler))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = origin.as_str(), "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check endpoint.
async fn health_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.pipeline.model_name(),
    }))
}

/// Run one pipeline for the requested focus and return the terminal state.
async fn research_handler(
    State(state): State<GatewayState>,
    Json(request): Json<ResearchRequest>,
) -> Response {
    let focus = request.biological_focus.trim().to_string();
    if focus.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, &PipelineError::InvalidFocus.to_string());
    }

    // A panicking stage must not take the connection down with it.
    let pipeline = Arc::clone(&state.pipeline);
    match tokio::spawn(async move { pipeline.run(focus).await }).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!(error = %e, "Research pipeline task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "research pipeline failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Start the gateway on the configured address.
///
/// Runs until Ctrl-C is received.
pub async fn run(config: &GatewayConfig, pipeline: Arc<ResearchPipeline>) -> Result<(), std::io::Error> {
    let app = router(GatewayState::new(pipeline), config);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = addr.as_str(), "TrustScout gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gateway");
        })
        .await?;
    Ok(())
}
