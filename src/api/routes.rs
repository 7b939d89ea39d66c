use super::error::ApiError;
use crate::core::assistant::{AssistantReply, AssistantRequest, RequestHandler};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, Method},
    routing::{any, get},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<dyn RequestHandler>,
}

/// Builds the router: the assistant endpoint on `/` (any method) and a
/// liveness probe on `/healthz`.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", any(assistant_endpoint))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(cors_origins))
        .with_state(state)
}

fn setup_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    cors.allow_origin(allowed)
}

async fn health() -> &'static str {
    "ok"
}

pub async fn assistant_endpoint(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AssistantReply>, ApiError> {
    let request = parse_request(&body);
    let reply = state.assistant.handle(request).await?;
    Ok(Json(reply))
}

/// A body that isn't a JSON object is treated as a request with no fields,
/// which the core then rejects for its missing `type`.
fn parse_request(body: &[u8]) -> AssistantRequest {
    if body.is_empty() {
        return AssistantRequest::default();
    }

    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!("Unreadable request body: {}", e);
        AssistantRequest::default()
    })
}
