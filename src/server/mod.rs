//! HTTP adapter: form fields in, JSON out.
//!
//! Every route resolves a credential (the caller's `api_key` field, else the
//! configured fallback) and delegates to the turn, catalogue and history
//! operations.

pub mod error;
pub mod form;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ai::ClientFactory;
use crate::cache::TurnCache;

pub use error::ApiError;

/// Upload cap for `POST /api/send`.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<dyn ClientFactory>,
    pub cache: Arc<TurnCache>,
    pub default_model: String,
    pub fallback_api_key: Option<String>,
}

/// Cross-origin access is only opened up when every request has to bring
/// its own credential.
fn cors_layer(state: &AppState) -> CorsLayer {
    if state.fallback_api_key.is_some() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/api/models", get(handlers::list_models))
        .route(
            "/api/send",
            post(handlers::send_message).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/history/{response_id}", get(handlers::response_history))
        .route("/api/turns/{response_id}", get(handlers::cached_turn))
        .route("/api/conversations", post(handlers::create_conversation))
        .route(
            "/api/conversations/{conversation_id}/continue",
            post(handlers::continue_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/items",
            get(handlers::conversation_items),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
