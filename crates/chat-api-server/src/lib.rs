use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod database;
pub mod document;
pub mod handlers;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test;

use database::Repository;
use services::ChatService;

pub fn build_router(chat_service: Arc<ChatService>, repository: Arc<Repository>) -> Router {
    Router::new()
        .route("/", get(handlers::health::liveness))
        .route("/health", get(handlers::health::health_check))
        .route("/api/chat", post(handlers::chat::chat_handler))
        .route(
            "/api/conversations/{session_id}",
            get(handlers::chat::conversation_handler),
        )
        .route("/api/sessions", get(handlers::chat::sessions_handler))
        // Shared state
        .layer(Extension(chat_service))
        .layer(Extension(repository))
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(TraceLayer::new_for_http())
}
