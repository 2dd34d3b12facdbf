use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - REST API for programmatic access
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Query endpoints
            .route("/query", post(handlers::api::execute_query))
            .route("/nl-query", post(handlers::api::nl_query))
            // Speech input
            .route("/transcribe", post(handlers::api::transcribe))
            .route("/languages", get(handlers::api::list_languages))
            // Schema introspection
            .route("/schema", get(handlers::api::get_schema))
            // Chart building
            .route("/chart", post(handlers::api::build_chart))
            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
