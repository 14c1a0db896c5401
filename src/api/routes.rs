use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers::connection::{self, AppState};
use crate::api::handlers::planner;
use crate::config::Config;
use crate::services::AttachPlanner;
use crate::storage::ConnectionCatalog;

/// Create router with application state
pub fn create_router_with_state(
    catalog: Arc<dyn ConnectionCatalog>,
    planner: Arc<AttachPlanner>,
    config: Config,
) -> Router {
    let state = AppState {
        catalog,
        planner,
        config,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/connections", get(connection::list_connections))
        .route("/api/connections/{id}", get(connection::get_connection))
        .route("/api/sql/references", post(planner::extract_references))
        .route("/api/prefixes/match", post(planner::match_prefix))
        .route("/api/attach-plan", post(planner::plan_attachments))
        .route("/api/cache/stats", get(planner::cache_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
