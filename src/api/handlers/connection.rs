use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::middleware::AppError;
use crate::config::Config;
use crate::models::ConnectionSummary;
use crate::services::AttachPlanner;
use crate::storage::ConnectionCatalog;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ConnectionCatalog>,
    pub planner: Arc<AttachPlanner>,
    pub config: Config,
}

/// List catalog connections with the alias each one answers to
pub async fn list_connections(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let connections: Vec<ConnectionSummary> = state
        .catalog
        .list_connections()
        .await?
        .into_iter()
        .map(|connection| ConnectionSummary {
            alias: state.planner.alias_for(&connection),
            connection,
        })
        .collect();

    Ok(Json(serde_json::json!({
        "connections": connections
    })))
}

/// Get connection details
pub async fn get_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConnectionSummary>, AppError> {
    let connection = state
        .catalog
        .get_connection(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Connection {} not found", id)))?;

    Ok(Json(ConnectionSummary {
        alias: state.planner.alias_for(&connection),
        connection,
    }))
}
