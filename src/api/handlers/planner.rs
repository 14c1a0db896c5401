// Attachment Planning Handlers
//
// Thin HTTP wrappers over the attach planner. The planner itself never
// fails; only request validation and catalog access can.

use axum::{extract::State, Json};

use crate::api::handlers::connection::AppState;
use crate::api::middleware::AppError;
use crate::models::{
    AttachPlan, AttachPlanRequest, ExtractReferencesRequest, PrefixMatchRequest,
    PrefixMatchResult,
};
use crate::services::CacheStats;

fn validate_query(query: &str, max_length: usize) -> Result<(), AppError> {
    if query.len() > max_length {
        return Err(AppError::Validation(format!(
            "SQL text is {} bytes; the limit is {} bytes",
            query.len(),
            max_length
        )));
    }
    Ok(())
}

/// Extract table references from SQL text
///
/// # Request Body
///
/// ```json
/// { "query": "SELECT * FROM mysql_orders.users u JOIN local_table t ON u.id = t.user_id" }
/// ```
pub async fn extract_references(
    State(state): State<AppState>,
    Json(payload): Json<ExtractReferencesRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_query(&payload.query, state.config.planner.max_sql_length)?;

    let references = state.planner.extract_references(&payload.query);
    tracing::debug!("Extracted {} table reference(s)", references.len());

    Ok(Json(serde_json::json!({
        "references": references.as_slice(),
    })))
}

/// Resolve a single database prefix against the catalog
pub async fn match_prefix(
    State(state): State<AppState>,
    Json(payload): Json<PrefixMatchRequest>,
) -> Result<Json<PrefixMatchResult>, AppError> {
    if payload.prefix.trim().is_empty() {
        return Err(AppError::Validation("Prefix cannot be empty".to_string()));
    }

    let connections = state.catalog.list_connections().await?;
    Ok(Json(state.planner.match_prefix(&payload.prefix, &connections)))
}

/// Build the attachment plan for a query
///
/// # Request Body
///
/// ```json
/// {
///   "query": "SELECT * FROM mysql_orders.users u JOIN pg_crm.accounts a ON u.id = a.user_id",
///   "selected_tables": [{ "alias": "pg_crm", "connection_id": "conn-2" }],
///   "manual_additions": []
/// }
/// ```
///
/// # Response
///
/// The deduplicated attachments in priority order, unrecognized prefixes,
/// ambiguity warnings and the references the plan was built from.
pub async fn plan_attachments(
    State(state): State<AppState>,
    Json(payload): Json<AttachPlanRequest>,
) -> Result<Json<AttachPlan>, AppError> {
    validate_query(&payload.query, state.config.planner.max_sql_length)?;

    let connections = state.catalog.list_connections().await.map_err(|e| {
        tracing::error!("Failed to load connection catalog: {}", e);
        e
    })?;

    let plan = state.planner.plan(
        &payload.query,
        &connections,
        &payload.selected_tables,
        &payload.manual_additions,
    );

    for prefix in &plan.merge.unrecognized_prefixes {
        tracing::warn!("Unknown database prefix in query: {}", prefix);
    }

    Ok(Json(plan))
}

/// Reference cache statistics
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.planner.cache_stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query_length() {
        assert!(validate_query("SELECT 1", 100).is_ok());
        assert!(validate_query("", 0).is_ok());

        let err = validate_query("SELECT * FROM t", 5).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
