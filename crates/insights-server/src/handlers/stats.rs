//! Dashboard summary handlers: statistics, filter menus and facets

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{AppError, AppState};
use insights_core::models::Facets;
use insights_core::{build_predicate, FilterOptions, RecordStats};

/// GET /api/records/stats/ - Aggregate statistics over the filtered view
pub async fn record_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<RecordStats>, AppError> {
    let predicate = build_predicate(&params);
    let stats = state.db.record_stats(&predicate)?;
    Ok(Json(stats))
}

/// GET /api/records/filter-options/ - Distinct values for every filter menu
///
/// Always computed over the whole store; query parameters are ignored.
pub async fn filter_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilterOptions>, AppError> {
    Ok(Json(state.db.filter_options()?))
}

/// GET /api/records/facet/ - Value counts for every filter menu
pub async fn facets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Facets>, AppError> {
    let predicate = build_predicate(&params);
    Ok(Json(state.db.facets(&predicate)?))
}

/// GET /api/health - Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
