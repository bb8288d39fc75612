//! Record listing and lookup handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    Json,
};

use crate::pagination::{Page, PageWindow, INVALID_PAGE};
use crate::{AppError, AppState};
use insights_core::{build_predicate, Record};

/// GET /api/records/list/ - Filtered, paginated records (newest first)
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Page<Record>>, AppError> {
    let predicate = build_predicate(&params);

    let count = state.db.count_records(&predicate)?;
    let window =
        PageWindow::resolve(&params, count).ok_or_else(|| AppError::not_found(INVALID_PAGE))?;

    let results = state
        .db
        .list_records(&predicate, window.size, window.offset())?;

    Ok(Json(Page::new(&window, count, &uri, results)))
}

/// GET /api/records/:id/ - Single record
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Record>, AppError> {
    let record = state
        .db
        .get_record(id)?
        .ok_or_else(|| AppError::not_found(&format!("Record {} not found", id)))?;

    Ok(Json(record))
}
