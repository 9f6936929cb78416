//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use aom_core::models::{Category, Group, NewCategory, TransactionKind};

/// Query parameters for listing categories
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    /// "income" or "expense"
    pub kind: Option<String>,
}

/// Look up a wallet or answer 404
pub(crate) fn require_group(state: &AppState, group_id: i64) -> Result<Group, AppError> {
    state
        .engine
        .db()
        .get_group(group_id)?
        .ok_or_else(|| AppError::not_found("Group not found"))
}

/// GET /api/groups/:id/categories - List a wallet's categories in storage order
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<i64>,
    Query(params): Query<CategoryQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    require_group(&state, group_id)?;

    let kind = params
        .kind
        .as_deref()
        .map(|k| k.parse::<TransactionKind>())
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    Ok(Json(state.engine.db().list_categories(group_id, kind)?))
}

/// POST /api/groups/:id/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<i64>,
    Json(req): Json<NewCategory>,
) -> Result<Json<Category>, AppError> {
    require_group(&state, group_id)?;

    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Category name is required"));
    }
    if let Some(limit) = req.budget_limit {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(AppError::bad_request("Budget limit must be positive"));
        }
    }

    let category = state.engine.db().create_category(group_id, &req)?;
    tracing::info!(group_id, id = category.id, name = %category.name, "Created category");
    Ok(Json(category))
}
