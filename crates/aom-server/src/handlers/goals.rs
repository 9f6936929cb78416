//! Savings goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::categories::require_group;
use crate::{AppError, AppState};
use aom_core::models::SavingsGoal;

/// GET /api/groups/:id/goals - List a wallet's savings goals, open goals first
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<i64>,
) -> Result<Json<Vec<SavingsGoal>>, AppError> {
    require_group(&state, group_id)?;
    Ok(Json(state.engine.db().list_goals(group_id)?))
}
