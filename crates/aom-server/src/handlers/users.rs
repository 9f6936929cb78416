//! User and journal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::reports::resolve_month;
use crate::{AppError, AppState};
use aom_core::models::{DailyJournal, Group, User};

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
    /// Every wallet the user belongs to, personal first
    pub groups: Vec<Group>,
}

/// Query parameters carrying an optional month
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// "YYYY-MM"; defaults to the current local month
    pub month: Option<String>,
}

/// GET /api/health - Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/users/:id - User profile, streak, achievements and wallets
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let db = state.engine.db();
    let user = db
        .get_user(&id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let groups = db.list_user_groups(&user.id)?;

    Ok(Json(UserResponse { user, groups }))
}

/// GET /api/users/:id/journals - Daily journal entries for one month
pub async fn list_journals(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<DailyJournal>>, AppError> {
    let month = resolve_month(&state, params.month.as_deref())?;
    let db = state.engine.db();
    if db.get_user(&id)?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    Ok(Json(db.list_journals(&id, &month)?))
}
