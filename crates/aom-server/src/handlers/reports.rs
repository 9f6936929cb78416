//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use super::categories::require_group;
use super::users::MonthQuery;
use crate::{AppError, AppState};
use aom_core::calendar::parse_month_key;
use aom_core::models::{BudgetStatus, CategoryTotal, MonthSummary, TransactionKind};

/// Validate a "YYYY-MM" parameter, defaulting to the current local month
pub(crate) fn resolve_month(state: &AppState, month: Option<&str>) -> Result<String, AppError> {
    match month {
        Some(m) => parse_month_key(m)
            .ok_or_else(|| AppError::bad_request(&format!("Invalid month: {} (expected YYYY-MM)", m))),
        None => Ok(state.engine.calendar().month_key(Utc::now())),
    }
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: MonthSummary,
    pub balance: f64,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
    pub budgets: Vec<BudgetStatus>,
}

/// GET /api/groups/:id/summary - Month totals, per-category breakdown and budgets
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<i64>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    require_group(&state, group_id)?;
    let month = resolve_month(&state, params.month.as_deref())?;
    let db = state.engine.db();

    let summary = db.month_summary(group_id, &month)?;
    Ok(Json(SummaryResponse {
        balance: summary.balance(),
        expenses_by_category: db.category_totals(group_id, &month, TransactionKind::Expense)?,
        income_by_category: db.category_totals(group_id, &month, TransactionKind::Income)?,
        budgets: db.budget_statuses(
            group_id,
            &month,
            state.engine.config().default_alert_percent,
        )?,
        summary,
    }))
}
