//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::categories::require_group;
use super::reports::resolve_month;
use crate::{AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use aom_core::models::{NewTransaction, Transaction, TransactionSource};
use aom_core::Gamification;

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// "YYYY-MM"; defaults to the current local month
    pub month: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub month: String,
    pub transactions: Vec<Transaction>,
    pub limit: i64,
    pub offset: i64,
}

/// Request body for recording a transaction from the web app
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub user_id: String,
    pub category_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defaults to now
    pub occurred_at: Option<DateTime<Utc>>,
}

/// GET /api/groups/:id/transactions - List one month of a wallet's transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<i64>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    require_group(&state, group_id)?;
    let month = resolve_month(&state, params.month.as_deref())?;

    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let transactions = state
        .engine
        .db()
        .list_transactions(group_id, Some(&month), limit, offset)?;

    Ok(Json(TransactionResponse {
        month,
        transactions,
        limit,
        offset,
    }))
}

/// POST /api/groups/:id/transactions - Record a transaction entered on the web
///
/// Entries dated today count towards the user's streak like chat entries do.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<i64>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<Json<Transaction>, AppError> {
    require_group(&state, group_id)?;
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(AppError::bad_request("Amount must be a positive number"));
    }

    let db = state.engine.db();
    let user = db
        .get_user(&req.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if !db.is_group_member(group_id, &user.id)? {
        return Err(AppError::bad_request("User is not a member of this group"));
    }
    let category = db
        .get_category(req.category_id)?
        .filter(|c| c.group_id == group_id)
        .ok_or_else(|| AppError::bad_request("Category does not belong to this group"))?;

    let now = Utc::now();
    let occurred_at = req.occurred_at.unwrap_or(now);
    let calendar = state.engine.calendar();

    let mut tags: Vec<String> = Vec::new();
    for tag in req.tags {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let transaction = db.insert_transaction(&NewTransaction {
        group_id,
        user_id: user.id.clone(),
        category_id: Some(category.id),
        kind: category.kind,
        amount: req.amount,
        occurred_at,
        month: calendar.month_key(occurred_at),
        note: req.note.trim().to_string(),
        tags,
        source: TransactionSource::Web,
    })?;
    info!(
        user_id = %user.id,
        group_id,
        id = transaction.id,
        amount = transaction.amount,
        "Recorded web transaction"
    );

    let today = calendar.day(now);
    if calendar.day(occurred_at) == today {
        Gamification::new(db).record_activity(&user, today, now)?;
    }

    Ok(Json(transaction))
}

/// DELETE /api/transactions/:id - Delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.engine.db().delete_transaction(id)? {
        return Err(AppError::not_found("Transaction not found"));
    }
    info!(id, "Deleted transaction");
    Ok(Json(SuccessResponse { success: true }))
}
