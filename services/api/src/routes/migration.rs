//! Administrative migration handlers
//!
//! Any authenticated caller may trigger these; there is no admin role check.

use axum::{Json, extract::State, response::IntoResponse};
use ledger::migration::{fix_orphans_for_all_users, run_for_all_users, status};
use serde_json::json;
use tracing::{error, info};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
};

/// Seed default categories where missing and reassign orphan expenses
pub async fn migrate_default_categories(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let results = run_for_all_users(&state.store).await.map_err(|e| {
        error!(context = "migrate-default-categories", error = %e, "Migration failed");
        ApiError::InternalServerError
    })?;

    info!(
        total_users = results.total_users,
        errors = results.errors.len(),
        "Default categories migration triggered over HTTP"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Migration completed",
        "results": results,
    })))
}

/// Read-only migration status
pub async fn check_migration_status(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let report = status(&state.store).await.map_err(|e| {
        error!(context = "check-migration-status", error = %e, "Status query failed");
        ApiError::InternalServerError
    })?;

    Ok(Json(report))
}

/// Reassign orphan expenses for every user without seeding categories
pub async fn fix_orphan_expenses(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let summary = fix_orphans_for_all_users(&state.store).await.map_err(|e| {
        error!(context = "fix-orphan-expenses", error = %e, "Orphan fix failed");
        ApiError::InternalServerError
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Orphan expenses fixed",
        "totalExpensesUpdated": summary.total_expenses_updated,
        "usersProcessed": summary.users_processed,
        "errors": summary.errors,
    })))
}
