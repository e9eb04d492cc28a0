//! Expense handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use ledger::sentinel::ensure_sentinel_category;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    middleware::AuthUser,
    models::{CreateExpenseRequest, ExpenseQuery, Pagination, PaginationQuery, UpdateExpenseRequest},
    repositories::expense::{ExpenseChanges, ExpenseFilter, NewExpense},
    validation::{collect_errors, parse_date, validate_amount, validate_title},
};

/// Reject category ids the caller does not own
async fn ensure_owned_category(state: &AppState, category_id: Uuid, user_id: Uuid) -> ApiResult<()> {
    state
        .category_repository
        .find_owned(category_id, user_id)
        .await
        .map_err(internal("verify-category"))?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
}

/// Create an expense; without a category it lands in "No Category"
pub async fn create_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = collect_errors([
        validate_title(&payload.title),
        payload
            .amount
            .map_or_else(|| Err("Amount is required".to_string()), validate_amount),
    ]);
    let date = match payload.date.as_deref().map(parse_date).transpose() {
        Ok(date) => date,
        Err(e) => {
            errors.push(e);
            None
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let category_id = match payload.category_id {
        Some(category_id) => {
            ensure_owned_category(&state, category_id, user.id).await?;
            category_id
        }
        None => ensure_sentinel_category(&state.store, user.id).await?,
    };

    let new_expense = NewExpense {
        title: payload.title.trim().to_string(),
        amount: payload.amount.unwrap_or_default(),
        currency: payload.currency.unwrap_or_else(|| "USD".to_string()),
        description: payload.description,
        date: date.unwrap_or_else(Utc::now),
        category_id,
    };

    let expense = state
        .expense_repository
        .create(user.id, &new_expense)
        .await
        .map_err(internal("create-expense"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Expense created successfully",
            "expense": expense,
        })),
    ))
}

/// Get the caller's expenses, optionally filtered by category and date range
pub async fn get_expenses(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ExpenseQuery>,
) -> ApiResult<impl IntoResponse> {
    let (page, limit, offset) = PaginationQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(10);

    let mut filter = ExpenseFilter {
        category_id: query.category_id,
        ..ExpenseFilter::default()
    };
    // The date window only applies when both ends are given
    if let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref()) {
        filter.start = Some(parse_date(start).map_err(ApiError::BadRequest)?);
        filter.end = Some(parse_date(end).map_err(ApiError::BadRequest)?);
    }

    let (expenses, total) = state
        .expense_repository
        .list(user.id, &filter, limit, offset)
        .await
        .map_err(internal("get-expenses"))?;

    Ok(Json(json!({
        "expenses": expenses,
        "pagination": Pagination::new(total, page, limit),
    })))
}

/// Get one of the caller's expenses
pub async fn get_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let expense = state
        .expense_repository
        .find_owned(id, user.id)
        .await
        .map_err(internal("get-expense-by-id"))?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    Ok(Json(json!({ "expense": expense })))
}

/// Partially update one of the caller's expenses
pub async fn update_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = collect_errors([
        payload.title.as_deref().map_or(Ok(()), validate_title),
        payload.amount.map_or(Ok(()), validate_amount),
    ]);
    let date = match payload.date.as_deref().map(parse_date).transpose() {
        Ok(date) => date,
        Err(e) => {
            errors.push(e);
            None
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    state
        .expense_repository
        .find_owned(id, user.id)
        .await
        .map_err(internal("update-expense"))?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    if let Some(category_id) = payload.category_id {
        ensure_owned_category(&state, category_id, user.id).await?;
    }

    let changes = ExpenseChanges {
        title: payload.title.map(|title| title.trim().to_string()),
        amount: payload.amount,
        currency: payload.currency,
        description: payload.description,
        date,
        category_id: payload.category_id,
    };

    let expense = state
        .expense_repository
        .update(id, user.id, &changes)
        .await
        .map_err(internal("update-expense"))?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    Ok(Json(json!({
        "message": "Expense updated successfully",
        "expense": expense,
    })))
}

/// Delete one of the caller's expenses
pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state
        .expense_repository
        .delete(id, user.id)
        .await
        .map_err(internal("delete-expense"))?;

    if deleted {
        Ok(Json(json!({ "message": "Expense deleted successfully" })))
    } else {
        Err(ApiError::NotFound("Expense not found".to_string()))
    }
}
