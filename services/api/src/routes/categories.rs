//! Category handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use ledger::{models::NewCategory, store::Store};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    middleware::AuthUser,
    models::{CreateCategoryRequest, Pagination, PaginationQuery, UpdateCategoryRequest},
    validation::{collect_errors, validate_category_name, validate_color, validate_icon},
};

const CATEGORY_EXISTS: &str = "Category with this name already exists";

/// Create a category for the caller
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let errors = collect_errors([
        validate_category_name(&payload.name),
        payload.color.as_deref().map_or(Ok(()), validate_color),
        payload.icon.as_deref().map_or(Ok(()), validate_icon),
    ]);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let name = payload.name.trim();
    if state
        .store
        .find_category_by_name(user.id, name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(CATEGORY_EXISTS.to_string()));
    }

    let new_category = NewCategory {
        name: name.to_string(),
        color: payload.color,
        icon: payload.icon.map(|icon| icon.trim().to_string()),
    };
    let category = state.store.create_category(user.id, &new_category).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully",
            "category": category,
        })),
    ))
}

/// Get the caller's categories
pub async fn get_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<impl IntoResponse> {
    let (page, limit, offset) = query.resolve(50);

    let (categories, total) = state
        .category_repository
        .list(user.id, limit, offset)
        .await
        .map_err(internal("get-categories"))?;

    Ok(Json(json!({
        "categories": categories,
        "pagination": Pagination::new(total, page, limit),
    })))
}

/// Get one of the caller's categories
pub async fn get_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let category = state
        .category_repository
        .find_owned(id, user.id)
        .await
        .map_err(internal("get-category-by-id"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(json!({ "category": category })))
}

/// Partially update one of the caller's categories
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let errors = collect_errors([
        payload.name.as_deref().map_or(Ok(()), validate_category_name),
        payload.color.as_deref().map_or(Ok(()), validate_color),
        payload.icon.as_deref().map_or(Ok(()), validate_icon),
    ]);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let existing = state
        .category_repository
        .find_owned(id, user.id)
        .await
        .map_err(internal("update-category"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    payload.name = payload.name.map(|name| name.trim().to_string());
    payload.icon = payload.icon.map(|icon| icon.trim().to_string());

    if let Some(name) = payload.name.as_deref() {
        if name != existing.category.name
            && state
                .store
                .find_category_by_name(user.id, name)
                .await?
                .is_some()
        {
            return Err(ApiError::Conflict(CATEGORY_EXISTS.to_string()));
        }
    }

    let category = state
        .category_repository
        .update(id, &payload)
        .await
        .map_err(internal("update-category"))?;

    Ok(Json(json!({
        "message": "Category updated successfully",
        "category": category,
    })))
}

/// Delete one of the caller's categories if no expense uses it
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let category = state
        .category_repository
        .find_owned(id, user.id)
        .await
        .map_err(internal("delete-category"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    if category.expense_count > 0 {
        return Err(ApiError::CategoryInUse(category.expense_count));
    }

    state
        .category_repository
        .delete(id)
        .await
        .map_err(internal("delete-category"))?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
