//! API service routes

pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod migration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState,
    middleware::{auth_middleware, log_requests},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/categories",
            get(categories::get_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/expenses",
            get(expenses::get_expenses).post(expenses::create_expense),
        )
        .route(
            "/expenses/:id",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route("/dashboard/summary", get(dashboard::get_summary))
        .route(
            "/dashboard/category-analytics",
            get(dashboard::get_category_analytics),
        )
        .route("/dashboard/monthly-trends", get(dashboard::get_monthly_trends))
        .route("/dashboard/recent-expenses", get(dashboard::get_recent_expenses))
        .route(
            "/migration/default-categories",
            post(migration::migrate_default_categories),
        )
        .route("/migration/status", get(migration::check_migration_status))
        .route(
            "/migration/fix-orphan-expenses",
            post(migration::fix_orphan_expenses),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
        .merge(protected_routes);

    Router::new()
        .nest("/api/v1", api)
        .fallback(route_not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Expense API is running",
        "timestamp": chrono::Utc::now(),
        "environment": state.environment,
    }))
}

/// Health check including database connectivity
pub async fn detailed_health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if database_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database_up { "ok" } else { "degraded" },
            "message": "Expense API is running",
            "timestamp": chrono::Utc::now(),
            "environment": state.environment,
            "services": {
                "database": { "status": if database_up { "up" } else { "down" } },
            },
        })),
    )
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
