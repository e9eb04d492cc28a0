//! Dashboard handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{Datelike, TimeZone, Utc};
use ledger::analytics::{category_analytics, monthly_trends, summarize};
use serde_json::json;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    middleware::AuthUser,
    models::{DateRangeQuery, RecentQuery, TrendsQuery},
    validation::parse_date,
};

impl DateRangeQuery {
    /// Both ends or nothing
    fn window(
        &self,
    ) -> ApiResult<(Option<chrono::DateTime<Utc>>, Option<chrono::DateTime<Utc>>)> {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(end)) => Ok((
                Some(parse_date(start).map_err(ApiError::BadRequest)?),
                Some(parse_date(end).map_err(ApiError::BadRequest)?),
            )),
            _ => Ok((None, None)),
        }
    }
}

/// Totals and per-category breakdown
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let (start, end) = query.window()?;

    let expenses = state
        .expense_repository
        .in_period(user.id, start, end)
        .await
        .map_err(internal("dashboard-summary"))?;

    Ok(Json(json!({ "summary": summarize(&expenses) })))
}

pub async fn get_category_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let (start, end) = query.window()?;

    let expenses = state
        .expense_repository
        .in_period(user.id, start, end)
        .await
        .map_err(internal("category-analytics"))?;

    Ok(Json(json!({ "categoryAnalytics": category_analytics(&expenses) })))
}

/// Month-by-month totals for one year (current year by default)
pub async fn get_monthly_trends(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TrendsQuery>,
) -> ApiResult<impl IntoResponse> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid year: {}", year)))?;
    let end = Utc
        .with_ymd_and_hms(year, 12, 31, 23, 59, 59)
        .single()
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid year: {}", year)))?;

    let expenses = state
        .expense_repository
        .in_period(user.id, Some(start), Some(end))
        .await
        .map_err(internal("monthly-trends"))?;

    Ok(Json(json!({ "trends": monthly_trends(&expenses, year) })))
}

pub async fn get_recent_expenses(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(5).clamp(1, 100);

    let expenses = state
        .expense_repository
        .recent(user.id, limit)
        .await
        .map_err(internal("recent-expenses"))?;

    Ok(Json(json!({ "expenses": expenses })))
}
