//! API models for request and response payloads

use ledger::models::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for category creation
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Request for a partial category update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Request for expense creation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    #[serde(default)]
    pub title: String,
    pub amount: Option<f64>,
    /// Falls back to the caller's "No Category" when omitted
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub currency: Option<String>,
}

/// Request for a partial expense update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub currency: Option<String>,
}

/// Query parameters for paginated listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

impl PaginationQuery {
    /// Resolve page, limit and row offset with the given default limit
    pub fn resolve(&self, default_limit: u32) -> (u32, u32, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, 100);
        let offset = (page - 1) as i64 * limit as i64;
        (page, limit, offset)
    }
}

/// Query parameters for expense listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Optional date window
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendsQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

/// Pagination block returned with listings
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let limit_i64 = i64::from(limit);
        Self {
            total,
            page,
            limit,
            pages: (total + limit_i64 - 1) / limit_i64,
        }
    }
}

/// Category with the number of expenses filed under it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub expense_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_resolve() {
        let query = PaginationQuery {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(query.resolve(10), (3, 20, 40));

        let query = PaginationQuery {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(query.resolve(10), (1, 100, 0));

        assert_eq!(PaginationQuery::default().resolve(50), (1, 50, 0));
    }

    #[test]
    fn test_pagination_pages_round_up() {
        assert_eq!(Pagination::new(0, 1, 10).pages, 0);
        assert_eq!(Pagination::new(10, 1, 10).pages, 1);
        assert_eq!(Pagination::new(11, 1, 10).pages, 2);
    }

    #[test]
    fn test_create_expense_request_camel_case() {
        let request: CreateExpenseRequest = serde_json::from_str(
            r#"{"title":"Coffee","amount":3.5,"categoryId":"00000000-0000-0000-0000-000000000000"}"#,
        )
        .unwrap();
        assert_eq!(request.category_id, Some(Uuid::nil()));
        assert!(request.currency.is_none());
    }
}
