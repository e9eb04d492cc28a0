//! Domain models shared by the store implementations and the HTTP layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity, as far as this crate cares about it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New category creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewCategory {
    pub fn new(name: &str, color: &str, icon: &str) -> Self {
        Self {
            name: name.to_string(),
            color: Some(color.to_string()),
            icon: Some(icon.to_string()),
        }
    }
}

/// Expense entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub user_id: Uuid,
    /// May point at a category that no longer exists
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Expense together with the category its reference resolves to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithCategory {
    #[serde(flatten)]
    pub expense: Expense,
    pub category: Option<Category>,
}

/// Minimal category reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

/// A user with the categories they own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCategories {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub categories: Vec<CategoryRef>,
}

/// An expense's category link as seen through a join on categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseLink {
    pub expense_id: Uuid,
    pub category_id: Option<Uuid>,
    /// `None` when the join found no category row
    pub category: Option<CategoryRef>,
}

impl ExpenseLink {
    /// An expense is an orphan when its category does not resolve. A
    /// dangling id and a missing id are treated the same.
    pub fn is_orphan(&self) -> bool {
        self.category.is_none()
    }
}

/// Raw counters behind the migration status report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total_users: i64,
    pub users_with_categories: i64,
    pub users_with_no_category: i64,
    pub total_categories: i64,
    pub total_expenses: i64,
}

/// Round to two decimals, the precision used for reported averages
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
