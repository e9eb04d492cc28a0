//! Expense repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use ledger::models::{Category, Expense, ExpenseWithCategory};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

/// Columns selected for an expense joined with its (optional) category
const EXPENSE_WITH_CATEGORY: &str = r#"
    SELECT e.id, e.title, e.amount, e.currency, e.description, e.date, e.user_id,
           e.category_id, e.created_at, e.updated_at,
           c.id AS c_id, c.name AS c_name, c.color AS c_color, c.icon AS c_icon,
           c.user_id AS c_user_id, c.created_at AS c_created_at, c.updated_at AS c_updated_at
    FROM expenses e
    LEFT JOIN categories c ON c.id = e.category_id
"#;

/// Fields for a new expense, already validated
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub category_id: Uuid,
}

/// Fields to change on an existing expense
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
}

/// Filters for the expense listing
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category_id: Option<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

fn map_row(row: &PgRow) -> ExpenseWithCategory {
    let category_id: Option<Uuid> = row.get("c_id");
    let category = category_id.map(|id| Category {
        id,
        name: row.get("c_name"),
        color: row.get("c_color"),
        icon: row.get("c_icon"),
        user_id: row.get("c_user_id"),
        created_at: row.get("c_created_at"),
        updated_at: row.get("c_updated_at"),
    });

    ExpenseWithCategory {
        expense: Expense {
            id: row.get("id"),
            title: row.get("title"),
            amount: row.get("amount"),
            currency: row.get("currency"),
            description: row.get("description"),
            date: row.get("date"),
            user_id: row.get("user_id"),
            category_id: row.get("category_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        category,
    }
}

/// Expense repository for database operations
#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an expense for the user
    pub async fn create(&self, user_id: Uuid, new_expense: &NewExpense) -> Result<ExpenseWithCategory> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO expenses (title, amount, currency, description, date, user_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&new_expense.title)
        .bind(new_expense.amount)
        .bind(&new_expense.currency)
        .bind(&new_expense.description)
        .bind(new_expense.date)
        .bind(user_id)
        .bind(new_expense.category_id)
        .fetch_one(&self.pool)
        .await?;

        self.find_owned(id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Expense {} vanished after insert", id))
    }

    /// Get a page of the user's expenses, newest first
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &ExpenseFilter,
        limit: u32,
        offset: i64,
    ) -> Result<(Vec<ExpenseWithCategory>, i64)> {
        let query = format!(
            r#"
            {EXPENSE_WITH_CATEGORY}
            WHERE e.user_id = $1
              AND ($2::uuid IS NULL OR e.category_id = $2)
              AND ($3::timestamptz IS NULL OR e.date >= $3)
              AND ($4::timestamptz IS NULL OR e.date <= $4)
            ORDER BY e.date DESC
            LIMIT $5 OFFSET $6
            "#
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(filter.category_id)
            .bind(filter.start)
            .bind(filter.end)
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM expenses e
            WHERE e.user_id = $1
              AND ($2::uuid IS NULL OR e.category_id = $2)
              AND ($3::timestamptz IS NULL OR e.date >= $3)
              AND ($4::timestamptz IS NULL OR e.date <= $4)
            "#,
        )
        .bind(user_id)
        .bind(filter.category_id)
        .bind(filter.start)
        .bind(filter.end)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.iter().map(map_row).collect(), total))
    }

    /// Find an expense by ID, only if the user owns it
    pub async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<ExpenseWithCategory>> {
        let query = format!("{EXPENSE_WITH_CATEGORY} WHERE e.id = $1 AND e.user_id = $2");

        let row = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row))
    }

    /// Apply the fields present in `changes`
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &ExpenseChanges,
    ) -> Result<Option<ExpenseWithCategory>> {
        sqlx::query(
            r#"
            UPDATE expenses
            SET title = COALESCE($3, title),
                amount = COALESCE($4, amount),
                currency = COALESCE($5, currency),
                description = COALESCE($6, description),
                date = COALESCE($7, date),
                category_id = COALESCE($8, category_id),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&changes.title)
        .bind(changes.amount)
        .bind(&changes.currency)
        .bind(&changes.description)
        .bind(changes.date)
        .bind(changes.category_id)
        .execute(&self.pool)
        .await?;

        self.find_owned(id, user_id).await
    }

    /// Delete an expense by ID
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every expense of the user inside the optional window, newest first
    pub async fn in_period(
        &self,
        user_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<ExpenseWithCategory>> {
        let query = format!(
            r#"
            {EXPENSE_WITH_CATEGORY}
            WHERE e.user_id = $1
              AND ($2::timestamptz IS NULL OR e.date >= $2)
              AND ($3::timestamptz IS NULL OR e.date <= $3)
            ORDER BY e.date DESC
            "#
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row).collect())
    }

    /// The user's most recent expenses
    pub async fn recent(&self, user_id: Uuid, limit: u32) -> Result<Vec<ExpenseWithCategory>> {
        let query = format!(
            "{EXPENSE_WITH_CATEGORY} WHERE e.user_id = $1 ORDER BY e.date DESC LIMIT $2"
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row).collect())
    }
}
