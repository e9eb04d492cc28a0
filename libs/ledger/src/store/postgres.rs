//! PostgreSQL implementation of [`Store`]

use std::collections::HashMap;

use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::Store;
use crate::{
    error::{LedgerError, LedgerResult},
    models::{Category, CategoryRef, ExpenseLink, NewCategory, StatusCounts, UserCategories},
    sentinel::NO_CATEGORY_NAME,
};

const INSERT_CATEGORY: &str = r#"
    INSERT INTO categories (name, color, icon, user_id)
    VALUES ($1, $2, $3, $4)
    RETURNING id, name, color, icon, user_id, created_at, updated_at
"#;

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for callers that own its lifecycle
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    async fn list_users(&self) -> LedgerResult<Vec<UserCategories>> {
        let users = sqlx::query(
            r#"
            SELECT id, email, name
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let category_rows = sqlx::query(
            r#"
            SELECT id, name, user_id
            FROM categories
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_user: HashMap<Uuid, Vec<CategoryRef>> = HashMap::new();
        for row in category_rows {
            by_user
                .entry(row.get("user_id"))
                .or_default()
                .push(CategoryRef {
                    id: row.get("id"),
                    name: row.get("name"),
                });
        }

        let users = users
            .into_iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                UserCategories {
                    id,
                    email: row.get("email"),
                    name: row.get("name"),
                    categories: by_user.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok(users)
    }

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> LedgerResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, color, icon, user_id, created_at, updated_at
            FROM categories
            WHERE user_id = $1 AND name = $2
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        category: &NewCategory,
    ) -> LedgerResult<Category> {
        sqlx::query_as::<_, Category>(INSERT_CATEGORY)
            .bind(&category.name)
            .bind(&category.color)
            .bind(&category.icon)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| LedgerError::from_category_insert(e, &category.name))
    }

    async fn create_categories(
        &self,
        user_id: Uuid,
        categories: &[NewCategory],
    ) -> LedgerResult<Vec<Category>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(categories.len());

        for category in categories {
            // Dropping `tx` on the error path rolls everything back
            let row = sqlx::query_as::<_, Category>(INSERT_CATEGORY)
                .bind(&category.name)
                .bind(&category.color)
                .bind(&category.icon)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| LedgerError::from_category_insert(e, &category.name))?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn expense_links(&self, user_id: Uuid) -> LedgerResult<Vec<ExpenseLink>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id AS expense_id, e.category_id, c.id AS resolved_id, c.name AS resolved_name
            FROM expenses e
            LEFT JOIN categories c ON c.id = e.category_id
            WHERE e.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let links = rows
            .into_iter()
            .map(|row| {
                let resolved_id: Option<Uuid> = row.get("resolved_id");
                let resolved_name: Option<String> = row.get("resolved_name");
                ExpenseLink {
                    expense_id: row.get("expense_id"),
                    category_id: row.get("category_id"),
                    category: resolved_id
                        .zip(resolved_name)
                        .map(|(id, name)| CategoryRef { id, name }),
                }
            })
            .collect();

        Ok(links)
    }

    async fn reassign_expenses(&self, expense_ids: &[Uuid], category_id: Uuid) -> LedgerResult<u64> {
        if expense_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET category_id = $1, updated_at = NOW()
            WHERE id = ANY($2)
            "#,
        )
        .bind(category_id)
        .bind(expense_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn status_counts(&self) -> LedgerResult<StatusCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(DISTINCT user_id) FROM categories) AS users_with_categories,
                (SELECT COUNT(DISTINCT user_id) FROM categories WHERE name = $1) AS users_with_no_category,
                (SELECT COUNT(*) FROM categories) AS total_categories,
                (SELECT COUNT(*) FROM expenses) AS total_expenses
            "#,
        )
        .bind(NO_CATEGORY_NAME)
        .fetch_one(&self.pool)
        .await?;

        Ok(StatusCounts {
            total_users: row.get("total_users"),
            users_with_categories: row.get("users_with_categories"),
            users_with_no_category: row.get("users_with_no_category"),
            total_categories: row.get("total_categories"),
            total_expenses: row.get("total_expenses"),
        })
    }
}
