//! Repositories for database operations

use anyhow::Result;
use ledger::models::Category;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{CategoryWithCount, UpdateCategoryRequest};

pub mod expense;

/// Category repository for database operations
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a page of the user's categories ordered by name, with expense counts
    pub async fn list(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: i64,
    ) -> Result<(Vec<CategoryWithCount>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.color, c.icon, c.user_id, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM expenses e WHERE e.category_id = c.id) AS expense_count
            FROM categories c
            WHERE c.user_id = $1
            ORDER BY c.name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let categories = rows
            .into_iter()
            .map(|row| CategoryWithCount {
                category: Category {
                    id: row.get("id"),
                    name: row.get("name"),
                    color: row.get("color"),
                    icon: row.get("icon"),
                    user_id: row.get("user_id"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                },
                expense_count: row.get("expense_count"),
            })
            .collect();

        Ok((categories, total))
    }

    /// Find a category by ID, only if the user owns it
    pub async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<CategoryWithCount>> {
        let row = sqlx::query(
            r#"
            SELECT c.id, c.name, c.color, c.icon, c.user_id, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM expenses e WHERE e.category_id = c.id) AS expense_count
            FROM categories c
            WHERE c.id = $1 AND c.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let category = CategoryWithCount {
                    category: Category {
                        id: row.get("id"),
                        name: row.get("name"),
                        color: row.get("color"),
                        icon: row.get("icon"),
                        user_id: row.get("user_id"),
                        created_at: row.get("created_at"),
                        updated_at: row.get("updated_at"),
                    },
                    expense_count: row.get("expense_count"),
                };
                Ok(Some(category))
            }
            None => Ok(None),
        }
    }

    /// Apply the fields present in `changes`
    pub async fn update(&self, id: Uuid, changes: &UpdateCategoryRequest) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                color = COALESCE($3, color),
                icon = COALESCE($4, icon),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, color, icon, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.color)
        .bind(&changes.icon)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Delete a category by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
