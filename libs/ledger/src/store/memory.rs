//! In-process implementation of [`Store`]
//!
//! Enforces the same `(user_id, name)` uniqueness as the database schema and
//! can be told to fail every write for a given user, which makes it suitable
//! for exercising the workflow without PostgreSQL.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Store;
use crate::{
    error::{LedgerError, LedgerResult},
    models::{
        Category, CategoryRef, Expense, ExpenseLink, NewCategory, StatusCounts, User,
        UserCategories,
    },
    sentinel::NO_CATEGORY_NAME,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    categories: Vec<Category>,
    expenses: Vec<Expense>,
    failing_users: HashSet<Uuid>,
    writes: usize,
}

impl State {
    fn check_writable(&self, user_id: Uuid) -> LedgerResult<()> {
        if self.failing_users.contains(&user_id) {
            return Err(LedgerError::Store(format!(
                "write rejected for user {}",
                user_id
            )));
        }
        Ok(())
    }

    fn has_category(&self, user_id: Uuid, name: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.user_id == user_id && c.name == name)
    }

    fn build_category(user_id: Uuid, category: &NewCategory, now: DateTime<Utc>) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: category.name.clone(),
            color: category.color.clone(),
            icon: category.icon.clone(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Store that keeps everything in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Store("memory store lock poisoned".to_string()))
    }

    /// Register a user and return their id
    pub fn add_user(&self, email: &str, name: &str) -> LedgerResult<Uuid> {
        let mut state = self.lock()?;
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let id = user.id;
        state.users.push(user);
        Ok(id)
    }

    /// Insert an expense as-is. `category_id` is not checked, so dangling
    /// references can be created on purpose.
    pub fn add_expense(
        &self,
        user_id: Uuid,
        title: &str,
        amount: f64,
        category_id: Option<Uuid>,
    ) -> LedgerResult<Uuid> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            title: title.to_string(),
            amount,
            currency: "USD".to_string(),
            description: None,
            date: now,
            user_id,
            category_id,
            created_at: now,
            updated_at: now,
        };
        let id = expense.id;
        state.expenses.push(expense);
        Ok(id)
    }

    /// Every write for this user fails from now on
    pub fn fail_writes_for(&self, user_id: Uuid) -> LedgerResult<()> {
        self.lock()?.failing_users.insert(user_id);
        Ok(())
    }

    /// Categories owned by the user, in creation order
    pub fn categories_for(&self, user_id: Uuid) -> LedgerResult<Vec<Category>> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    pub fn expense(&self, expense_id: Uuid) -> LedgerResult<Option<Expense>> {
        Ok(self
            .lock()?
            .expenses
            .iter()
            .find(|e| e.id == expense_id)
            .cloned())
    }

    /// Number of successful write operations so far
    pub fn write_count(&self) -> LedgerResult<usize> {
        Ok(self.lock()?.writes)
    }
}

impl Store for MemoryStore {
    async fn list_users(&self) -> LedgerResult<Vec<UserCategories>> {
        let state = self.lock()?;
        let users = state
            .users
            .iter()
            .map(|user| UserCategories {
                id: user.id,
                email: user.email.clone(),
                name: user.name.clone(),
                categories: state
                    .categories
                    .iter()
                    .filter(|c| c.user_id == user.id)
                    .map(|c| CategoryRef {
                        id: c.id,
                        name: c.name.clone(),
                    })
                    .collect(),
            })
            .collect();
        Ok(users)
    }

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> LedgerResult<Option<Category>> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        category: &NewCategory,
    ) -> LedgerResult<Category> {
        let mut state = self.lock()?;
        state.check_writable(user_id)?;

        if state.has_category(user_id, &category.name) {
            return Err(LedgerError::CategoryExists {
                name: category.name.clone(),
            });
        }

        let created = State::build_category(user_id, category, Utc::now());
        state.categories.push(created.clone());
        state.writes += 1;
        Ok(created)
    }

    async fn create_categories(
        &self,
        user_id: Uuid,
        categories: &[NewCategory],
    ) -> LedgerResult<Vec<Category>> {
        let mut state = self.lock()?;
        state.check_writable(user_id)?;

        // Validate the whole batch before touching state
        let mut seen = HashSet::new();
        for category in categories {
            if state.has_category(user_id, &category.name) || !seen.insert(category.name.as_str())
            {
                return Err(LedgerError::CategoryExists {
                    name: category.name.clone(),
                });
            }
        }

        let now = Utc::now();
        let created: Vec<Category> = categories
            .iter()
            .map(|c| State::build_category(user_id, c, now))
            .collect();
        state.categories.extend(created.iter().cloned());
        state.writes += 1;
        Ok(created)
    }

    async fn expense_links(&self, user_id: Uuid) -> LedgerResult<Vec<ExpenseLink>> {
        let state = self.lock()?;
        let links = state
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| ExpenseLink {
                expense_id: e.id,
                category_id: e.category_id,
                category: e.category_id.and_then(|id| {
                    state
                        .categories
                        .iter()
                        .find(|c| c.id == id)
                        .map(|c| CategoryRef {
                            id: c.id,
                            name: c.name.clone(),
                        })
                }),
            })
            .collect();
        Ok(links)
    }

    async fn reassign_expenses(&self, expense_ids: &[Uuid], category_id: Uuid) -> LedgerResult<u64> {
        if expense_ids.is_empty() {
            return Ok(0);
        }

        let mut state = self.lock()?;
        let owners: Vec<Uuid> = state
            .expenses
            .iter()
            .filter(|e| expense_ids.contains(&e.id))
            .map(|e| e.user_id)
            .collect();
        for owner in owners {
            state.check_writable(owner)?;
        }

        let now = Utc::now();
        let mut updated = 0;
        for expense in state
            .expenses
            .iter_mut()
            .filter(|e| expense_ids.contains(&e.id))
        {
            expense.category_id = Some(category_id);
            expense.updated_at = now;
            updated += 1;
        }
        state.writes += 1;
        Ok(updated)
    }

    async fn status_counts(&self) -> LedgerResult<StatusCounts> {
        let state = self.lock()?;
        let owners: HashSet<Uuid> = state.categories.iter().map(|c| c.user_id).collect();
        let sentinel_owners: HashSet<Uuid> = state
            .categories
            .iter()
            .filter(|c| c.name == NO_CATEGORY_NAME)
            .map(|c| c.user_id)
            .collect();

        Ok(StatusCounts {
            total_users: state.users.len() as i64,
            users_with_categories: owners.len() as i64,
            users_with_no_category: sentinel_owners.len() as i64,
            total_categories: state.categories.len() as i64,
            total_expenses: state.expenses.len() as i64,
        })
    }
}
