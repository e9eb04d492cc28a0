//! Batch maintenance across all users
//!
//! [`run_for_all_users`] bootstraps categories and repairs orphan expenses
//! for every user, one user at a time. A failure for one user is recorded in
//! the summary and the batch moves on. Nothing here locks across users, so
//! two batches running at once can race on sentinel creation; the losing
//! user ends up in `errors`.

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    defaults::seed_default_categories,
    error::{LedgerError, LedgerResult},
    models::{UserCategories, round2},
    reconcile::reconcile_orphans,
    sentinel::{NO_CATEGORY_NAME, sentinel_category},
    store::Store,
};

/// A user the batch could not process
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFailure {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub message: String,
}

impl UserFailure {
    fn new(user: &UserCategories, err: &LedgerError) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            message: err.to_string(),
        }
    }
}

/// Aggregate result of [`run_for_all_users`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub total_users: usize,
    pub users_with_categories: usize,
    pub users_without_categories: usize,
    pub categories_created: usize,
    pub expenses_updated: u64,
    pub errors: Vec<UserFailure>,
}

/// What happened to one user that was processed successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    /// The user had no categories and received the full catalog
    Seeded {
        categories_created: usize,
        expenses_updated: u64,
    },
    /// The user already had categories; the sentinel may have been added
    Existing {
        sentinel_created: bool,
        expenses_updated: u64,
    },
}

impl MigrationSummary {
    fn new(total_users: usize) -> Self {
        Self {
            total_users,
            ..Self::default()
        }
    }

    /// Fold one user's result into the summary. Work saved before a failure
    /// is counted and the failure is listed in `errors`.
    pub fn record(
        self,
        user: &UserCategories,
        result: Result<UserOutcome, StoppedMigration>,
    ) -> Self {
        match result {
            Ok(outcome) => self.count(outcome),
            Err(stopped) => {
                let mut summary = match stopped.completed {
                    Some(outcome) => self.count(outcome),
                    None => self,
                };
                summary.errors.push(UserFailure::new(user, &stopped.error));
                summary
            }
        }
    }

    fn count(mut self, outcome: UserOutcome) -> Self {
        match outcome {
            UserOutcome::Seeded {
                categories_created,
                expenses_updated,
            } => {
                self.users_without_categories += 1;
                self.categories_created += categories_created;
                self.expenses_updated += expenses_updated;
            }
            UserOutcome::Existing {
                sentinel_created,
                expenses_updated,
            } => {
                self.users_with_categories += 1;
                self.categories_created += usize::from(sentinel_created);
                self.expenses_updated += expenses_updated;
            }
        }
        self
    }
}

/// A user migration that failed. `completed` holds the bootstrap step that
/// was already saved when reconciliation failed.
#[derive(Debug)]
pub struct StoppedMigration {
    pub completed: Option<UserOutcome>,
    pub error: LedgerError,
}

impl StoppedMigration {
    fn after(completed: UserOutcome) -> impl FnOnce(LedgerError) -> Self {
        move |error| Self {
            completed: Some(completed),
            error,
        }
    }
}

impl From<LedgerError> for StoppedMigration {
    fn from(error: LedgerError) -> Self {
        Self {
            completed: None,
            error,
        }
    }
}

/// Bootstrap one user's categories, then reconcile their orphan expenses
pub async fn migrate_user<S: Store>(
    store: &S,
    user: &UserCategories,
) -> Result<UserOutcome, StoppedMigration> {
    if user.categories.is_empty() {
        let seeded = seed_default_categories(store, user.id).await?;
        let categories_created = seeded.categories.len();
        let expenses_updated = reconcile_orphans(store, user.id)
            .await
            .map_err(StoppedMigration::after(UserOutcome::Seeded {
                categories_created,
                expenses_updated: 0,
            }))?;
        return Ok(UserOutcome::Seeded {
            categories_created,
            expenses_updated,
        });
    }

    let has_sentinel = user.categories.iter().any(|c| c.name == NO_CATEGORY_NAME);
    if !has_sentinel {
        store.create_category(user.id, &sentinel_category()).await?;
    }

    let expenses_updated = reconcile_orphans(store, user.id)
        .await
        .map_err(StoppedMigration::after(UserOutcome::Existing {
            sentinel_created: !has_sentinel,
            expenses_updated: 0,
        }))?;
    Ok(UserOutcome::Existing {
        sentinel_created: !has_sentinel,
        expenses_updated,
    })
}

/// Run the category migration for every user
pub async fn run_for_all_users<S: Store>(store: &S) -> LedgerResult<MigrationSummary> {
    run_for_all_users_with_progress(store, |_, _, _| {}).await
}

/// Same as [`run_for_all_users`], calling `on_user(position, total, user)`
/// before each user is processed. `position` starts at 1.
pub async fn run_for_all_users_with_progress<S, F>(
    store: &S,
    mut on_user: F,
) -> LedgerResult<MigrationSummary>
where
    S: Store,
    F: FnMut(usize, usize, &UserCategories) + Send,
{
    let users = store.list_users().await.inspect_err(|e| {
        error!(context = "migrate-default-categories", error = %e, "Failed to list users");
    })?;
    let total = users.len();

    let mut summary = MigrationSummary::new(total);
    for (index, user) in users.iter().enumerate() {
        on_user(index + 1, total, user);

        let result = migrate_user(store, user).await;
        if let Err(stopped) = &result {
            error!(context = "migrate-user-categories", user_id = %user.id, error = %stopped.error, "User migration failed");
        }
        summary = summary.record(user, result);
    }

    info!(
        total_users = summary.total_users,
        categories_created = summary.categories_created,
        expenses_updated = summary.expenses_updated,
        errors = summary.errors.len(),
        "Default categories migration completed"
    );

    Ok(summary)
}

/// Aggregate result of [`fix_orphans_for_all_users`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanFixSummary {
    pub total_expenses_updated: u64,
    pub users_processed: usize,
    pub errors: Vec<UserFailure>,
}

/// Reconcile orphan expenses for every user without seeding anything
pub async fn fix_orphans_for_all_users<S: Store>(store: &S) -> LedgerResult<OrphanFixSummary> {
    let users = store.list_users().await?;

    let mut summary = OrphanFixSummary {
        users_processed: users.len(),
        ..OrphanFixSummary::default()
    };

    for user in &users {
        match reconcile_orphans(store, user.id).await {
            Ok(updated) => summary.total_expenses_updated += updated,
            Err(e) => {
                error!(context = "fix-orphan-expenses", user_id = %user.id, error = %e, "Orphan fix failed");
                summary.errors.push(UserFailure::new(user, &e));
            }
        }
    }

    Ok(summary)
}

/// User counters of the status report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub total: i64,
    pub with_categories: i64,
    pub without_categories: i64,
    pub with_no_category: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseStatus {
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatus {
    pub total: i64,
    pub average_per_user: f64,
}

/// Read-only view of how far the migration has progressed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationStatus {
    pub users: UserStatus,
    pub expenses: ExpenseStatus,
    pub categories: CategoryStatus,
}

/// Build the status report. Never writes.
pub async fn status<S: Store>(store: &S) -> LedgerResult<MigrationStatus> {
    let counts = store.status_counts().await?;

    let average_per_user = if counts.total_users > 0 {
        round2(counts.total_categories as f64 / counts.total_users as f64)
    } else {
        0.0
    };

    Ok(MigrationStatus {
        users: UserStatus {
            total: counts.total_users,
            with_categories: counts.users_with_categories,
            without_categories: counts.total_users - counts.users_with_categories,
            with_no_category: counts.users_with_no_category,
        },
        expenses: ExpenseStatus {
            total: counts.total_expenses,
        },
        categories: CategoryStatus {
            total: counts.total_categories,
            average_per_user,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::NewCategory, store::MemoryStore};

    #[test]
    fn test_record_folds_outcomes() {
        let user = UserCategories {
            id: Uuid::new_v4(),
            email: "sam@example.com".to_string(),
            name: "Sam".to_string(),
            categories: vec![],
        };

        let summary = MigrationSummary::new(4)
            .record(
                &user,
                Ok(UserOutcome::Seeded {
                    categories_created: 12,
                    expenses_updated: 2,
                }),
            )
            .record(
                &user,
                Ok(UserOutcome::Existing {
                    sentinel_created: true,
                    expenses_updated: 1,
                }),
            )
            .record(&user, Err(LedgerError::Store("boom".to_string()).into()))
            .record(
                &user,
                Err(StoppedMigration {
                    completed: Some(UserOutcome::Seeded {
                        categories_created: 12,
                        expenses_updated: 0,
                    }),
                    error: LedgerError::Store("timeout".to_string()),
                }),
            );

        assert_eq!(summary.total_users, 4);
        assert_eq!(summary.users_without_categories, 2);
        assert_eq!(summary.users_with_categories, 1);
        assert_eq!(summary.categories_created, 25);
        assert_eq!(summary.expenses_updated, 3);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(summary.errors[0].message, "Store error: boom");
        assert_eq!(summary.errors[1].message, "Store error: timeout");
    }

    #[tokio::test]
    async fn test_existing_user_without_sentinel_gets_one() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let user = store.add_user("tara@example.com", "Tara")?;
        store
            .create_category(user, &NewCategory::new("Rent", "#111111", "🏠"))
            .await?;

        let summary = run_for_all_users(&store).await?;

        assert_eq!(summary.users_with_categories, 1);
        assert_eq!(summary.users_without_categories, 0);
        assert_eq!(summary.categories_created, 1);
        assert_eq!(store.categories_for(user)?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_on_empty_store() -> LedgerResult<()> {
        let store = MemoryStore::new();

        let report = status(&store).await?;

        assert_eq!(report.users.total, 0);
        assert_eq!(report.categories.average_per_user, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_counts_and_average() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let a = store.add_user("uma@example.com", "Uma")?;
        let b = store.add_user("vic@example.com", "Vic")?;
        store.add_user("wes@example.com", "Wes")?;
        seed_default_categories(&store, a).await?;
        store
            .create_category(b, &NewCategory::new("Rent", "#111111", "🏠"))
            .await?;
        store.add_expense(b, "March rent", 900.0, None)?;

        let report = status(&store).await?;

        assert_eq!(report.users.total, 3);
        assert_eq!(report.users.with_categories, 2);
        assert_eq!(report.users.without_categories, 1);
        assert_eq!(report.users.with_no_category, 1);
        assert_eq!(report.expenses.total, 1);
        assert_eq!(report.categories.total, 13);
        assert_eq!(report.categories.average_per_user, 4.33);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_serializes_camel_case() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let report = status(&store).await?;

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["users"].get("withNoCategory").is_some());
        assert!(json["categories"].get("averagePerUser").is_some());
        Ok(())
    }
}
