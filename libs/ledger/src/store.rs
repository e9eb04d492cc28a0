//! Storage seam for the category bootstrap and reconciliation routines
//!
//! Every routine in this crate takes the store as an explicit argument.
//! [`PgStore`] is the production implementation; [`MemoryStore`] keeps the
//! same invariants in process.

use uuid::Uuid;

use crate::{
    error::LedgerResult,
    models::{Category, ExpenseLink, NewCategory, StatusCounts, UserCategories},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Reads and writes the category and expense data the workflow touches.
pub trait Store: Send + Sync {
    /// Every user with the (id, name) of each category they own.
    fn list_users(&self) -> impl Future<Output = LedgerResult<Vec<UserCategories>>> + Send;

    /// Find a category owned by `user_id` with exactly this name.
    fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> impl Future<Output = LedgerResult<Option<Category>>> + Send;

    /// Create one category for the user.
    fn create_category(
        &self,
        user_id: Uuid,
        category: &NewCategory,
    ) -> impl Future<Output = LedgerResult<Category>> + Send;

    /// Create all categories or none of them. Rows come back in input order.
    fn create_categories(
        &self,
        user_id: Uuid,
        categories: &[NewCategory],
    ) -> impl Future<Output = LedgerResult<Vec<Category>>> + Send;

    /// Each of the user's expenses with the category its id resolves to.
    fn expense_links(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = LedgerResult<Vec<ExpenseLink>>> + Send;

    /// Point every listed expense at `category_id` in one update. Returns the
    /// number of rows changed.
    fn reassign_expenses(
        &self,
        expense_ids: &[Uuid],
        category_id: Uuid,
    ) -> impl Future<Output = LedgerResult<u64>> + Send;

    /// Read-only counters for the status report.
    fn status_counts(&self) -> impl Future<Output = LedgerResult<StatusCounts>> + Send;
}
