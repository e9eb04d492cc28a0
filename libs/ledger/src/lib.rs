//! Category bootstrap and orphan-expense reconciliation for the Expenser
//! application
//!
//! The routines here keep every user's expenses attached to a category:
//!
//! - [`defaults::seed_default_categories`] gives a user the default catalog
//!   in one all-or-nothing step.
//! - [`sentinel::ensure_sentinel_category`] finds or creates the user's
//!   "No Category" category.
//! - [`reconcile::reconcile_orphans`] moves expenses whose category no
//!   longer resolves onto that sentinel.
//! - [`migration::run_for_all_users`] runs the above for every user and
//!   collects per-user failures instead of stopping.
//!
//! All of them take a [`store::Store`] explicitly.

pub mod analytics;
pub mod defaults;
pub mod error;
pub mod migration;
pub mod models;
pub mod reconcile;
pub mod sentinel;
pub mod store;

pub use error::{LedgerError, LedgerResult};
