//! Error types for the ledger domain

use thiserror::Error;

/// Errors raised by the category and expense routines
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A category with this name already exists for the user
    #[error("Category '{name}' already exists for this user")]
    CategoryExists { name: String },

    /// Any other store failure
    #[error("Store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Map a failed category insert, turning `(user_id, name)` unique
    /// violations into [`LedgerError::CategoryExists`].
    pub fn from_category_insert(err: sqlx::Error, name: &str) -> Self {
        let is_unique_violation = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());

        if is_unique_violation {
            LedgerError::CategoryExists {
                name: name.to_string(),
            }
        } else {
            LedgerError::Database(err)
        }
    }
}

/// Type alias for Result with LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_database_errors() {
        let err = LedgerError::from_category_insert(sqlx::Error::RowNotFound, "Travel");
        assert!(matches!(err, LedgerError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_category_exists_message() {
        let err = LedgerError::CategoryExists {
            name: "No Category".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Category 'No Category' already exists for this user"
        );
    }
}
