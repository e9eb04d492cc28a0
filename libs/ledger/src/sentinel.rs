//! The per-user "No Category" sentinel
//!
//! The sentinel is an ordinary category found by exact name match. Renaming
//! it, or creating a second category called "No Category" in a store
//! without the unique constraint, breaks detection.

use tracing::{error, info};
use uuid::Uuid;

use crate::{error::LedgerResult, models::NewCategory, store::Store};

/// Name of the sentinel category
pub const NO_CATEGORY_NAME: &str = "No Category";
/// Color given to the sentinel category
pub const NO_CATEGORY_COLOR: &str = "#9CA3AF";
/// Icon given to the sentinel category
pub const NO_CATEGORY_ICON: &str = "📋";

/// Payload for a fresh sentinel category
pub fn sentinel_category() -> NewCategory {
    NewCategory::new(NO_CATEGORY_NAME, NO_CATEGORY_COLOR, NO_CATEGORY_ICON)
}

/// Return the id of the user's sentinel category, creating it if needed.
///
/// Sequential calls are idempotent. Concurrent calls for the same user can
/// both miss the lookup; the second insert then fails on the unique
/// `(user_id, name)` constraint.
pub async fn ensure_sentinel_category<S: Store>(store: &S, user_id: Uuid) -> LedgerResult<Uuid> {
    find_or_create_sentinel(store, user_id).await.inspect_err(|e| {
        error!(context = "get-or-create-no-category", %user_id, error = %e, "Failed to resolve sentinel category");
    })
}

async fn find_or_create_sentinel<S: Store>(store: &S, user_id: Uuid) -> LedgerResult<Uuid> {
    if let Some(existing) = store.find_category_by_name(user_id, NO_CATEGORY_NAME).await? {
        return Ok(existing.id);
    }

    let created = store.create_category(user_id, &sentinel_category()).await?;
    info!(%user_id, "Created \"{}\" category", NO_CATEGORY_NAME);
    Ok(created.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_creates_sentinel_when_missing() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let user = store.add_user("frank@example.com", "Frank")?;

        let id = ensure_sentinel_category(&store, user).await?;

        let categories = store.categories_for(user)?;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, id);
        assert_eq!(categories[0].name, NO_CATEGORY_NAME);
        assert_eq!(categories[0].color.as_deref(), Some(NO_CATEGORY_COLOR));
        assert_eq!(categories[0].icon.as_deref(), Some(NO_CATEGORY_ICON));
        Ok(())
    }

    #[tokio::test]
    async fn test_sequential_calls_return_same_id() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let user = store.add_user("grace@example.com", "Grace")?;

        let first = ensure_sentinel_category(&store, user).await?;
        let second = ensure_sentinel_category(&store, user).await?;

        assert_eq!(first, second);
        assert_eq!(store.categories_for(user)?.len(), 1);
        assert_eq!(store.write_count()?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reuses_existing_sentinel() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let user = store.add_user("heidi@example.com", "Heidi")?;
        let existing = store.create_category(user, &sentinel_category()).await?;

        assert_eq!(ensure_sentinel_category(&store, user).await?, existing.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_sentinel_is_per_user() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let ivan = store.add_user("ivan@example.com", "Ivan")?;
        let judy = store.add_user("judy@example.com", "Judy")?;

        let a = ensure_sentinel_category(&store, ivan).await?;
        let b = ensure_sentinel_category(&store, judy).await?;

        assert_ne!(a, b);
        Ok(())
    }
}
