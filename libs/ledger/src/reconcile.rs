//! Orphan expense reconciliation

use tracing::{error, info};
use uuid::Uuid;

use crate::{error::LedgerResult, sentinel::ensure_sentinel_category, store::Store};

/// Point every expense of `user_id` whose category does not resolve at the
/// user's sentinel category. Returns the number of expenses updated.
///
/// Creates the sentinel when it is missing. Running it again right after is
/// a no-op that returns 0 without writing.
pub async fn reconcile_orphans<S: Store>(store: &S, user_id: Uuid) -> LedgerResult<u64> {
    match reassign_orphans(store, user_id).await {
        Ok(updated) => Ok(updated),
        Err(e) => {
            error!(context = "assign-no-category-to-orphan-expenses", %user_id, error = %e, "Failed to reconcile orphan expenses");
            Err(e)
        }
    }
}

async fn reassign_orphans<S: Store>(store: &S, user_id: Uuid) -> LedgerResult<u64> {
    let sentinel_id = ensure_sentinel_category(store, user_id).await?;

    let orphan_ids: Vec<Uuid> = store
        .expense_links(user_id)
        .await?
        .into_iter()
        .filter(|link| link.is_orphan())
        .map(|link| link.expense_id)
        .collect();

    if orphan_ids.is_empty() {
        return Ok(0);
    }

    let updated = store.reassign_expenses(&orphan_ids, sentinel_id).await?;
    info!(%user_id, updated_count = updated, "Assigned \"No Category\" to {} expenses", updated);

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::NewCategory,
        sentinel::NO_CATEGORY_NAME,
        store::MemoryStore,
    };

    #[tokio::test]
    async fn test_reassigns_only_orphans() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let user = store.add_user("nina@example.com", "Nina")?;
        let travel = store
            .create_category(user, &NewCategory::new("Travel", "#6366F1", "✈️"))
            .await?;

        let valid = store.add_expense(user, "Flight", 320.0, Some(travel.id))?;
        let dangling = store.add_expense(user, "Hotel", 180.0, Some(Uuid::new_v4()))?;
        let unset = store.add_expense(user, "Snacks", 4.5, None)?;

        let updated = reconcile_orphans(&store, user).await?;
        assert_eq!(updated, 2);

        let sentinel = store
            .find_category_by_name(user, NO_CATEGORY_NAME)
            .await?
            .expect("sentinel created");
        assert_eq!(store.expense(valid)?.unwrap().category_id, Some(travel.id));
        assert_eq!(store.expense(dangling)?.unwrap().category_id, Some(sentinel.id));
        assert_eq!(store.expense(unset)?.unwrap().category_id, Some(sentinel.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_second_run_is_noop() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let user = store.add_user("oscar@example.com", "Oscar")?;
        store.add_expense(user, "Coffee", 3.2, Some(Uuid::new_v4()))?;

        assert_eq!(reconcile_orphans(&store, user).await?, 1);
        let writes = store.write_count()?;

        assert_eq!(reconcile_orphans(&store, user).await?, 0);
        assert_eq!(store.write_count()?, writes);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_expenses_still_ensures_sentinel() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let user = store.add_user("peggy@example.com", "Peggy")?;

        assert_eq!(reconcile_orphans(&store, user).await?, 0);
        assert!(
            store
                .find_category_by_name(user, NO_CATEGORY_NAME)
                .await?
                .is_some()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_leaves_other_users_untouched() -> LedgerResult<()> {
        let store = MemoryStore::new();
        let quinn = store.add_user("quinn@example.com", "Quinn")?;
        let rita = store.add_user("rita@example.com", "Rita")?;
        let stray = Uuid::new_v4();
        let ritas = store.add_expense(rita, "Books", 40.0, Some(stray))?;
        store.add_expense(quinn, "Gym", 25.0, None)?;

        assert_eq!(reconcile_orphans(&store, quinn).await?, 1);
        assert_eq!(store.expense(ritas)?.unwrap().category_id, Some(stray));
        Ok(())
    }
}
