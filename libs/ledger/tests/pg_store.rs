//! PgStore against a live PostgreSQL database
//!
//! Every test creates its own users and deletes them afterwards, so the
//! status assertions compare counters before and after the fixture.

use common::database::{DatabaseConfig, init_pool, run_migrations};
use ledger::{
    LedgerError,
    defaults::seed_default_categories,
    models::NewCategory,
    reconcile::reconcile_orphans,
    sentinel::NO_CATEGORY_NAME,
    store::{PgStore, Store},
};
use serial_test::serial;
use sqlx::Row;
use uuid::Uuid;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn connect() -> Result<PgStore, Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;
    Ok(PgStore::new(pool))
}

async fn insert_user(store: &PgStore, name: &str) -> Result<Uuid, sqlx::Error> {
    let row = sqlx::query("INSERT INTO users (email, name) VALUES ($1, $2) RETURNING id")
        .bind(format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()))
        .bind(name)
        .fetch_one(store.pool())
        .await?;
    Ok(row.get("id"))
}

async fn insert_expense(
    store: &PgStore,
    user_id: Uuid,
    title: &str,
    category_id: Option<Uuid>,
) -> Result<Uuid, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO expenses (title, amount, user_id, category_id) VALUES ($1, 10.0, $2, $3) RETURNING id",
    )
    .bind(title)
    .bind(user_id)
    .bind(category_id)
    .fetch_one(store.pool())
    .await?;
    Ok(row.get("id"))
}

async fn category_of(store: &PgStore, expense_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query("SELECT category_id FROM expenses WHERE id = $1")
        .bind(expense_id)
        .fetch_one(store.pool())
        .await?;
    Ok(row.get("category_id"))
}

async fn delete_users(store: &PgStore, ids: &[Uuid]) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(ids)
        .execute(store.pool())
        .await?;
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_seeding_rolls_back_on_name_collision() -> TestResult {
    let store = connect().await?;
    let user = insert_user(&store, "Nia").await?;
    store
        .create_category(user, &NewCategory::new("Groceries", "#84CC16", "🛒"))
        .await?;

    let err = seed_default_categories(&store, user)
        .await
        .expect_err("catalog collides with Groceries");

    assert!(matches!(err, LedgerError::CategoryExists { ref name } if name == "Groceries"));
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE user_id = $1")
        .bind(user)
        .fetch_one(store.pool())
        .await?;
    assert_eq!(count, 1);

    delete_users(&store, &[user]).await?;
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_dangling_category_is_reconciled_once() -> TestResult {
    let store = connect().await?;
    let user = insert_user(&store, "Oto").await?;
    let rent = store
        .create_category(user, &NewCategory::new("Rent", "#111111", "🏠"))
        .await?;
    let valid = insert_expense(&store, user, "March rent", Some(rent.id)).await?;
    let dangling = insert_expense(&store, user, "Old import", Some(Uuid::new_v4())).await?;
    let unset = insert_expense(&store, user, "Cash", None).await?;

    let links = store.expense_links(user).await?;
    let orphans: Vec<Uuid> = links
        .iter()
        .filter(|link| link.is_orphan())
        .map(|link| link.expense_id)
        .collect();
    assert_eq!(orphans.len(), 2);
    assert!(orphans.contains(&dangling) && orphans.contains(&unset));

    assert_eq!(reconcile_orphans(&store, user).await?, 2);

    let sentinel = store
        .find_category_by_name(user, NO_CATEGORY_NAME)
        .await?
        .expect("sentinel created");
    assert_eq!(category_of(&store, dangling).await?, Some(sentinel.id));
    assert_eq!(category_of(&store, unset).await?, Some(sentinel.id));
    assert_eq!(category_of(&store, valid).await?, Some(rent.id));

    assert_eq!(reconcile_orphans(&store, user).await?, 0);

    delete_users(&store, &[user]).await?;
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_status_counts_track_fixture() -> TestResult {
    let store = connect().await?;
    let before = store.status_counts().await?;

    let seeded = insert_user(&store, "Pia").await?;
    let partial = insert_user(&store, "Quin").await?;
    let empty = insert_user(&store, "Ray").await?;
    seed_default_categories(&store, seeded).await?;
    store
        .create_category(partial, &NewCategory::new("Rent", "#111111", "🏠"))
        .await?;
    insert_expense(&store, partial, "Deposit", None).await?;
    insert_expense(&store, empty, "Coffee", None).await?;

    let after = store.status_counts().await?;

    assert_eq!(after.total_users - before.total_users, 3);
    assert_eq!(after.users_with_categories - before.users_with_categories, 2);
    assert_eq!(after.users_with_no_category - before.users_with_no_category, 1);
    assert_eq!(after.total_categories - before.total_categories, 13);
    assert_eq!(after.total_expenses - before.total_expenses, 2);

    delete_users(&store, &[seeded, partial, empty]).await?;
    Ok(())
}
