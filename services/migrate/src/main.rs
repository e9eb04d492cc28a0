//! One-shot script giving every user the default categories and moving
//! their orphan expenses onto "No Category".

use std::process::ExitCode;

use anyhow::Result;
use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    telemetry::init_tracing,
};
use ledger::{
    migration::{MigrationSummary, run_for_all_users_with_progress},
    store::PgStore,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("{e}");
    }

    match run().await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Migration failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<MigrationSummary> {
    info!("Starting default categories migration");

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    if !health_check(&pool).await? {
        anyhow::bail!("Failed to connect to database");
    }
    run_migrations(&pool).await?;

    let store = PgStore::new(pool);
    let summary = run_for_all_users_with_progress(&store, |position, total, user| {
        println!("Processing user {}/{}...", position, total);
        info!(user_id = %user.id, email = %user.email, "Migrating user");
    })
    .await?;

    store.pool().close().await;
    Ok(summary)
}

fn print_summary(summary: &MigrationSummary) {
    println!();
    println!("Migration summary");
    println!("  Total users:                {}", summary.total_users);
    println!("  Users with categories:      {}", summary.users_with_categories);
    println!("  Users without categories:   {}", summary.users_without_categories);
    println!("  Categories created:         {}", summary.categories_created);
    println!("  Expenses updated:           {}", summary.expenses_updated);
    println!("  Errors:                     {}", summary.errors.len());

    for failure in &summary.errors {
        println!("    - {} ({}): {}", failure.email, failure.name, failure.message);
    }
}
