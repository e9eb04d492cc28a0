//! Application state shared across handlers

use ledger::store::PgStore;
use sqlx::PgPool;

use crate::{
    middleware::JwtConfig,
    repositories::{CategoryRepository, expense::ExpenseRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub store: PgStore,
    pub category_repository: CategoryRepository,
    pub expense_repository: ExpenseRepository,
    pub jwt_config: JwtConfig,
    pub environment: String,
}

impl AppState {
    pub fn new(pool: PgPool, jwt_config: JwtConfig, environment: String) -> Self {
        Self {
            store: PgStore::new(pool.clone()),
            category_repository: CategoryRepository::new(pool.clone()),
            expense_repository: ExpenseRepository::new(pool.clone()),
            db_pool: pool,
            jwt_config,
            environment,
        }
    }
}
