use anyhow::Result;
use tracing::info;

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod validation;

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    telemetry::init_tracing,
};
use tokio::net::TcpListener;

use crate::{config::ServerConfig, middleware::JwtConfig};

pub use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let jwt_config = JwtConfig::from_env().map_err(anyhow::Error::msg)?;
    let server_config = ServerConfig::from_env();

    let app_state = AppState::new(pool, jwt_config, server_config.environment.clone());

    // Start the web server
    let app = routes::create_router(app_state);

    let address = server_config.address();
    let listener = TcpListener::bind(&address).await?;
    info!(%address, environment = %server_config.environment, "API service listening");

    axum::serve(listener, app).await?;

    Ok(())
}
