use std::net::SocketAddr;

use anyhow::Result;
use tracing::{info, warn};

use persistence::repositories::Repositories;
use tenant_admin_api::app::{create_app, AppState};
use tenant_admin_api::config::{Config, StorageBackend};
use tenant_admin_api::middleware;
use tenant_admin_api::services::bootstrap_master;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    middleware::init_metrics()?;

    info!("Starting Tenant Admin API v{}", env!("CARGO_PKG_VERSION"));

    let repos = match config.database.backend {
        StorageBackend::Postgres => {
            let db_config: persistence::db::DatabaseConfig = (&config.database).into();
            let pool = persistence::db::create_pool(&db_config).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data will be lost on restart");
            Repositories::in_memory()
        }
    };

    let addr = config.socket_addr()?;
    let state = AppState::new(config, repos)?;

    let users = state.service(state.repos.users.clone());
    bootstrap_master(&state.repos, &users, &state.config.bootstrap).await?;

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
