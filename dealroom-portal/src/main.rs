//! Dealroom NDA Portal
//!
//! NDA signing service for a single transaction's due-diligence data
//! room. Sits behind an external auth layer that injects identity
//! headers; see the `auth` module.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealroom_portal::{
    routes, AppState, Config, InMemoryRoleStore, InMemorySignatureStore, RateLimiter, RoleStore,
    SqliteStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dealroom_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    let agreement = config.agreement();
    let rate_limiter = RateLimiter::new(config.rate_limit_attempts, config.rate_limit_window());

    // Create app state; SQLite serves both stores when configured,
    // otherwise everything lives in memory
    let app = match &config.database_path {
        Some(path) => {
            let store = Arc::new(SqliteStore::open(path)?);
            seed_admins(store.as_ref(), &config.admin_users)?;
            let state = Arc::new(AppState::new(agreement, rate_limiter, store.clone(), store));
            routes::create_router(state)
        }
        None => {
            tracing::warn!("No database configured; signatures will not survive a restart");
            let roles = Arc::new(InMemoryRoleStore::new());
            seed_admins(roles.as_ref(), &config.admin_users)?;
            let state = Arc::new(AppState::new(
                agreement,
                rate_limiter,
                Arc::new(InMemorySignatureStore::new()),
                roles,
            ));
            routes::create_router(state)
        }
    };

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Portal listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn seed_admins<R: RoleStore>(roles: &R, admin_users: &[String]) -> Result<()> {
    for user_id in admin_users {
        roles
            .assign(user_id, "admin")
            .map_err(|e| anyhow::anyhow!("failed to seed admin {user_id}: {e}"))?;
        tracing::info!(user_id = %user_id, "Seeded admin role");
    }
    Ok(())
}
