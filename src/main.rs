//! Storefront HTTP server.
//!
//! ```text
//! storefront [--env dev] [--port 8080]
//! ```
//!
//! Runs on PostgreSQL when `postgres_url` (or `DATABASE_URL`) is set,
//! otherwise on the in-memory store.

use std::sync::Arc;

use anyhow::Context;

use storefront::account::UserCache;
use storefront::auth::TokenService;
use storefront::config::AppConfig;
use storefront::db::Database;
use storefront::events::event_channel;
use storefront::gateway::{self, state::AppState};
use storefront::logging::init_logging;
use storefront::store::Repositories;

fn arg_value(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.windows(2)
        .find(|pair| names.contains(&pair[0].as_str()))
        .map(|pair| pair[1].clone())
}

fn get_env() -> String {
    arg_value(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    arg_value(&["--port"]).and_then(|p| p.parse().ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = init_logging(&config);

    tracing::info!(env = %env, "starting storefront");

    let (repos, db) = match &config.postgres_url {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("failed to connect to PostgreSQL")?;
            db.init_schema()
                .await
                .context("failed to initialize schema")?;
            let repos = Repositories::postgres(db.pool().clone());
            (repos, Some(Arc::new(db)))
        }
        None => {
            tracing::warn!("postgres_url not set, using in-memory store (data is lost on exit)");
            (Repositories::memory(), None)
        }
    };

    let cache = Arc::new(UserCache::new());
    let (events, worker) = event_channel(config.events.channel_size, cache.clone());
    tokio::spawn(worker.run());

    if config.auth.uses_default_secret() {
        tracing::warn!("auth.jwt_secret not configured, signing tokens with the built-in default secret; set JWT_SECRET");
    }
    let tokens = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    ));
    let state = AppState::new(repos, cache, events, tokens, db);

    if let Some(admin) = &config.auth.bootstrap_admin {
        state
            .users
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("failed to create bootstrap admin")?;
    }

    gateway::run_server(&config, Arc::new(state)).await
}
