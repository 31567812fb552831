use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use sqlx::PgPool;

use checkmedi::config::Config;
use checkmedi::routes::{app, with_frontend, AppState};
use checkmedi::store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    checkmedi::init_tracing();

    let config = Config::from_env()?;

    // Connect to PostgreSQL
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    let store = Arc::new(PgStore::new(pool));
    store.init_schema().await.context("Failed to create tables")?;

    let mut router = app(AppState::from_config(store, &config));
    if let Some(dir) = &config.static_dir {
        router = with_frontend(router, dir);
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 Listening on http://{}", config.bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}
