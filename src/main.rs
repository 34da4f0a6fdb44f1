use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use pawprint_api::config::config;
use pawprint_api::database::{create_pool, ensure_schema, PgPetStore, PgUserStore};
use pawprint_api::handlers::build_router;
use pawprint_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config();
    tracing::info!("Starting Pawprint API in {:?} mode", config.environment);

    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    ensure_schema(&pool).await.context("schema setup failed")?;

    let state = AppState::new(
        config.clone(),
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgPetStore::new(pool)),
    );

    let app = build_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Pawprint API listening on http://{bind_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server")?;

    Ok(())
}
