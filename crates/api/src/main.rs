use anyhow::Context;

use supplydesk_api::app::{build_app, AppServices};
use supplydesk_infra::{db, AppConfig};
use supplydesk_observability::LogOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    supplydesk_observability::init(&LogOptions {
        level: config.log.level.clone(),
        json: config.log.json,
    });

    anyhow::ensure!(!config.auth.secret.is_empty(), "auth.secret must be set");

    let pool = db::connect(&config.database).await.context("failed to connect to database")?;
    let services = AppServices::postgres(pool, &config.auth);
    let app = build_app(&config.auth, services);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
