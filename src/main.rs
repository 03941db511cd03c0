use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use healthharmony_pos::billing;
use healthharmony_pos::cache::AppCache;
use healthharmony_pos::config::AppConfig;
use healthharmony_pos::routes;
use healthharmony_pos::store::DocStore;
use healthharmony_pos::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let store = DocStore::new(
        config.store_base_url.clone(),
        config.store_dataset.clone(),
        config.store_token.clone(),
    );
    let cache = AppCache::new();

    // Warm the price table so the first bill does not wait on the store.
    match billing::service::current_price_table(&store, &cache).await {
        Ok(table) => info!(activities = table.entry.len(), "price table loaded"),
        Err(err) => warn!("price table warm-up failed: {err}"),
    }

    let bind_addr = config.bind_addr;
    let state = AppState { config: Arc::new(config), store, cache };

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
