use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use attach_planner::api;
use attach_planner::config::Config;
use attach_planner::services::AttachPlanner;
use attach_planner::storage::{ConnectionCatalog, SqliteCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_ansi(config.logging.style != "never")
        .init();

    info!("Starting server on {}", config.server_address());

    // Open the connection catalog
    let catalog: Arc<dyn ConnectionCatalog> = Arc::new(
        SqliteCatalog::open(&config.catalog.url)
            .await
            .map_err(|e| {
                error!("Failed to open connection catalog: {}", e);
                e
            })?,
    );

    let planner = Arc::new(AttachPlanner::new(&config.planner));
    info!(
        "Reference cache: {} entries, {}s TTL",
        config.planner.cache_max_entries, config.planner.cache_ttl_secs
    );

    if planner.cache().is_enabled() && config.planner.cache_ttl_secs > 0 {
        let sweeper = Arc::clone(&planner);
        let period = Duration::from_secs(config.planner.cache_ttl_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                sweeper.cache().cleanup_expired();
            }
        });
    }

    // Create router with state
    let app: Router = api::routes::create_router_with_state(catalog, planner, config.clone());

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
