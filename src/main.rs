use tracing_subscriber::EnvFilter;

use genre_compass::{
    config::Config,
    db,
    routes::{create_router, AppState, Settings},
    services::CatalogLoader,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("genre_compass=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Load eagerly so a broken catalog shows up in the startup logs
    let catalog = CatalogLoader::new(&config.catalog_path);
    if let Some(error) = &catalog.load().error {
        tracing::warn!(error = %error, "Serving without a catalog");
    }

    let store = db::open_store(&config).await?;
    let state = AppState::new(catalog, store, Settings::from(&config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
