use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelpick_api::{
    config::Config,
    routes::{create_router, AppState},
    services::{CompletionChain, RecommendationService, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelpick_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Arc::new(TmdbProvider::from_config(&config)?);
    let completion = CompletionChain::from_config(&config)?;
    if completion.is_empty() {
        tracing::warn!("No completion provider keys configured; requests will fail with 503");
    }

    let service = RecommendationService::new(
        completion,
        catalog,
        config.tmdb_image_base_url.clone(),
    );
    let app = create_router(Arc::new(AppState::new(service)));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
