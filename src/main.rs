use std::sync::Arc;

use anyhow::Context;

use magpie_core::AppConfig;
use reddit_source::RedditDataSource;
use twitter_source::TwitterDataSource;
use web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("magpie=debug,web=debug,twitter_source=debug,reddit_source=debug")
        .init();

    tracing::info!("Starting Magpie - social data downloader");

    let config = AppConfig::load().context("loading configuration")?;

    let twitter = Arc::new(TwitterDataSource::new(config.twitter.bearer_token.clone()));
    let reddit = Arc::new(
        RedditDataSource::connect(config.reddit.clone(), config.listing_limit)
            .await
            .context("establishing Reddit session")?,
    );

    let app = web::create_router(AppState { twitter, reddit });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}
