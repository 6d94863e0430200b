use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wordcloud::config::Config;
use wordcloud::layout::load_glyph_source;
use wordcloud::routes::build_router;
use wordcloud::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = &config.rust_log;
            EnvFilter::new(format!("{}={level},api={level}", env!("CARGO_PKG_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting word cloud API v{}", env!("CARGO_PKG_VERSION"));

    // Resolve the glyph source once; font discovery scans the system font directories.
    let glyphs = load_glyph_source(config.font_path.as_deref(), config.font_family.as_deref());
    info!("Glyph source: {}", glyphs.name());
    info!(
        "Default canvas: {}x{} on {}",
        config.width, config.height, config.background
    );

    let state = AppState::new(config.clone(), glyphs);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
