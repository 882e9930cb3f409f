use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impostor::{
    config::ServerConfig, router, state::AppState, store::MemoryStore, words::WordBank,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impostor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Impostor...");

    let config = ServerConfig::from_env();

    let words = match &config.word_bank_path {
        Some(path) => match WordBank::load(path) {
            Ok(words) => {
                tracing::info!("Loaded word bank from {}", path.display());
                words
            }
            Err(e) => {
                tracing::error!("Failed to load word bank {}: {}", path.display(), e);
                return;
            }
        },
        None => WordBank::builtin(),
    };
    tracing::info!(
        "Word bank has {} categories",
        words.categories().count()
    );

    let state = Arc::new(AppState::new(
        Arc::new(MemoryStore::new()),
        words,
        config.game,
    ));
    let app = router(state, config.static_dir.as_deref());

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            return;
        }
    };
    tracing::info!("Listening on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
