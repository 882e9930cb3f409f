// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod error;
pub mod machine;
pub mod protocol;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod view;
pub mod words;
pub mod ws;

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Build the HTTP + WebSocket router
pub fn router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let api_routes = Router::new()
        .route("/categories", get(api::list_categories))
        .route("/rooms", post(api::create_room))
        .route("/rooms/{code}", get(api::get_room))
        .route("/rooms/{code}/join", post(api::join_room));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/healthz", get(api::healthz))
        .nest("/api", api_routes);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
