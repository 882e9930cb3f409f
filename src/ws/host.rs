//! Host-only command handlers
//!
//! All handlers in this module require the host seat.
//! Authorization is checked in the main dispatch layer before calling these.

use super::handlers::reply;
use crate::protocol::ServerMessage;
use crate::session::PlayerSession;
use crate::types::RoomConfig;

pub async fn handle_update_config(
    session: &PlayerSession,
    config: RoomConfig,
) -> Option<ServerMessage> {
    tracing::info!("Host updating config in {}: {:?}", session.code(), config);
    reply(session.update_config(config).await)
}

pub async fn handle_start_game(
    session: &PlayerSession,
    config: RoomConfig,
) -> Option<ServerMessage> {
    tracing::info!(
        "Host starting game in {} with categories {:?}",
        session.code(),
        config.categories
    );
    reply(session.start_game(config).await)
}

pub async fn handle_skip_to_voting(session: &PlayerSession) -> Option<ServerMessage> {
    tracing::info!("Host skipping to voting in {}", session.code());
    reply(session.skip_to_voting().await)
}

pub async fn handle_end_game(session: &PlayerSession) -> Option<ServerMessage> {
    tracing::info!("Host ending game in {}", session.code());
    reply(session.end_game().await)
}

pub async fn handle_play_again(session: &PlayerSession) -> Option<ServerMessage> {
    tracing::info!("Host returning {} to the lobby", session.code());
    reply(session.play_again().await)
}
