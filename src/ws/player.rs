//! Seat handlers
//!
//! Creating, joining, resuming and leaving rooms. A connection holds at most
//! one seat at a time.

use crate::error::RoomError;
use crate::protocol::ServerMessage;
use crate::session::PlayerSession;
use crate::state::{AppState, Seat};
use crate::types::{PlayerId, RoomCode};
use std::sync::Arc;

fn already_seated(session: &Option<PlayerSession>) -> Option<ServerMessage> {
    session.as_ref().filter(|s| s.is_active()).map(|s| {
        ServerMessage::error(
            "ALREADY_IN_ROOM",
            format!("Already in room {}, leave it first", s.code()),
        )
    })
}

fn seat_reply(
    session: &mut Option<PlayerSession>,
    result: Result<PlayerSession, RoomError>,
) -> Option<ServerMessage> {
    match result {
        Ok(new_session) => {
            let seat = new_session.seat().clone();
            *session = Some(new_session);
            Some(ServerMessage::Joined { seat })
        }
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_create_room(
    state: &Arc<AppState>,
    session: &mut Option<PlayerSession>,
    name: String,
) -> Option<ServerMessage> {
    if let Some(err) = already_seated(session) {
        return Some(err);
    }
    tracing::info!("Room creation requested by {}", name);
    let result = PlayerSession::create(state.as_ref().clone(), &name).await;
    seat_reply(session, result)
}

pub async fn handle_join_room(
    state: &Arc<AppState>,
    session: &mut Option<PlayerSession>,
    code: RoomCode,
    name: String,
) -> Option<ServerMessage> {
    if let Some(err) = already_seated(session) {
        return Some(err);
    }
    tracing::info!("{} asking to join {}", name, code);
    let result = PlayerSession::join(state.as_ref().clone(), &code, &name).await;
    seat_reply(session, result)
}

pub async fn handle_resume(
    state: &Arc<AppState>,
    session: &mut Option<PlayerSession>,
    code: RoomCode,
    player_id: PlayerId,
) -> Option<ServerMessage> {
    if let Some(err) = already_seated(session) {
        return Some(err);
    }
    tracing::info!("{} resuming in {}", player_id, code);
    let result = PlayerSession::resume(state.as_ref().clone(), Seat { code, player_id }).await;
    seat_reply(session, result)
}

pub async fn handle_leave_room(session: &mut Option<PlayerSession>) -> Option<ServerMessage> {
    let Some(current) = session.take() else {
        return Some(ServerMessage::error("NOT_IN_ROOM", "Not in a room"));
    };

    match current.leave().await {
        Ok(_) => Some(ServerMessage::Left),
        // The room is gone either way
        Err(RoomError::NotFound(_)) => Some(ServerMessage::Left),
        Err(e) => Some(e.into()),
    }
}
