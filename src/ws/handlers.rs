//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Seat and host checks happen here, then messages are dispatched to the
//! handler modules. The state machine re-checks every guard on its own.

use crate::error::RoomError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::PlayerSession;
use crate::state::{AppState, Outcome};
use std::sync::Arc;

use super::{host, player};

/// Macro to check host authorization and return early if unauthorized
macro_rules! check_host {
    ($session:expr, $action:expr) => {
        if !$session.is_host() {
            return Some(ServerMessage::Error {
                code: "UNAUTHORIZED".to_string(),
                msg: format!("Only the host can {}", $action),
            });
        }
    };
}

/// Macro to take the connection's seat or return early if it has none
macro_rules! seated {
    ($session:expr) => {
        match $session.as_ref() {
            Some(s) if s.is_active() => s,
            _ => {
                return Some(ServerMessage::Error {
                    code: "NOT_IN_ROOM".to_string(),
                    msg: "Create or join a room first".to_string(),
                })
            }
        }
    };
}

/// Handle client messages and return optional response.
///
/// Accepted intents get no direct reply: the new room view arrives through
/// the session's subscription like every other change.
pub async fn handle_message(
    msg: ClientMessage,
    session: &mut Option<PlayerSession>,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Seat messages
        ClientMessage::CreateRoom { name } => {
            player::handle_create_room(state, session, name).await
        }

        ClientMessage::JoinRoom { code, name } => {
            player::handle_join_room(state, session, code, name).await
        }

        ClientMessage::Resume { code, player_id } => {
            player::handle_resume(state, session, code, player_id).await
        }

        ClientMessage::LeaveRoom => player::handle_leave_room(session).await,

        // Player messages
        ClientMessage::Reveal => {
            let s = seated!(session);
            reply(s.reveal().await)
        }

        ClientMessage::RejectWord => {
            let s = seated!(session);
            reply(s.reject_word().await)
        }

        ClientMessage::CastVote { target } => {
            let s = seated!(session);
            reply(s.cast_vote(&target).await)
        }

        // Host-only commands (authorization checked before dispatch)
        ClientMessage::UpdateConfig { config } => {
            let s = seated!(session);
            check_host!(s, "change the settings");
            host::handle_update_config(s, config).await
        }

        ClientMessage::StartGame { config } => {
            let s = seated!(session);
            check_host!(s, "start the game");
            host::handle_start_game(s, config).await
        }

        ClientMessage::SkipToVoting => {
            let s = seated!(session);
            check_host!(s, "skip to voting");
            host::handle_skip_to_voting(s).await
        }

        ClientMessage::EndGame => {
            let s = seated!(session);
            check_host!(s, "end the game");
            host::handle_end_game(s).await
        }

        ClientMessage::PlayAgain => {
            let s = seated!(session);
            check_host!(s, "start another round");
            host::handle_play_again(s).await
        }
    }
}

/// Map an intent's outcome to the direct reply, if any
pub(super) fn reply(result: Result<Outcome, RoomError>) -> Option<ServerMessage> {
    match result {
        Ok(Outcome::Applied(_)) => None,
        Ok(Outcome::Ignored(rejection)) => Some(rejection.into()),
        Err(e) => Some(e.into()),
    }
}
