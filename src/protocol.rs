use crate::error::{Rejection, RoomError};
use crate::state::Seat;
use crate::types::*;
use crate::view::RoomView;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
    },
    JoinRoom {
        code: RoomCode,
        name: String,
    },
    /// Reattach to a seat after a reconnect
    Resume {
        code: RoomCode,
        player_id: PlayerId,
    },
    Reveal,
    RejectWord,
    CastVote {
        target: PlayerId,
    },
    LeaveRoom,
    // Host-only messages
    UpdateConfig {
        config: RoomConfig,
    },
    StartGame {
        config: RoomConfig,
    },
    SkipToVoting,
    EndGame,
    PlayAgain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        server_now: String,
    },
    /// The connection now holds this seat; keep it to resume later
    Joined {
        seat: Seat,
    },
    /// The room as this connection's player sees it
    Room {
        view: RoomView,
    },
    /// The room no longer exists
    RoomClosed,
    /// This connection no longer holds a seat
    Left,
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn welcome() -> Self {
        ServerMessage::Welcome {
            protocol: PROTOCOL_VERSION.to_string(),
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(code: &str, msg: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            msg: msg.into(),
        }
    }
}

impl From<RoomError> for ServerMessage {
    fn from(e: RoomError) -> Self {
        ServerMessage::error(e.code(), e.to_string())
    }
}

impl From<Rejection> for ServerMessage {
    fn from(r: Rejection) -> Self {
        ServerMessage::error(r.code(), r.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"join_room","code":"abc234","name":"Ana"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { ref code, .. } if code == "abc234"));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"t":"start_game","config":{"impostor_count":1,"clue_enabled":true,"categories":["Food"]}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::StartGame { config } => {
                assert!(config.clue_enabled);
                assert!(config.categories.contains("Food"));
            }
            other => panic!("Expected start_game, got {:?}", other),
        }

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"skip_to_voting"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SkipToVoting));
    }

    #[test]
    fn test_raw_field_writes_are_not_messages() {
        let result =
            serde_json::from_str::<ClientMessage>(r#"{"t":"set_phase","phase":"RESULTS"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_from_rejection() {
        let msg: ServerMessage = Rejection::NotHost("start the game").into();
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["t"], "error");
        assert_eq!(json["code"], "UNAUTHORIZED");
        assert_eq!(json["msg"], "only the host can start the game");
    }

    #[test]
    fn test_room_closed_shape() {
        let json = serde_json::to_string(&ServerMessage::RoomClosed).unwrap();
        assert_eq!(json, r#"{"t":"room_closed"}"#);
    }
}
