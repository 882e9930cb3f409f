//! Error types shared by the store, the state machine and the session layer.
//!
//! Guard failures are [`Rejection`]s: the intent is dropped without any write.
//! Everything that reaches the caller as a failure is a [`RoomError`].

use crate::types::{GamePhase, PlayerId, RoomCode};

/// Failures of the room store itself
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("room {0} not found")]
    NotFound(RoomCode),

    #[error("room code {0} is already taken")]
    CodeTaken(RoomCode),

    #[error("room store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to a session
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomCode),

    #[error("room is full (max {0} players)")]
    RoomFull(usize),

    #[error("the game is already running, wait for the lobby")]
    GameInProgress,

    #[error("player names must be 1-{0} characters")]
    InvalidName(usize),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("could not allocate a free room code")]
    NoFreeCode,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RoomError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(code) => RoomError::NotFound(code),
            other => RoomError::Store(other),
        }
    }
}

impl RoomError {
    /// Wire code for `ServerMessage::Error`
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::NotFound(_) => "ROOM_NOT_FOUND",
            RoomError::RoomFull(_) => "ROOM_FULL",
            RoomError::GameInProgress => "GAME_IN_PROGRESS",
            RoomError::InvalidName(_) => "INVALID_NAME",
            RoomError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            RoomError::NoFreeCode => "NO_FREE_CODE",
            RoomError::Store(_) => "STORE_UNAVAILABLE",
        }
    }

    /// The room is gone for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomError::NotFound(_))
    }
}

/// A guard refused an intent; nothing was written
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("only the host can {0}")]
    NotHost(&'static str),

    #[error("cannot {action} during {phase:?}")]
    WrongPhase {
        action: &'static str,
        phase: GamePhase,
    },

    #[error("need at least {needed} players, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },

    #[error("select at least one category")]
    NoCategories,

    #[error("unknown category {0}")]
    UnknownCategory(String),

    #[error("{requested} impostors need more than {threshold} players")]
    TooManyImpostors { requested: u8, threshold: usize },

    #[error("the host cannot leave, close the room instead")]
    HostMustClose,

    #[error("cannot vote for {0}")]
    InvalidVoteTarget(PlayerId),

    #[error("already rejected this word")]
    AlreadyRejected,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("countdown for round {0} is no longer running")]
    StaleTimer(u32),
}

impl Rejection {
    /// Wire code for `ServerMessage::Error`
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NotHost(_) => "UNAUTHORIZED",
            Rejection::WrongPhase { .. } => "WRONG_PHASE",
            Rejection::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            Rejection::NoCategories => "NO_CATEGORIES",
            Rejection::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Rejection::TooManyImpostors { .. } => "TOO_MANY_IMPOSTORS",
            Rejection::HostMustClose => "HOST_MUST_CLOSE",
            Rejection::InvalidVoteTarget(_) => "INVALID_VOTE_TARGET",
            Rejection::AlreadyRejected => "ALREADY_REJECTED",
            Rejection::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            Rejection::StaleTimer(_) => "STALE_TIMER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_room_not_found() {
        let err: RoomError = StoreError::NotFound("ABC234".to_string()).into();
        assert_eq!(err, RoomError::NotFound("ABC234".to_string()));
        assert!(err.is_terminal());
        assert_eq!(err.code(), "ROOM_NOT_FOUND");
    }

    #[test]
    fn test_store_unavailable_is_recoverable() {
        let err: RoomError = StoreError::Unavailable("connection reset".to_string()).into();
        assert!(!err.is_terminal());
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
        assert!(err.to_string().contains("connection reset"));
    }
}
