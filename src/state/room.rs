use super::{AppState, Outcome};
use crate::error::{RoomError, StoreError};
use crate::machine;
use crate::store::Mutation;
use crate::types::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Attempts before giving up on finding a free code
const MAX_CODE_ATTEMPTS: usize = 16;

/// Generate a random room code
fn generate_room_code() -> RoomCode {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Trimmed display name, if it fits
fn validate_name(name: &str) -> Result<String, RoomError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(RoomError::InvalidName(MAX_NAME_CHARS));
    }
    Ok(name.to_string())
}

/// A player's place in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub code: RoomCode,
    pub player_id: PlayerId,
}

impl AppState {
    /// Create a room with `host_name` as its host
    pub async fn create_room(&self, host_name: &str) -> Result<Seat, RoomError> {
        let name = validate_name(host_name)?;
        let host_id = ulid::Ulid::new().to_string();

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_room_code();
            let room = Room::new(
                code.clone(),
                host_id.clone(),
                name.clone(),
                self.settings.round_seconds,
            );

            match self.store.create(room).await {
                Ok(()) => {
                    tracing::info!("Room {} created by {} ({})", code, name, host_id);
                    return Ok(Seat {
                        code,
                        player_id: host_id,
                    });
                }
                // Collision - try again
                Err(StoreError::CodeTaken(_)) => continue,
                Err(e) => {
                    tracing::error!("Failed to create room: {}", e);
                    return Err(e.into());
                }
            }
        }

        tracing::error!("No free room code after {} attempts", MAX_CODE_ATTEMPTS);
        Err(RoomError::NoFreeCode)
    }

    /// Join a room in the lobby. The code is case-insensitive.
    pub async fn join_room(&self, code: &str, name: &str) -> Result<Seat, RoomError> {
        let code = code.trim().to_uppercase();
        let name = validate_name(name)?;

        let refused = |e: &RoomError| tracing::warn!("Join to {} refused: {}", code, e);
        let lock = self.room_lock(&code).await.inspect_err(refused)?;
        let _guard = lock.lock().await;

        let room = self.snapshot(&code).await.inspect_err(refused)?;

        if room.player_count() >= MAX_PLAYERS {
            tracing::warn!("Join to {} refused: room full", code);
            return Err(RoomError::RoomFull(MAX_PLAYERS));
        }
        if room.phase() != GamePhase::Lobby {
            tracing::warn!("Join to {} refused: game in {:?}", code, room.phase());
            return Err(RoomError::GameInProgress);
        }

        let player = Player::new(ulid::Ulid::new().to_string(), name, false, room.next_seq);
        let seat = Seat {
            code: code.clone(),
            player_id: player.id.clone(),
        };

        tracing::info!("{} joined room {} as {}", player.name, code, player.id);
        self.store
            .write(&code, vec![Mutation::AddPlayer(player)])
            .await?;
        Ok(seat)
    }

    /// Leave a room. The host leaving closes it for everyone.
    pub async fn leave_room(&self, code: &str, player_id: &str) -> Result<Outcome, RoomError> {
        let room = self.snapshot(code).await?;
        if room.is_host(player_id) {
            self.close_room(&room.code).await?;
            return Ok(Outcome::Applied(room));
        }

        tracing::info!("{} is leaving room {}", player_id, room.code);
        self.run_intent(&room.code, |room, _| {
            machine::remove_player(room, player_id)
        })
        .await
    }

    /// Delete a room, stop its countdown and notify every subscriber
    pub async fn close_room(&self, code: &str) -> Result<(), RoomError> {
        let lock = self.room_lock(code).await?;
        let _guard = lock.lock().await;

        self.store.delete(code).await?;
        self.forget_room(code).await;
        tracing::info!("Room {} closed", code);
        Ok(())
    }
}
