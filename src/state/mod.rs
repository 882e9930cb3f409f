mod game;
mod room;
mod timer;
mod vote;

pub use room::Seat;
pub use timer::Countdown;

use crate::config::GameSettings;
use crate::error::{Rejection, RoomError};
use crate::machine::{self, Context, Event};
use crate::store::{MemoryStore, Mutation, RoomStore};
use crate::types::*;
use crate::words::WordBank;
use rand::rngs::ThreadRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RoomStore>,
    pub words: Arc<WordBank>,
    pub settings: GameSettings,
    /// One mutex per room, held across read, guard and write
    locks: Arc<RwLock<HashMap<RoomCode, Arc<Mutex<()>>>>>,
    /// Running countdowns by room
    timers: Arc<RwLock<HashMap<RoomCode, Countdown>>>,
}

/// Result of an intent that reached the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Written (or a no-op); carries the room as it is now
    Applied(Room),
    /// A guard refused it and nothing was written
    Ignored(Rejection),
}

impl Outcome {
    pub fn room(&self) -> Option<&Room> {
        match self {
            Outcome::Applied(room) => Some(room),
            Outcome::Ignored(_) => None,
        }
    }
}

impl AppState {
    pub fn new(store: Arc<dyn RoomStore>, words: WordBank, settings: GameSettings) -> Self {
        Self {
            store,
            words: Arc::new(words),
            settings,
            locks: Arc::new(RwLock::new(HashMap::new())),
            timers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// In-memory store with the built-in word bank
    pub fn in_memory(settings: GameSettings) -> Self {
        Self::new(Arc::new(MemoryStore::new()), WordBank::builtin(), settings)
    }

    /// The room's mutex. Only codes the store knows get an entry.
    async fn room_lock(&self, code: &str) -> Result<Arc<Mutex<()>>, RoomError> {
        if let Some(lock) = self.locks.read().await.get(code) {
            return Ok(lock.clone());
        }
        self.store.read(code).await?;
        Ok(self
            .locks
            .write()
            .await
            .entry(code.to_string())
            .or_default()
            .clone())
    }

    async fn forget_room(&self, code: &str) {
        self.locks.write().await.remove(code);
        self.timers.write().await.remove(code);
    }

    /// Run a player's intent through the state machine
    pub async fn apply_intent(
        &self,
        code: &str,
        actor: &str,
        event: Event,
    ) -> Result<Outcome, RoomError> {
        tracing::info!("Intent in room {} from {}: {:?}", code, actor, event);
        self.run_intent(code, |room, ctx| machine::apply(room, actor, event, ctx))
            .await
    }

    /// Serialize a transition on the room, then start or stop its countdown
    /// to match the phase it left the room in
    async fn run_intent<F>(&self, code: &str, transition: F) -> Result<Outcome, RoomError>
    where
        F: FnOnce(&Room, &mut Context<'_, ThreadRng>) -> Result<Vec<Mutation>, Rejection>,
    {
        let lock = self.room_lock(code).await?;
        let _guard = lock.lock().await;

        let outcome = self.transition(code, transition).await?;
        if let Outcome::Applied(room) = &outcome {
            self.sync_countdown(room).await;
        }
        Ok(outcome)
    }

    /// Fresh read, guard, batched write. The caller holds the room lock.
    async fn transition<F>(&self, code: &str, transition: F) -> Result<Outcome, RoomError>
    where
        F: FnOnce(&Room, &mut Context<'_, ThreadRng>) -> Result<Vec<Mutation>, Rejection>,
    {
        let room = self.store.read(code).await.inspect_err(|e| {
            tracing::error!("Failed to read room {}: {}", code, e);
        })?;

        let decided = {
            let mut rng = rand::rng();
            let mut ctx = Context {
                words: &self.words,
                rng: &mut rng,
                round_seconds: self.settings.round_seconds,
            };
            transition(&room, &mut ctx)
        };

        match decided {
            Err(rejection) => {
                tracing::debug!("Ignored intent in room {}: {}", code, rejection);
                Ok(Outcome::Ignored(rejection))
            }
            Ok(batch) if batch.is_empty() => Ok(Outcome::Applied(room)),
            Ok(batch) => {
                let before = room.phase();
                let room = self.store.write(code, batch).await.inspect_err(|e| {
                    tracing::error!("Failed to write room {}: {}", code, e);
                })?;
                if room.phase() != before {
                    tracing::info!(
                        "Room {} moved from {:?} to {:?}",
                        code,
                        before,
                        room.phase()
                    );
                }
                Ok(Outcome::Applied(room))
            }
        }
    }

    /// Current snapshot of a room
    pub async fn snapshot(&self, code: &str) -> Result<Room, RoomError> {
        Ok(self.store.read(&code.to_uppercase()).await?)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(GameSettings::default())
    }
}
