//! Room store: the system of record for rooms.
//!
//! The store only knows documents and field writes. It has no notion of
//! phases or hosts; all game rules live in [`crate::machine`].

mod memory;
mod mutation;

pub use memory::MemoryStore;
pub use mutation::Mutation;

use crate::error::StoreResult;
use crate::types::Room;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Change notification pushed to every subscriber of a room
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// Full snapshot after a write
    Changed(Arc<Room>),
    /// The room was deleted
    Closed,
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Insert a new room, failing if the code is taken
    async fn create(&self, room: Room) -> StoreResult<()>;

    /// Read the current snapshot
    async fn read(&self, code: &str) -> StoreResult<Room>;

    /// Subscribe to changes; the first event is the current snapshot
    async fn subscribe(&self, code: &str) -> StoreResult<Subscription>;

    /// Apply a batch of field writes atomically and return the new snapshot
    async fn write(&self, code: &str, batch: Vec<Mutation>) -> StoreResult<Room>;

    /// Delete the room and notify subscribers
    async fn delete(&self, code: &str) -> StoreResult<()>;
}

/// Stream of room changes. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    pending: Option<RoomEvent>,
    rx: broadcast::Receiver<RoomEvent>,
    closed: bool,
}

impl Subscription {
    pub fn new(current: Arc<Room>, rx: broadcast::Receiver<RoomEvent>) -> Self {
        Self {
            pending: Some(RoomEvent::Changed(current)),
            rx,
            closed: false,
        }
    }

    /// Next change, or `None` once `Closed` has been delivered
    pub async fn next(&mut self) -> Option<RoomEvent> {
        if self.closed {
            return None;
        }
        if let Some(event) = self.pending.take() {
            return Some(event);
        }

        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if matches!(event, RoomEvent::Closed) {
                        self.closed = true;
                    }
                    return Some(event);
                }
                // Every event is a full snapshot, skipping ahead loses nothing
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Subscriber lagged, skipped {} snapshots", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.closed = true;
                    return Some(RoomEvent::Closed);
                }
            }
        }
    }
}
