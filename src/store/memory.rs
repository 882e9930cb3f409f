use super::{Mutation, RoomEvent, RoomStore, Subscription};
use crate::error::{StoreError, StoreResult};
use crate::types::{Room, RoomCode};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const SUBSCRIBER_BUFFER: usize = 64;

struct RoomSlot {
    room: Room,
    changes: broadcast::Sender<RoomEvent>,
}

/// In-process room store backed by a map and per-room broadcast channels
#[derive(Clone, Default)]
pub struct MemoryStore {
    rooms: Arc<RwLock<HashMap<RoomCode, RoomSlot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create(&self, room: Room) -> StoreResult<()> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.code) {
            return Err(StoreError::CodeTaken(room.code));
        }

        let (changes, _rx) = broadcast::channel(SUBSCRIBER_BUFFER);
        rooms.insert(room.code.clone(), RoomSlot { room, changes });
        Ok(())
    }

    async fn read(&self, code: &str) -> StoreResult<Room> {
        self.rooms
            .read()
            .await
            .get(code)
            .map(|slot| slot.room.clone())
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn subscribe(&self, code: &str) -> StoreResult<Subscription> {
        let rooms = self.rooms.read().await;
        let slot = rooms
            .get(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        // Subscribing under the lock means no write can slip between the
        // snapshot and the receiver
        Ok(Subscription::new(
            Arc::new(slot.room.clone()),
            slot.changes.subscribe(),
        ))
    }

    async fn write(&self, code: &str, batch: Vec<Mutation>) -> StoreResult<Room> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        slot.room.apply_batch(&batch);
        let snapshot = slot.room.clone();

        // No subscribers is fine
        let _ = slot.changes.send(RoomEvent::Changed(Arc::new(snapshot.clone())));
        Ok(snapshot)
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        let slot = self
            .rooms
            .write()
            .await
            .remove(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        let _ = slot.changes.send(RoomEvent::Closed);
        Ok(())
    }
}
