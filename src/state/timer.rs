//! Discussion countdown.
//!
//! One task per room while it is `Playing`, bound to the round it was
//! started for. Every step goes through the room lock like any intent, so a
//! step that lands after the phase moved on is rejected as stale and the
//! task stops.

use super::{AppState, Outcome};
use crate::error::RoomError;
use crate::machine;
use crate::types::*;
use tokio::sync::watch;

/// Handle to a running countdown. Dropping it stops the task.
#[derive(Debug)]
pub struct Countdown {
    round: u32,
    cancel: watch::Sender<bool>,
}

impl Countdown {
    pub fn round(&self) -> u32 {
        self.round
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
    }
}

impl AppState {
    /// Start or stop the room's countdown to match its phase
    pub(super) async fn sync_countdown(&self, room: &Room) {
        let mut timers = self.timers.write().await;
        let round = room.game_state.round;

        if room.phase() != GamePhase::Playing {
            if timers.remove(&room.code).is_some() {
                tracing::debug!("Countdown for room {} stopped", room.code);
            }
            return;
        }

        if timers.get(&room.code).is_some_and(|c| c.round == round) {
            return;
        }
        tracing::debug!("Countdown for room {} round {} started", room.code, round);
        // Replacing an older handle drops it, which stops its task
        timers.insert(room.code.clone(), self.spawn_countdown(room.code.clone(), round));
    }

    fn spawn_countdown(&self, code: RoomCode, round: u32) -> Countdown {
        let (cancel, mut cancelled) = watch::channel(false);
        let state = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(state.settings.tick);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.changed() => break,
                    _ = interval.tick() => {
                        match state.tick_room(&code, round).await {
                            Ok(Outcome::Applied(room)) if room.phase() == GamePhase::Playing => {}
                            Ok(Outcome::Applied(_)) => {
                                state.finish_countdown(&code, round).await;
                                break;
                            }
                            Ok(Outcome::Ignored(reason)) => {
                                tracing::debug!("Countdown for room {} stopping: {}", code, reason);
                                break;
                            }
                            Err(e) => {
                                tracing::error!("Countdown for room {} failed: {}", code, e);
                                break;
                            }
                        }
                    }
                }
            }
        });

        Countdown { round, cancel }
    }

    /// One countdown step under the room lock
    async fn tick_room(&self, code: &str, round: u32) -> Result<Outcome, RoomError> {
        let lock = self.room_lock(code).await?;
        let _guard = lock.lock().await;
        self.transition(code, |room, _| machine::tick(room, round))
            .await
    }

    /// Drop the handle of a countdown that ran out on its own
    async fn finish_countdown(&self, code: &str, round: u32) {
        let mut timers = self.timers.write().await;
        if timers.get(code).is_some_and(|c| c.round == round) {
            timers.remove(code);
        }
    }

    /// Whether a countdown task is registered for the room
    pub async fn countdown_running(&self, code: &str) -> bool {
        self.timers.read().await.contains_key(code)
    }
}
