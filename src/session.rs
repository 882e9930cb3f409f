//! One client's seat in a room.
//!
//! A session follows the room's change stream and derives everything it
//! shows ("my role", "have I voted", which screen) from the latest snapshot
//! alone, so replaying a snapshot is harmless. The room disappearing, or the
//! player being removed from it, ends the session.

use crate::error::RoomError;
use crate::state::{AppState, Outcome, Seat};
use crate::store::{RoomEvent, Subscription};
use crate::types::*;
use crate::view::RoomView;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which screen a client should be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Outside any room
    Home,
    Lobby,
    Card,
    Discussion,
    Ballot,
    Results,
}

impl From<GamePhase> for Screen {
    fn from(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Lobby => Screen::Lobby,
            GamePhase::Revealing => Screen::Card,
            GamePhase::Playing => Screen::Discussion,
            GamePhase::Voting => Screen::Ballot,
            GamePhase::Results => Screen::Results,
        }
    }
}

/// What a room change means for this session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Updated(RoomView),
    /// The room was deleted
    Closed,
    /// The room still exists but this player is no longer in it
    Removed,
}

pub struct PlayerSession {
    state: AppState,
    seat: Seat,
    /// Hosts never change, so this is fixed when the seat is taken
    host: bool,
    subscription: Option<Subscription>,
    latest: Option<Arc<Room>>,
}

impl PlayerSession {
    /// Create a room and take the host seat
    pub async fn create(state: AppState, name: &str) -> Result<Self, RoomError> {
        let seat = state.create_room(name).await?;
        Self::attach(state, seat, true).await
    }

    /// Join an existing room by code
    pub async fn join(state: AppState, code: &str, name: &str) -> Result<Self, RoomError> {
        let seat = state.join_room(code, name).await?;
        Self::attach(state, seat, false).await
    }

    /// Pick a seat back up after a reconnect
    pub async fn resume(state: AppState, seat: Seat) -> Result<Self, RoomError> {
        let seat = Seat {
            code: seat.code.trim().to_uppercase(),
            player_id: seat.player_id,
        };
        let room = state.snapshot(&seat.code).await?;
        if room.player(&seat.player_id).is_none() {
            return Err(RoomError::UnknownPlayer(seat.player_id));
        }
        let host = room.is_host(&seat.player_id);
        Self::attach(state, seat, host).await
    }

    async fn attach(state: AppState, seat: Seat, host: bool) -> Result<Self, RoomError> {
        let subscription = state.store.subscribe(&seat.code).await?;
        Ok(Self {
            state,
            seat,
            host,
            subscription: Some(subscription),
            latest: None,
        })
    }

    /// Wait for the next room change. `None` once the session has ended.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let event = self.subscription.as_mut()?.next().await?;
        Some(self.apply(event))
    }

    /// Fold a room change into the session
    pub fn apply(&mut self, event: RoomEvent) -> SessionEvent {
        match event {
            RoomEvent::Changed(room) if room.player(&self.seat.player_id).is_some() => {
                let view = RoomView::for_player(&room, Some(&self.seat.player_id));
                self.latest = Some(room);
                SessionEvent::Updated(view)
            }
            RoomEvent::Changed(_) => {
                tracing::info!(
                    "{} is no longer in room {}",
                    self.seat.player_id,
                    self.seat.code
                );
                self.end();
                SessionEvent::Removed
            }
            RoomEvent::Closed => {
                self.end();
                SessionEvent::Closed
            }
        }
    }

    fn end(&mut self) {
        self.subscription = None;
        self.latest = None;
    }

    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    pub fn code(&self) -> &str {
        &self.seat.code
    }

    pub fn player_id(&self) -> &str {
        &self.seat.player_id
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Latest snapshot seen
    pub fn room(&self) -> Option<&Room> {
        self.latest.as_deref()
    }

    fn me(&self) -> Option<&Player> {
        self.room()?.player(&self.seat.player_id)
    }

    pub fn view(&self) -> Option<RoomView> {
        self.room()
            .map(|room| RoomView::for_player(room, Some(&self.seat.player_id)))
    }

    pub fn screen(&self) -> Screen {
        self.room()
            .map(|room| Screen::from(room.phase()))
            .unwrap_or(Screen::Home)
    }

    pub fn is_host(&self) -> bool {
        self.host && self.is_active()
    }

    pub fn is_impostor(&self) -> bool {
        self.me().is_some_and(|p| p.is_impostor)
    }

    pub fn has_voted(&self) -> bool {
        self.me().is_some_and(Player::has_voted)
    }

    pub async fn update_config(&self, config: RoomConfig) -> Result<Outcome, RoomError> {
        self.state
            .update_config(self.code(), self.player_id(), config)
            .await
    }

    pub async fn start_game(&self, config: RoomConfig) -> Result<Outcome, RoomError> {
        self.state
            .start_game(self.code(), self.player_id(), config)
            .await
    }

    pub async fn reveal(&self) -> Result<Outcome, RoomError> {
        self.state.reveal(self.code(), self.player_id()).await
    }

    pub async fn reject_word(&self) -> Result<Outcome, RoomError> {
        self.state.reject_word(self.code(), self.player_id()).await
    }

    pub async fn cast_vote(&self, target: &str) -> Result<Outcome, RoomError> {
        self.state
            .cast_vote(self.code(), self.player_id(), target)
            .await
    }

    pub async fn skip_to_voting(&self) -> Result<Outcome, RoomError> {
        self.state
            .skip_to_voting(self.code(), self.player_id())
            .await
    }

    pub async fn end_game(&self) -> Result<Outcome, RoomError> {
        self.state.end_game(self.code(), self.player_id()).await
    }

    pub async fn play_again(&self) -> Result<Outcome, RoomError> {
        self.state.play_again(self.code(), self.player_id()).await
    }

    /// Give up the seat. For the host this closes the room.
    pub async fn leave(mut self) -> Result<Outcome, RoomError> {
        self.end();
        self.state.leave_room(&self.seat.code, &self.seat.player_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameSettings;
    use crate::view::SecretView;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::in_memory(GameSettings {
            round_seconds: 60,
            tick: Duration::from_millis(10),
        })
    }

    fn food() -> RoomConfig {
        RoomConfig {
            impostor_count: 1,
            clue_enabled: false,
            categories: ["Food".to_string()].into(),
        }
    }

    /// Drain events until the session shows `screen`
    async fn wait_for(session: &mut PlayerSession, screen: Screen) {
        while session.screen() != screen {
            session
                .next_event()
                .await
                .unwrap_or_else(|| panic!("Session ended before reaching {:?}", screen));
        }
    }

    #[tokio::test]
    async fn test_first_event_is_current_room() {
        let state = state();
        let mut host = PlayerSession::create(state, "Ana").await.unwrap();
        assert_eq!(host.screen(), Screen::Home);

        match host.next_event().await {
            Some(SessionEvent::Updated(view)) => {
                assert_eq!(view.code, host.code());
                assert!(view.you.unwrap().is_host);
            }
            other => panic!("Expected room update, got {:?}", other),
        }
        assert_eq!(host.screen(), Screen::Lobby);
        assert!(host.is_host());
    }

    #[tokio::test]
    async fn test_roles_follow_snapshot() {
        let state = state();
        let mut host = PlayerSession::create(state.clone(), "Ana").await.unwrap();
        let mut ben = PlayerSession::join(state.clone(), host.code(), "Ben")
            .await
            .unwrap();
        let mut cai = PlayerSession::join(state.clone(), host.code(), "Cai")
            .await
            .unwrap();

        host.start_game(food()).await.unwrap();
        for session in [&mut host, &mut ben, &mut cai] {
            wait_for(session, Screen::Card).await;
        }

        let impostors = [&host, &ben, &cai]
            .iter()
            .filter(|s| s.is_impostor())
            .count();
        assert_eq!(impostors, 1);

        for session in [&host, &ben, &cai] {
            let secret = session.view().unwrap().secret.unwrap();
            match secret {
                SecretView::Impostor { clue } => {
                    assert!(session.is_impostor());
                    assert!(clue.is_none());
                }
                SecretView::Word { .. } => assert!(!session.is_impostor()),
            }
        }
        assert!(!ben.is_host());
        assert!(!ben.has_voted());
    }

    #[tokio::test]
    async fn test_host_leaving_closes_every_session() {
        let state = state();
        let host = PlayerSession::create(state.clone(), "Ana").await.unwrap();
        let mut ben = PlayerSession::join(state.clone(), host.code(), "Ben")
            .await
            .unwrap();
        wait_for(&mut ben, Screen::Lobby).await;

        host.leave().await.unwrap();

        assert_eq!(ben.next_event().await, Some(SessionEvent::Closed));
        assert_eq!(ben.screen(), Screen::Home);
        assert!(!ben.is_active());
        assert!(ben.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_leaving_guest_sees_removed() {
        let state = state();
        let host = PlayerSession::create(state.clone(), "Ana").await.unwrap();
        let mut ben = PlayerSession::join(state.clone(), host.code(), "Ben")
            .await
            .unwrap();
        wait_for(&mut ben, Screen::Lobby).await;

        state.leave_room(host.code(), ben.player_id()).await.unwrap();

        assert_eq!(ben.next_event().await, Some(SessionEvent::Removed));
        assert!(!ben.is_active());
    }

    #[tokio::test]
    async fn test_resume_requires_membership() {
        let state = state();
        let host = PlayerSession::create(state.clone(), "Ana").await.unwrap();

        let seat = Seat {
            code: host.code().to_lowercase(),
            player_id: host.player_id().to_string(),
        };
        let resumed = PlayerSession::resume(state.clone(), seat).await.unwrap();
        assert_eq!(resumed.code(), host.code());

        let stranger = Seat {
            code: host.code().to_string(),
            player_id: "stranger".to_string(),
        };
        assert_eq!(
            PlayerSession::resume(state, stranger).await.err(),
            Some(RoomError::UnknownPlayer("stranger".to_string()))
        );
    }
}
