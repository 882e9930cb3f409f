use super::{AppState, Outcome};
use crate::error::RoomError;
use crate::machine::Event;
use crate::types::*;

impl AppState {
    /// Host changes the settings in the lobby
    pub async fn update_config(
        &self,
        code: &str,
        player_id: &str,
        config: RoomConfig,
    ) -> Result<Outcome, RoomError> {
        self.apply_intent(code, player_id, Event::UpdateConfig(config))
            .await
    }

    /// Host starts a round with `config`
    pub async fn start_game(
        &self,
        code: &str,
        player_id: &str,
        config: RoomConfig,
    ) -> Result<Outcome, RoomError> {
        self.apply_intent(code, player_id, Event::StartGame(config))
            .await
    }

    /// A player has looked at their card
    pub async fn reveal(&self, code: &str, player_id: &str) -> Result<Outcome, RoomError> {
        self.apply_intent(code, player_id, Event::Reveal).await
    }

    pub async fn reject_word(&self, code: &str, player_id: &str) -> Result<Outcome, RoomError> {
        self.apply_intent(code, player_id, Event::RejectWord).await
    }

    /// Host cuts the discussion short
    pub async fn skip_to_voting(&self, code: &str, player_id: &str) -> Result<Outcome, RoomError> {
        self.apply_intent(code, player_id, Event::SkipToVoting)
            .await
    }

    /// Host aborts the round back to the lobby
    pub async fn end_game(&self, code: &str, player_id: &str) -> Result<Outcome, RoomError> {
        self.apply_intent(code, player_id, Event::EndGame).await
    }

    pub async fn play_again(&self, code: &str, player_id: &str) -> Result<Outcome, RoomError> {
        self.apply_intent(code, player_id, Event::PlayAgain).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::*;
    use super::*;
    use crate::error::Rejection;

    #[tokio::test]
    async fn test_start_game() {
        let state = AppState::default();
        let (code, ids) = lobby(&state, 3).await;

        let room = applied(state.start_game(&code, &ids[0], food()).await.unwrap());

        assert_eq!(room.phase(), GamePhase::Revealing);
        assert_eq!(room.game_state.round, 1);
        assert_eq!(room.impostors().len(), 1);
        assert!(room.config.clue_enabled);
    }

    #[tokio::test]
    async fn test_start_with_two_players_stays_in_lobby() {
        let state = AppState::default();
        let (code, ids) = lobby(&state, 2).await;

        let outcome = state.start_game(&code, &ids[0], food()).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Ignored(Rejection::NotEnoughPlayers { needed: 3, have: 2 })
        );
        assert_eq!(
            state.snapshot(&code).await.unwrap().phase(),
            GamePhase::Lobby
        );
    }

    #[tokio::test]
    async fn test_update_config() {
        let state = AppState::default();
        let (code, ids) = lobby(&state, 4).await;
        let mut config = food();
        config.impostor_count = 2;

        let room = applied(state.update_config(&code, &ids[0], config).await.unwrap());

        assert_eq!(room.config.impostor_count, 1);
        assert!(room.config.categories.contains("Food"));
    }

    #[tokio::test]
    async fn test_reveal_all_starts_playing() {
        let state = fast_state(60);
        let (code, ids) = lobby(&state, 3).await;
        state.start_game(&code, &ids[0], food()).await.unwrap();

        for id in &ids[..2] {
            let room = applied(state.reveal(&code, id).await.unwrap());
            assert_eq!(room.phase(), GamePhase::Revealing);
        }
        let room = applied(state.reveal(&code, &ids[2]).await.unwrap());

        assert_eq!(room.phase(), GamePhase::Playing);
        state.close_room(&code).await.unwrap();
    }

    #[tokio::test]
    async fn test_end_game_resets() {
        let state = fast_state(60);
        let (code, ids) = lobby(&state, 3).await;
        state.start_game(&code, &ids[0], food()).await.unwrap();
        for id in &ids {
            state.reveal(&code, id).await.unwrap();
        }

        let outcome = state.end_game(&code, &ids[1]).await.unwrap();
        assert_eq!(outcome, Outcome::Ignored(Rejection::NotHost("end the game")));

        let room = applied(state.end_game(&code, &ids[0]).await.unwrap());
        assert_eq!(room.phase(), GamePhase::Lobby);
        assert!(room.game_state.word.is_none());
        assert!(room.impostors().is_empty());
        assert!(!state.countdown_running(&code).await);
    }

    #[tokio::test]
    async fn test_reject_word_majority() {
        let state = AppState::default();
        let (code, ids) = lobby(&state, 3).await;
        let room = applied(state.start_game(&code, &ids[0], food()).await.unwrap());
        let word = room.game_state.word.clone();

        let room = applied(state.reject_word(&code, &ids[1]).await.unwrap());
        assert_eq!(room.game_state.rejection_count(), 1);

        let room = applied(state.reject_word(&code, &ids[2]).await.unwrap());
        assert_eq!(room.game_state.rejection_count(), 0);
        assert_ne!(room.game_state.word, word);
        assert_eq!(room.phase(), GamePhase::Revealing);
    }
}
