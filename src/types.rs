use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Opaque ID types for type safety
pub type RoomCode = String;
pub type PlayerId = String;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 6;
pub const MAX_NAME_CHARS: usize = 15;
pub const ROOM_CODE_LENGTH: usize = 6;
pub const DEFAULT_ROUND_SECONDS: u32 = 420;

/// Clue handed out when the word bank has none for the secret word
pub const PLACEHOLDER_CLUE: &str = "Guess";

/// A second impostor needs strictly more players than this
pub const TWO_IMPOSTOR_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    Revealing,
    Playing,
    Voting,
    Results,
}

impl GamePhase {
    /// Check if a phase transition is valid
    pub fn can_transition(from: GamePhase, to: GamePhase) -> bool {
        use GamePhase::*;

        matches!(
            (from, to),
            (Lobby, Revealing)
                | (Revealing, Playing)
                | (Playing, Voting)
                | (Voting, Results)
                | (Results, Lobby)
                // Host ends the game from the discussion
                | (Playing, Lobby)
        )
    }

    /// Phases reachable from this one
    pub fn valid_transitions(self) -> Vec<GamePhase> {
        use GamePhase::*;

        [Lobby, Revealing, Playing, Voting, Results]
            .into_iter()
            .filter(|to| Self::can_transition(self, *to))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomConfig {
    pub impostor_count: u8,
    pub clue_enabled: bool,
    pub categories: BTreeSet<String>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            impostor_count: 1,
            clue_enabled: false,
            categories: BTreeSet::new(),
        }
    }
}

impl RoomConfig {
    /// Highest impostor count a room of `players` may use
    pub fn max_impostors_for(players: usize) -> u8 {
        if players > TWO_IMPOSTOR_THRESHOLD {
            2
        } else {
            1
        }
    }

    /// Clamp the impostor count into `1..=max_impostors_for(players)`
    pub fn clamped(mut self, players: usize) -> Self {
        self.impostor_count = self
            .impostor_count
            .clamp(1, Self::max_impostors_for(players));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub phase: GamePhase,
    /// Incremented on every game start; countdowns are bound to it
    pub round: u32,
    pub category: Option<String>,
    pub word: Option<String>,
    pub clue: Option<String>,
    pub time_left: u32,
    pub impostor_ids: Vec<PlayerId>,
    pub first_speaker: Option<PlayerId>,
    /// Players who rejected the current word
    #[serde(default)]
    pub word_rejections: BTreeSet<PlayerId>,
    pub voting_results: Option<BTreeMap<PlayerId, u32>>,
    pub most_voted: Option<PlayerId>,
}

impl GameState {
    pub fn new(round_seconds: u32) -> Self {
        Self {
            phase: GamePhase::Lobby,
            round: 0,
            category: None,
            word: None,
            clue: None,
            time_left: round_seconds,
            impostor_ids: Vec::new(),
            first_speaker: None,
            word_rejections: BTreeSet::new(),
            voting_results: None,
            most_voted: None,
        }
    }

    pub fn rejection_count(&self) -> usize {
        self.word_rejections.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_impostor: bool,
    pub has_revealed: bool,
    pub vote: Option<PlayerId>,
    /// Position in join order, the stable ordering for selection and tallying
    pub joined_seq: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_host: bool, joined_seq: u32) -> Self {
        Self {
            id,
            name,
            is_host,
            is_impostor: false,
            has_revealed: false,
            vote: None,
            joined_seq,
        }
    }

    pub fn has_voted(&self) -> bool {
        self.vote.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub players: HashMap<PlayerId, Player>,
    pub config: RoomConfig,
    pub game_state: GameState,
    pub created_at: String,
    /// Next `joined_seq` to hand out; never decreases so ids are never reused
    pub next_seq: u32,
}

impl Room {
    /// Create a room in the lobby with its host as the only player
    pub fn new(code: RoomCode, host_id: PlayerId, host_name: String, round_seconds: u32) -> Self {
        let host = Player::new(host_id.clone(), host_name, true, 0);
        let mut players = HashMap::new();
        players.insert(host_id.clone(), host);

        Self {
            code,
            host_id,
            players,
            config: RoomConfig::default(),
            game_state: GameState::new(round_seconds),
            created_at: chrono::Utc::now().to_rfc3339(),
            next_seq: 1,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.game_state.phase
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn is_host(&self, id: &str) -> bool {
        self.host_id == id
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Players sorted by join order
    pub fn players_in_join_order(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.joined_seq);
        players
    }

    /// Player ids sorted by join order
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players_in_join_order()
            .into_iter()
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn all_revealed(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.has_revealed)
    }

    pub fn all_voted(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(Player::has_voted)
    }

    pub fn impostors(&self) -> Vec<&Player> {
        self.players_in_join_order()
            .into_iter()
            .filter(|p| p.is_impostor)
            .collect()
    }
}
