//! Per-viewer projections of a room.
//!
//! Snapshots never leave the server as-is: every client gets a [`RoomView`]
//! built for it, which hides the secret word from impostors and everyone's
//! role and vote from everyone else until the results are in.

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomView {
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub phase: GamePhase,
    pub round: u32,
    pub time_left: u32,
    pub config: RoomConfig,
    /// In join order
    pub players: Vec<PlayerView>,
    pub first_speaker: Option<PlayerId>,
    pub rejection_count: usize,
    pub category: Option<String>,
    /// What the viewer sees on their card; `None` in the lobby and for
    /// spectators
    pub secret: Option<SecretView>,
    pub you: Option<SelfView>,
    pub results: Option<ResultsView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub has_revealed: bool,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretView {
    Word { word: String },
    Impostor { clue: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelfView {
    pub id: PlayerId,
    pub is_host: bool,
    pub is_impostor: bool,
    pub has_revealed: bool,
    pub vote: Option<PlayerId>,
    pub rejected_word: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsView {
    pub word: Option<String>,
    pub impostor_ids: Vec<PlayerId>,
    pub voting_results: BTreeMap<PlayerId, u32>,
    pub most_voted: Option<PlayerId>,
    /// Voter id to voted-for id
    pub votes: BTreeMap<PlayerId, PlayerId>,
}

impl RoomView {
    /// Project `room` for `viewer`. A viewer that is not in the room sees
    /// what a spectator would.
    pub fn for_player(room: &Room, viewer: Option<&str>) -> Self {
        let gs = &room.game_state;
        let me = viewer.and_then(|id| room.player(id));
        let in_round = matches!(
            gs.phase,
            GamePhase::Revealing | GamePhase::Playing | GamePhase::Voting
        );

        let secret = match me {
            Some(p) if in_round && p.is_impostor => Some(SecretView::Impostor {
                clue: room
                    .config
                    .clue_enabled
                    .then(|| gs.clue.clone())
                    .flatten(),
            }),
            Some(_) if in_round => gs.word.clone().map(|word| SecretView::Word { word }),
            _ => None,
        };

        let results = (gs.phase == GamePhase::Results).then(|| ResultsView {
            word: gs.word.clone(),
            impostor_ids: gs.impostor_ids.clone(),
            voting_results: gs.voting_results.clone().unwrap_or_default(),
            most_voted: gs.most_voted.clone(),
            votes: room
                .players
                .values()
                .filter_map(|p| p.vote.clone().map(|v| (p.id.clone(), v)))
                .collect(),
        });

        Self {
            code: room.code.clone(),
            host_id: room.host_id.clone(),
            phase: gs.phase,
            round: gs.round,
            time_left: gs.time_left,
            config: room.config.clone(),
            players: room
                .players_in_join_order()
                .into_iter()
                .map(|p| PlayerView {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    is_host: p.is_host,
                    has_revealed: p.has_revealed,
                    has_voted: p.has_voted(),
                })
                .collect(),
            first_speaker: gs.first_speaker.clone(),
            rejection_count: gs.rejection_count(),
            category: gs.category.clone(),
            secret,
            you: me.map(|p| SelfView {
                id: p.id.clone(),
                is_host: p.is_host,
                is_impostor: p.is_impostor,
                has_revealed: p.has_revealed,
                vote: p.vote.clone(),
                rejected_word: gs.word_rejections.contains(&p.id),
            }),
            results,
        }
    }

    /// Spectator projection
    pub fn public(room: &Room) -> Self {
        Self::for_player(room, None)
    }
}
