use crate::types::*;
use std::collections::BTreeMap;

/// One field write against a room document.
///
/// The store applies a `Vec<Mutation>` as a single atomic batch, so a
/// transition that touches several fields is never observed half-done.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetPhase(GamePhase),
    SetRound(u32),
    SetTimeLeft(u32),
    SetConfig(RoomConfig),
    SetSecret {
        category: Option<String>,
        word: Option<String>,
        clue: Option<String>,
    },
    SetImpostorIds(Vec<PlayerId>),
    SetFirstSpeaker(Option<PlayerId>),
    AddRejection(PlayerId),
    RemoveRejection(PlayerId),
    ClearRejections,
    SetResults {
        voting_results: Option<BTreeMap<PlayerId, u32>>,
        most_voted: Option<PlayerId>,
    },
    AddPlayer(Player),
    RemovePlayer(PlayerId),
    SetRevealed { player_id: PlayerId, value: bool },
    SetImpostor { player_id: PlayerId, value: bool },
    SetVote {
        player_id: PlayerId,
        vote: Option<PlayerId>,
    },
}

impl Room {
    /// Apply a single field write. Writes addressed to a player that is no
    /// longer in the room are dropped.
    pub fn apply_mutation(&mut self, mutation: &Mutation) {
        let gs = &mut self.game_state;
        match mutation {
            Mutation::SetPhase(phase) => gs.phase = *phase,
            Mutation::SetRound(round) => gs.round = *round,
            Mutation::SetTimeLeft(t) => gs.time_left = *t,
            Mutation::SetConfig(config) => self.config = config.clone(),
            Mutation::SetSecret {
                category,
                word,
                clue,
            } => {
                gs.category = category.clone();
                gs.word = word.clone();
                gs.clue = clue.clone();
            }
            Mutation::SetImpostorIds(ids) => gs.impostor_ids = ids.clone(),
            Mutation::SetFirstSpeaker(id) => gs.first_speaker = id.clone(),
            Mutation::AddRejection(id) => {
                gs.word_rejections.insert(id.clone());
            }
            Mutation::RemoveRejection(id) => {
                gs.word_rejections.remove(id);
            }
            Mutation::ClearRejections => gs.word_rejections.clear(),
            Mutation::SetResults {
                voting_results,
                most_voted,
            } => {
                gs.voting_results = voting_results.clone();
                gs.most_voted = most_voted.clone();
            }
            Mutation::AddPlayer(player) => {
                self.next_seq = self.next_seq.max(player.joined_seq + 1);
                self.players.insert(player.id.clone(), player.clone());
            }
            Mutation::RemovePlayer(id) => {
                self.players.remove(id);
            }
            Mutation::SetRevealed { player_id, value } => {
                if let Some(p) = self.players.get_mut(player_id) {
                    p.has_revealed = *value;
                }
            }
            Mutation::SetImpostor { player_id, value } => {
                if let Some(p) = self.players.get_mut(player_id) {
                    p.is_impostor = *value;
                }
            }
            Mutation::SetVote { player_id, vote } => {
                if let Some(p) = self.players.get_mut(player_id) {
                    p.vote = vote.clone();
                }
            }
        }
    }

    /// Apply a batch in order
    pub fn apply_batch(&mut self, batch: &[Mutation]) {
        for mutation in batch {
            self.apply_mutation(mutation);
        }
    }
}
