//! Room state machine.
//!
//! Every function here is pure: it takes the current snapshot and an event
//! and returns the batch of field writes that moves the room to its next
//! state, or a [`Rejection`] when a guard fails. Nothing touches the store;
//! the caller writes the batch atomically.
//!
//! ```text
//! Lobby -> Revealing -> Playing -> Voting -> Results -> Lobby
//!                          \-------(end game)-----------^
//! ```

pub mod selection;
pub mod tally;

use crate::error::Rejection;
use crate::store::Mutation;
use crate::types::*;
use crate::words::WordBank;
use rand::Rng;

pub use tally::{tally, tally_room, Tally};

/// An intent issued by a player
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UpdateConfig(RoomConfig),
    StartGame(RoomConfig),
    Reveal,
    RejectWord,
    CastVote(PlayerId),
    SkipToVoting,
    EndGame,
    PlayAgain,
}

/// What a transition may draw on besides the snapshot
pub struct Context<'a, R: Rng + ?Sized> {
    pub words: &'a WordBank,
    pub rng: &'a mut R,
    pub round_seconds: u32,
}

/// Apply a player's intent
pub fn apply<R: Rng + ?Sized>(
    room: &Room,
    actor: &str,
    event: Event,
    ctx: &mut Context<'_, R>,
) -> Result<Vec<Mutation>, Rejection> {
    if room.player(actor).is_none() {
        return Err(Rejection::UnknownPlayer(actor.to_string()));
    }

    let mut batch = match event {
        Event::UpdateConfig(config) => update_config(room, actor, config, ctx)?,
        Event::StartGame(config) => start_game(room, actor, config, ctx)?,
        Event::Reveal => reveal(room, actor)?,
        Event::RejectWord => reject_word(room, actor, ctx)?,
        Event::CastVote(target) => cast_vote(room, actor, target)?,
        Event::SkipToVoting => {
            ensure_host(room, actor, "skip to voting")?;
            ensure_phase(room, GamePhase::Playing, "skip to voting")?;
            voting_transition(room)
        }
        Event::EndGame => {
            ensure_host(room, actor, "end the game")?;
            ensure_phase(room, GamePhase::Playing, "end the game")?;
            back_to_lobby(room, ctx.round_seconds)
        }
        Event::PlayAgain => {
            ensure_host(room, actor, "start another round")?;
            ensure_phase(room, GamePhase::Results, "start another round")?;
            back_to_lobby(room, ctx.round_seconds)
        }
    };

    settle(room, &mut batch);
    Ok(batch)
}

/// One countdown step for `round`
pub fn tick(room: &Room, round: u32) -> Result<Vec<Mutation>, Rejection> {
    let gs = &room.game_state;
    if gs.phase != GamePhase::Playing || gs.round != round {
        return Err(Rejection::StaleTimer(round));
    }

    if gs.time_left <= 1 {
        Ok(voting_transition(room))
    } else {
        Ok(vec![Mutation::SetTimeLeft(gs.time_left - 1)])
    }
}

/// Remove a non-host player, keeping votes, config and completion guards
/// consistent with the smaller room
pub fn remove_player(room: &Room, player_id: &str) -> Result<Vec<Mutation>, Rejection> {
    if room.player(player_id).is_none() {
        return Err(Rejection::UnknownPlayer(player_id.to_string()));
    }
    if room.is_host(player_id) {
        return Err(Rejection::HostMustClose);
    }

    let gs = &room.game_state;
    let mut batch = vec![Mutation::RemovePlayer(player_id.to_string())];

    for p in room.players.values() {
        if p.vote.as_deref() == Some(player_id) {
            batch.push(Mutation::SetVote {
                player_id: p.id.clone(),
                vote: None,
            });
        }
    }

    if gs.word_rejections.contains(player_id) {
        batch.push(Mutation::RemoveRejection(player_id.to_string()));
    }
    if gs.impostor_ids.iter().any(|id| id == player_id) {
        batch.push(Mutation::SetImpostorIds(
            gs.impostor_ids
                .iter()
                .filter(|id| *id != player_id)
                .cloned()
                .collect(),
        ));
    }
    if gs.first_speaker.as_deref() == Some(player_id) {
        batch.push(Mutation::SetFirstSpeaker(None));
    }

    // Any phase: the next lobby starts from this config
    let clamped = room.config.clone().clamped(room.player_count() - 1);
    if clamped != room.config {
        batch.push(Mutation::SetConfig(clamped));
    }

    settle(room, &mut batch);
    Ok(batch)
}

fn ensure_host(room: &Room, actor: &str, action: &'static str) -> Result<(), Rejection> {
    if room.is_host(actor) {
        Ok(())
    } else {
        Err(Rejection::NotHost(action))
    }
}

fn ensure_phase(room: &Room, phase: GamePhase, action: &'static str) -> Result<(), Rejection> {
    if room.phase() == phase {
        Ok(())
    } else {
        Err(Rejection::WrongPhase {
            action,
            phase: room.phase(),
        })
    }
}

fn validate_categories(config: &RoomConfig, words: &WordBank) -> Result<(), Rejection> {
    match config.categories.iter().find(|c| !words.has_category(c)) {
        Some(unknown) => Err(Rejection::UnknownCategory(unknown.clone())),
        None => Ok(()),
    }
}

fn update_config<R: Rng + ?Sized>(
    room: &Room,
    actor: &str,
    config: RoomConfig,
    ctx: &Context<'_, R>,
) -> Result<Vec<Mutation>, Rejection> {
    ensure_host(room, actor, "change the settings")?;
    ensure_phase(room, GamePhase::Lobby, "change the settings")?;
    validate_categories(&config, ctx.words)?;

    let config = config.clamped(room.player_count());
    if config == room.config {
        return Ok(Vec::new());
    }
    Ok(vec![Mutation::SetConfig(config)])
}

fn start_game<R: Rng + ?Sized>(
    room: &Room,
    actor: &str,
    mut config: RoomConfig,
    ctx: &mut Context<'_, R>,
) -> Result<Vec<Mutation>, Rejection> {
    ensure_host(room, actor, "start the game")?;
    ensure_phase(room, GamePhase::Lobby, "start the game")?;

    let n = room.player_count();
    if n < MIN_PLAYERS {
        return Err(Rejection::NotEnoughPlayers {
            needed: MIN_PLAYERS,
            have: n,
        });
    }
    if config.categories.is_empty() {
        return Err(Rejection::NoCategories);
    }
    validate_categories(&config, ctx.words)?;

    config.impostor_count = config.impostor_count.max(1);
    if config.impostor_count > RoomConfig::max_impostors_for(n) {
        return Err(Rejection::TooManyImpostors {
            requested: config.impostor_count,
            threshold: TWO_IMPOSTOR_THRESHOLD,
        });
    }

    let secret = selection::select_word(ctx.words, &config.categories, None, ctx.rng)?;
    let player_ids = room.player_ids();
    let impostors =
        selection::select_impostors(&player_ids, config.impostor_count as usize, ctx.rng);
    let first_speaker = selection::select_first_speaker(&player_ids, ctx.rng);

    tracing::debug!(
        "Round {} in room {}: category {}, {} impostor(s)",
        room.game_state.round + 1,
        room.code,
        secret.category,
        impostors.len()
    );

    let mut batch = vec![
        Mutation::SetConfig(config),
        Mutation::SetRound(room.game_state.round + 1),
        Mutation::SetSecret {
            category: Some(secret.category),
            word: Some(secret.word),
            clue: Some(secret.clue),
        },
        Mutation::SetFirstSpeaker(first_speaker),
        Mutation::ClearRejections,
        Mutation::SetResults {
            voting_results: None,
            most_voted: None,
        },
    ];
    // Stale flags from the previous round are overwritten for every player
    for id in &player_ids {
        batch.push(Mutation::SetImpostor {
            player_id: id.clone(),
            value: impostors.contains(id),
        });
        batch.push(Mutation::SetRevealed {
            player_id: id.clone(),
            value: false,
        });
        batch.push(Mutation::SetVote {
            player_id: id.clone(),
            vote: None,
        });
    }
    batch.push(Mutation::SetImpostorIds(impostors));
    batch.push(Mutation::SetTimeLeft(ctx.round_seconds));
    batch.push(Mutation::SetPhase(GamePhase::Revealing));

    Ok(batch)
}

fn reveal(room: &Room, actor: &str) -> Result<Vec<Mutation>, Rejection> {
    ensure_phase(room, GamePhase::Revealing, "reveal")?;

    let already = room.player(actor).is_some_and(|p| p.has_revealed);
    if already {
        return Ok(Vec::new());
    }
    Ok(vec![Mutation::SetRevealed {
        player_id: actor.to_string(),
        value: true,
    }])
}

/// A strict majority of rejections redraws the word. Impostors stay.
fn reject_word<R: Rng + ?Sized>(
    room: &Room,
    actor: &str,
    ctx: &mut Context<'_, R>,
) -> Result<Vec<Mutation>, Rejection> {
    ensure_phase(room, GamePhase::Revealing, "reject the word")?;

    let gs = &room.game_state;
    if gs.word_rejections.contains(actor) {
        return Err(Rejection::AlreadyRejected);
    }

    let rejections = gs.rejection_count() + 1;
    if rejections * 2 <= room.player_count() {
        return Ok(vec![Mutation::AddRejection(actor.to_string())]);
    }

    let secret =
        selection::select_word(ctx.words, &room.config.categories, gs.word.as_deref(), ctx.rng)?;
    tracing::info!(
        "Word rejected by {} of {} players in room {}, redrawing",
        rejections,
        room.player_count(),
        room.code
    );

    let mut batch = vec![
        Mutation::ClearRejections,
        Mutation::SetSecret {
            category: Some(secret.category),
            word: Some(secret.word),
            clue: Some(secret.clue),
        },
    ];
    for id in room.player_ids() {
        batch.push(Mutation::SetRevealed {
            player_id: id,
            value: false,
        });
    }
    Ok(batch)
}

fn cast_vote(room: &Room, actor: &str, target: PlayerId) -> Result<Vec<Mutation>, Rejection> {
    ensure_phase(room, GamePhase::Voting, "vote")?;

    if room.player(&target).is_none() {
        return Err(Rejection::InvalidVoteTarget(target));
    }
    Ok(vec![Mutation::SetVote {
        player_id: actor.to_string(),
        vote: Some(target),
    }])
}

/// Clear every vote and open the ballot in one write
fn voting_transition(room: &Room) -> Vec<Mutation> {
    let mut batch: Vec<Mutation> = room
        .player_ids()
        .into_iter()
        .map(|id| Mutation::SetVote {
            player_id: id,
            vote: None,
        })
        .collect();
    batch.push(Mutation::SetTimeLeft(0));
    batch.push(Mutation::SetPhase(GamePhase::Voting));
    batch
}

fn back_to_lobby(room: &Room, round_seconds: u32) -> Vec<Mutation> {
    let mut batch = Vec::new();
    for id in room.player_ids() {
        batch.push(Mutation::SetRevealed {
            player_id: id.clone(),
            value: false,
        });
        batch.push(Mutation::SetImpostor {
            player_id: id.clone(),
            value: false,
        });
        batch.push(Mutation::SetVote {
            player_id: id,
            vote: None,
        });
    }
    batch.extend([
        Mutation::SetSecret {
            category: None,
            word: None,
            clue: None,
        },
        Mutation::SetImpostorIds(Vec::new()),
        Mutation::SetFirstSpeaker(None),
        Mutation::ClearRejections,
        Mutation::SetResults {
            voting_results: None,
            most_voted: None,
        },
        Mutation::SetTimeLeft(round_seconds),
        Mutation::SetPhase(GamePhase::Lobby),
    ]);
    batch
}

/// Append the automatic completion transitions (everyone revealed,
/// everyone voted) that the batch unlocks, so they land in the same write
fn settle(room: &Room, batch: &mut Vec<Mutation>) {
    if batch.is_empty() {
        return;
    }

    let mut next = room.clone();
    next.apply_batch(batch.as_slice());

    match next.phase() {
        GamePhase::Revealing if next.all_revealed() => {
            batch.push(Mutation::SetPhase(GamePhase::Playing));
        }
        GamePhase::Voting if next.all_voted() => {
            let Tally { counts, most_voted } = tally_room(&next);
            tracing::info!(
                "All {} votes in for room {}, most voted: {:?}",
                counts.values().sum::<u32>(),
                room.code,
                most_voted
            );
            batch.push(Mutation::SetResults {
                voting_results: Some(counts),
                most_voted,
            });
            batch.push(Mutation::SetPhase(GamePhase::Results));
        }
        _ => {}
    }

    debug_assert!({
        let to = batch
            .iter()
            .rev()
            .find_map(|m| match m {
                Mutation::SetPhase(p) => Some(*p),
                _ => None,
            })
            .unwrap_or(room.phase());
        to == room.phase() || GamePhase::can_transition(room.phase(), to)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ROUND: u32 = 420;

    struct Harness {
        room: Room,
        words: WordBank,
        rng: StdRng,
    }

    impl Harness {
        fn with_players(n: usize) -> Self {
            let mut room = Room::new("TESTXX".to_string(), "p0".to_string(), "P0".to_string(), ROUND);
            for i in 1..n {
                let id = format!("p{}", i);
                room.apply_mutation(&Mutation::AddPlayer(Player::new(
                    id.clone(),
                    id.to_uppercase(),
                    false,
                    room.next_seq,
                )));
            }
            Self {
                room,
                words: WordBank::builtin(),
                rng: StdRng::seed_from_u64(42),
            }
        }

        fn try_apply(&mut self, actor: &str, event: Event) -> Result<Vec<Mutation>, Rejection> {
            let mut ctx = Context {
                words: &self.words,
                rng: &mut self.rng,
                round_seconds: ROUND,
            };
            let batch = apply(&self.room, actor, event, &mut ctx)?;
            self.room.apply_batch(&batch);
            Ok(batch)
        }

        fn apply(&mut self, actor: &str, event: Event) {
            self.try_apply(actor, event).expect("intent should be accepted");
        }

        fn start(&mut self, impostors: u8) {
            self.apply("p0", Event::StartGame(food(impostors)));
        }

        fn reveal_all(&mut self) {
            for id in self.room.player_ids() {
                self.apply(&id, Event::Reveal);
            }
        }

        fn run_out_clock(&mut self) {
            while self.room.phase() == GamePhase::Playing {
                let batch = tick(&self.room, self.room.game_state.round).unwrap();
                self.room.apply_batch(&batch);
            }
        }
    }

    fn food(impostors: u8) -> RoomConfig {
        RoomConfig {
            impostor_count: impostors,
            clue_enabled: false,
            categories: ["Food".to_string()].into(),
        }
    }

    #[test]
    fn test_phase_edges() {
        use GamePhase::*;

        assert!(GamePhase::can_transition(Lobby, Revealing));
        assert!(GamePhase::can_transition(Revealing, Playing));
        assert!(GamePhase::can_transition(Playing, Voting));
        assert!(GamePhase::can_transition(Voting, Results));
        assert!(GamePhase::can_transition(Results, Lobby));
        assert!(GamePhase::can_transition(Playing, Lobby));

        assert!(!GamePhase::can_transition(Lobby, Voting));
        assert!(!GamePhase::can_transition(Revealing, Lobby));
        assert!(!GamePhase::can_transition(Voting, Lobby));
        assert!(!GamePhase::can_transition(Results, Revealing));
        assert_eq!(Playing.valid_transitions(), vec![Lobby, Voting]);
    }

    #[test]
    fn test_start_requires_three_players() {
        let mut h = Harness::with_players(2);
        let result = h.try_apply("p0", Event::StartGame(food(1)));

        assert_eq!(
            result,
            Err(Rejection::NotEnoughPlayers { needed: 3, have: 2 })
        );
        assert_eq!(h.room.phase(), GamePhase::Lobby);
    }

    #[test]
    fn test_start_requires_category() {
        let mut h = Harness::with_players(3);
        let result = h.try_apply("p0", Event::StartGame(RoomConfig::default()));

        assert_eq!(result, Err(Rejection::NoCategories));
        assert_eq!(h.room.phase(), GamePhase::Lobby);
    }

    #[test]
    fn test_start_rejects_unknown_category() {
        let mut h = Harness::with_players(3);
        let mut config = food(1);
        config.categories.insert("Opera".to_string());

        let result = h.try_apply("p0", Event::StartGame(config));
        assert_eq!(result, Err(Rejection::UnknownCategory("Opera".to_string())));
    }

    #[test]
    fn test_two_impostors_need_six_players() {
        let mut h = Harness::with_players(5);
        let result = h.try_apply("p0", Event::StartGame(food(2)));

        assert_eq!(
            result,
            Err(Rejection::TooManyImpostors {
                requested: 2,
                threshold: 5
            })
        );
        assert_eq!(h.room.phase(), GamePhase::Lobby);
        assert_eq!(h.room.config.impostor_count, 1);
    }

    #[test]
    fn test_two_impostors_with_six_players() {
        let mut h = Harness::with_players(6);
        h.start(2);

        assert_eq!(h.room.impostors().len(), 2);
        assert_eq!(h.room.game_state.impostor_ids.len(), 2);
    }

    #[test]
    fn test_config_update_clamps_impostors() {
        let mut h = Harness::with_players(5);
        h.apply("p0", Event::UpdateConfig(food(2)));

        assert_eq!(h.room.config.impostor_count, 1);
        assert!(h.room.config.categories.contains("Food"));
    }

    #[test]
    fn test_non_host_cannot_start_or_configure() {
        let mut h = Harness::with_players(3);

        assert_eq!(
            h.try_apply("p1", Event::StartGame(food(1))),
            Err(Rejection::NotHost("start the game"))
        );
        assert_eq!(
            h.try_apply("p1", Event::UpdateConfig(food(1))),
            Err(Rejection::NotHost("change the settings"))
        );
        assert_eq!(h.room.phase(), GamePhase::Lobby);
        assert!(h.room.config.categories.is_empty());
    }

    #[test]
    fn test_unknown_actor_is_rejected() {
        let mut h = Harness::with_players(3);
        let result = h.try_apply("ghost", Event::Reveal);
        assert_eq!(result, Err(Rejection::UnknownPlayer("ghost".to_string())));
    }

    #[test]
    fn test_start_game_sets_round() {
        let mut h = Harness::with_players(3);
        h.start(1);

        let gs = &h.room.game_state;
        assert_eq!(gs.phase, GamePhase::Revealing);
        assert_eq!(gs.round, 1);
        assert_eq!(gs.time_left, ROUND);
        assert_eq!(gs.category.as_deref(), Some("Food"));
        assert!(h.words.words_for("Food").contains(gs.word.as_ref().unwrap()));
        assert!(gs.clue.is_some());
        assert!(gs.first_speaker.is_some());
        assert_eq!(h.room.impostors().len(), 1);
        assert!(h.room.players.values().all(|p| !p.has_revealed && p.vote.is_none()));
    }

    #[test]
    fn test_impostors_redrawn_without_stale_flags() {
        let mut h = Harness::with_players(6);

        for _ in 0..20 {
            h.start(1);
            let ids = &h.room.game_state.impostor_ids;
            assert_eq!(ids.len(), 1);
            assert_eq!(h.room.impostors().len(), 1);
            assert_eq!(&h.room.impostors()[0].id, &ids[0]);

            h.reveal_all();
            h.apply("p0", Event::EndGame);
            assert!(h.room.impostors().is_empty());
        }
    }

    #[test]
    fn test_last_reveal_starts_playing() {
        let mut h = Harness::with_players(3);
        h.start(1);

        h.apply("p0", Event::Reveal);
        h.apply("p1", Event::Reveal);
        assert_eq!(h.room.phase(), GamePhase::Revealing);

        let batch = h.try_apply("p2", Event::Reveal).unwrap();
        assert_eq!(batch.last(), Some(&Mutation::SetPhase(GamePhase::Playing)));
        assert_eq!(h.room.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_reveal_twice_is_noop() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.apply("p1", Event::Reveal);

        let batch = h.try_apply("p1", Event::Reveal).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_reveal_outside_revealing() {
        let mut h = Harness::with_players(3);
        let result = h.try_apply("p1", Event::Reveal);
        assert_eq!(
            result,
            Err(Rejection::WrongPhase {
                action: "reveal",
                phase: GamePhase::Lobby
            })
        );
    }

    #[test]
    fn test_tick_counts_down_then_opens_voting() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.reveal_all();

        let batch = tick(&h.room, 1).unwrap();
        assert_eq!(batch, vec![Mutation::SetTimeLeft(ROUND - 1)]);

        h.room.game_state.time_left = 1;
        let batch = tick(&h.room, 1).unwrap();
        h.room.apply_batch(&batch);

        assert_eq!(h.room.phase(), GamePhase::Voting);
        assert_eq!(h.room.game_state.time_left, 0);
        assert!(h.room.players.values().all(|p| p.vote.is_none()));
    }

    #[test]
    fn test_stale_tick_rejected() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.reveal_all();

        assert_eq!(tick(&h.room, 7), Err(Rejection::StaleTimer(7)));

        h.apply("p0", Event::SkipToVoting);
        assert_eq!(tick(&h.room, 1), Err(Rejection::StaleTimer(1)));
    }

    #[test]
    fn test_voting_clears_votes_in_same_batch() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.reveal_all();
        // A vote written during the discussion must not survive into the ballot
        h.room.players.get_mut("p1").unwrap().vote = Some("p2".to_string());

        let batch = h.try_apply("p0", Event::SkipToVoting).unwrap();
        let phase_pos = batch
            .iter()
            .position(|m| *m == Mutation::SetPhase(GamePhase::Voting))
            .unwrap();
        let clear_pos = batch
            .iter()
            .position(|m| {
                *m == Mutation::SetVote {
                    player_id: "p1".to_string(),
                    vote: None,
                }
            })
            .unwrap();

        assert!(clear_pos < phase_pos);
        assert!(h.room.player("p1").unwrap().vote.is_none());
    }

    #[test]
    fn test_only_host_skips() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.reveal_all();

        let result = h.try_apply("p2", Event::SkipToVoting);
        assert_eq!(result, Err(Rejection::NotHost("skip to voting")));
        assert_eq!(h.room.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_last_vote_tallies() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.reveal_all();
        h.run_out_clock();

        h.apply("p0", Event::CastVote("p1".to_string()));
        h.apply("p1", Event::CastVote("p2".to_string()));
        assert_eq!(h.room.phase(), GamePhase::Voting);
        h.apply("p2", Event::CastVote("p1".to_string()));

        let gs = &h.room.game_state;
        assert_eq!(gs.phase, GamePhase::Results);
        let results = gs.voting_results.as_ref().unwrap();
        assert_eq!(results.get("p1"), Some(&2));
        assert_eq!(results.get("p2"), Some(&1));
        assert_eq!(gs.most_voted.as_deref(), Some("p1"));
    }

    #[test]
    fn test_vote_for_unknown_player() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.reveal_all();
        h.run_out_clock();

        let result = h.try_apply("p0", Event::CastVote("nobody".to_string()));
        assert_eq!(
            result,
            Err(Rejection::InvalidVoteTarget("nobody".to_string()))
        );
    }

    #[test]
    fn test_vote_outside_voting() {
        let mut h = Harness::with_players(3);
        h.start(1);

        let result = h.try_apply("p0", Event::CastVote("p1".to_string()));
        assert!(matches!(result, Err(Rejection::WrongPhase { .. })));
    }

    #[test]
    fn test_play_again_resets_round() {
        let mut h = Harness::with_players(3);
        h.start(1);
        h.reveal_all();
        h.run_out_clock();
        for id in h.room.player_ids() {
            h.apply(&id, Event::CastVote("p0".to_string()));
        }
        assert_eq!(h.room.phase(), GamePhase::Results);

        assert_eq!(
            h.try_apply("p1", Event::PlayAgain),
            Err(Rejection::NotHost("start another round"))
        );
        h.apply("p0", Event::PlayAgain);

        let gs = &h.room.game_state;
        assert_eq!(gs.phase, GamePhase::Lobby);
        assert!(gs.word.is_none() && gs.clue.is_none());
        assert!(gs.voting_results.is_none() && gs.most_voted.is_none());
        assert!(gs.impostor_ids.is_empty());
        assert_eq!(gs.time_left, ROUND);
        assert!(h
            .room
            .players
            .values()
            .all(|p| !p.is_impostor && !p.has_revealed && p.vote.is_none()));
    }

    #[test]
    fn test_end_game_only_from_playing() {
        let mut h = Harness::with_players(3);
        h.start(1);

        assert!(matches!(
            h.try_apply("p0", Event::EndGame),
            Err(Rejection::WrongPhase { .. })
        ));

        h.reveal_all();
        h.apply("p0", Event::EndGame);
        assert_eq!(h.room.phase(), GamePhase::Lobby);
    }

    #[test]
    fn test_word_rejection_majority_redraws() {
        let mut h = Harness::with_players(4);
        h.start(1);
        let impostors = h.room.game_state.impostor_ids.clone();
        let first_word = h.room.game_state.word.clone().unwrap();
        h.apply("p0", Event::Reveal);

        h.apply("p1", Event::RejectWord);
        h.apply("p2", Event::RejectWord);
        assert_eq!(h.room.game_state.rejection_count(), 2);
        assert_eq!(h.room.game_state.word.as_ref(), Some(&first_word));

        h.apply("p3", Event::RejectWord);

        let gs = &h.room.game_state;
        assert_ne!(gs.word.as_ref(), Some(&first_word));
        assert_eq!(gs.rejection_count(), 0);
        assert_eq!(gs.impostor_ids, impostors);
        assert_eq!(gs.phase, GamePhase::Revealing);
        assert!(h.room.players.values().all(|p| !p.has_revealed));
    }

    #[test]
    fn test_word_rejection_once_per_player() {
        let mut h = Harness::with_players(4);
        h.start(1);
        h.apply("p1", Event::RejectWord);

        assert_eq!(
            h.try_apply("p1", Event::RejectWord),
            Err(Rejection::AlreadyRejected)
        );
    }

    #[test]
    fn test_remove_player_clears_votes_for_them() {
        let mut h = Harness::with_players(4);
        h.start(1);
        h.reveal_all();
        h.run_out_clock();
        h.apply("p0", Event::CastVote("p3".to_string()));
        h.apply("p1", Event::CastVote("p2".to_string()));

        let batch = remove_player(&h.room, "p3").unwrap();
        h.room.apply_batch(&batch);

        assert!(h.room.player("p3").is_none());
        assert!(h.room.player("p0").unwrap().vote.is_none());
        assert_eq!(h.room.player("p1").unwrap().vote.as_deref(), Some("p2"));
        assert_eq!(h.room.phase(), GamePhase::Voting);
    }

    #[test]
    fn test_remove_last_non_voter_completes_ballot() {
        let mut h = Harness::with_players(4);
        h.start(1);
        h.reveal_all();
        h.run_out_clock();
        h.apply("p0", Event::CastVote("p1".to_string()));
        h.apply("p1", Event::CastVote("p2".to_string()));
        h.apply("p2", Event::CastVote("p1".to_string()));

        let batch = remove_player(&h.room, "p3").unwrap();
        h.room.apply_batch(&batch);

        assert_eq!(h.room.phase(), GamePhase::Results);
        assert_eq!(h.room.game_state.most_voted.as_deref(), Some("p1"));
    }

    #[test]
    fn test_remove_player_clamps_lobby_config() {
        let mut h = Harness::with_players(6);
        h.apply("p0", Event::UpdateConfig(food(2)));
        assert_eq!(h.room.config.impostor_count, 2);

        let batch = remove_player(&h.room, "p5").unwrap();
        h.room.apply_batch(&batch);

        assert_eq!(h.room.config.impostor_count, 1);
    }

    #[test]
    fn test_leave_mid_round_clamps_config_for_next_lobby() {
        let mut h = Harness::with_players(6);
        h.start(2);
        h.reveal_all();
        assert_eq!(h.room.phase(), GamePhase::Playing);

        let batch = remove_player(&h.room, "p5").unwrap();
        h.room.apply_batch(&batch);
        assert_eq!(h.room.config.impostor_count, 1);

        h.apply("p0", Event::EndGame);
        assert_eq!(h.room.phase(), GamePhase::Lobby);
        assert_eq!(h.room.player_count(), 5);
        assert_eq!(h.room.config.impostor_count, 1);
        let config = h.room.config.clone();
        assert!(h.try_apply("p0", Event::StartGame(config)).is_ok());
    }

    #[test]
    fn test_host_cannot_be_removed() {
        let h = Harness::with_players(3);
        assert_eq!(remove_player(&h.room, "p0"), Err(Rejection::HostMustClose));
    }
}
