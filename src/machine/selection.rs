//! Random draws made at round start: impostors, secret word, first speaker.

use crate::error::Rejection;
use crate::types::{PlayerId, PLACEHOLDER_CLUE};
use crate::words::WordBank;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretWord {
    pub category: String,
    pub word: String,
    pub clue: String,
}

/// Draw `count` distinct players uniformly without replacement
pub fn select_impostors<R: Rng + ?Sized>(
    player_ids: &[PlayerId],
    count: usize,
    rng: &mut R,
) -> Vec<PlayerId> {
    let mut shuffled = player_ids.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

/// Uniform category, then uniform word, then uniform clue.
///
/// `avoid` is skipped when the drawn category has any other word.
pub fn select_word<R: Rng + ?Sized>(
    words: &WordBank,
    categories: &BTreeSet<String>,
    avoid: Option<&str>,
    rng: &mut R,
) -> Result<SecretWord, Rejection> {
    let categories: Vec<&String> = categories.iter().collect();
    let category = *categories.choose(rng).ok_or(Rejection::NoCategories)?;

    let pool = words.words_for(category);
    let candidates: Vec<&String> = match avoid {
        Some(avoid) if pool.iter().any(|w| w != avoid) => {
            pool.iter().filter(|w| *w != avoid).collect()
        }
        _ => pool.iter().collect(),
    };
    let word = *candidates
        .choose(rng)
        .ok_or_else(|| Rejection::UnknownCategory(category.clone()))?;

    let clue = words
        .clues_for(word)
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER_CLUE.to_string());

    Ok(SecretWord {
        category: category.clone(),
        word: word.clone(),
        clue,
    })
}

pub fn select_first_speaker<R: Rng + ?Sized>(
    player_ids: &[PlayerId],
    rng: &mut R,
) -> Option<PlayerId> {
    player_ids.choose(rng).cloned()
}
