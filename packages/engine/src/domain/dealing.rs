//! Deck construction, shuffling and dealing.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::warn;

use crate::domain::rules::{DECK_SIZE, TABLE_LAYOUT_SIZE};
use crate::domain::seed_derivation::derive_dealing_seed;
use crate::domain::{Card, Rank, Suit};

/// Generate a full 52-card deck in standard order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// A full deck in uniformly random order (Fisher-Yates).
pub fn new_shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = full_deck();
    deck.shuffle(rng);
    deck
}

/// Deterministic deck for a 1-based round of a room.
pub fn deck_for_round(game_seed: u64, round_no: u32) -> Vec<Card> {
    let mut rng = ChaCha20Rng::seed_from_u64(derive_dealing_seed(game_seed, round_no));
    new_shuffled_deck(&mut rng)
}

/// Remove the initial table layout from the front of `deck`.
///
/// No Jack may be laid out. A Jack reached at draw position `i` is swapped
/// with the first non-Jack found after `i`, so the Jack goes back into the
/// deck where that card was. If no non-Jack remains, the Jack is dealt.
pub fn deal_table_layout(mut deck: Vec<Card>) -> (Vec<Card>, Vec<Card>) {
    let count = TABLE_LAYOUT_SIZE.min(deck.len());
    for i in 0..count {
        if !deck[i].is_jack() {
            continue;
        }
        match (i + 1..deck.len()).find(|&j| !deck[j].is_jack()) {
            Some(j) => deck.swap(i, j),
            None => {
                warn!(position = i, "No non-Jack card left for the table layout");
            }
        }
    }
    let rest = deck.split_off(count);
    (deck, rest)
}

/// Take up to `n` cards from the front of the deck.
pub fn draw(deck: &mut Vec<Card>, n: usize) -> Vec<Card> {
    let n = n.min(deck.len());
    deck.drain(..n).collect()
}
