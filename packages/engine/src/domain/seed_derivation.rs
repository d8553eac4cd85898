//! RNG seed derivation for deterministic dealing.
//!
//! Every room draws one base seed from OS entropy when it is created. All
//! later shuffles are derived from it, so re-running a transition against a
//! re-read document always deals the same cards.

/// Derive the seed used to shuffle the deck of a 1-based round.
pub fn derive_dealing_seed(game_seed: u64, round_no: u32) -> u64 {
    game_seed
        .wrapping_add((round_no as u64).wrapping_mul(1_000_000))
        .wrapping_add(2)
}

/// Fresh base seed for a new room.
pub fn new_game_seed() -> u64 {
    rand::random::<u64>()
}
