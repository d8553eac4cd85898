//! Domain layer: pure game logic types and transitions.

pub mod capture;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod game_transition;
pub mod outcome;
pub mod play;
pub mod room;
pub mod rules;
pub mod scoring;
pub mod seed_derivation;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests_game_transition;
#[cfg(test)]
mod tests_play;
#[cfg(test)]
mod tests_props_capture;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use capture::{can_capture, is_legal_capture, legal_captures};
pub use cards_parsing::try_parse_cards;
pub use cards_types::{Card, Color, Rank, Suit};
pub use dealing::{deal_table_layout, deck_for_round, full_deck, new_shuffled_deck};
pub use game_transition::{derive_room_transitions, RoomTransition};
pub use outcome::{determine_winner, GameOutcome};
pub use play::{apply_move, record_timeout, MoveOutcome};
pub use room::{acknowledge_round_score, clear_round_score, create_room, forfeit, join_room, JoinOutcome};
pub use rules::GameRules;
pub use scoring::{score_round, RoundScoreResult};
pub use seed_derivation::{derive_dealing_seed, new_game_seed};
pub use snapshot::PlayerSnapshot;
pub use state::{GameState, GameStatus, Move, Player, PlayerId, RoundSummary};
