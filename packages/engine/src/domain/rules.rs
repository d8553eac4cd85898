//! Fixed rule constants and the per-room rule set.

use serde::{Deserialize, Serialize};

use crate::domain::{Card, Rank, Suit};

/// Seats per room.
pub const PLAYERS: usize = 2;
pub const DECK_SIZE: usize = 52;
/// Cards dealt to each player per hand (sub-deal).
pub const HAND_SIZE: usize = 4;
/// Face-up cards laid out at the start of every round.
pub const TABLE_LAYOUT_SIZE: usize = 4;
pub const DEFAULT_WIN_THRESHOLD: u32 = 16;

pub const POINTS_MOST_CLUBS: u32 = 1;
pub const POINTS_MORE_CARDS: u32 = 2;
pub const POINTS_BONUS_CARD: u32 = 1;

/// Bonus card A.
pub const TEN_OF_DIAMONDS: Card = Card::new(Suit::Diamonds, Rank::Ten);
/// Bonus card B.
pub const TWO_OF_CLUBS: Card = Card::new(Suit::Clubs, Rank::Two);

/// Which seat opens each new round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOpener {
    /// Seat 0: the player who created the room.
    Host,
    /// Seat 1: the player who joined second.
    Joiner,
}

impl RoundOpener {
    pub fn seat(self) -> usize {
        match self {
            RoundOpener::Host => 0,
            RoundOpener::Joiner => 1,
        }
    }
}

/// Round 1 and every later round are opened by the room's original player 1.
pub const ROUND_OPENER: RoundOpener = RoundOpener::Host;

/// Rule set fixed at room creation and stored in the room document so both
/// peers always apply the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Cumulative score at which a completed round can end the game.
    pub win_threshold: u32,
    /// When set, `apply_move` rejects captures that `is_legal_capture` refuses.
    /// Off by default: clients are trusted to validate before submitting.
    pub enforce_capture_legality: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            win_threshold: DEFAULT_WIN_THRESHOLD,
            enforce_capture_legality: false,
        }
    }
}

impl GameRules {
    pub fn with_win_threshold(mut self, win_threshold: u32) -> Self {
        self.win_threshold = win_threshold;
        self
    }

    pub fn with_capture_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_capture_legality = enforce;
        self
    }
}
