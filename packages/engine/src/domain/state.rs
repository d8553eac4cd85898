use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::rules::{GameRules, DECK_SIZE, PLAYERS};
use crate::domain::scoring::RoundScoreResult;
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

pub type PlayerId = String;

/// Room lifecycle. Transitions only move forward; `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// One player seated, waiting for an opponent.
    Waiting,
    /// Both players seated, rounds in progress.
    Active,
    /// Someone reached the win threshold after a round, or forfeited.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Order only matters for display.
    pub hand: Vec<Card>,
    /// Cards taken this round; cleared after round scoring.
    pub captures: Vec<Card>,
    /// Cumulative points across rounds.
    pub score: u32,
    pub is_turn: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            hand: Vec::new(),
            captures: Vec::new(),
            score: 0,
            is_turn: false,
        }
    }
}

/// The most recent action, kept for client-side animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub player_id: PlayerId,
    pub played_card: Card,
    pub captured_cards: Vec<Card>,
    pub timestamp: OffsetDateTime,
    /// Laid down on the player's behalf after a turn timeout.
    #[serde(default)]
    pub forced: bool,
}

/// Scoring of the last completed round, shown until every player acknowledges it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_no: u32,
    pub round_sequence: u64,
    pub scores: RoundScoreResult,
}

/// The authoritative room document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: String,
    pub rules: GameRules,
    /// Base seed every round's deck is derived from.
    pub rng_seed: u64,
    /// Join order; index 0 is the room's original player 1.
    pub seat_order: Vec<PlayerId>,
    pub players: BTreeMap<PlayerId, Player>,
    pub table_cards: Vec<Card>,
    pub deck: Vec<Card>,
    pub current_player_id: Option<PlayerId>,
    pub last_move: Option<Move>,
    pub game_status: GameStatus,
    pub last_round_score: Option<RoundSummary>,
    pub last_capture_player_id: Option<PlayerId>,
    pub forfeited_by: Option<PlayerId>,
    /// 1-based round counter.
    pub round_no: u32,
    /// 1-based hand (sub-deal) counter within the round.
    pub current_hand: u32,
    pub consecutive_timeouts: BTreeMap<PlayerId, u32>,
    /// Bumped by every join, move, timeout and forfeit.
    pub move_sequence: u64,
    /// Bumped every time a round is scored.
    pub round_sequence: u64,
    /// Last round_sequence each player acknowledged.
    pub round_acks: BTreeMap<PlayerId, u64>,
}

impl GameState {
    pub fn player(&self, player_id: &str) -> Result<&Player, DomainError> {
        self.players.get(player_id).ok_or_else(|| unknown_player(player_id))
    }

    pub fn player_mut(&mut self, player_id: &str) -> Result<&mut Player, DomainError> {
        self.players
            .get_mut(player_id)
            .ok_or_else(|| unknown_player(player_id))
    }

    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.seat_order.iter().position(|p| p == player_id)
    }

    /// The other seated player, if any.
    pub fn opponent_of(&self, player_id: &str) -> Option<&PlayerId> {
        if self.seat_of(player_id).is_none() {
            return None;
        }
        self.seat_order.iter().find(|p| p.as_str() != player_id)
    }

    /// Player in the given seat.
    pub fn seated(&self, seat: usize) -> Result<&PlayerId, DomainError> {
        self.seat_order.get(seat).ok_or_else(|| {
            DomainError::invariant(format!("seat {seat} is empty in room {}", self.room_id))
        })
    }

    pub fn is_full(&self) -> bool {
        self.seat_order.len() >= PLAYERS
    }

    pub fn is_turn_of(&self, player_id: &str) -> bool {
        self.current_player_id.as_deref() == Some(player_id)
    }

    /// Both hands are empty.
    pub fn hands_empty(&self) -> bool {
        self.players.values().all(|p| p.hand.is_empty())
    }

    /// Cards on the table, in the deck, in hands and in capture piles.
    ///
    /// Equals the full deck while a round is in play; drops to zero once the
    /// game finishes and the final round has been scored.
    pub fn cards_in_play(&self) -> usize {
        self.table_cards.len()
            + self.deck.len()
            + self
                .players
                .values()
                .map(|p| p.hand.len() + p.captures.len())
                .sum::<usize>()
    }

    pub fn is_fully_accounted(&self) -> bool {
        self.cards_in_play() == DECK_SIZE
    }

    /// Keep each player's `is_turn` flag in line with `current_player_id`.
    pub(crate) fn sync_turn_flags(&mut self) {
        let current = self.current_player_id.clone();
        for (id, player) in self.players.iter_mut() {
            player.is_turn = current.as_deref() == Some(id.as_str());
        }
    }
}

fn unknown_player(player_id: &str) -> DomainError {
    DomainError::validation(
        ValidationKind::UnknownPlayer,
        format!("Player {player_id} is not seated in this room"),
    )
}

pub fn require_status(
    state: &GameState,
    expected: GameStatus,
    ctx: &'static str,
) -> Result<(), DomainError> {
    if state.game_status != expected {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!(
                "{ctx}: room is {:?}, expected {:?}",
                state.game_status, expected
            ),
        ));
    }
    Ok(())
}

pub fn require_turn(state: &GameState, player_id: &str) -> Result<(), DomainError> {
    if !state.is_turn_of(player_id) {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            format!(
                "Not {player_id}'s turn (current: {})",
                state.current_player_id.as_deref().unwrap_or("nobody")
            ),
        ));
    }
    Ok(())
}
