//! Per-player redacted view of a room.

use serde::{Deserialize, Serialize};

use crate::domain::state::{GameState, GameStatus, Move, PlayerId, RoundSummary};
use crate::domain::Card;
use crate::errors::domain::DomainError;

/// What the opponent is allowed to know about a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentView {
    pub player_id: PlayerId,
    pub hand_size: usize,
    pub captured: usize,
    pub score: u32,
    pub consecutive_timeouts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub room_id: String,
    pub viewer: PlayerId,
    pub status: GameStatus,
    pub hand: Vec<Card>,
    pub captures: Vec<Card>,
    pub score: u32,
    pub is_turn: bool,
    pub consecutive_timeouts: u32,
    pub opponent: Option<OpponentView>,
    pub table: Vec<Card>,
    pub deck_remaining: usize,
    pub round_no: u32,
    pub current_hand: u32,
    pub move_sequence: u64,
    pub last_move: Option<Move>,
    pub last_round_score: Option<RoundSummary>,
}

impl PlayerSnapshot {
    pub fn for_player(state: &GameState, viewer: &str) -> Result<Self, DomainError> {
        let me = state.player(viewer)?;
        let timeouts = |id: &str| state.consecutive_timeouts.get(id).copied().unwrap_or(0);

        let opponent = state
            .opponent_of(viewer)
            .and_then(|id| state.players.get(id.as_str()))
            .map(|p| OpponentView {
                player_id: p.id.clone(),
                hand_size: p.hand.len(),
                captured: p.captures.len(),
                score: p.score,
                consecutive_timeouts: timeouts(p.id.as_str()),
            });

        Ok(Self {
            room_id: state.room_id.clone(),
            viewer: me.id.clone(),
            status: state.game_status,
            hand: me.hand.clone(),
            captures: me.captures.clone(),
            score: me.score,
            is_turn: state.is_turn_of(viewer),
            consecutive_timeouts: timeouts(viewer),
            opponent,
            table: state.table_cards.clone(),
            deck_remaining: state.deck.len(),
            round_no: state.round_no,
            current_hand: state.current_hand,
            move_sequence: state.move_sequence,
            last_move: state.last_move.clone(),
            last_round_score: state.last_round_score.clone(),
        })
    }
}
