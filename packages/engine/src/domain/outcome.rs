//! Read-only win determination for payout and summary collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::state::{GameState, GameStatus, PlayerId};

/// Who won, if anyone.
///
/// A forfeit always hands the win to the other player. Otherwise the winner
/// is the player at or above the threshold who is not behind the opponent;
/// level scores produce no winner.
pub fn determine_winner(state: &GameState) -> Option<PlayerId> {
    if let Some(forfeiter) = &state.forfeited_by {
        return state.opponent_of(forfeiter).cloned();
    }

    let threshold = state.rules.win_threshold;
    let mut qualified = state.seat_order.iter().filter(|id| {
        let Some(player) = state.players.get(id.as_str()) else {
            return false;
        };
        let opponent_score = state
            .opponent_of(id)
            .and_then(|o| state.players.get(o.as_str()))
            .map(|o| o.score)
            .unwrap_or(0);
        player.score >= threshold && player.score >= opponent_score
    });

    match (qualified.next(), qualified.next()) {
        (Some(winner), None) => Some(winner.clone()),
        _ => None,
    }
}

/// Everything a payout collaborator needs once a room has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub room_id: String,
    pub winner: Option<PlayerId>,
    pub loser: Option<PlayerId>,
    pub forfeited_by: Option<PlayerId>,
    pub scores: BTreeMap<PlayerId, u32>,
    pub rounds_played: u64,
}

impl GameOutcome {
    /// `None` until the room is finished.
    pub fn from_state(state: &GameState) -> Option<Self> {
        if state.game_status != GameStatus::Finished {
            return None;
        }
        let winner = determine_winner(state);
        let loser = winner
            .as_deref()
            .and_then(|w| state.opponent_of(w))
            .cloned();
        Some(Self {
            room_id: state.room_id.clone(),
            winner,
            loser,
            forfeited_by: state.forfeited_by.clone(),
            scores: state
                .players
                .iter()
                .map(|(id, p)| (id.clone(), p.score))
                .collect(),
            rounds_played: state.round_sequence,
        })
    }
}
