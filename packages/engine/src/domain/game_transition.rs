use serde::{Deserialize, Serialize};

use crate::domain::state::{GameState, GameStatus, PlayerId};

/// Observable changes between two committed versions of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomTransition {
    /// A player took a seat.
    PlayerJoined { player_id: PlayerId },
    /// Edge-triggered: Waiting -> Active.
    GameStarted,
    /// Edge-triggered: the turn became a specific player.
    TurnBecame { player_id: PlayerId },
    /// Both hands ran out and a new hand was dealt mid-round.
    HandDealt { round_no: u32, hand: u32 },
    /// A round was scored.
    RoundScored { round_no: u32, round_sequence: u64 },
    /// A player conceded.
    Forfeited { player_id: PlayerId },
    /// Edge-triggered: -> Finished.
    GameEnded,
}

/// Derive transitions from the state before a commit (if the room existed)
/// and the state after it.
pub fn derive_room_transitions(before: Option<&GameState>, after: &GameState) -> Vec<RoomTransition> {
    let mut transitions = Vec::new();

    let seated_before = before.map(|b| b.seat_order.as_slice()).unwrap_or(&[]);
    for id in &after.seat_order {
        if !seated_before.contains(id) {
            transitions.push(RoomTransition::PlayerJoined {
                player_id: id.clone(),
            });
        }
    }

    let status_before = before.map(|b| b.game_status);
    if status_before != Some(GameStatus::Active)
        && status_before != Some(GameStatus::Finished)
        && after.game_status == GameStatus::Active
    {
        transitions.push(RoomTransition::GameStarted);
    }

    let round_sequence_before = before.map(|b| b.round_sequence).unwrap_or(0);
    if after.round_sequence > round_sequence_before {
        if let Some(summary) = &after.last_round_score {
            transitions.push(RoomTransition::RoundScored {
                round_no: summary.round_no,
                round_sequence: summary.round_sequence,
            });
        }
    }

    if let Some(b) = before {
        if b.round_no == after.round_no && after.current_hand > b.current_hand {
            transitions.push(RoomTransition::HandDealt {
                round_no: after.round_no,
                hand: after.current_hand,
            });
        }
    }

    if let Some(player_id) = &after.current_player_id {
        if before.and_then(|b| b.current_player_id.as_ref()) != Some(player_id) {
            transitions.push(RoomTransition::TurnBecame {
                player_id: player_id.clone(),
            });
        }
    }

    if before.and_then(|b| b.forfeited_by.as_ref()).is_none() {
        if let Some(player_id) = &after.forfeited_by {
            transitions.push(RoomTransition::Forfeited {
                player_id: player_id.clone(),
            });
        }
    }

    if status_before != Some(GameStatus::Finished) && after.game_status == GameStatus::Finished {
        transitions.push(RoomTransition::GameEnded);
    }

    transitions
}
