//! Room lifecycle transitions: create, join, forfeit, round-score acks.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::dealing::deck_for_round;
use crate::domain::play::start_round;
use crate::domain::rules::{GameRules, PLAYERS};
use crate::domain::state::{GameState, GameStatus, Player, PlayerId};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Result of a join attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The player took the given seat.
    Seated { seat: usize },
    /// The player was already seated; nothing changed.
    AlreadySeated { seat: usize },
}

/// A new room with `host_id` in seat 0, waiting for an opponent.
///
/// The round-1 deck is shuffled now; nothing is dealt until the room fills.
pub fn create_room(
    room_id: impl Into<String>,
    host_id: impl Into<PlayerId>,
    rules: GameRules,
    rng_seed: u64,
) -> GameState {
    let host_id = host_id.into();
    let mut players = BTreeMap::new();
    players.insert(host_id.clone(), Player::new(host_id.clone()));
    let mut consecutive_timeouts = BTreeMap::new();
    consecutive_timeouts.insert(host_id.clone(), 0);

    GameState {
        room_id: room_id.into(),
        rules,
        rng_seed,
        seat_order: vec![host_id],
        players,
        table_cards: Vec::new(),
        deck: deck_for_round(rng_seed, 1),
        current_player_id: None,
        last_move: None,
        game_status: GameStatus::Waiting,
        last_round_score: None,
        last_capture_player_id: None,
        forfeited_by: None,
        round_no: 0,
        current_hand: 0,
        consecutive_timeouts,
        move_sequence: 0,
        round_sequence: 0,
        round_acks: BTreeMap::new(),
    }
}

/// Seat `player_id` as player 2 and deal round 1.
///
/// Joining a room you already sit in is a no-op, so a reconnecting client can
/// call this blindly. A third distinct player is refused.
pub fn join_room(state: &mut GameState, player_id: &str) -> Result<JoinOutcome, DomainError> {
    if let Some(seat) = state.seat_of(player_id) {
        return Ok(JoinOutcome::AlreadySeated { seat });
    }
    if state.game_status == GameStatus::Finished {
        return Err(DomainError::conflict(
            ConflictKind::AlreadyFinished,
            format!("Room {} has finished", state.room_id),
        ));
    }
    if state.seat_order.len() >= PLAYERS {
        return Err(DomainError::conflict(
            ConflictKind::RoomFull,
            format!("Room {} already has {PLAYERS} players", state.room_id),
        ));
    }

    let seat = state.seat_order.len();
    state.seat_order.push(player_id.to_string());
    state
        .players
        .insert(player_id.to_string(), Player::new(player_id));
    state
        .consecutive_timeouts
        .insert(player_id.to_string(), 0);

    if state.is_full() {
        start_round(state, 1)?;
        state.game_status = GameStatus::Active;
        info!(room_id = %state.room_id, player_id, "Room full, game started");
    }
    state.move_sequence += 1;

    Ok(JoinOutcome::Seated { seat })
}

/// `player_id` concedes. The opponent is lifted to at least the win threshold
/// and wins regardless of points.
pub fn forfeit(state: &mut GameState, player_id: &str) -> Result<(), DomainError> {
    if state.game_status == GameStatus::Finished {
        return Err(DomainError::conflict(
            ConflictKind::AlreadyFinished,
            format!("Room {} has finished", state.room_id),
        ));
    }
    state.player(player_id)?;

    let threshold = state.rules.win_threshold;
    if let Some(opponent_id) = state.opponent_of(player_id).cloned() {
        let opponent = state.player_mut(&opponent_id)?;
        opponent.score = opponent.score.max(threshold);
    }

    state.game_status = GameStatus::Finished;
    state.forfeited_by = Some(player_id.to_string());
    state.current_player_id = None;
    state.move_sequence += 1;
    state.sync_turn_flags();

    info!(room_id = %state.room_id, player_id, "Player forfeited");
    Ok(())
}

/// Record that `player_id` has seen the summary of round `round_sequence`.
///
/// The summary is cleared once every seated player has acknowledged it.
/// Returns whether this call cleared it. Repeating an ack changes nothing.
pub fn acknowledge_round_score(
    state: &mut GameState,
    player_id: &str,
    round_sequence: u64,
) -> Result<bool, DomainError> {
    state.player(player_id)?;
    if round_sequence > state.round_sequence {
        return Err(DomainError::validation(
            ValidationKind::StaleSequence,
            format!(
                "Cannot acknowledge round {round_sequence}, only {} scored",
                state.round_sequence
            ),
        ));
    }

    let ack = state.round_acks.entry(player_id.to_string()).or_insert(0);
    *ack = (*ack).max(round_sequence);

    let Some(summary) = &state.last_round_score else {
        return Ok(false);
    };
    let all_acked = state.seat_order.iter().all(|id| {
        state
            .round_acks
            .get(id)
            .is_some_and(|&seen| seen >= summary.round_sequence)
    });
    if all_acked {
        state.last_round_score = None;
    }
    Ok(all_acked)
}

/// Drop the round summary unconditionally. Idempotent.
pub fn clear_round_score(state: &mut GameState) {
    state.last_round_score = None;
}
