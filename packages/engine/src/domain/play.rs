//! Turn transitions: playing a card, mid-round redeals, round end.

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::domain::capture::is_legal_capture;
use crate::domain::dealing::{deal_table_layout, deck_for_round, draw};
use crate::domain::rules::{HAND_SIZE, ROUND_OPENER};
use crate::domain::scoring::score_round;
use crate::domain::state::{
    require_status, require_turn, GameState, GameStatus, Move, PlayerId, RoundSummary,
};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

/// What a single move changed besides the obvious hand/table update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The move took at least one table card.
    pub captured: bool,
    /// Both hands ran out and a fresh hand was dealt from the deck.
    pub hand_dealt: bool,
    /// The move exhausted the round; the summary has been applied to scores.
    pub round_completed: Option<RoundSummary>,
    /// The room reached `Finished`.
    pub game_finished: bool,
}

/// Play `played` from `player_id`'s hand, taking `chosen` from the table.
///
/// An empty `chosen` lays the card face-up. Capture legality is only checked
/// when the room's rules ask for it; otherwise the caller is trusted to have
/// validated the selection with `is_legal_capture`. All checks run before
/// any mutation, so an `Err` leaves the state untouched.
pub fn apply_move(
    state: &mut GameState,
    player_id: &str,
    played: Card,
    chosen: &[Card],
    now: OffsetDateTime,
) -> Result<MoveOutcome, DomainError> {
    require_status(state, GameStatus::Active, "apply_move")?;
    require_turn(state, player_id)?;

    let hand_pos = state
        .player(player_id)?
        .hand
        .iter()
        .position(|&c| c == played)
        .ok_or_else(|| {
            DomainError::validation(
                ValidationKind::CardNotInHand,
                format!("{played} is not in {player_id}'s hand"),
            )
        })?;

    require_on_table(&state.table_cards, chosen)?;

    if state.rules.enforce_capture_legality
        && !is_legal_capture(played, chosen, &state.table_cards)
    {
        return Err(DomainError::validation(
            ValidationKind::IllegalCapture,
            format!("{played} cannot capture {}", format_cards(chosen)),
        ));
    }

    let outcome = play_from_hand(state, player_id, hand_pos, chosen, now, false)?;
    state
        .consecutive_timeouts
        .insert(player_id.to_string(), 0);
    Ok(outcome)
}

/// Record that `player_id` let their turn expire.
///
/// `observed_sequence` is the `move_sequence` the reporter saw when the timer
/// fired; a report against any other sequence is stale, which also makes a
/// double report from both peers harmless. The idle player's counter goes up
/// and their first hand card is laid on the table for them.
pub fn record_timeout(
    state: &mut GameState,
    player_id: &str,
    observed_sequence: u64,
    now: OffsetDateTime,
) -> Result<MoveOutcome, DomainError> {
    require_status(state, GameStatus::Active, "record_timeout")?;
    require_turn(state, player_id)?;
    if observed_sequence != state.move_sequence {
        return Err(DomainError::validation(
            ValidationKind::StaleSequence,
            format!(
                "Timeout reported at sequence {observed_sequence}, room is at {}",
                state.move_sequence
            ),
        ));
    }
    if state.player(player_id)?.hand.is_empty() {
        return Err(DomainError::invariant(format!(
            "{player_id} holds the turn with an empty hand"
        )));
    }

    let counter = state
        .consecutive_timeouts
        .entry(player_id.to_string())
        .or_insert(0);
    *counter += 1;
    debug!(
        room_id = %state.room_id,
        player_id,
        consecutive = *counter,
        "Turn timed out, laying first card"
    );

    play_from_hand(state, player_id, 0, &[], now, true)
}

fn require_on_table(table: &[Card], chosen: &[Card]) -> Result<(), DomainError> {
    let mut left = table.to_vec();
    for card in chosen {
        match left.iter().position(|t| t == card) {
            Some(pos) => {
                left.swap_remove(pos);
            }
            None => {
                return Err(DomainError::validation(
                    ValidationKind::CardNotOnTable,
                    format!("{card} is not on the table"),
                ))
            }
        }
    }
    Ok(())
}

fn format_cards(cards: &[Card]) -> String {
    let tokens: Vec<String> = cards.iter().map(Card::to_string).collect();
    format!("[{}]", tokens.join(" "))
}

/// Steps shared by regular and forced moves. Preconditions are checked by
/// the callers; this only fails on broken invariants, before mutating.
fn play_from_hand(
    state: &mut GameState,
    player_id: &str,
    hand_pos: usize,
    chosen: &[Card],
    now: OffsetDateTime,
    forced: bool,
) -> Result<MoveOutcome, DomainError> {
    let opponent_id = state
        .opponent_of(player_id)
        .cloned()
        .ok_or_else(|| DomainError::invariant("active room without an opponent"))?;

    let hands_empty_after = state.player(player_id)?.hand.len() == 1
        && state.player(&opponent_id)?.hand.is_empty();
    if hands_empty_after && !state.deck.is_empty() && state.deck.len() < 2 * HAND_SIZE {
        return Err(DomainError::invariant(format!(
            "deck holds {} cards, cannot deal a full hand to both players",
            state.deck.len()
        )));
    }

    let mover = state.player_mut(player_id)?;
    let played = mover.hand.remove(hand_pos);

    let captured = !chosen.is_empty();
    if captured {
        for card in chosen {
            if let Some(pos) = state.table_cards.iter().position(|t| t == card) {
                state.table_cards.remove(pos);
            }
        }
        let mover = state.player_mut(player_id)?;
        mover.captures.extend_from_slice(chosen);
        mover.captures.push(played);
        state.last_capture_player_id = Some(player_id.to_string());
    } else {
        state.table_cards.push(played);
    }

    state.current_player_id = Some(opponent_id.clone());

    let mut outcome = MoveOutcome {
        captured,
        hand_dealt: false,
        round_completed: None,
        game_finished: false,
    };

    if state.hands_empty() && state.deck.len() >= 2 * HAND_SIZE {
        deal_hand(state, player_id, &opponent_id)?;
        state.current_hand += 1;
        outcome.hand_dealt = true;
        debug!(
            room_id = %state.room_id,
            round_no = state.round_no,
            hand = state.current_hand,
            deck_left = state.deck.len(),
            "Dealt next hand"
        );
    }

    if state.hands_empty() && state.deck.is_empty() {
        let summary = finish_round(state, player_id)?;
        outcome.game_finished = state.game_status == GameStatus::Finished;
        outcome.round_completed = Some(summary);
    }

    state.last_move = Some(Move {
        player_id: player_id.to_string(),
        played_card: played,
        captured_cards: chosen.to_vec(),
        timestamp: now,
        forced,
    });
    state.move_sequence += 1;
    state.sync_turn_flags();

    Ok(outcome)
}

/// Deal one hand to each player, `first` before `second`.
pub(crate) fn deal_hand(
    state: &mut GameState,
    first: &str,
    second: &str,
) -> Result<(), DomainError> {
    let first_cards = draw(&mut state.deck, HAND_SIZE);
    state.player_mut(first)?.hand.extend(first_cards);
    let second_cards = draw(&mut state.deck, HAND_SIZE);
    state.player_mut(second)?.hand.extend(second_cards);
    Ok(())
}

/// Sweep, score, and either finish the game or deal the next round.
fn finish_round(state: &mut GameState, mover_id: &str) -> Result<RoundSummary, DomainError> {
    let sweeper: PlayerId = state
        .last_capture_player_id
        .clone()
        .unwrap_or_else(|| mover_id.to_string());
    let swept: Vec<Card> = std::mem::take(&mut state.table_cards);
    let swept_count = swept.len();
    state.player_mut(&sweeper)?.captures.extend(swept);

    let first_id = state.seated(0)?.clone();
    let second_id = state.seated(1)?.clone();
    let scores = score_round(state.player(&first_id)?, state.player(&second_id)?);

    for entry in &scores.players {
        let player = state.player_mut(&entry.player_id)?;
        player.score += entry.points;
        player.captures.clear();
    }

    state.round_sequence += 1;
    let summary = RoundSummary {
        round_no: state.round_no,
        round_sequence: state.round_sequence,
        scores,
    };
    state.last_round_score = Some(summary.clone());

    let first_score = state.player(&first_id)?.score;
    let second_score = state.player(&second_id)?.score;
    info!(
        room_id = %state.room_id,
        round_no = state.round_no,
        sweeper = %sweeper,
        swept = swept_count,
        first_score,
        second_score,
        "Round scored"
    );

    let threshold = state.rules.win_threshold;
    let reached = first_score >= threshold || second_score >= threshold;
    if reached && first_score != second_score {
        state.game_status = GameStatus::Finished;
        state.current_player_id = None;
        info!(room_id = %state.room_id, first_score, second_score, "Game finished");
        return Ok(summary);
    }
    if reached {
        info!(
            room_id = %state.room_id,
            score = first_score,
            "Scores level at the threshold, playing another round"
        );
    }

    let next_round = state.round_no + 1;
    start_round(state, next_round)?;
    Ok(summary)
}

/// Deal round `round_no`: fresh deck, table layout, one hand each, and the
/// declared round opener to act.
pub(crate) fn start_round(state: &mut GameState, round_no: u32) -> Result<(), DomainError> {
    let opener = state.seated(ROUND_OPENER.seat())?.clone();
    let other = state
        .opponent_of(&opener)
        .cloned()
        .ok_or_else(|| DomainError::invariant("cannot start a round with one player"))?;

    let (table, deck) = deal_table_layout(deck_for_round(state.rng_seed, round_no));
    state.round_no = round_no;
    state.table_cards = table;
    state.deck = deck;
    deal_hand(state, &opener, &other)?;
    state.current_hand = 1;
    state.last_capture_player_id = None;
    state.current_player_id = Some(opener);
    state.sync_turn_flags();

    debug!(room_id = %state.room_id, round_no, "Round dealt");
    Ok(())
}
