use time::OffsetDateTime;

use crate::domain::cards_parsing::parse_cards;
use crate::domain::outcome::determine_winner;
use crate::domain::play::{apply_move, record_timeout};
use crate::domain::rules::GameRules;
use crate::domain::state::GameStatus;
use crate::domain::test_state_helpers::{
    crafted_state, crafted_state_with, set_scores, started_room, Layout, GUEST, HOST,
};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

fn card(token: &str) -> Card {
    token.parse().expect("valid token")
}

fn now() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

fn assert_kind(err: DomainError, expected: ValidationKind) {
    assert_eq!(err.validation_kind(), Some(&expected), "got {err:?}");
}

#[test]
fn laying_a_card_passes_the_turn() {
    let mut state = crafted_state(Layout {
        host_hand: &["5C", "KD"],
        guest_hand: &["2H", "3H"],
        table: &["9S"],
        ..Default::default()
    });
    let seq = state.move_sequence;

    let outcome = apply_move(&mut state, HOST, card("5C"), &[], now()).expect("lay");

    assert!(!outcome.captured);
    assert_eq!(state.table_cards, parse_cards(&["9S", "5C"]));
    assert_eq!(state.players[HOST].hand, parse_cards(&["KD"]));
    assert!(state.is_turn_of(GUEST));
    assert!(state.players[GUEST].is_turn);
    assert!(!state.players[HOST].is_turn);
    assert_eq!(state.move_sequence, seq + 1);
    let last = state.last_move.as_ref().expect("move recorded");
    assert_eq!(last.played_card, card("5C"));
    assert!(last.captured_cards.is_empty());
    assert!(!last.forced);
}

#[test]
fn capture_moves_cards_to_the_pile() {
    let mut state = crafted_state(Layout {
        host_hand: &["5C", "KD"],
        guest_hand: &["2H", "3H"],
        table: &["2S", "3D", "9S"],
        ..Default::default()
    });

    let outcome = apply_move(
        &mut state,
        HOST,
        card("5C"),
        &parse_cards(&["2S", "3D"]),
        now(),
    )
    .expect("capture");

    assert!(outcome.captured);
    assert_eq!(state.table_cards, parse_cards(&["9S"]));
    assert_eq!(state.players[HOST].captures, parse_cards(&["2S", "3D", "5C"]));
    assert_eq!(state.last_capture_player_id.as_deref(), Some(HOST));
}

#[test]
fn rejected_moves_leave_state_untouched() {
    let base = crafted_state(Layout {
        host_hand: &["5C", "KD"],
        guest_hand: &["2H", "3H"],
        table: &["2S", "3D"],
        ..Default::default()
    });

    let mut state = base.clone();
    let err = apply_move(&mut state, GUEST, card("2H"), &[], now()).unwrap_err();
    assert_kind(err, ValidationKind::OutOfTurn);
    assert_eq!(state, base);

    let err = apply_move(&mut state, HOST, card("7C"), &[], now()).unwrap_err();
    assert_kind(err, ValidationKind::CardNotInHand);
    assert_eq!(state, base);

    let err = apply_move(&mut state, HOST, card("5C"), &parse_cards(&["4H"]), now()).unwrap_err();
    assert_kind(err, ValidationKind::CardNotOnTable);
    assert_eq!(state, base);

    let err = apply_move(&mut state, "mallory", card("5C"), &[], now()).unwrap_err();
    assert_kind(err, ValidationKind::OutOfTurn);
    assert_eq!(state, base);
}

#[test]
fn waiting_room_refuses_moves() {
    let mut state = crate::domain::room::create_room("r", HOST, GameRules::default(), 1);
    let err = apply_move(&mut state, HOST, card("5C"), &[], now()).unwrap_err();
    assert_kind(err, ValidationKind::PhaseMismatch);
}

#[test]
fn illegal_capture_is_trusted_by_default() {
    let mut state = crafted_state(Layout {
        host_hand: &["5C", "KD"],
        guest_hand: &["2H"],
        table: &["9S"],
        ..Default::default()
    });

    apply_move(&mut state, HOST, card("5C"), &parse_cards(&["9S"]), now())
        .expect("trusted capture");
    assert_eq!(state.players[HOST].captures, parse_cards(&["9S", "5C"]));
}

#[test]
fn illegal_capture_is_refused_when_enforced() {
    let rules = GameRules::default().with_capture_enforcement(true);
    let base = crafted_state_with(
        rules,
        Layout {
            host_hand: &["5C", "KD"],
            guest_hand: &["2H"],
            table: &["9S", "5H"],
            ..Default::default()
        },
    );

    let mut state = base.clone();
    let err = apply_move(&mut state, HOST, card("5C"), &parse_cards(&["9S"]), now()).unwrap_err();
    assert_kind(err, ValidationKind::IllegalCapture);
    assert_eq!(state, base);

    apply_move(&mut state, HOST, card("5C"), &parse_cards(&["5H"]), now())
        .expect("legal capture");
}

#[test]
fn empty_hands_trigger_a_redeal_mover_first() {
    let mut state = crafted_state(Layout {
        host_hand: &["5C"],
        guest_hand: &["6D"],
        table: &["KS"],
        deck: &["2C", "3C", "4C", "5D", "6C", "7C", "8C", "9C"],
        ..Default::default()
    });
    let hand_before = state.current_hand;

    apply_move(&mut state, HOST, card("5C"), &[], now()).expect("host lays");
    let outcome = apply_move(&mut state, GUEST, card("6D"), &[], now()).expect("guest lays");

    assert!(outcome.hand_dealt);
    assert!(outcome.round_completed.is_none());
    assert_eq!(state.players[GUEST].hand, parse_cards(&["2C", "3C", "4C", "5D"]));
    assert_eq!(state.players[HOST].hand, parse_cards(&["6C", "7C", "8C", "9C"]));
    assert!(state.deck.is_empty());
    assert_eq!(state.current_hand, hand_before + 1);
    assert!(state.is_turn_of(HOST));
}

#[test]
fn short_deck_at_redeal_is_an_invariant_error() {
    let base = crafted_state(Layout {
        host_hand: &["5C"],
        guest_hand: &[],
        table: &["KS"],
        deck: &["2C", "3C", "4C"],
        ..Default::default()
    });

    let mut state = base.clone();
    let err = apply_move(&mut state, HOST, card("5C"), &[], now()).unwrap_err();
    assert!(matches!(err, DomainError::Invariant(_)), "got {err:?}");
    assert_eq!(state, base);
}

#[test]
fn round_end_sweeps_to_mover_when_nobody_captured() {
    let mut state = crafted_state(Layout {
        host_hand: &["5C"],
        guest_hand: &["KD"],
        table: &["2H"],
        ..Default::default()
    });

    apply_move(&mut state, HOST, card("5C"), &[], now()).expect("host lays");
    let outcome = apply_move(&mut state, GUEST, card("KD"), &[], now()).expect("guest lays");

    let summary = outcome.round_completed.expect("round scored");
    // Guest swept 2H 5C KD: most clubs and more cards.
    assert_eq!(summary.scores.points_for(GUEST), 3);
    assert_eq!(summary.scores.points_for(HOST), 0);
    assert_eq!(summary.round_no, 1);
    assert_eq!(summary.round_sequence, 1);
    assert!(!outcome.game_finished);

    assert_eq!(state.players[GUEST].score, 3);
    assert_eq!(state.players[HOST].score, 0);
    assert_eq!(state.round_no, 2);
    assert_eq!(state.current_hand, 1);
    assert_eq!(state.table_cards.len(), 4);
    assert_eq!(state.players[HOST].hand.len(), 4);
    assert_eq!(state.players[GUEST].hand.len(), 4);
    assert!(state.players.values().all(|p| p.captures.is_empty()));
    assert!(state.is_fully_accounted());
    assert!(state.is_turn_of(HOST));
    assert!(state.last_capture_player_id.is_none());
    assert_eq!(state.last_round_score, Some(summary));
}

#[test]
fn round_end_sweeps_to_last_capturer() {
    let mut state = crafted_state(Layout {
        host_hand: &["5C"],
        guest_hand: &["KD"],
        table: &["5H", "2D"],
        ..Default::default()
    });

    apply_move(&mut state, HOST, card("5C"), &parse_cards(&["5H"]), now()).expect("host takes");
    let outcome = apply_move(&mut state, GUEST, card("KD"), &[], now()).expect("guest lays");

    let summary = outcome.round_completed.expect("round scored");
    let host = summary.scores.for_player(HOST).expect("host scored");
    assert_eq!(host.cards, 4);
    assert_eq!(host.points, 3);
    assert_eq!(summary.scores.points_for(GUEST), 0);
}

fn last_trick(host_score: u32, guest_score: u32) -> crate::domain::state::GameState {
    let mut state = crafted_state(Layout {
        host_hand: &["5C"],
        guest_hand: &["KD"],
        table: &["5H", "2D"],
        ..Default::default()
    });
    set_scores(&mut state, host_score, guest_score);
    apply_move(&mut state, HOST, card("5C"), &parse_cards(&["5H"]), now()).expect("host takes");
    apply_move(&mut state, GUEST, card("KD"), &[], now()).expect("guest lays");
    state
}

#[test]
fn reaching_the_threshold_finishes_the_game() {
    let state = last_trick(13, 14);

    assert_eq!(state.game_status, GameStatus::Finished);
    assert_eq!(state.players[HOST].score, 16);
    assert!(state.current_player_id.is_none());
    assert!(state.players.values().all(|p| !p.is_turn));
    assert_eq!(determine_winner(&state).as_deref(), Some(HOST));
    assert_eq!(state.cards_in_play(), 0);
}

#[test]
fn higher_score_wins_when_both_pass_threshold() {
    let state = last_trick(15, 16);

    assert_eq!(state.game_status, GameStatus::Finished);
    assert_eq!(determine_winner(&state).as_deref(), Some(HOST));
}

#[test]
fn level_scores_at_threshold_play_another_round() {
    let state = last_trick(13, 16);

    assert_eq!(state.players[HOST].score, 16);
    assert_eq!(state.players[GUEST].score, 16);
    assert_eq!(state.game_status, GameStatus::Active);
    assert_eq!(state.round_no, 2);
    assert!(determine_winner(&state).is_none());
}

#[test]
fn custom_threshold_is_respected() {
    let rules = GameRules::default().with_win_threshold(3);
    let mut state = crafted_state_with(
        rules,
        Layout {
            host_hand: &["5C"],
            guest_hand: &["KD"],
            table: &["5H"],
            ..Default::default()
        },
    );
    apply_move(&mut state, HOST, card("5C"), &parse_cards(&["5H"]), now()).expect("host takes");
    let outcome = apply_move(&mut state, GUEST, card("KD"), &[], now()).expect("guest lays");

    assert!(outcome.game_finished);
    assert_eq!(determine_winner(&state).as_deref(), Some(HOST));
}

#[test]
fn timeout_lays_first_card_and_counts() {
    let mut state = started_room(11);
    let first = state.players[HOST].hand[0];
    let seq = state.move_sequence;

    record_timeout(&mut state, HOST, seq, now()).expect("timeout");

    assert_eq!(state.consecutive_timeouts[HOST], 1);
    assert_eq!(state.table_cards.last(), Some(&first));
    assert_eq!(state.players[HOST].hand.len(), 3);
    assert!(state.is_turn_of(GUEST));
    assert!(state.last_move.as_ref().is_some_and(|m| m.forced));
    assert_eq!(state.move_sequence, seq + 1);
}

#[test]
fn duplicate_timeout_report_is_stale() {
    let mut state = started_room(11);
    let seq = state.move_sequence;
    record_timeout(&mut state, HOST, seq, now()).expect("first report");

    let snapshot = state.clone();
    let err = record_timeout(&mut state, GUEST, seq, now()).unwrap_err();
    assert_kind(err, ValidationKind::StaleSequence);
    assert_eq!(state, snapshot);
}

#[test]
fn timeout_for_idle_player_only() {
    let mut state = started_room(11);
    let seq = state.move_sequence;
    let err = record_timeout(&mut state, GUEST, seq, now()).unwrap_err();
    assert_kind(err, ValidationKind::OutOfTurn);
}

#[test]
fn real_move_resets_timeout_counter() {
    let mut state = started_room(11);
    let seq = state.move_sequence;
    record_timeout(&mut state, HOST, seq, now()).expect("host idles");
    let seq = state.move_sequence;
    record_timeout(&mut state, GUEST, seq, now()).expect("guest idles");

    let card = state.players[HOST].hand[0];
    apply_move(&mut state, HOST, card, &[], now()).expect("host plays");

    assert_eq!(state.consecutive_timeouts[HOST], 0);
    assert_eq!(state.consecutive_timeouts[GUEST], 1);
}
