use time::OffsetDateTime;

use crate::domain::game_transition::{derive_room_transitions, RoomTransition};
use crate::domain::play::apply_move;
use crate::domain::room::{create_room, forfeit, join_room};
use crate::domain::rules::GameRules;
use crate::domain::test_state_helpers::{crafted_state, started_room, Layout, GUEST, HOST, ROOM};

#[test]
fn creating_a_room_reports_the_host() {
    let after = create_room(ROOM, HOST, GameRules::default(), 1);
    assert_eq!(
        derive_room_transitions(None, &after),
        vec![RoomTransition::PlayerJoined {
            player_id: HOST.to_string()
        }]
    );
}

#[test]
fn join_starts_game_and_hands_turn_to_host() {
    let before = create_room(ROOM, HOST, GameRules::default(), 1);
    let mut after = before.clone();
    join_room(&mut after, GUEST).expect("join");

    assert_eq!(
        derive_room_transitions(Some(&before), &after),
        vec![
            RoomTransition::PlayerJoined {
                player_id: GUEST.to_string()
            },
            RoomTransition::GameStarted,
            RoomTransition::TurnBecame {
                player_id: HOST.to_string()
            },
        ]
    );
}

#[test]
fn plain_move_only_passes_the_turn() {
    let before = started_room(2);
    let mut after = before.clone();
    let card = after.players[HOST].hand[0];
    apply_move(&mut after, HOST, card, &[], OffsetDateTime::UNIX_EPOCH).expect("lay");

    assert_eq!(
        derive_room_transitions(Some(&before), &after),
        vec![RoomTransition::TurnBecame {
            player_id: GUEST.to_string()
        }]
    );
}

#[test]
fn redeal_is_reported() {
    let mut before = crafted_state(Layout {
        host_hand: &["5C"],
        guest_hand: &["6D"],
        table: &["KS"],
        deck: &["2C", "3C", "4C", "5D", "6C", "7C", "8C", "9C"],
        ..Default::default()
    });
    let now = OffsetDateTime::UNIX_EPOCH;
    apply_move(&mut before, HOST, "5C".parse().expect("card"), &[], now).expect("host lays");
    let mut after = before.clone();
    apply_move(&mut after, GUEST, "6D".parse().expect("card"), &[], now).expect("guest lays");

    let transitions = derive_room_transitions(Some(&before), &after);
    assert!(transitions.contains(&RoomTransition::HandDealt {
        round_no: 1,
        hand: before.current_hand + 1
    }));
}

#[test]
fn forfeit_reports_forfeit_and_end() {
    let before = started_room(2);
    let mut after = before.clone();
    forfeit(&mut after, GUEST).expect("forfeit");

    assert_eq!(
        derive_room_transitions(Some(&before), &after),
        vec![
            RoomTransition::Forfeited {
                player_id: GUEST.to_string()
            },
            RoomTransition::GameEnded,
        ]
    );
}

#[test]
fn unchanged_state_reports_nothing() {
    let state = started_room(2);
    assert!(derive_room_transitions(Some(&state), &state).is_empty());
}

#[test]
fn transitions_serialize_with_type_tag() {
    let json = serde_json::to_value(RoomTransition::TurnBecame {
        player_id: HOST.to_string(),
    })
    .expect("serialize");
    assert_eq!(json["type"], "turn_became");
    assert_eq!(json["player_id"], HOST);
}
