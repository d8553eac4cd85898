use crate::domain::cards_parsing::parse_cards;
use crate::domain::scoring::score_round;
use crate::domain::state::Player;

fn player_with(id: &str, captures: &[&str]) -> Player {
    let mut player = Player::new(id);
    player.captures = parse_cards(captures);
    player
}

#[test]
fn dominant_round_takes_every_bonus() {
    let p1 = player_with(
        "p1",
        &["3C", "4C", "5C", "6C", "7C", "8C", "9C", "2C", "TD", "AH"],
    );
    let p2 = player_with("p2", &["KH", "QS", "5D"]);

    let result = score_round(&p1, &p2);

    assert_eq!(result.points_for("p1"), 5);
    assert_eq!(result.points_for("p2"), 0);
    let p1_score = result.for_player("p1").expect("p1 scored");
    assert_eq!(p1_score.clubs, 8);
    assert_eq!(p1_score.cards, 10);
    assert!(p1_score.breakdown.most_clubs);
    assert!(p1_score.breakdown.more_cards);
    assert!(p1_score.breakdown.ten_of_diamonds);
    assert!(p1_score.breakdown.two_of_clubs);
}

#[test]
fn ties_award_no_comparative_bonus() {
    let p1 = player_with("p1", &["3C", "4C", "TD"]);
    let p2 = player_with("p2", &["5C", "6H", "2C"]);

    let result = score_round(&p1, &p2);

    assert_eq!(result.points_for("p1"), 1);
    assert_eq!(result.points_for("p2"), 1);
    for entry in &result.players {
        assert!(!entry.breakdown.most_clubs);
        assert!(!entry.breakdown.more_cards);
    }
}

#[test]
fn bonuses_can_split_between_players() {
    // p1: more clubs, fewer cards. p2: more cards, ten of diamonds.
    let p1 = player_with("p1", &["3C", "4C", "2C"]);
    let p2 = player_with("p2", &["TD", "5H", "6H", "7S", "8C"]);

    let result = score_round(&p1, &p2);

    assert_eq!(result.points_for("p1"), 2);
    assert_eq!(result.points_for("p2"), 3);
}

#[test]
fn empty_piles_score_nothing() {
    let result = score_round(&Player::new("p1"), &Player::new("p2"));
    assert_eq!(result.points_for("p1"), 0);
    assert_eq!(result.points_for("p2"), 0);
    assert_eq!(result.players.len(), 2);
    assert_eq!(result.players[0].player_id, "p1");
}

#[test]
fn unknown_player_scores_zero() {
    let result = score_round(&Player::new("p1"), &Player::new("p2"));
    assert_eq!(result.points_for("mallory"), 0);
    assert!(result.for_player("mallory").is_none());
}
