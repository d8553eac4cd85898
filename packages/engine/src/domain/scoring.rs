//! End-of-round bonus scoring.

use serde::{Deserialize, Serialize};

use crate::domain::rules::{
    POINTS_BONUS_CARD, POINTS_MORE_CARDS, POINTS_MOST_CLUBS, TEN_OF_DIAMONDS, TWO_OF_CLUBS,
};
use crate::domain::state::{Player, PlayerId};
use crate::domain::{Card, Suit};

/// Which bonus conditions a player satisfied this round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub most_clubs: bool,
    pub more_cards: bool,
    pub ten_of_diamonds: bool,
    pub two_of_clubs: bool,
}

impl ScoreBreakdown {
    pub fn points(&self) -> u32 {
        let mut points = 0;
        if self.most_clubs {
            points += POINTS_MOST_CLUBS;
        }
        if self.more_cards {
            points += POINTS_MORE_CARDS;
        }
        if self.ten_of_diamonds {
            points += POINTS_BONUS_CARD;
        }
        if self.two_of_clubs {
            points += POINTS_BONUS_CARD;
        }
        points
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoundScore {
    pub player_id: PlayerId,
    pub points: u32,
    pub clubs: usize,
    pub cards: usize,
    pub breakdown: ScoreBreakdown,
}

/// Points awarded to each player for one round, in seat order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScoreResult {
    pub players: Vec<PlayerRoundScore>,
}

impl RoundScoreResult {
    pub fn for_player(&self, player_id: &str) -> Option<&PlayerRoundScore> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn points_for(&self, player_id: &str) -> u32 {
        self.for_player(player_id).map(|p| p.points).unwrap_or(0)
    }
}

fn count_clubs(captures: &[Card]) -> usize {
    captures.iter().filter(|c| c.suit == Suit::Clubs).count()
}

/// Score a finished round from both capture piles.
///
/// The comparative bonuses (most clubs, more cards) go to nobody on a tie.
/// The two bonus cards are checked per player, independently.
pub fn score_round(player1: &Player, player2: &Player) -> RoundScoreResult {
    let clubs = [count_clubs(&player1.captures), count_clubs(&player2.captures)];
    let cards = [player1.captures.len(), player2.captures.len()];

    let players = [player1, player2]
        .into_iter()
        .enumerate()
        .map(|(idx, player)| {
            let other = 1 - idx;
            let breakdown = ScoreBreakdown {
                most_clubs: clubs[idx] > clubs[other],
                more_cards: cards[idx] > cards[other],
                ten_of_diamonds: player.captures.contains(&TEN_OF_DIAMONDS),
                two_of_clubs: player.captures.contains(&TWO_OF_CLUBS),
            };
            PlayerRoundScore {
                player_id: player.id.clone(),
                points: breakdown.points(),
                clubs: clubs[idx],
                cards: cards[idx],
                breakdown,
            }
        })
        .collect();

    RoundScoreResult { players }
}
