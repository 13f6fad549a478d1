//! Rock-paper-scissors elimination among captains.

use crate::models::participant::{Participant, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpsHand {
    Rock,
    Paper,
    Scissors,
}

impl RpsHand {
    pub const ALL: [RpsHand; 3] = [RpsHand::Rock, RpsHand::Paper, RpsHand::Scissors];

    /// The hand this one beats.
    pub fn beats(self) -> RpsHand {
        match self {
            RpsHand::Rock => RpsHand::Scissors,
            RpsHand::Paper => RpsHand::Rock,
            RpsHand::Scissors => RpsHand::Paper,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> RpsHand {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// One participant's choice in one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RpsChoice {
    pub id: Uuid,
    pub user_id: UserId,
    pub nexus_nickname: String,
    pub choice: RpsHand,
    /// Filled in by the round timer rather than the participant.
    pub auto_assigned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RoundOutcome {
    /// All three hands, or only one, were shown: the same set replays.
    Draw,
    Decided { winning_hand: RpsHand },
}

/// Record of a resolved round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RpsRoundResult {
    pub round: u32,
    pub choices: Vec<RpsChoice>,
    pub outcome: RoundOutcome,
    pub advancing: Vec<UserId>,
    pub eliminated: Vec<UserId>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpsPhase {
    #[default]
    Choosing,
    Finished,
}

/// Elimination game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpsGame {
    pub phase: RpsPhase,
    /// 1-based round number.
    pub round: u32,
    /// Participants still in the game.
    pub participants: Vec<Participant>,
    pub eliminated: Vec<Participant>,
    /// Choices made in the current round.
    pub choices: Vec<RpsChoice>,
    pub history: Vec<RpsRoundResult>,
    pub round_seconds: u32,
    pub time_left: u32,
    pub winner: Option<Participant>,
}

impl RpsGame {
    pub fn has_chosen(&self, user_id: UserId) -> bool {
        self.choices.iter().any(|c| c.user_id == user_id)
    }

    /// Participants that have not chosen yet this round.
    pub fn waiting_on(&self) -> Vec<&Participant> {
        self.participants
            .iter()
            .filter(|p| !self.has_chosen(p.user_id))
            .collect()
    }
}
