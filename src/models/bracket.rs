//! Bracket match, match status, and the single-elimination bracket.

use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side won the match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Score recorded for a bye.
pub const BYE_SCORE: (u32, u32) = (1, 0);

/// A bracket match. `team_2` is None for a bye.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    /// 1-based bracket round.
    pub round: u32,
    pub team_1: Team,
    pub team_2: Option<Team>,
    pub status: MatchStatus,
    /// None if not yet played.
    pub winner: Option<Side>,
    pub score: Option<(u32, u32)>,
}

impl BracketMatch {
    pub fn new(team_1: Team, team_2: Team, round: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            team_1,
            team_2: Some(team_2),
            status: MatchStatus::Pending,
            winner: None,
            score: None,
        }
    }

    /// A bye: already completed, won by `team`.
    pub fn bye(team: Team, round: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            team_1: team,
            team_2: None,
            status: MatchStatus::Completed,
            winner: Some(Side::One),
            score: Some(BYE_SCORE),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.team_2.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn winning_team(&self) -> Option<&Team> {
        match self.winner? {
            Side::One => Some(&self.team_1),
            Side::Two => self.team_2.as_ref(),
        }
    }

    /// Ids of the teams that appear in this match.
    pub fn team_ids(&self) -> Vec<TeamId> {
        std::iter::once(self.team_1.id)
            .chain(self.team_2.as_ref().map(|t| t.id))
            .collect()
    }
}

/// Single-elimination bracket. Pairings within a round never change after generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Current round number (1-based).
    pub round: u32,
    /// Current round's matches.
    pub matches: Vec<BracketMatch>,
    /// Matches of earlier rounds, for display.
    pub previous_rounds: Vec<Vec<BracketMatch>>,
    pub champion: Option<Team>,
}

impl Bracket {
    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut BracketMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn all_matches_completed(&self) -> bool {
        !self.matches.is_empty() && self.matches.iter().all(BracketMatch::is_completed)
    }
}
