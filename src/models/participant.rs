//! Participant and GameInfo data structures (supplied by the surrounding app).

use serde::{Deserialize, Serialize};
use std::io::Read;

/// Identifier of a user in the surrounding app (unique within a roster).
pub type UserId = i64;

/// Rating assumed for participants that have none.
pub const DEFAULT_RATING: f64 = 1000.0;

/// A player taking part in one formation session. Immutable for the session's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub nexus_nickname: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub main_lane: Option<String>,
    /// Match-history win rate in percent, when the caller has looked it up.
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub total_games: Option<u32>,
}

impl Participant {
    /// Create a participant with only the required fields.
    pub fn new(user_id: UserId, nexus_nickname: impl Into<String>) -> Self {
        Self {
            user_id,
            nexus_nickname: nexus_nickname.into(),
            rating: None,
            tier: None,
            main_lane: None,
            win_rate: None,
            total_games: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Rating used for skill-based sorting.
    pub fn effective_rating(&self) -> f64 {
        self.rating.unwrap_or(DEFAULT_RATING)
    }

    /// Parse a roster CSV with header
    /// `user_id,nexus_nickname,rating,tier,main_lane,win_rate,total_games`.
    /// Optional columns may be missing or empty.
    pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Participant>, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        rdr.deserialize::<CsvRow>()
            .map(|row| row.map(Participant::from))
            .collect()
    }
}

#[derive(Deserialize)]
struct CsvRow {
    user_id: UserId,
    nexus_nickname: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rating: Option<f64>,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    main_lane: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    win_rate: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    total_games: Option<u32>,
}

impl From<CsvRow> for Participant {
    fn from(row: CsvRow) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());
        Self {
            user_id: row.user_id,
            nexus_nickname: row.nexus_nickname,
            rating: row.rating,
            tier: non_empty(row.tier),
            main_lane: non_empty(row.main_lane),
            win_rate: row.win_rate,
            total_games: row.total_games,
        }
    }
}

/// The custom game a session belongs to. `created_by` is the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: i64,
    pub created_by: UserId,
    pub max_players: u32,
    #[serde(default)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_accepts_empty_optional_columns() {
        let data = "user_id,nexus_nickname,rating,tier,main_lane,win_rate,total_games\n\
                    1,Faker,2400,Challenger,Mid,61.5,900\n\
                    2,Keria,,,,,\n";
        let roster = Participant::parse_csv(data.as_bytes()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].rating, Some(2400.0));
        assert_eq!(roster[0].main_lane.as_deref(), Some("Mid"));
        assert_eq!(roster[1].nexus_nickname, "Keria");
        assert_eq!(roster[1].rating, None);
        assert_eq!(roster[1].tier, None);
        assert_eq!(roster[1].effective_rating(), DEFAULT_RATING);
    }

    #[test]
    fn parse_csv_rejects_missing_user_id() {
        let data = "user_id,nexus_nickname\nabc,Nobody\n";
        assert!(Participant::parse_csv(data.as_bytes()).is_err());
    }
}
