//! Team produced by a formation path.

use crate::models::participant::{Participant, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// A team: its captain is always one of its members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: Vec<Participant>,
    pub captain: Participant,
}

impl Team {
    /// Build a team whose captain is `members[0]`. Returns None for an empty member list.
    pub fn from_members(name: impl Into<String>, members: Vec<Participant>) -> Option<Self> {
        let captain = members.first()?.clone();
        Some(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members,
            captain,
        })
    }

    /// Build a captain's team: the captain first, then the drafted players.
    pub fn captained(captain: Participant, drafted: Vec<Participant>) -> Self {
        let name = format!("Team {}", captain.nexus_nickname);
        let mut members = Vec::with_capacity(drafted.len() + 1);
        members.push(captain.clone());
        members.extend(drafted);
        Self {
            id: Uuid::new_v4(),
            name,
            members,
            captain,
        }
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}
