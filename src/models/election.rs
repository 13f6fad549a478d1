//! Captain election: candidates, ballots, and the election phase.

use crate::models::participant::{Participant, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Number of captains needed for a roster of `roster_size` participants.
pub fn required_captain_count(roster_size: usize) -> usize {
    match roster_size {
        0..=10 => 2,
        11..=15 => 3,
        16..=20 => 4,
        n => n.div_ceil(5),
    }
}

/// Phase of the captain election.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionPhase {
    #[default]
    Nomination,
    Voting,
    /// Captains picked; shown for a short delay before draft-method selection.
    Results,
}

/// A participant viewed as a possible captain.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CaptainCandidate {
    pub user_id: UserId,
    pub nexus_nickname: String,
    pub self_nominated: bool,
    pub nominated_by_others: u32,
    pub total_votes: u32,
    pub is_selected: bool,
    /// Order of the first nomination this candidate received (ties in the results).
    pub nominated_seq: Option<u32>,
}

impl CaptainCandidate {
    pub fn from_participant(p: &Participant) -> Self {
        Self {
            user_id: p.user_id,
            nexus_nickname: p.nexus_nickname.clone(),
            self_nominated: false,
            nominated_by_others: 0,
            total_votes: 0,
            is_selected: false,
            nominated_seq: None,
        }
    }

    /// Can receive votes in the voting phase.
    pub fn is_eligible(&self) -> bool {
        self.self_nominated || self.nominated_by_others > 0
    }
}

/// State of one election.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptainElection {
    pub phase: ElectionPhase,
    pub required_captains: usize,
    pub candidates: Vec<CaptainCandidate>,
    /// Voters that already used their one "nominate someone else" action.
    pub nominators: HashSet<UserId>,
    /// voter -> candidate voted for.
    pub votes: HashMap<UserId, UserId>,
    /// Counter handing out `nominated_seq`.
    pub next_nomination_seq: u32,
    /// Seconds spent in the results phase.
    pub results_elapsed: u32,
}

impl CaptainElection {
    /// Fresh election over the given roster.
    pub fn new(participants: &[Participant]) -> Self {
        Self {
            phase: ElectionPhase::Nomination,
            required_captains: required_captain_count(participants.len()),
            candidates: participants
                .iter()
                .map(CaptainCandidate::from_participant)
                .collect(),
            nominators: HashSet::new(),
            votes: HashMap::new(),
            next_nomination_seq: 0,
            results_elapsed: 0,
        }
    }

    pub fn candidate(&self, user_id: UserId) -> Option<&CaptainCandidate> {
        self.candidates.iter().find(|c| c.user_id == user_id)
    }

    pub fn candidate_mut(&mut self, user_id: UserId) -> Option<&mut CaptainCandidate> {
        self.candidates.iter_mut().find(|c| c.user_id == user_id)
    }

    /// Candidates that may be voted for.
    pub fn eligible_candidates(&self) -> impl Iterator<Item = &CaptainCandidate> {
        self.candidates.iter().filter(|c| c.is_eligible())
    }

    /// Selected captains' user ids, in ranking order.
    pub fn selected_ids(&self) -> Vec<UserId> {
        let mut selected: Vec<_> = self.candidates.iter().filter(|c| c.is_selected).collect();
        selected.sort_by_key(|c| (std::cmp::Reverse(c.total_votes), c.nominated_seq));
        selected.into_iter().map(|c| c.user_id).collect()
    }
}
