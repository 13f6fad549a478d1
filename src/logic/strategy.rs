//! Strategy selection: balanced / skill-based splits, or hand off to captain election.

use crate::logic::bracket::start_bracket;
use crate::models::{
    CaptainElection, FormationError, FormationSession, FormationState, Participant, Strategy, Team,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Minimum roster size for any strategy.
pub const MIN_PARTICIPANTS: usize = 2;

/// Apply the chosen strategy (StrategySelection only).
///
/// Balanced and skill-based assign two teams and open the bracket; captain-draft starts the
/// election with a fresh candidate list.
pub fn select_strategy<R: Rng + ?Sized>(
    session: &mut FormationSession,
    strategy: Strategy,
    rng: &mut R,
) -> Result<(), FormationError> {
    if session.state != FormationState::StrategySelection {
        return Err(FormationError::InvalidState);
    }
    if session.participants.len() < MIN_PARTICIPANTS {
        return Err(FormationError::NotEnoughParticipants {
            required: MIN_PARTICIPANTS,
        });
    }
    session.strategy = Some(strategy);
    log::info!("Session {}: strategy {}", session.id, strategy.as_str());
    match strategy {
        Strategy::Balanced => {
            session.teams = split_balanced(&session.participants, rng);
            start_bracket(session, rng)
        }
        Strategy::SkillBased => {
            session.teams = split_by_skill(&session.participants);
            start_bracket(session, rng)
        }
        Strategy::CaptainDraft => {
            session.election = Some(CaptainElection::new(&session.participants));
            session.transition(FormationState::Nomination);
            Ok(())
        }
    }
}

/// Shuffle, then split into halves of ⌈n/2⌉ and ⌊n/2⌋. Captain = first of each half.
pub fn split_balanced<R: Rng + ?Sized>(participants: &[Participant], rng: &mut R) -> Vec<Team> {
    let mut shuffled = participants.to_vec();
    shuffled.shuffle(rng);
    split_halves(shuffled)
}

/// Sort by rating (highest first, unrated = 1000), then split into halves.
/// Team 1 gets the top half.
pub fn split_by_skill(participants: &[Participant]) -> Vec<Team> {
    let mut sorted = participants.to_vec();
    sorted.sort_by(|a, b| b.effective_rating().total_cmp(&a.effective_rating()));
    split_halves(sorted)
}

fn split_halves(mut ordered: Vec<Participant>) -> Vec<Team> {
    let second = ordered.split_off(ordered.len().div_ceil(2));
    [("Team 1", ordered), ("Team 2", second)]
        .into_iter()
        .filter_map(|(name, members)| Team::from_members(name, members))
        .collect()
}
