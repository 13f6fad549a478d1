//! Captain election: nomination, voting, results, and the host's random pick.

use crate::models::{
    CaptainElection, ElectionPhase, FormationError, FormationSession, FormationState, Participant,
    UserId,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;

fn election_in(
    session: &mut FormationSession,
    state: FormationState,
) -> Result<&mut CaptainElection, FormationError> {
    if session.state != state {
        return Err(FormationError::InvalidState);
    }
    session.election.as_mut().ok_or(FormationError::InvalidState)
}

fn require_participant(session: &FormationSession, user_id: UserId) -> Result<(), FormationError> {
    session
        .participant(user_id)
        .map(|_| ())
        .ok_or(FormationError::ParticipantNotFound(user_id))
}

/// Nominate yourself (Nomination only). Repeating it changes nothing.
/// The nomination counts as one vote.
pub fn self_nominate(session: &mut FormationSession, user_id: UserId) -> Result<(), FormationError> {
    let election = election_in(session, FormationState::Nomination)?;
    let seq = election.next_nomination_seq;
    let candidate = election
        .candidate_mut(user_id)
        .ok_or(FormationError::ParticipantNotFound(user_id))?;
    if candidate.self_nominated {
        return Ok(());
    }
    candidate.self_nominated = true;
    candidate.total_votes += 1;
    if candidate.nominated_seq.is_none() {
        candidate.nominated_seq = Some(seq);
        election.next_nomination_seq += 1;
    }
    Ok(())
}

/// Nominate another participant (Nomination only). Each voter gets one such nomination for
/// the whole phase. The nomination counts as one vote.
pub fn nominate(
    session: &mut FormationSession,
    voter: UserId,
    candidate_id: UserId,
) -> Result<(), FormationError> {
    require_participant(session, voter)?;
    let election = election_in(session, FormationState::Nomination)?;
    if voter == candidate_id {
        return Err(FormationError::CannotNominateSelf);
    }
    if election.nominators.contains(&voter) {
        return Err(FormationError::AlreadyNominated);
    }
    let seq = election.next_nomination_seq;
    let candidate = election
        .candidate_mut(candidate_id)
        .ok_or(FormationError::ParticipantNotFound(candidate_id))?;
    candidate.nominated_by_others += 1;
    candidate.total_votes += 1;
    if candidate.nominated_seq.is_none() {
        candidate.nominated_seq = Some(seq);
        election.next_nomination_seq += 1;
    }
    election.nominators.insert(voter);
    Ok(())
}

/// Close nominations and open voting.
pub fn end_nomination(session: &mut FormationSession) -> Result<(), FormationError> {
    let election = election_in(session, FormationState::Nomination)?;
    election.phase = ElectionPhase::Voting;
    let eligible = election.eligible_candidates().count();
    log::info!("Session {}: voting opens with {} candidate(s)", session.id, eligible);
    session.transition(FormationState::Voting);
    Ok(())
}

/// Cast the voter's single vote for a nominated candidate (Voting only).
pub fn vote(
    session: &mut FormationSession,
    voter: UserId,
    candidate_id: UserId,
) -> Result<(), FormationError> {
    require_participant(session, voter)?;
    let election = election_in(session, FormationState::Voting)?;
    if election.votes.contains_key(&voter) {
        return Err(FormationError::AlreadyVoted);
    }
    let candidate = election
        .candidate_mut(candidate_id)
        .ok_or(FormationError::ParticipantNotFound(candidate_id))?;
    if !candidate.is_eligible() {
        return Err(FormationError::CandidateNotEligible(candidate_id));
    }
    candidate.total_votes += 1;
    election.votes.insert(voter, candidate_id);
    Ok(())
}

/// Close voting: the top `required_captains` eligible candidates by votes become captains.
/// Ties keep nomination order. Fewer nominees than required yields fewer captains.
pub fn end_voting(session: &mut FormationSession) -> Result<(), FormationError> {
    let election = election_in(session, FormationState::Voting)?;
    let required = election.required_captains;
    let mut ranked: Vec<_> = election
        .eligible_candidates()
        .map(|c| (c.user_id, c.total_votes, c.nominated_seq))
        .collect();
    ranked.sort_by_key(|&(_, votes, seq)| (Reverse(votes), seq));
    let chosen: Vec<UserId> = ranked
        .into_iter()
        .take(required)
        .map(|(id, _, _)| id)
        .collect();
    for c in &mut election.candidates {
        c.is_selected = chosen.contains(&c.user_id);
    }
    election.phase = ElectionPhase::Results;
    election.results_elapsed = 0;
    if chosen.len() < required {
        log::warn!(
            "Session {}: only {} of {} captains could be elected",
            session.id,
            chosen.len(),
            required
        );
    }

    session.captains = captains_in_order(&session.participants, &chosen);
    session.transition(FormationState::ElectionResults);
    Ok(())
}

/// Host shortcut: pick the required number of captains uniformly at random from the whole
/// roster and go straight to draft-method selection.
pub fn pick_random_captains<R: Rng + ?Sized>(
    session: &mut FormationSession,
    actor: UserId,
    rng: &mut R,
) -> Result<(), FormationError> {
    if !matches!(session.state, FormationState::Nomination | FormationState::Voting) {
        return Err(FormationError::InvalidState);
    }
    if !session.is_host(actor) {
        return Err(FormationError::NotHost);
    }
    let k = session.required_captains();
    let mut pool = session.participants.clone();
    pool.shuffle(rng);
    pool.truncate(k);
    session.captains = pool;
    session.election = None;
    session.transition(FormationState::DraftMethodSelection);
    Ok(())
}

/// Count down the results display; moves to draft-method selection once the delay is over.
pub(crate) fn advance_results(session: &mut FormationSession, seconds: u32) {
    if session.state != FormationState::ElectionResults {
        return;
    }
    let delay = session.config.results_delay_seconds;
    let Some(election) = session.election.as_mut() else {
        return;
    };
    election.results_elapsed = election.results_elapsed.saturating_add(seconds);
    if election.results_elapsed >= delay {
        session.election = None;
        session.transition(FormationState::DraftMethodSelection);
    }
}

fn captains_in_order(participants: &[Participant], ids: &[UserId]) -> Vec<Participant> {
    ids.iter()
        .filter_map(|id| participants.iter().find(|p| p.user_id == *id).cloned())
        .collect()
}
