//! Single-elimination bracket over the formed teams. Winners are picked by hand.

use crate::models::{
    Bracket, BracketMatch, FormationError, FormationOutcome, FormationSession, FormationState,
    MatchId, MatchStatus, Side, Strategy, Team,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle the teams and pair them consecutively. A trailing odd team gets a bye.
pub fn generate_bracket<R: Rng + ?Sized>(teams: &[Team], rng: &mut R) -> Result<Bracket, FormationError> {
    if teams.is_empty() {
        return Err(FormationError::NoTeams);
    }
    let mut seeded = teams.to_vec();
    seeded.shuffle(rng);
    let mut bracket = Bracket {
        round: 1,
        matches: pair_round(seeded, 1),
        previous_rounds: Vec::new(),
        champion: None,
    };
    advance_if_round_complete(&mut bracket);
    Ok(bracket)
}

/// Pair teams in order: 0 vs 1, 2 vs 3, ...
fn pair_round(teams: Vec<Team>, round: u32) -> Vec<BracketMatch> {
    let mut matches = Vec::with_capacity(teams.len().div_ceil(2));
    let mut iter = teams.into_iter();
    while let Some(team_1) = iter.next() {
        match iter.next() {
            Some(team_2) => matches.push(BracketMatch::new(team_1, team_2, round)),
            None => matches.push(BracketMatch::bye(team_1, round)),
        }
    }
    matches
}

/// Mark a pending match as being played.
pub fn start_match(bracket: &mut Bracket, match_id: MatchId) -> Result<(), FormationError> {
    let m = bracket
        .get_match_mut(match_id)
        .ok_or(FormationError::MatchNotFound(match_id))?;
    match m.status {
        MatchStatus::Completed => Err(FormationError::MatchAlreadyCompleted),
        _ => {
            m.status = MatchStatus::InProgress;
            Ok(())
        }
    }
}

/// Record the winner of a match in the current round. When the round is complete the
/// winners are paired into the next round, or the last one left becomes champion.
pub fn set_match_winner(bracket: &mut Bracket, match_id: MatchId, side: Side) -> Result<(), FormationError> {
    let m = bracket
        .get_match_mut(match_id)
        .ok_or(FormationError::MatchNotFound(match_id))?;
    if m.is_completed() {
        return Err(FormationError::MatchAlreadyCompleted);
    }
    m.winner = Some(side);
    m.status = MatchStatus::Completed;
    advance_if_round_complete(bracket);
    Ok(())
}

/// Completion is checked against the current match list, after the latest result is in.
fn advance_if_round_complete(bracket: &mut Bracket) {
    while bracket.champion.is_none() && bracket.all_matches_completed() {
        let winners: Vec<Team> = bracket
            .matches
            .iter()
            .filter_map(|m| m.winning_team().cloned())
            .collect();
        if let [champion] = winners.as_slice() {
            log::info!("Bracket champion: {}", champion.name);
            bracket.champion = Some(champion.clone());
            return;
        }
        let finished = std::mem::take(&mut bracket.matches);
        bracket.previous_rounds.push(finished);
        bracket.round += 1;
        bracket.matches = pair_round(winners, bracket.round);
    }
}

/// Build the bracket from the session's teams and enter the Bracket phase.
pub(crate) fn start_bracket<R: Rng + ?Sized>(
    session: &mut FormationSession,
    rng: &mut R,
) -> Result<(), FormationError> {
    let bracket = generate_bracket(&session.teams, rng)?;
    let done = bracket.champion.is_some();
    session.bracket = Some(bracket);
    session.transition(FormationState::Bracket);
    if done {
        finish_bracket(session);
    }
    Ok(())
}

/// Mark a bracket match as in progress (Bracket only).
pub fn start_bracket_match(session: &mut FormationSession, match_id: MatchId) -> Result<(), FormationError> {
    if session.state != FormationState::Bracket {
        return Err(FormationError::InvalidState);
    }
    let bracket = session.bracket.as_mut().ok_or(FormationError::InvalidState)?;
    start_match(bracket, match_id)
}

/// Pick the winner of a bracket match (Bracket only). Completes the session once a champion
/// is known.
pub fn pick_match_winner(
    session: &mut FormationSession,
    match_id: MatchId,
    side: Side,
) -> Result<(), FormationError> {
    if session.state != FormationState::Bracket {
        return Err(FormationError::InvalidState);
    }
    let bracket = session.bracket.as_mut().ok_or(FormationError::InvalidState)?;
    set_match_winner(bracket, match_id, side)?;
    if bracket.champion.is_some() {
        finish_bracket(session);
    }
    Ok(())
}

fn finish_bracket(session: &mut FormationSession) {
    let tournament_winner = session.bracket.as_ref().and_then(|b| b.champion.clone());
    session.outcome = Some(FormationOutcome {
        strategy: session.strategy.unwrap_or(Strategy::CaptainDraft),
        teams: session.teams.clone(),
        tournament_winner,
        rps_winner: None,
    });
    session.transition(FormationState::Completed);
}
