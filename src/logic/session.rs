//! Session orchestration: draft-method routing, the clock, and the action dispatcher.

use crate::logic::auction::{advance_auction, place_bid, start_auction};
use crate::logic::bracket::{pick_match_winner, start_bracket_match};
use crate::logic::election::{
    advance_results, end_nomination, end_voting, nominate, pick_random_captains, self_nominate, vote,
};
use crate::logic::rps::{advance_rps, make_choice, start_rps};
use crate::logic::strategy::select_strategy;
use crate::models::{
    DraftMethod, FormationError, FormationSession, FormationState, MatchId, RpsHand, Side,
    Strategy, UserId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Route the elected captains to a draft method (DraftMethodSelection only).
/// Manual drafting is not available and leaves the session unchanged.
pub fn select_draft_method<R: Rng + ?Sized>(
    session: &mut FormationSession,
    method: DraftMethod,
    rng: &mut R,
) -> Result<(), FormationError> {
    if session.state != FormationState::DraftMethodSelection {
        return Err(FormationError::InvalidState);
    }
    if method == DraftMethod::Manual {
        return Err(FormationError::ManualDraftUnimplemented);
    }
    if session.captains.is_empty() {
        return Err(FormationError::NoCaptains);
    }
    session.draft_method = Some(method);
    match method {
        DraftMethod::Auction => start_auction(session, rng),
        DraftMethod::RockPaperScissors => start_rps(session),
        DraftMethod::Manual => Err(FormationError::ManualDraftUnimplemented),
    }
}

/// Advance every running clock by `seconds`: the election results delay, the auction timer,
/// or the RPS round timer, depending on the phase.
pub fn tick<R: Rng + ?Sized>(
    session: &mut FormationSession,
    seconds: u32,
    rng: &mut R,
) -> Result<(), FormationError> {
    match session.state {
        FormationState::ElectionResults => advance_results(session, seconds),
        FormationState::Auction => advance_auction(session, seconds, rng)?,
        FormationState::RockPaperScissors => advance_rps(session, seconds, rng),
        _ => {}
    }
    Ok(())
}

/// Everything a client can ask a session to do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Action {
    SelectStrategy { strategy: Strategy },
    SelfNominate,
    Nominate { candidate: UserId },
    PickRandomCaptains,
    EndNomination,
    Vote { candidate: UserId },
    EndVoting,
    SelectDraftMethod { method: DraftMethod },
    PlaceBid { amount: u32 },
    ChooseHand { hand: RpsHand },
    StartMatch { match_id: MatchId },
    PickMatchWinner { match_id: MatchId, side: Side },
    Restart,
    Tick { seconds: u32 },
}

impl Action {
    /// Whether the action has to come from a known user.
    pub fn needs_actor(&self) -> bool {
        matches!(
            self,
            Action::SelfNominate
                | Action::Nominate { .. }
                | Action::PickRandomCaptains
                | Action::Vote { .. }
                | Action::PlaceBid { .. }
                | Action::ChooseHand { .. }
        )
    }
}

/// Apply one action on behalf of `actor`. Errors leave the session as it was.
pub fn apply_action<R: Rng + ?Sized>(
    session: &mut FormationSession,
    actor: Option<UserId>,
    action: Action,
    rng: &mut R,
) -> Result<(), FormationError> {
    let who = || actor.ok_or(FormationError::ActorRequired);
    match action {
        Action::SelectStrategy { strategy } => select_strategy(session, strategy, rng),
        Action::SelfNominate => self_nominate(session, who()?),
        Action::Nominate { candidate } => nominate(session, who()?, candidate),
        Action::PickRandomCaptains => pick_random_captains(session, who()?, rng),
        Action::EndNomination => end_nomination(session),
        Action::Vote { candidate } => vote(session, who()?, candidate),
        Action::EndVoting => end_voting(session),
        Action::SelectDraftMethod { method } => select_draft_method(session, method, rng),
        Action::PlaceBid { amount } => place_bid(session, who()?, amount),
        Action::ChooseHand { hand } => make_choice(session, who()?, hand),
        Action::StartMatch { match_id } => start_bracket_match(session, match_id),
        Action::PickMatchWinner { match_id, side } => pick_match_winner(session, match_id, side),
        Action::Restart => session.restart(),
        Action::Tick { seconds } => tick(session, seconds, rng),
    }
}
