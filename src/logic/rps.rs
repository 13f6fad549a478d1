//! Rock-paper-scissors elimination: timed rounds among captains until one remains.

use crate::models::{
    FormationError, FormationEvent, FormationOutcome, FormationSession, FormationState,
    Participant, RoundOutcome, RpsChoice, RpsGame, RpsHand, RpsPhase, RpsRoundResult, Strategy,
    UserId,
};
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

/// Group rule for one round: exactly two distinct hands decides it; one or three is a draw.
pub fn resolve_outcome(hands: &[RpsHand]) -> RoundOutcome {
    let present: Vec<RpsHand> = RpsHand::ALL
        .into_iter()
        .filter(|h| hands.contains(h))
        .collect();
    match present.as_slice() {
        [a, b] => {
            let winning_hand = if a.beats() == *b { *a } else { *b };
            RoundOutcome::Decided { winning_hand }
        }
        _ => RoundOutcome::Draw,
    }
}

/// New game over `participants`. A single participant wins without playing.
pub fn new_game(participants: &[Participant], round_seconds: u32) -> RpsGame {
    let mut game = RpsGame {
        phase: RpsPhase::Choosing,
        round: 1,
        participants: participants.to_vec(),
        eliminated: Vec::new(),
        choices: Vec::new(),
        history: Vec::new(),
        round_seconds,
        time_left: round_seconds,
        winner: None,
    };
    if let [only] = participants {
        game.winner = Some(only.clone());
        game.phase = RpsPhase::Finished;
    }
    game
}

/// Record a participant's hand for the current round. A second choice in the same round is
/// rejected; the round resolves once everyone has chosen.
pub fn choose(
    game: &mut RpsGame,
    user_id: UserId,
    hand: RpsHand,
) -> Result<Vec<FormationEvent>, FormationError> {
    if game.phase != RpsPhase::Choosing {
        return Err(FormationError::InvalidState);
    }
    let nexus_nickname = game
        .participants
        .iter()
        .find(|p| p.user_id == user_id)
        .map(|p| p.nexus_nickname.clone())
        .ok_or(FormationError::ParticipantNotFound(user_id))?;
    if game.has_chosen(user_id) {
        return Err(FormationError::AlreadyChosen);
    }
    game.choices.push(RpsChoice {
        id: Uuid::new_v4(),
        user_id,
        nexus_nickname,
        choice: hand,
        auto_assigned: false,
        created_at: Utc::now(),
    });
    let mut events = vec![FormationEvent::RpsChoiceMade {
        user_id,
        round: game.round,
    }];
    if game.waiting_on().is_empty() {
        events.extend(resolve_round(game));
    }
    Ok(events)
}

/// Resolve the current round from the recorded choices.
///
/// Draws replay with the same participants. A decided round keeps only those who showed the
/// winning hand; one survivor ends the game.
pub fn resolve_round(game: &mut RpsGame) -> Vec<FormationEvent> {
    if game.phase != RpsPhase::Choosing {
        return Vec::new();
    }
    let hands: Vec<RpsHand> = game.choices.iter().map(|c| c.choice).collect();
    let outcome = resolve_outcome(&hands);
    let hand_of = |id: UserId| game.choices.iter().find(|c| c.user_id == id).map(|c| c.choice);

    let (advancing, eliminated): (Vec<Participant>, Vec<Participant>) = match outcome {
        RoundOutcome::Draw => (game.participants.clone(), Vec::new()),
        RoundOutcome::Decided { winning_hand } => game
            .participants
            .iter()
            .cloned()
            .partition(|p| hand_of(p.user_id) == Some(winning_hand)),
    };

    let round = game.round;
    let choices = std::mem::take(&mut game.choices);
    let advancing_ids: Vec<UserId> = advancing.iter().map(|p| p.user_id).collect();
    let mut events = vec![FormationEvent::RpsRoundResult {
        round,
        outcome,
        choices: choices.iter().map(|c| (c.user_id, c.choice)).collect(),
        advancing: advancing_ids.clone(),
    }];
    game.history.push(RpsRoundResult {
        round,
        choices,
        outcome,
        advancing: advancing_ids,
        eliminated: eliminated.iter().map(|p| p.user_id).collect(),
    });
    log::debug!("RPS round {}: {:?}", round, outcome);

    game.eliminated.extend(eliminated);
    game.participants = advancing;
    if let [winner] = game.participants.as_slice() {
        game.winner = Some(winner.clone());
        game.phase = RpsPhase::Finished;
        game.time_left = 0;
        events.push(FormationEvent::RpsGameResult {
            winner: winner.clone(),
        });
    } else {
        game.round += 1;
        game.time_left = game.round_seconds;
    }
    events
}

/// Run the round clock down by `seconds`. On expiry everyone who has not chosen gets a
/// random hand and the round resolves.
pub fn run_clock<R: Rng + ?Sized>(game: &mut RpsGame, seconds: u32, rng: &mut R) -> Vec<FormationEvent> {
    let mut events = Vec::new();
    for _ in 0..seconds {
        if game.phase != RpsPhase::Choosing {
            break;
        }
        game.time_left = game.time_left.saturating_sub(1);
        if game.time_left > 0 {
            continue;
        }
        let waiting: Vec<Participant> = game.waiting_on().into_iter().cloned().collect();
        for p in waiting {
            let hand = RpsHand::random(rng);
            game.choices.push(RpsChoice {
                id: Uuid::new_v4(),
                user_id: p.user_id,
                nexus_nickname: p.nexus_nickname,
                choice: hand,
                auto_assigned: true,
                created_at: Utc::now(),
            });
        }
        events.extend(resolve_round(game));
    }
    events
}

/// Start the elimination among the session's captains (called from draft-method selection).
pub(crate) fn start_rps(session: &mut FormationSession) -> Result<(), FormationError> {
    if session.captains.is_empty() {
        return Err(FormationError::NoCaptains);
    }
    let game = new_game(&session.captains, session.config.rps_round_seconds);
    let finished = game.phase == RpsPhase::Finished;
    session.rps = Some(game);
    session.transition(FormationState::RockPaperScissors);
    if finished {
        finish_rps(session);
    }
    Ok(())
}

/// Submit a hand for `user` (RockPaperScissors only).
pub fn make_choice(session: &mut FormationSession, user: UserId, hand: RpsHand) -> Result<(), FormationError> {
    if session.state != FormationState::RockPaperScissors {
        return Err(FormationError::InvalidState);
    }
    let game = session.rps.as_mut().ok_or(FormationError::InvalidState)?;
    let events = choose(game, user, hand)?;
    let finished = game.phase == RpsPhase::Finished;
    session.events.extend(events);
    if finished {
        finish_rps(session);
    }
    Ok(())
}

pub(crate) fn advance_rps<R: Rng + ?Sized>(session: &mut FormationSession, seconds: u32, rng: &mut R) {
    if session.state != FormationState::RockPaperScissors {
        return;
    }
    let Some(game) = session.rps.as_mut() else {
        return;
    };
    let events = run_clock(game, seconds, rng);
    let finished = game.phase == RpsPhase::Finished;
    session.events.extend(events);
    if finished {
        finish_rps(session);
    }
}

/// RPS picks a single winner and produces no teams.
fn finish_rps(session: &mut FormationSession) {
    let winner = session.rps.as_ref().and_then(|g| g.winner.clone());
    session.outcome = Some(FormationOutcome {
        strategy: session.strategy.unwrap_or(Strategy::CaptainDraft),
        teams: Vec::new(),
        tournament_winner: None,
        rps_winner: winner,
    });
    session.transition(FormationState::Completed);
}
