//! Integration tests for rock-paper-scissors elimination.

use naejeon_web::logic::rps::{choose, new_game, run_clock};
use naejeon_web::{
    end_nomination, end_voting, make_choice, resolve_outcome, select_draft_method,
    select_strategy, self_nominate, tick, DraftMethod, FormationError, FormationSession,
    FormationState, GameInfo, Participant, RoundOutcome, RpsHand, RpsPhase, Strategy,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use RpsHand::{Paper, Rock, Scissors};

const ROUND_SECONDS: u32 = 30;

fn captains(n: i64) -> Vec<Participant> {
    (1..=n).map(|i| Participant::new(i, format!("C{i}"))).collect()
}

/// Session of 12 players where users 1..=3 were elected and RPS has started.
fn session_in_rps() -> (FormationSession, ChaCha8Rng) {
    let participants: Vec<Participant> = (1..=12).map(|i| Participant::new(i, format!("P{i}"))).collect();
    let game = GameInfo {
        id: 7,
        created_by: 1,
        max_players: 12,
        title: Some("Friday scrim".to_string()),
    };
    let mut s = FormationSession::new(game, participants);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    select_strategy(&mut s, Strategy::CaptainDraft, &mut rng).unwrap();
    for id in 1..=3 {
        self_nominate(&mut s, id).unwrap();
    }
    end_nomination(&mut s).unwrap();
    end_voting(&mut s).unwrap();
    tick(&mut s, 3, &mut rng).unwrap();
    select_draft_method(&mut s, DraftMethod::RockPaperScissors, &mut rng).unwrap();
    (s, rng)
}

#[test]
fn group_rule_for_round_outcomes() {
    assert_eq!(
        resolve_outcome(&[Rock, Rock, Paper]),
        RoundOutcome::Decided { winning_hand: Paper }
    );
    assert_eq!(
        resolve_outcome(&[Paper, Scissors]),
        RoundOutcome::Decided { winning_hand: Scissors }
    );
    assert_eq!(
        resolve_outcome(&[Scissors, Rock, Rock]),
        RoundOutcome::Decided { winning_hand: Rock }
    );
    assert_eq!(resolve_outcome(&[Rock, Paper, Scissors]), RoundOutcome::Draw);
    assert_eq!(resolve_outcome(&[Scissors, Scissors, Scissors]), RoundOutcome::Draw);
}

#[test]
fn all_same_hand_replays_with_everyone() {
    let (mut s, _) = session_in_rps();
    assert_eq!(s.state, FormationState::RockPaperScissors);
    for id in 1..=3 {
        make_choice(&mut s, id, Rock).unwrap();
    }
    let game = s.rps.as_ref().unwrap();
    assert_eq!(game.round, 2);
    assert_eq!(game.participants.len(), 3);
    assert!(game.choices.is_empty());
    assert_eq!(game.history[0].outcome, RoundOutcome::Draw);
    assert_eq!(game.time_left, ROUND_SECONDS);
    assert_eq!(s.state, FormationState::RockPaperScissors);
}

#[test]
fn two_hands_decide_and_single_survivor_wins_without_teams() {
    let (mut s, _) = session_in_rps();
    make_choice(&mut s, 1, Rock).unwrap();
    make_choice(&mut s, 2, Rock).unwrap();
    make_choice(&mut s, 3, Paper).unwrap();

    let game = s.rps.as_ref().unwrap();
    assert_eq!(game.phase, RpsPhase::Finished);
    assert_eq!(game.winner.as_ref().unwrap().user_id, 3);
    assert_eq!(game.history[0].eliminated, vec![1, 2]);
    assert_eq!(s.state, FormationState::Completed);
    let outcome = s.outcome.as_ref().unwrap();
    assert!(outcome.teams.is_empty());
    assert!(outcome.tournament_winner.is_none());
    assert_eq!(outcome.rps_winner.as_ref().unwrap().user_id, 3);
}

#[test]
fn second_choice_in_a_round_is_rejected() {
    let (mut s, _) = session_in_rps();
    make_choice(&mut s, 1, Rock).unwrap();
    assert_eq!(make_choice(&mut s, 1, Paper), Err(FormationError::AlreadyChosen));
    let game = s.rps.as_ref().unwrap();
    assert_eq!(game.choices.len(), 1);
    assert_eq!(game.choices[0].choice, Rock);
    assert_eq!(make_choice(&mut s, 9, Rock), Err(FormationError::ParticipantNotFound(9)));
}

#[test]
fn eliminated_players_sit_out_later_rounds() {
    let mut game = new_game(&captains(4), ROUND_SECONDS);
    choose(&mut game, 1, Scissors).unwrap();
    choose(&mut game, 2, Paper).unwrap();
    choose(&mut game, 3, Scissors).unwrap();
    choose(&mut game, 4, Paper).unwrap();
    assert_eq!(game.round, 2);
    let ids: Vec<i64> = game.participants.iter().map(|p| p.user_id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(choose(&mut game, 2, Rock), Err(FormationError::ParticipantNotFound(2)));
}

#[test]
fn expired_round_fills_in_random_hands() {
    let mut game = new_game(&captains(2), ROUND_SECONDS);
    choose(&mut game, 1, Rock).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    run_clock(&mut game, ROUND_SECONDS - 1, &mut rng);
    assert!(game.history.is_empty());
    assert_eq!(game.time_left, 1);

    run_clock(&mut game, 1, &mut rng);
    let first = &game.history[0];
    assert_eq!(first.round, 1);
    assert_eq!(first.choices.len(), 2);
    let auto: Vec<_> = first.choices.iter().filter(|c| c.auto_assigned).collect();
    assert_eq!(auto.len(), 1);
    assert_eq!(auto[0].user_id, 2);
}

#[test]
fn lone_captain_wins_immediately() {
    let game = new_game(&captains(1), ROUND_SECONDS);
    assert_eq!(game.phase, RpsPhase::Finished);
    assert_eq!(game.winner.unwrap().user_id, 1);
}

#[test]
fn decided_rounds_always_shrink_the_field() {
    for code in 0..81u32 {
        let hands: Vec<RpsHand> = (0..4)
            .map(|i| RpsHand::ALL[((code / 3u32.pow(i)) % 3) as usize])
            .collect();
        let mut game = new_game(&captains(4), ROUND_SECONDS);
        for (i, hand) in hands.iter().enumerate() {
            choose(&mut game, i as i64 + 1, *hand).unwrap();
        }
        let result = &game.history[0];
        match result.outcome {
            RoundOutcome::Draw => assert_eq!(result.advancing.len(), 4, "{hands:?}"),
            RoundOutcome::Decided { winning_hand } => {
                assert!(!result.advancing.is_empty() && result.advancing.len() < 4, "{hands:?}");
                for id in &result.advancing {
                    assert_eq!(hands[(*id - 1) as usize], winning_hand);
                }
            }
        }
    }
}
