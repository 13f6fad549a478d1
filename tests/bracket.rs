//! Integration tests for the single-elimination bracket.

use naejeon_web::models::BYE_SCORE;
use naejeon_web::{
    generate_bracket, set_match_winner, start_match, FormationError, MatchStatus, Participant,
    Side, Team, TeamId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

fn teams(m: i64) -> Vec<Team> {
    (1..=m)
        .map(|i| Team::from_members(format!("T{i}"), vec![Participant::new(i, format!("P{i}"))]).unwrap())
        .collect()
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(5)
}

#[test]
fn every_team_appears_exactly_once_in_the_first_round() {
    for m in 1..=9 {
        let ts = teams(m);
        let bracket = generate_bracket(&ts, &mut rng()).unwrap();
        let round_one = bracket
            .previous_rounds
            .first()
            .unwrap_or(&bracket.matches);
        let mut seen: HashMap<TeamId, usize> = HashMap::new();
        for id in round_one.iter().flat_map(|mt| mt.team_ids()) {
            *seen.entry(id).or_default() += 1;
        }
        assert_eq!(seen.len(), ts.len(), "m={m}");
        assert!(seen.values().all(|&n| n == 1), "m={m}");
        assert_eq!(round_one.len(), (m as usize).div_ceil(2), "m={m}");
    }
}

#[test]
fn odd_team_out_gets_a_completed_bye() {
    let bracket = generate_bracket(&teams(5), &mut rng()).unwrap();
    assert_eq!(bracket.matches.len(), 3);
    let bye = &bracket.matches[2];
    assert!(bye.is_bye());
    assert_eq!(bye.status, MatchStatus::Completed);
    assert_eq!(bye.winner, Some(Side::One));
    assert_eq!(bye.score, Some(BYE_SCORE));
    assert!(bracket.matches[..2].iter().all(|m| m.status == MatchStatus::Pending));
}

#[test]
fn no_champion_until_every_match_is_decided() {
    let mut bracket = generate_bracket(&teams(4), &mut rng()).unwrap();
    let first = bracket.matches[0].id;
    let second = bracket.matches[1].id;

    set_match_winner(&mut bracket, first, Side::Two).unwrap();
    assert!(bracket.champion.is_none());
    assert_eq!(bracket.round, 1);

    set_match_winner(&mut bracket, second, Side::One).unwrap();
    assert!(bracket.champion.is_none());
    assert_eq!(bracket.round, 2);
    assert_eq!(bracket.matches.len(), 1);
    let final_match = bracket.matches[0].clone();
    let expected_1 = bracket.previous_rounds[0][0].team_2.clone().unwrap();
    let expected_2 = bracket.previous_rounds[0][1].team_1.clone();
    assert_eq!(final_match.team_1.id, expected_1.id);
    assert_eq!(final_match.team_2.as_ref().unwrap().id, expected_2.id);

    set_match_winner(&mut bracket, final_match.id, Side::Two).unwrap();
    assert_eq!(bracket.champion.as_ref().unwrap().id, expected_2.id);
}

#[test]
fn bye_team_meets_the_other_winner_next_round() {
    let mut bracket = generate_bracket(&teams(3), &mut rng()).unwrap();
    let bye_team = bracket.matches[1].team_1.clone();
    let played = bracket.matches[0].id;
    let winner = bracket.matches[0].team_1.clone();

    set_match_winner(&mut bracket, played, Side::One).unwrap();
    assert_eq!(bracket.round, 2);
    assert_eq!(bracket.matches.len(), 1);
    assert_eq!(bracket.matches[0].team_1.id, winner.id);
    assert_eq!(bracket.matches[0].team_2.as_ref().unwrap().id, bye_team.id);
}

#[test]
fn decided_matches_and_byes_cannot_be_changed() {
    let mut bracket = generate_bracket(&teams(3), &mut rng()).unwrap();
    let bye = bracket.matches[1].id;
    assert_eq!(
        set_match_winner(&mut bracket, bye, Side::Two),
        Err(FormationError::MatchAlreadyCompleted)
    );
    assert_eq!(start_match(&mut bracket, bye), Err(FormationError::MatchAlreadyCompleted));
    let unknown = uuid::Uuid::new_v4();
    assert_eq!(
        set_match_winner(&mut bracket, unknown, Side::One),
        Err(FormationError::MatchNotFound(unknown))
    );
}

#[test]
fn matches_can_be_marked_in_progress() {
    let mut bracket = generate_bracket(&teams(2), &mut rng()).unwrap();
    let id = bracket.matches[0].id;
    start_match(&mut bracket, id).unwrap();
    assert_eq!(bracket.matches[0].status, MatchStatus::InProgress);
    set_match_winner(&mut bracket, id, Side::One).unwrap();
    assert_eq!(bracket.matches[0].status, MatchStatus::Completed);
    assert!(bracket.champion.is_some());
}

#[test]
fn single_team_is_champion_and_empty_list_is_rejected() {
    let bracket = generate_bracket(&teams(1), &mut rng()).unwrap();
    assert_eq!(bracket.champion.as_ref().unwrap().name, "T1");
    assert_eq!(generate_bracket(&[], &mut rng()), Err(FormationError::NoTeams));
}
