//! Integration tests for the auction draft: bid validation, clock, settlement, conservation.

use chrono::Utc;
use naejeon_web::logic::auction::{bid, new_auction, run_clock, settle_current};
use naejeon_web::{
    assemble_teams, AuctionBid, AuctionPhase, FormationError, FormationEvent, Participant,
};
use uuid::Uuid;

const BUDGET: u32 = 3000;
const SECONDS: u32 = 30;
const EXTENSION: u32 = 10;

fn roster(n: i64) -> Vec<Participant> {
    (1..=n).map(|i| Participant::new(i, format!("P{i}"))).collect()
}

/// Captains are users 1 and 2; everyone else is in the pool.
fn two_captain_auction(n: i64) -> (naejeon_web::Auction, Vec<Participant>) {
    let participants = roster(n);
    let captains = participants[..2].to_vec();
    (new_auction(&captains, &participants, BUDGET, SECONDS), participants)
}

#[test]
fn pool_excludes_captains_and_keeps_roster_order() {
    let (auction, _) = two_captain_auction(6);
    let ids: Vec<i64> = auction.players.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 4, 5, 6]);
    assert_eq!(auction.current_player().unwrap().id, 3);
    assert_eq!(auction.remaining_points(1), Some(BUDGET));
    assert_eq!(auction.remaining_points(2), Some(BUDGET));
    assert_eq!(auction.time_left, SECONDS);
}

#[test]
fn happy_path_sells_to_highest_bidder() {
    let (mut auction, _) = two_captain_auction(3);
    bid(&mut auction, 1, 100, EXTENSION).unwrap();
    bid(&mut auction, 2, 150, EXTENSION).unwrap();
    assert_eq!(auction.current_player().unwrap().current_bid, 150);
    assert_eq!(auction.current_player().unwrap().bid_count, 2);

    let events = run_clock(&mut auction, SECONDS, SECONDS);
    assert!(events.contains(&FormationEvent::PlayerSold {
        player_id: 3,
        captain_id: 2,
        captain_nickname: "P2".to_string(),
        price: 150,
    }));
    let p = &auction.players[0];
    assert!(p.is_sold);
    assert_eq!(p.sold_to.as_deref(), Some("P2"));
    assert_eq!(p.sold_price, Some(150));
    assert_eq!(auction.remaining_points(2), Some(2850));
    assert_eq!(auction.remaining_points(1), Some(3000));
    assert_eq!(auction.phase, AuctionPhase::Completed);
}

#[test]
fn rejected_bids_change_nothing() {
    let (mut auction, _) = two_captain_auction(4);
    bid(&mut auction, 1, 200, EXTENSION).unwrap();
    let before = auction.bids.len();

    assert_eq!(bid(&mut auction, 3, 300, EXTENSION), Err(FormationError::NotACaptain(3)));
    assert_eq!(bid(&mut auction, 2, 0, EXTENSION), Err(FormationError::InvalidBidAmount));
    assert_eq!(
        bid(&mut auction, 2, BUDGET + 1, EXTENSION),
        Err(FormationError::InsufficientPoints {
            available: BUDGET,
            requested: BUDGET + 1
        })
    );
    assert_eq!(
        bid(&mut auction, 2, 200, EXTENSION),
        Err(FormationError::BidTooLow { current_highest: 200 })
    );
    assert_eq!(auction.bids.len(), before);
    assert_eq!(auction.current_player().unwrap().current_bid, 200);
    assert_eq!(auction.current_player().unwrap().bid_count, 1);
}

#[test]
fn bids_extend_but_never_shorten_the_clock() {
    let (mut auction, _) = two_captain_auction(3);
    run_clock(&mut auction, 10, SECONDS);
    assert_eq!(auction.time_left, 20);
    bid(&mut auction, 1, 10, EXTENSION).unwrap();
    assert_eq!(auction.time_left, 20);

    run_clock(&mut auction, 15, SECONDS);
    assert_eq!(auction.time_left, 5);
    bid(&mut auction, 2, 20, EXTENSION).unwrap();
    assert_eq!(auction.time_left, EXTENSION);
}

#[test]
fn player_without_bids_goes_unsold_and_auction_moves_on() {
    let (mut auction, _) = two_captain_auction(4);
    let events = run_clock(&mut auction, SECONDS, SECONDS);
    assert_eq!(
        events,
        vec![
            FormationEvent::PlayerUnsold { player_id: 3 },
            FormationEvent::NextPlayer {
                player_id: 4,
                nexus_nickname: "P4".to_string()
            },
        ]
    );
    assert!(!auction.players[0].is_sold);
    assert_eq!(auction.current_player().unwrap().id, 4);
    assert_eq!(auction.time_left, SECONDS);
    assert_eq!(auction.phase, AuctionPhase::Active);
}

#[test]
fn completed_auction_rejects_bids() {
    let (mut auction, _) = two_captain_auction(3);
    settle_current(&mut auction, SECONDS);
    assert_eq!(auction.phase, AuctionPhase::Completed);
    assert!(auction.current_player().is_none());
    assert_eq!(bid(&mut auction, 1, 10, EXTENSION), Err(FormationError::InvalidState));
}

#[test]
fn budget_shrinks_after_winning() {
    let (mut auction, _) = two_captain_auction(4);
    bid(&mut auction, 1, 2900, EXTENSION).unwrap();
    settle_current(&mut auction, SECONDS);
    assert_eq!(auction.remaining_points(1), Some(100));
    assert_eq!(
        bid(&mut auction, 1, 200, EXTENSION),
        Err(FormationError::InsufficientPoints {
            available: 100,
            requested: 200
        })
    );
    bid(&mut auction, 1, 100, EXTENSION).unwrap();
}

#[test]
fn earliest_maximal_bid_wins_a_tie() {
    let (mut auction, _) = two_captain_auction(3);
    for (bidder, nick) in [(2, "P2"), (1, "P1")] {
        auction.bids.push(AuctionBid {
            id: Uuid::new_v4(),
            bidder_id: bidder,
            player_id: 3,
            bid_amount: 500,
            bidder_nickname: nick.to_string(),
            created_at: Utc::now(),
        });
    }
    assert_eq!(auction.highest_bid(3).unwrap().bidder_id, 2);
    settle_current(&mut auction, SECONDS);
    assert_eq!(auction.players[0].sold_to_id, Some(2));
}

#[test]
fn points_are_conserved_and_bids_strictly_increase() {
    let (mut auction, participants) = two_captain_auction(10);
    let mut step = 0u32;
    while auction.phase == AuctionPhase::Active {
        step += 1;
        // Every third player gets no bids; others see a short bidding war.
        if step % 3 != 0 {
            for round in 1..=4u32 {
                let bidder = if round % 2 == 1 { 1 } else { 2 };
                let amount = auction.highest_bid_amount(auction.current_player().unwrap().id) + 37 * step;
                let _ = bid(&mut auction, bidder, amount, EXTENSION);
            }
        }
        run_clock(&mut auction, SECONDS, SECONDS);
    }

    let sold = auction.sold_players();
    let total: u32 = sold.iter().filter_map(|p| p.sold_price).sum();
    assert!(total <= BUDGET * 2);
    for captain in [1, 2] {
        let spent: u32 = sold
            .iter()
            .filter(|p| p.sold_to_id == Some(captain))
            .filter_map(|p| p.sold_price)
            .sum();
        assert_eq!(auction.remaining_points(captain), Some(BUDGET - spent));
    }
    for p in &auction.players {
        let amounts: Vec<u32> = auction.bids_for(p.id).map(|b| b.bid_amount).collect();
        assert!(amounts.windows(2).all(|w| w[0] < w[1]), "player {}: {:?}", p.id, amounts);
    }

    let teams = assemble_teams(&auction, &participants);
    assert_eq!(teams.len(), 2);
    for team in &teams {
        assert_eq!(team.members[0].user_id, team.captain.user_id);
    }
    let drafted: usize = teams.iter().map(|t| t.members.len() - 1).sum();
    assert_eq!(drafted, sold.len());
    let unsold = auction.players.iter().filter(|p| !p.is_sold).count();
    assert!(unsold > 0);
    for p in auction.players.iter().filter(|p| !p.is_sold) {
        assert!(teams.iter().all(|t| !t.contains(p.id)));
    }
}
