//! Auction draft: sequential timed bidding for every non-captain participant.

use crate::logic::bracket::start_bracket;
use crate::models::{
    Auction, AuctionBid, AuctionPhase, AuctionPlayer, FormationError, FormationEvent,
    FormationSession, FormationState, Participant, Team, UserId,
};
use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;
use uuid::Uuid;

/// Build the auction: each captain gets the initial budget; the pool is every non-captain
/// participant in roster order, and the first one goes on the block.
pub fn new_auction(
    captains: &[Participant],
    participants: &[Participant],
    initial_budget: u32,
    seconds_per_player: u32,
) -> Auction {
    let players: Vec<AuctionPlayer> = participants
        .iter()
        .filter(|p| !captains.iter().any(|c| c.user_id == p.user_id))
        .map(AuctionPlayer::from_participant)
        .collect();
    let captain_points: HashMap<UserId, u32> =
        captains.iter().map(|c| (c.user_id, initial_budget)).collect();
    let current_index = if players.is_empty() { None } else { Some(0) };
    Auction {
        phase: if players.is_empty() {
            AuctionPhase::Completed
        } else {
            AuctionPhase::Active
        },
        captains: captains.to_vec(),
        players,
        bids: Vec::new(),
        captain_points,
        initial_budget,
        current_index,
        time_left: seconds_per_player,
    }
}

/// Validate and record a bid on the player currently on the block.
///
/// Rejected bids leave the auction untouched. An accepted bid raises the clock to at least
/// `extension_seconds`.
pub fn bid(
    auction: &mut Auction,
    bidder_id: UserId,
    amount: u32,
    extension_seconds: u32,
) -> Result<FormationEvent, FormationError> {
    if auction.phase != AuctionPhase::Active {
        return Err(FormationError::InvalidState);
    }
    let player_id = auction
        .current_player()
        .map(|p| p.id)
        .ok_or(FormationError::InvalidState)?;
    let bidder_nickname = auction
        .captains
        .iter()
        .find(|c| c.user_id == bidder_id)
        .map(|c| c.nexus_nickname.clone())
        .ok_or(FormationError::NotACaptain(bidder_id))?;
    if amount == 0 {
        return Err(FormationError::InvalidBidAmount);
    }
    let available = auction.remaining_points(bidder_id).unwrap_or(0);
    if amount > available {
        return Err(FormationError::InsufficientPoints {
            available,
            requested: amount,
        });
    }
    let current_highest = auction.highest_bid_amount(player_id);
    if amount <= current_highest {
        return Err(FormationError::BidTooLow { current_highest });
    }

    auction.bids.push(AuctionBid {
        id: Uuid::new_v4(),
        bidder_id,
        player_id,
        bid_amount: amount,
        bidder_nickname: bidder_nickname.clone(),
        created_at: Utc::now(),
    });
    if let Some(idx) = auction.current_index {
        let player = &mut auction.players[idx];
        player.current_bid = amount;
        player.bid_count += 1;
    }
    auction.time_left = auction.time_left.max(extension_seconds);
    log::debug!("Bid {} on player {} by {}", amount, player_id, bidder_id);

    Ok(FormationEvent::BidPlaced {
        player_id,
        bidder_id,
        bidder_nickname,
        amount,
        time_left: auction.time_left,
    })
}

/// Settle the player on the block and put the next unsold player up.
///
/// The earliest highest bid wins and is debited from that captain. Without bids the player
/// stays unsold. Completes the auction when the pool is exhausted.
pub fn settle_current(auction: &mut Auction, seconds_per_player: u32) -> Vec<FormationEvent> {
    let mut events = Vec::new();
    let Some(idx) = auction.current_index else {
        return events;
    };
    if auction.phase != AuctionPhase::Active {
        return events;
    }
    let player_id = auction.players[idx].id;
    match auction.highest_bid(player_id).cloned() {
        Some(winning) => {
            let player = &mut auction.players[idx];
            player.is_sold = true;
            player.sold_to = Some(winning.bidder_nickname.clone());
            player.sold_to_id = Some(winning.bidder_id);
            player.sold_price = Some(winning.bid_amount);
            if let Some(points) = auction.captain_points.get_mut(&winning.bidder_id) {
                *points = points.saturating_sub(winning.bid_amount);
            }
            log::info!(
                "Player {} sold to {} for {}",
                player_id,
                winning.bidder_nickname,
                winning.bid_amount
            );
            events.push(FormationEvent::PlayerSold {
                player_id,
                captain_id: winning.bidder_id,
                captain_nickname: winning.bidder_nickname,
                price: winning.bid_amount,
            });
        }
        None => {
            log::info!("Player {} went unsold", player_id);
            events.push(FormationEvent::PlayerUnsold { player_id });
        }
    }

    let next = (idx + 1..auction.players.len()).find(|&i| !auction.players[i].is_sold);
    match next {
        Some(i) => {
            auction.current_index = Some(i);
            auction.time_left = seconds_per_player;
            let p = &auction.players[i];
            events.push(FormationEvent::NextPlayer {
                player_id: p.id,
                nexus_nickname: p.nexus_nickname.clone(),
            });
        }
        None => {
            auction.current_index = None;
            auction.time_left = 0;
            auction.phase = AuctionPhase::Completed;
            let sold = auction.players.iter().filter(|p| p.is_sold).count();
            events.push(FormationEvent::AuctionCompleted {
                sold,
                unsold: auction.players.len() - sold,
            });
        }
    }
    events
}

/// Run the clock down by `seconds`, settling each player whose time runs out.
pub fn run_clock(auction: &mut Auction, seconds: u32, seconds_per_player: u32) -> Vec<FormationEvent> {
    let mut events = Vec::new();
    for _ in 0..seconds {
        if auction.phase != AuctionPhase::Active {
            break;
        }
        auction.time_left = auction.time_left.saturating_sub(1);
        if auction.time_left == 0 {
            events.extend(settle_current(auction, seconds_per_player));
        }
    }
    events
}

/// Teams from a finished auction: each captain plus the players sold to them.
/// Unsold players are left out.
pub fn assemble_teams(auction: &Auction, participants: &[Participant]) -> Vec<Team> {
    auction
        .captains
        .iter()
        .map(|captain| {
            let drafted = auction
                .players
                .iter()
                .filter(|p| p.sold_to_id == Some(captain.user_id))
                .filter_map(|p| participants.iter().find(|x| x.user_id == p.id).cloned())
                .collect();
            Team::captained(captain.clone(), drafted)
        })
        .collect()
}

/// Open the auction for the session's captains (called from draft-method selection).
pub(crate) fn start_auction<R: Rng + ?Sized>(
    session: &mut FormationSession,
    rng: &mut R,
) -> Result<(), FormationError> {
    if session.captains.is_empty() {
        return Err(FormationError::NoCaptains);
    }
    let auction = new_auction(
        &session.captains,
        &session.participants,
        session.config.initial_budget,
        session.config.auction_seconds,
    );
    log::info!(
        "Session {}: auction opens with {} captain(s) and {} player(s)",
        session.id,
        auction.captains.len(),
        auction.players.len()
    );
    let completed = auction.phase == AuctionPhase::Completed;
    if let Some(p) = auction.current_player() {
        session.events.push(FormationEvent::NextPlayer {
            player_id: p.id,
            nexus_nickname: p.nexus_nickname.clone(),
        });
    }
    session.auction = Some(auction);
    session.transition(FormationState::Auction);
    if completed {
        finish_auction(session, rng)?;
    }
    Ok(())
}

/// Place a bid as `bidder` on the player on the block (Auction only).
pub fn place_bid(session: &mut FormationSession, bidder: UserId, amount: u32) -> Result<(), FormationError> {
    if session.state != FormationState::Auction {
        return Err(FormationError::InvalidState);
    }
    let extension = session.config.bid_extension_seconds;
    let auction = session.auction.as_mut().ok_or(FormationError::InvalidState)?;
    let event = bid(auction, bidder, amount, extension)?;
    session.events.push(event);
    Ok(())
}

/// Advance the auction clock; finishing the pool builds teams and opens the bracket.
pub(crate) fn advance_auction<R: Rng + ?Sized>(
    session: &mut FormationSession,
    seconds: u32,
    rng: &mut R,
) -> Result<(), FormationError> {
    if session.state != FormationState::Auction {
        return Ok(());
    }
    let per_player = session.config.auction_seconds;
    let Some(auction) = session.auction.as_mut() else {
        return Ok(());
    };
    let events = run_clock(auction, seconds, per_player);
    let completed = auction.phase == AuctionPhase::Completed;
    session.events.extend(events);
    if completed {
        finish_auction(session, rng)?;
    }
    Ok(())
}

fn finish_auction<R: Rng + ?Sized>(session: &mut FormationSession, rng: &mut R) -> Result<(), FormationError> {
    let auction = session.auction.as_ref().ok_or(FormationError::InvalidState)?;
    session.teams = assemble_teams(auction, &session.participants);
    start_bracket(session, rng)
}
