//! Auction draft: players on the block, the bid log, and captain budgets.

use crate::models::participant::{Participant, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a bid.
pub type BidId = Uuid;

/// Auction lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionPhase {
    #[default]
    Active,
    Completed,
}

/// A non-captain participant being auctioned. Frozen once `is_sold` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuctionPlayer {
    pub id: UserId,
    pub nexus_nickname: String,
    pub current_bid: u32,
    pub bid_count: u32,
    pub is_sold: bool,
    /// Nickname of the winning captain.
    pub sold_to: Option<String>,
    pub sold_to_id: Option<UserId>,
    pub sold_price: Option<u32>,
    pub tier: Option<String>,
    pub main_lane: Option<String>,
    pub win_rate: Option<f64>,
    pub total_games: Option<u32>,
}

impl AuctionPlayer {
    pub fn from_participant(p: &Participant) -> Self {
        Self {
            id: p.user_id,
            nexus_nickname: p.nexus_nickname.clone(),
            current_bid: 0,
            bid_count: 0,
            is_sold: false,
            sold_to: None,
            sold_to_id: None,
            sold_price: None,
            tier: p.tier.clone(),
            main_lane: p.main_lane.clone(),
            win_rate: p.win_rate,
            total_games: p.total_games,
        }
    }
}

/// Append-only bid log entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuctionBid {
    pub id: BidId,
    pub bidder_id: UserId,
    pub player_id: UserId,
    pub bid_amount: u32,
    pub bidder_nickname: String,
    pub created_at: DateTime<Utc>,
}

/// Full auction state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Auction {
    pub phase: AuctionPhase,
    pub captains: Vec<Participant>,
    /// Pool in input order; never shrinks.
    pub players: Vec<AuctionPlayer>,
    pub bids: Vec<AuctionBid>,
    /// captain user id -> remaining budget.
    pub captain_points: HashMap<UserId, u32>,
    pub initial_budget: u32,
    /// Index into `players` of the player on the block.
    pub current_index: Option<usize>,
    /// Seconds left for the current player.
    pub time_left: u32,
}

impl Auction {
    pub fn current_player(&self) -> Option<&AuctionPlayer> {
        self.current_index.and_then(|i| self.players.get(i))
    }

    pub fn remaining_points(&self, captain_id: UserId) -> Option<u32> {
        self.captain_points.get(&captain_id).copied()
    }

    /// Highest bid amount for a player (0 if none).
    pub fn highest_bid_amount(&self, player_id: UserId) -> u32 {
        self.highest_bid(player_id).map_or(0, |b| b.bid_amount)
    }

    /// Winning bid for a player: the maximum amount, earliest in the log on ties.
    pub fn highest_bid(&self, player_id: UserId) -> Option<&AuctionBid> {
        self.bids
            .iter()
            .filter(|b| b.player_id == player_id)
            .fold(None, |best: Option<&AuctionBid>, b| match best {
                Some(top) if top.bid_amount >= b.bid_amount => Some(top),
                _ => Some(b),
            })
    }

    /// Bids for one player, in log order.
    pub fn bids_for(&self, player_id: UserId) -> impl Iterator<Item = &AuctionBid> {
        self.bids.iter().filter(move |b| b.player_id == player_id)
    }

    pub fn sold_players(&self) -> Vec<&AuctionPlayer> {
        self.players.iter().filter(|p| p.is_sold).collect()
    }
}
