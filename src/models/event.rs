//! Events emitted by the formation engines for live multi-client sync.

use crate::models::participant::{Participant, UserId};
use crate::models::rps::{RoundOutcome, RpsHand};
use crate::models::session::FormationState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FormationEvent {
    PhaseChanged {
        from: FormationState,
        to: FormationState,
    },
    BidPlaced {
        player_id: UserId,
        bidder_id: UserId,
        bidder_nickname: String,
        amount: u32,
        time_left: u32,
    },
    PlayerSold {
        player_id: UserId,
        captain_id: UserId,
        captain_nickname: String,
        price: u32,
    },
    PlayerUnsold {
        player_id: UserId,
    },
    NextPlayer {
        player_id: UserId,
        nexus_nickname: String,
    },
    AuctionCompleted {
        sold: usize,
        unsold: usize,
    },
    RpsChoiceMade {
        user_id: UserId,
        round: u32,
    },
    RpsRoundResult {
        round: u32,
        outcome: RoundOutcome,
        choices: Vec<(UserId, RpsHand)>,
        advancing: Vec<UserId>,
    },
    RpsGameResult {
        winner: Participant,
    },
}
