//! Data structures for team formation: roster, election, auction, RPS, bracket, session.

mod auction;
mod bracket;
mod election;
mod event;
mod participant;
mod rps;
mod session;
mod team;

pub use auction::{Auction, AuctionBid, AuctionPhase, AuctionPlayer, BidId};
pub use bracket::{Bracket, BracketMatch, MatchId, MatchStatus, Side, BYE_SCORE};
pub use election::{required_captain_count, CaptainCandidate, CaptainElection, ElectionPhase};
pub use event::FormationEvent;
pub use participant::{GameInfo, Participant, UserId, DEFAULT_RATING};
pub use rps::{RoundOutcome, RpsChoice, RpsGame, RpsHand, RpsPhase, RpsRoundResult};
pub use session::{
    DraftMethod, FormationError, FormationOutcome, FormationSession, FormationState, SessionId,
    Strategy,
};
pub use team::{Team, TeamId};
