//! Custom-game (내전) team formation: library with models and business logic.

pub mod broadcast;
pub mod config;
pub mod logic;
pub mod models;

pub use config::FormationConfig;
pub use logic::{
    apply_action, assemble_teams, end_nomination, end_voting, generate_bracket, make_choice,
    nominate, pick_match_winner, pick_random_captains, place_bid, resolve_outcome,
    select_draft_method, select_strategy, self_nominate, set_match_winner, split_balanced,
    split_by_skill, start_bracket_match, start_match, tick, vote, Action,
};
pub use models::{
    required_captain_count, Auction, AuctionBid, AuctionPhase, AuctionPlayer, Bracket,
    BracketMatch, CaptainCandidate, CaptainElection, DraftMethod, ElectionPhase, FormationError,
    FormationEvent, FormationOutcome, FormationSession, FormationState, GameInfo, MatchId,
    MatchStatus, Participant, RoundOutcome, RpsChoice, RpsGame, RpsHand, RpsPhase,
    RpsRoundResult, SessionId, Side, Strategy, Team, TeamId, UserId,
};
