//! Team-formation business logic: strategy, election, auction, RPS, bracket, orchestration.

pub mod auction;
mod bracket;
mod election;
pub mod rps;
mod session;
mod strategy;

pub use auction::{assemble_teams, place_bid};
pub use bracket::{generate_bracket, pick_match_winner, set_match_winner, start_bracket_match, start_match};
pub use election::{end_nomination, end_voting, nominate, pick_random_captains, self_nominate, vote};
pub use rps::{make_choice, resolve_outcome};
pub use session::{apply_action, select_draft_method, tick, Action};
pub use strategy::{select_strategy, split_balanced, split_by_skill, MIN_PARTICIPANTS};
