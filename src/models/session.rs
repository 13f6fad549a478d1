//! FormationSession, FormationState, and FormationError.

use crate::config::FormationConfig;
use crate::models::auction::Auction;
use crate::models::bracket::{Bracket, MatchId};
use crate::models::election::{required_captain_count, CaptainElection};
use crate::models::event::FormationEvent;
use crate::models::participant::{GameInfo, Participant, UserId};
use crate::models::rps::RpsGame;
use crate::models::team::Team;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during formation operations.
#[derive(Clone, Debug, PartialEq)]
pub enum FormationError {
    /// Session is not in a state that allows this action.
    InvalidState,
    /// Not enough participants for the chosen strategy.
    NotEnoughParticipants { required: usize },
    /// A participant with this user id is already on the roster.
    DuplicateParticipant(UserId),
    /// Roster already holds `max_players`.
    RosterFull { max_players: u32 },
    /// User is not on the roster (or not in the current RPS round).
    ParticipantNotFound(UserId),
    /// Only the host may do this.
    NotHost,
    /// The action needs to know who is acting.
    ActorRequired,
    /// Roster CSV could not be parsed.
    InvalidCsv(String),
    /// "Nominate others" cannot target yourself.
    CannotNominateSelf,
    /// This voter already used their nomination of another player.
    AlreadyNominated,
    /// This voter already cast their vote.
    AlreadyVoted,
    /// Candidate was never nominated.
    CandidateNotEligible(UserId),
    /// The draft needs at least one captain.
    NoCaptains,
    /// Manual drafting has no assignment rules.
    ManualDraftUnimplemented,
    /// Bidder is not a captain in this auction.
    NotACaptain(UserId),
    /// Bid must be a positive number of points.
    InvalidBidAmount,
    /// Bid exceeds the captain's remaining points.
    InsufficientPoints { available: u32, requested: u32 },
    /// Bid must beat the current highest bid.
    BidTooLow { current_highest: u32 },
    /// This participant already chose in the current round.
    AlreadyChosen,
    MatchNotFound(MatchId),
    /// Match already has a winner (or is a bye).
    MatchAlreadyCompleted,
    /// Bracket needs at least one team.
    NoTeams,
}

impl FormationError {
    /// Action attempted at the wrong time, as opposed to a bad input.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            FormationError::InvalidState | FormationError::MatchAlreadyCompleted
        )
    }

    pub fn is_validation(&self) -> bool {
        !self.is_state_error()
    }
}

impl std::fmt::Display for FormationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormationError::InvalidState => write!(f, "Invalid state for this action"),
            FormationError::NotEnoughParticipants { required } => {
                write!(f, "Need at least {} participants", required)
            }
            FormationError::DuplicateParticipant(id) => {
                write!(f, "Participant {} is already on the roster", id)
            }
            FormationError::RosterFull { max_players } => {
                write!(f, "Roster is full ({} players)", max_players)
            }
            FormationError::ParticipantNotFound(id) => write!(f, "Participant {} not found", id),
            FormationError::NotHost => write!(f, "Only the host can do this"),
            FormationError::ActorRequired => write!(f, "Set your user id first"),
            FormationError::InvalidCsv(msg) => write!(f, "Invalid roster CSV: {}", msg),
            FormationError::CannotNominateSelf => {
                write!(f, "Use self-nomination to nominate yourself")
            }
            FormationError::AlreadyNominated => write!(f, "You already nominated someone"),
            FormationError::AlreadyVoted => write!(f, "You already voted"),
            FormationError::CandidateNotEligible(id) => {
                write!(f, "Participant {} was not nominated", id)
            }
            FormationError::NoCaptains => write!(f, "No captains were selected"),
            FormationError::ManualDraftUnimplemented => {
                write!(f, "Manual draft is not available")
            }
            FormationError::NotACaptain(id) => write!(f, "User {} is not a captain", id),
            FormationError::InvalidBidAmount => write!(f, "Bid must be a positive number"),
            FormationError::InsufficientPoints { available, requested } => write!(
                f,
                "Not enough points: {} available, {} requested",
                available, requested
            ),
            FormationError::BidTooLow { current_highest } => {
                write!(f, "Bid must be higher than {}", current_highest)
            }
            FormationError::AlreadyChosen => write!(f, "You already chose this round"),
            FormationError::MatchNotFound(_) => write!(f, "Match not found"),
            FormationError::MatchAlreadyCompleted => write!(f, "Match already has a winner"),
            FormationError::NoTeams => write!(f, "No teams to put in a bracket"),
        }
    }
}

impl std::error::Error for FormationError {}

/// How teams are formed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Random halves.
    Balanced,
    /// Halves by descending rating.
    SkillBased,
    /// Captain election followed by a draft.
    CaptainDraft,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::SkillBased => "skill-based",
            Strategy::CaptainDraft => "captain-draft",
        }
    }
}

/// How elected captains acquire players.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DraftMethod {
    Manual,
    Auction,
    RockPaperScissors,
}

/// Unique identifier for a formation session.
pub type SessionId = Uuid;

/// Current phase of the formation session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationState {
    /// Roster editable; waiting for a strategy.
    #[default]
    StrategySelection,
    Nomination,
    Voting,
    /// Captains shown; moves on by itself after the results delay.
    ElectionResults,
    DraftMethodSelection,
    Auction,
    RockPaperScissors,
    Bracket,
    Completed,
}

/// What a finished session produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationOutcome {
    pub strategy: Strategy,
    /// Empty when the session ended with rock-paper-scissors.
    pub teams: Vec<Team>,
    pub tournament_winner: Option<Team>,
    pub rps_winner: Option<Participant>,
}

/// Full formation state for one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormationSession {
    pub id: SessionId,
    pub game: GameInfo,
    pub config: FormationConfig,
    pub participants: Vec<Participant>,
    pub state: FormationState,
    pub strategy: Option<Strategy>,
    pub draft_method: Option<DraftMethod>,
    pub election: Option<CaptainElection>,
    pub captains: Vec<Participant>,
    pub auction: Option<Auction>,
    pub rps: Option<RpsGame>,
    pub teams: Vec<Team>,
    pub bracket: Option<Bracket>,
    pub outcome: Option<FormationOutcome>,
    /// Events not yet handed to a broadcaster.
    #[serde(skip)]
    pub(crate) events: Vec<FormationEvent>,
}

impl FormationSession {
    /// Create a session in StrategySelection with the default config.
    pub fn new(game: GameInfo, participants: Vec<Participant>) -> Self {
        Self::with_config(game, participants, FormationConfig::default())
    }

    pub fn with_config(game: GameInfo, participants: Vec<Participant>, config: FormationConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            game,
            config,
            participants,
            state: FormationState::StrategySelection,
            strategy: None,
            draft_method: None,
            election: None,
            captains: Vec::new(),
            auction: None,
            rps: None,
            teams: Vec::new(),
            bracket: None,
            outcome: None,
            events: Vec::new(),
        }
    }

    pub fn is_host(&self, user_id: UserId) -> bool {
        self.game.created_by == user_id
    }

    pub fn participant(&self, user_id: UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    /// Captains needed for the current roster.
    pub fn required_captains(&self) -> usize {
        required_captain_count(self.participants.len())
    }

    /// Add a participant (StrategySelection only). User ids must be unique.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), FormationError> {
        if self.state != FormationState::StrategySelection {
            return Err(FormationError::InvalidState);
        }
        if self.participant(participant.user_id).is_some() {
            return Err(FormationError::DuplicateParticipant(participant.user_id));
        }
        if self.game.max_players > 0 && self.participants.len() >= self.game.max_players as usize {
            return Err(FormationError::RosterFull {
                max_players: self.game.max_players,
            });
        }
        self.participants.push(participant);
        Ok(())
    }

    /// Remove a participant by user id (StrategySelection only).
    pub fn remove_participant(&mut self, user_id: UserId) -> Result<(), FormationError> {
        if self.state != FormationState::StrategySelection {
            return Err(FormationError::InvalidState);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| p.user_id == user_id)
            .ok_or(FormationError::ParticipantNotFound(user_id))?;
        self.participants.remove(idx);
        Ok(())
    }

    /// Add every participant from a roster CSV. Nothing is added if any row is rejected.
    pub fn import_participants_csv<R: std::io::Read>(&mut self, reader: R) -> Result<usize, FormationError> {
        if self.state != FormationState::StrategySelection {
            return Err(FormationError::InvalidState);
        }
        let rows = Participant::parse_csv(reader).map_err(|e| FormationError::InvalidCsv(e.to_string()))?;
        let snapshot = self.participants.clone();
        let count = rows.len();
        for row in rows {
            if let Err(e) = self.add_participant(row) {
                self.participants = snapshot;
                return Err(e);
            }
        }
        Ok(count)
    }

    /// Restart formation: back to StrategySelection with the same roster.
    pub fn restart(&mut self) -> Result<(), FormationError> {
        if self.state == FormationState::StrategySelection {
            return Err(FormationError::InvalidState);
        }
        let participants = std::mem::take(&mut self.participants);
        let events = std::mem::take(&mut self.events);
        let from = self.state;
        *self = Self {
            id: self.id,
            events,
            ..Self::with_config(self.game.clone(), participants, self.config)
        };
        self.events.push(FormationEvent::PhaseChanged {
            from,
            to: FormationState::StrategySelection,
        });
        Ok(())
    }

    /// Move to `to`, recording a PhaseChanged event.
    pub(crate) fn transition(&mut self, to: FormationState) {
        let from = self.state;
        if from == to {
            return;
        }
        log::info!("Session {}: {:?} -> {:?}", self.id, from, to);
        self.state = to;
        self.events.push(FormationEvent::PhaseChanged { from, to });
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<FormationEvent> {
        std::mem::take(&mut self.events)
    }
}
