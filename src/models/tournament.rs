//! Tournament and its registration/lifecycle state.

use crate::models::bracket::{Bracket, BracketError};
use crate::models::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Bracket core error (bad input, indices, winner side, ...).
    Bracket(BracketError),
    /// Registration is closed; no sign-ups or withdrawals accepted.
    RegistrationClosed,
    /// The user or one of the team members is already registered.
    AlreadyRegistered,
    /// Participant not found in this tournament.
    ParticipantNotFound(ParticipantId),
    /// A participant with this label already exists (labels are unique, case-insensitive).
    DuplicateLabel,
    /// Tournament is not in a phase that allows this action.
    InvalidState,
    /// No bracket has been generated yet.
    NoBracket,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::Bracket(e) => write!(f, "{}", e),
            TournamentError::RegistrationClosed => write!(f, "Registration is closed"),
            TournamentError::AlreadyRegistered => write!(f, "Already registered"),
            TournamentError::ParticipantNotFound(_) => write!(f, "Participant not found"),
            TournamentError::DuplicateLabel => {
                write!(f, "A participant with this name already exists")
            }
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::NoBracket => write!(f, "No bracket generated yet"),
        }
    }
}

impl From<BracketError> for TournamentError {
    fn from(e: BracketError) -> Self {
        TournamentError::Bracket(e)
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentPhase {
    /// Accepting sign-ups and withdrawals; bracket hidden from non-admins.
    #[default]
    RegistrationOpen,
    /// Sign-ups closed; bracket may be generated.
    RegistrationClosed,
    /// Bracket generated, results being recorded.
    InProgress,
    /// Final match decided.
    Completed,
}

/// Per-participant stat line for one match (admin-recorded, free-form keys).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub participant_id: ParticipantId,
    pub values: HashMap<String, f64>,
}

/// Full tournament state: metadata, participants, bracket, per-match stats.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub title: String,
    /// Game or discipline being played (free text).
    #[serde(default)]
    pub game: String,
    pub created_at: DateTime<Utc>,
    pub phase: TournamentPhase,
    /// Registered entrants, in sign-up order (determines seeding).
    pub participants: Vec<Participant>,
    /// None until generated; regeneration replaces it wholesale.
    pub bracket: Option<Bracket>,
    /// Player stat lines keyed by "round:match".
    #[serde(default)]
    pub match_stats: HashMap<String, Vec<StatLine>>,
}

impl Tournament {
    /// Create a new tournament with open registration and no participants.
    pub fn new(title: impl Into<String>, game: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            game: game.into(),
            created_at: Utc::now(),
            phase: TournamentPhase::RegistrationOpen,
            participants: Vec::new(),
            bracket: None,
            match_stats: HashMap::new(),
        }
    }

    fn check_label_free(&self, label: &str) -> Result<(), TournamentError> {
        if label.trim().is_empty() {
            return Err(TournamentError::InvalidState);
        }
        let taken = self
            .participants
            .iter()
            .any(|p| p.label.eq_ignore_ascii_case(label.trim()));
        if taken {
            return Err(TournamentError::DuplicateLabel);
        }
        Ok(())
    }

    /// Register a solo entrant (registration must be open; user not already in).
    pub fn register_solo(
        &mut self,
        user_id: Uuid,
        label: impl Into<String>,
    ) -> Result<(), TournamentError> {
        if self.phase != TournamentPhase::RegistrationOpen {
            return Err(TournamentError::RegistrationClosed);
        }
        if self.participants.iter().any(|p| p.includes_user(user_id)) {
            return Err(TournamentError::AlreadyRegistered);
        }
        let label = label.into();
        self.check_label_free(&label)?;
        self.participants.push(Participant::solo(user_id, label.trim()));
        Ok(())
    }

    /// Register a team. Every member must be unregistered.
    pub fn register_team(
        &mut self,
        label: impl Into<String>,
        members: Vec<Uuid>,
    ) -> Result<ParticipantId, TournamentError> {
        if self.phase != TournamentPhase::RegistrationOpen {
            return Err(TournamentError::RegistrationClosed);
        }
        for &m in &members {
            if self.participants.iter().any(|p| p.includes_user(m)) {
                return Err(TournamentError::AlreadyRegistered);
            }
        }
        let label = label.into();
        self.check_label_free(&label)?;
        let team = Participant::team(label.trim(), members);
        let id = team.id;
        self.participants.push(team);
        Ok(id)
    }

    /// Withdraw a solo entrant (registration must still be open).
    pub fn unregister_solo(&mut self, user_id: Uuid) -> Result<(), TournamentError> {
        if self.phase != TournamentPhase::RegistrationOpen {
            return Err(TournamentError::RegistrationClosed);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == user_id && p.members.is_empty())
            .ok_or(TournamentError::ParticipantNotFound(user_id))?;
        self.participants.remove(idx);
        Ok(())
    }

    /// Withdraw a team by participant id (registration must still be open).
    pub fn unregister_team(&mut self, team_id: ParticipantId) -> Result<(), TournamentError> {
        if self.phase != TournamentPhase::RegistrationOpen {
            return Err(TournamentError::RegistrationClosed);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == team_id && !p.members.is_empty())
            .ok_or(TournamentError::ParticipantNotFound(team_id))?;
        self.participants.remove(idx);
        Ok(())
    }

    /// Admin removal of any participant, solo or team, while registration is open.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<(), TournamentError> {
        if self.phase != TournamentPhase::RegistrationOpen {
            return Err(TournamentError::RegistrationClosed);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(TournamentError::ParticipantNotFound(id))?;
        self.participants.remove(idx);
        Ok(())
    }

    /// Open or close registration. Only meaningful before the bracket exists;
    /// reopening after generation is rejected.
    pub fn toggle_registration(&mut self) -> Result<(), TournamentError> {
        match self.phase {
            TournamentPhase::RegistrationOpen => {
                self.phase = TournamentPhase::RegistrationClosed;
                Ok(())
            }
            TournamentPhase::RegistrationClosed => {
                self.phase = TournamentPhase::RegistrationOpen;
                Ok(())
            }
            _ => Err(TournamentError::InvalidState),
        }
    }

    /// Whether the given user is registered (solo or as a team member).
    pub fn is_registered(&self, user_id: Uuid) -> bool {
        self.participants.iter().any(|p| p.includes_user(user_id))
    }

    /// Stat-line storage key for a match position.
    pub fn stats_key(round_index: usize, match_index: usize) -> String {
        format!("{}:{}", round_index, match_index)
    }
}
