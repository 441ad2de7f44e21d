//! Participant (solo entrant or team) and caller Role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in bracket slots and lookups).
pub type ParticipantId = Uuid;

/// Role of the caller, as asserted by the auth layer in front of the API.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

/// An entrant in a tournament: a solo player or a team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name shown in the bracket.
    pub label: String,
    /// Member user ids; empty for solo entrants.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Uuid>,
}

impl Participant {
    /// Solo entrant: the participant id doubles as the user id.
    pub fn solo(user_id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id: user_id,
            label: label.into(),
            members: Vec::new(),
        }
    }

    /// Team entrant with a fresh id and the given member user ids.
    pub fn team(label: impl Into<String>, members: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            members,
        }
    }

    /// Whether the given user is this participant (solo) or one of its members (team).
    pub fn includes_user(&self, user_id: Uuid) -> bool {
        self.id == user_id || self.members.contains(&user_id)
    }
}
