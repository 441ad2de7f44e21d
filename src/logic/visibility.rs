//! Bracket visibility gate: who may view the bracket, by phase and role.

use crate::models::{Role, TournamentPhase};

/// Admins always see the bracket; everyone else only once registration has
/// closed (open sign-up keeps the draw hidden).
pub fn bracket_visible(phase: TournamentPhase, role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::Member => phase != TournamentPhase::RegistrationOpen,
    }
}
