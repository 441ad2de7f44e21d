//! Data structures for the tournament app: participants, brackets, tournament state.

mod bracket;
mod participant;
mod tournament;

pub use bracket::{Bracket, BracketError, BracketMatch, Round, Side};
pub use participant::{Participant, ParticipantId, Role};
pub use tournament::{StatLine, Tournament, TournamentError, TournamentId, TournamentPhase};
