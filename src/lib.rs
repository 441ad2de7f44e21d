//! Tournament bracket web app: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    apply_match_result, bracket_visible, build_bracket, generate_bracket, match_stats,
    record_match_stats, set_match_result,
};
pub use models::{
    Bracket, BracketError, BracketMatch, Participant, ParticipantId, Role, Round, Side, StatLine,
    Tournament, TournamentError, TournamentId, TournamentPhase,
};
