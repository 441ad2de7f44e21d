//! Tournament-level operations: bracket generation, result recording, match stats.

use crate::logic::applier::apply_match_result;
use crate::logic::builder::build_bracket;
use crate::models::{
    BracketError, Side, StatLine, Tournament, TournamentError, TournamentPhase,
};

/// Generate (or regenerate) the bracket from the current participant list.
///
/// Registration must be closed first. Regeneration replaces the whole tree:
/// prior results and recorded match stats are gone, and the phase returns to
/// InProgress.
pub fn generate_bracket(tournament: &mut Tournament) -> Result<(), TournamentError> {
    use TournamentPhase::*;
    if !matches!(tournament.phase, RegistrationClosed | InProgress | Completed) {
        return Err(TournamentError::InvalidState);
    }
    let bracket = build_bracket(&tournament.participants)?;
    tournament.bracket = Some(bracket);
    tournament.match_stats.clear();
    tournament.phase = InProgress;
    Ok(())
}

/// Record the winner of one match and propagate. Completes the tournament
/// when the final is decided; an overwrite cascade that un-decides the final
/// moves it back to InProgress.
pub fn set_match_result(
    tournament: &mut Tournament,
    round_index: usize,
    match_index: usize,
    side: Side,
) -> Result<(), TournamentError> {
    use TournamentPhase::*;
    if !matches!(tournament.phase, InProgress | Completed) {
        return Err(TournamentError::InvalidState);
    }
    let bracket = tournament.bracket.as_mut().ok_or(TournamentError::NoBracket)?;
    apply_match_result(bracket, round_index, match_index, side)?;
    tournament.phase = if bracket.champion().is_some() {
        Completed
    } else {
        InProgress
    };
    Ok(())
}

/// Store admin-recorded stat lines for one match (replaces any previous lines).
pub fn record_match_stats(
    tournament: &mut Tournament,
    round_index: usize,
    match_index: usize,
    lines: Vec<StatLine>,
) -> Result<(), TournamentError> {
    check_match_exists(tournament, round_index, match_index)?;
    tournament
        .match_stats
        .insert(Tournament::stats_key(round_index, match_index), lines);
    Ok(())
}

/// Stat lines recorded for one match (empty slice when none yet).
pub fn match_stats(
    tournament: &Tournament,
    round_index: usize,
    match_index: usize,
) -> Result<&[StatLine], TournamentError> {
    check_match_exists(tournament, round_index, match_index)?;
    Ok(tournament
        .match_stats
        .get(&Tournament::stats_key(round_index, match_index))
        .map(Vec::as_slice)
        .unwrap_or(&[]))
}

fn check_match_exists(
    tournament: &Tournament,
    round_index: usize,
    match_index: usize,
) -> Result<(), TournamentError> {
    let bracket = tournament.bracket.as_ref().ok_or(TournamentError::NoBracket)?;
    let in_range = bracket
        .rounds
        .get(round_index)
        .is_some_and(|r| match_index < r.len());
    if in_range {
        Ok(())
    } else {
        Err(BracketError::OutOfRange.into())
    }
}
