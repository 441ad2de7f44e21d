//! Match result application: winner propagation and cascade invalidation.

use crate::models::{Bracket, BracketError, Round, Side};

/// Declare the winner of one match and advance them into the next round.
///
/// The target match must have both slots filled (byes resolve at build time
/// and never take a manual result). Re-declaring the same winner is a no-op.
/// Changing an already-decided match is allowed: the old winner's placement
/// in the next round is replaced, and any downstream results that depended
/// on it are cleared recursively, so no round ever shows a winner its
/// feeding round contradicts.
///
/// If a propagated slot contradicts a recorded winner (the tree was edited
/// behind the applier's back), this fails with `InconsistentState` before
/// mutating anything.
pub fn apply_match_result(
    bracket: &mut Bracket,
    round_index: usize,
    match_index: usize,
    side: Side,
) -> Result<(), BracketError> {
    let m = bracket
        .rounds
        .get(round_index)
        .and_then(|r| r.get(match_index))
        .ok_or(BracketError::OutOfRange)?;
    if m.p1.is_none() || m.p2.is_none() {
        return Err(BracketError::MatchNotReady);
    }
    let winner = m.slot(side).cloned().ok_or(BracketError::MatchNotReady)?;
    if m.winner.as_ref() == Some(&winner) {
        return Ok(());
    }

    let next = bracket.next_slot(round_index, match_index);

    // Walk the downstream chain read-only first: a detected inconsistency
    // must leave the bracket exactly as it was.
    if let Some((nr, nm, nside)) = next {
        let occupant = bracket.rounds[nr][nm].slot(nside);
        if occupant.is_some() && occupant != Some(&winner) {
            check_downstream(&bracket.rounds, nr, nm)?;
        }
    }

    bracket.rounds[round_index][match_index].winner = Some(winner.clone());

    if let Some((nr, nm, nside)) = next {
        let occupant = bracket.rounds[nr][nm].slot(nside).cloned();
        if occupant.as_ref() != Some(&winner) {
            // The pairing in the next match changed; any result recorded
            // there (and further down) is stale.
            if occupant.is_some() {
                clear_downstream(&mut bracket.rounds, nr, nm);
            }
            *bracket.rounds[nr][nm].slot_mut(nside) = Some(winner);
        }
    }

    Ok(())
}

/// Verify that every decided match from (r, m) down has its winner sitting
/// in the expected next-round slot. A mismatch means some other mutator
/// bypassed the applier.
fn check_downstream(rounds: &[Round], r: usize, m: usize) -> Result<(), BracketError> {
    let w = match &rounds[r][m].winner {
        Some(w) => w,
        None => return Ok(()),
    };
    if r + 1 >= rounds.len() {
        return Ok(());
    }
    let nm = m / 2;
    let side = if m % 2 == 0 { Side::P1 } else { Side::P2 };
    if rounds[r + 1][nm].slot(side) != Some(w) {
        return Err(BracketError::InconsistentState);
    }
    check_downstream(rounds, r + 1, nm)
}

/// Clear the recorded winner of match (r, m), if any, and remove its
/// propagated placement from each later round in turn. The chain has
/// already been validated by `check_downstream`.
fn clear_downstream(rounds: &mut [Round], r: usize, m: usize) {
    let w = match rounds[r][m].winner.take() {
        Some(w) => w,
        None => return,
    };
    if r + 1 >= rounds.len() {
        return;
    }
    let nm = m / 2;
    let side = if m % 2 == 0 { Side::P1 } else { Side::P2 };
    if rounds[r + 1][nm].slot(side) == Some(&w) {
        clear_downstream(rounds, r + 1, nm);
        *rounds[r + 1][nm].slot_mut(side) = None;
    }
}
