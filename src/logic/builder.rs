//! Bracket construction: seeding, byes, and up-front round materialization.

use crate::models::{Bracket, BracketError, BracketMatch, Participant};

/// Build a complete single-elimination bracket from the participant list.
///
/// Seeding is sequential in list order: the bracket size is the next power of
/// two at or above the participant count, the deficit becomes byes awarded to
/// the earliest-listed participants, and the rest pair off in order. Bye
/// matches resolve immediately and their winners are placed into round 1
/// during construction. Deterministic for identical input.
///
/// A single participant yields an empty bracket (no matches to play).
pub fn build_bracket(participants: &[Participant]) -> Result<Bracket, BracketError> {
    if participants.is_empty() {
        return Err(BracketError::InvalidInput);
    }
    let n = participants.len();
    if n == 1 {
        return Ok(Bracket::default());
    }

    let size = n.next_power_of_two();
    let byes = size - n;
    let num_rounds = size.trailing_zeros() as usize;

    // All rounds up front; later rounds start as placeholders.
    let mut rounds = Vec::with_capacity(num_rounds);
    let mut matches_in_round = size / 2;
    for _ in 0..num_rounds {
        rounds.push(vec![BracketMatch::default(); matches_in_round]);
        matches_in_round /= 2;
    }

    // Round 0: the first `byes` seeds get a bye match each, the rest pair sequentially.
    for (j, m) in rounds[0].iter_mut().enumerate() {
        if j < byes {
            m.p1 = Some(participants[j].clone());
        } else {
            let base = byes + 2 * (j - byes);
            m.p1 = Some(participants[base].clone());
            m.p2 = Some(participants[base + 1].clone());
        }
    }

    let mut bracket = Bracket { rounds };

    // Byes auto-resolve: no manual result step, winner advances now.
    for j in 0..byes {
        let winner = bracket.rounds[0][j].p1.clone();
        bracket.rounds[0][j].winner = winner.clone();
        if let Some((nr, nm, side)) = bracket.next_slot(0, j) {
            *bracket.rounds[nr][nm].slot_mut(side) = winner;
        }
    }

    Ok(bracket)
}
