//! Single-elimination bracket tree: rounds, matches, slots, winner side.

use crate::models::participant::Participant;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Errors from bracket construction and result application.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Empty or otherwise unusable participant list.
    InvalidInput,
    /// Round or match index out of range.
    OutOfRange,
    /// Target match has an empty slot (bye or placeholder); no winner can be declared.
    MatchNotReady,
    /// Winner side is neither "p1" nor "p2".
    InvalidWinnerSide,
    /// A propagated slot contradicts the recorded upstream winner.
    InconsistentState,
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InvalidInput => write!(f, "Participant list is empty or invalid"),
            BracketError::OutOfRange => write!(f, "Round or match index out of range"),
            BracketError::MatchNotReady => {
                write!(f, "Match is not ready: one or both slots are empty")
            }
            BracketError::InvalidWinnerSide => write!(f, "Winner side must be \"p1\" or \"p2\""),
            BracketError::InconsistentState => {
                write!(f, "Bracket state is inconsistent with recorded results")
            }
        }
    }
}

/// Which slot of a match the declared winner occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    P1,
    P2,
}

impl FromStr for Side {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p1" => Ok(Side::P1),
            "p2" => Ok(Side::P2),
            _ => Err(BracketError::InvalidWinnerSide),
        }
    }
}

/// One match in the bracket. `None` slots are byes in round 0 and
/// placeholders (pending earlier results) in later rounds.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub p1: Option<Participant>,
    pub p2: Option<Participant>,
    /// Once set, always equal to p1 or p2.
    pub winner: Option<Participant>,
}

impl BracketMatch {
    /// The participant in the given slot, if any.
    pub fn slot(&self, side: Side) -> Option<&Participant> {
        match side {
            Side::P1 => self.p1.as_ref(),
            Side::P2 => self.p2.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Option<Participant> {
        match side {
            Side::P1 => &mut self.p1,
            Side::P2 => &mut self.p2,
        }
    }

    /// A bye match: exactly one slot filled in round 0.
    pub fn is_bye(&self) -> bool {
        self.p1.is_some() != self.p2.is_some()
    }
}

/// One round: matches in bracket order. Round 0 is the first round.
pub type Round = Vec<BracketMatch>;

/// The whole tree. Round i+1 has ceil(|round i| / 2) matches; the winner of
/// match m in round i feeds slot m/2 of round i+1, side p1 when m is even.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: Vec<Round>,
}

impl Bracket {
    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Winner of the final match, once decided.
    pub fn champion(&self) -> Option<&Participant> {
        self.rounds
            .last()
            .and_then(|r| r.first())
            .and_then(|m| m.winner.as_ref())
    }

    /// Next-round coordinates for the winner of match m in round r,
    /// or None when r is the final round.
    pub fn next_slot(&self, round_index: usize, match_index: usize) -> Option<(usize, usize, Side)> {
        if round_index + 1 >= self.rounds.len() {
            return None;
        }
        let side = if match_index % 2 == 0 { Side::P1 } else { Side::P2 };
        Some((round_index + 1, match_index / 2, side))
    }
}
