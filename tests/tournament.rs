//! Integration tests for tournament lifecycle: registration, generation, results.

use std::collections::HashMap;
use tournament_bracket_web::{
    bracket_visible, generate_bracket, match_stats, record_match_stats, set_match_result,
    BracketError, Role, Side, StatLine, Tournament, TournamentError, TournamentPhase,
};
use uuid::Uuid;

fn tournament_with_entrants(n: usize) -> Tournament {
    let mut t = Tournament::new("Spring Cup", "darts");
    for i in 0..n {
        t.register_solo(Uuid::new_v4(), format!("P{i}")).unwrap();
    }
    t
}

fn ready_tournament(n: usize) -> Tournament {
    let mut t = tournament_with_entrants(n);
    t.toggle_registration().unwrap();
    generate_bracket(&mut t).unwrap();
    t
}

#[test]
fn solo_registration_rejects_duplicates() {
    let mut t = Tournament::new("Cup", "");
    let alice = Uuid::new_v4();
    t.register_solo(alice, "Alice").unwrap();
    assert_eq!(
        t.register_solo(alice, "Alice again"),
        Err(TournamentError::AlreadyRegistered)
    );
    assert_eq!(
        t.register_solo(Uuid::new_v4(), "alice"),
        Err(TournamentError::DuplicateLabel)
    );
}

#[test]
fn team_members_cannot_double_register() {
    let mut t = Tournament::new("Cup", "");
    let bob = Uuid::new_v4();
    t.register_team("Team Red", vec![bob, Uuid::new_v4()]).unwrap();
    assert_eq!(
        t.register_solo(bob, "Bob"),
        Err(TournamentError::AlreadyRegistered)
    );
    assert!(t.is_registered(bob));
}

#[test]
fn unregister_before_close_only() {
    let mut t = Tournament::new("Cup", "");
    let alice = Uuid::new_v4();
    t.register_solo(alice, "Alice").unwrap();
    let team_id = t.register_team("Team Red", vec![Uuid::new_v4()]).unwrap();

    t.toggle_registration().unwrap();
    assert_eq!(
        t.unregister_solo(alice),
        Err(TournamentError::RegistrationClosed)
    );

    t.toggle_registration().unwrap(); // reopen
    t.unregister_solo(alice).unwrap();
    t.unregister_team(team_id).unwrap();
    assert!(t.participants.is_empty());
}

#[test]
fn unregister_wrong_kind_is_not_found() {
    let mut t = Tournament::new("Cup", "");
    let alice = Uuid::new_v4();
    t.register_solo(alice, "Alice").unwrap();
    // Alice is a solo entrant, not a team.
    assert_eq!(
        t.unregister_team(alice),
        Err(TournamentError::ParticipantNotFound(alice))
    );
}

#[test]
fn generation_requires_closed_registration() {
    let mut t = tournament_with_entrants(4);
    assert_eq!(generate_bracket(&mut t), Err(TournamentError::InvalidState));
    t.toggle_registration().unwrap();
    generate_bracket(&mut t).unwrap();
    assert_eq!(t.phase, TournamentPhase::InProgress);
    assert_eq!(t.bracket.as_ref().unwrap().num_rounds(), 2);
}

#[test]
fn generation_with_no_participants_is_invalid_input() {
    let mut t = Tournament::new("Cup", "");
    t.toggle_registration().unwrap();
    assert_eq!(
        generate_bracket(&mut t),
        Err(TournamentError::Bracket(BracketError::InvalidInput))
    );
}

#[test]
fn registration_cannot_reopen_after_generation() {
    let mut t = ready_tournament(4);
    assert_eq!(t.toggle_registration(), Err(TournamentError::InvalidState));
    assert_eq!(
        t.register_solo(Uuid::new_v4(), "Late"),
        Err(TournamentError::RegistrationClosed)
    );
}

#[test]
fn final_result_completes_the_tournament() {
    let mut t = ready_tournament(4);
    set_match_result(&mut t, 0, 0, Side::P1).unwrap();
    set_match_result(&mut t, 0, 1, Side::P1).unwrap();
    assert_eq!(t.phase, TournamentPhase::InProgress);
    set_match_result(&mut t, 1, 0, Side::P2).unwrap();
    assert_eq!(t.phase, TournamentPhase::Completed);
    assert!(t.bracket.as_ref().unwrap().champion().is_some());
}

#[test]
fn overwriting_an_upstream_result_reopens_a_completed_tournament() {
    let mut t = ready_tournament(4);
    set_match_result(&mut t, 0, 0, Side::P1).unwrap();
    set_match_result(&mut t, 0, 1, Side::P1).unwrap();
    set_match_result(&mut t, 1, 0, Side::P1).unwrap();
    assert_eq!(t.phase, TournamentPhase::Completed);

    set_match_result(&mut t, 0, 0, Side::P2).unwrap();
    assert_eq!(t.phase, TournamentPhase::InProgress);
    assert!(t.bracket.as_ref().unwrap().champion().is_none());
}

#[test]
fn results_require_a_generated_bracket() {
    let mut t = tournament_with_entrants(4);
    assert_eq!(
        set_match_result(&mut t, 0, 0, Side::P1),
        Err(TournamentError::InvalidState)
    );
}

#[test]
fn regeneration_replaces_results_and_stats() {
    let mut t = ready_tournament(4);
    set_match_result(&mut t, 0, 0, Side::P1).unwrap();
    let participant_id = t.participants[0].id;
    record_match_stats(
        &mut t,
        0,
        0,
        vec![StatLine {
            participant_id,
            values: HashMap::from([("legs".to_string(), 3.0)]),
        }],
    )
    .unwrap();

    generate_bracket(&mut t).unwrap();
    let b = t.bracket.as_ref().unwrap();
    assert!(b.rounds[0].iter().all(|m| m.winner.is_none()));
    assert!(t.match_stats.is_empty());
    assert_eq!(t.phase, TournamentPhase::InProgress);
}

#[test]
fn match_stats_validate_indices() {
    let mut t = ready_tournament(4);
    assert_eq!(
        record_match_stats(&mut t, 0, 99, Vec::new()),
        Err(TournamentError::Bracket(BracketError::OutOfRange))
    );
    assert!(match_stats(&t, 0, 1).unwrap().is_empty());

    let line = StatLine {
        participant_id: t.participants[2].id,
        values: HashMap::from([("180s".to_string(), 2.0)]),
    };
    record_match_stats(&mut t, 0, 1, vec![line.clone()]).unwrap();
    assert_eq!(match_stats(&t, 0, 1).unwrap(), std::slice::from_ref(&line));
}

#[test]
fn visibility_gate_truth_table() {
    use TournamentPhase::*;
    for phase in [RegistrationOpen, RegistrationClosed, InProgress, Completed] {
        assert!(bracket_visible(phase, Role::Admin));
    }
    assert!(!bracket_visible(RegistrationOpen, Role::Member));
    assert!(bracket_visible(RegistrationClosed, Role::Member));
    assert!(bracket_visible(InProgress, Role::Member));
    assert!(bracket_visible(Completed, Role::Member));
}

#[test]
fn tournament_serializes_losslessly() {
    let mut t = ready_tournament(5);
    set_match_result(&mut t, 0, 3, Side::P2).unwrap();
    let json = serde_json::to_string(&t).unwrap();
    let back: Tournament = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, t.id);
    assert_eq!(back.phase, t.phase);
    assert_eq!(back.participants, t.participants);
    assert_eq!(back.bracket, t.bracket);
}
