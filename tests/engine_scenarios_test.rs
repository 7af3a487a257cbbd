// Scenario tests for the laundry state engine
// Each test starts from a fresh seeded engine

use laundry_tracker::{
    EngineError, EngineSettings, LaundryRoom, LaundryState, Machine, MachineKind, MachineStatus,
};

fn tick_n(state: &mut LaundryState, n: u32) {
    for _ in 0..n {
        state.tick();
    }
}

fn single_machine(machine: Machine) -> LaundryState {
    LaundryState::with_rooms(
        vec![LaundryRoom::new("testRoom", "Test Room", vec![machine])],
        EngineSettings::default(),
    )
    .unwrap()
}

#[test]
fn test_washer_cycle_runs_to_completion() {
    let mut state = LaundryState::default();

    let machine = state.start_cycle(1).unwrap();
    assert_eq!(machine.status, MachineStatus::InUse);
    assert_eq!(machine.timer, 1800);

    tick_n(&mut state, 1500);
    let machine = state.find_machine(1).unwrap();
    assert_eq!(machine.timer, 300);
    assert_eq!(machine.status, MachineStatus::Finishing);

    tick_n(&mut state, 300);
    let machine = state.find_machine(1).unwrap();
    assert_eq!(machine.timer, 0);
    assert_eq!(machine.status, MachineStatus::Available);
}

#[test]
fn test_finishing_dryer_becomes_available() {
    let mut state = LaundryState::default();
    let dryer = state.find_machine(7).unwrap();
    assert_eq!(dryer.kind, MachineKind::Dryer);
    assert_eq!(dryer.status, MachineStatus::Finishing);
    assert_eq!(dryer.timer, 240);

    tick_n(&mut state, 239);
    assert_eq!(state.find_machine(7).unwrap().status, MachineStatus::Finishing);
    assert_eq!(state.find_machine(7).unwrap().timer, 1);

    state.tick();
    let dryer = state.find_machine(7).unwrap();
    assert_eq!(dryer.timer, 0);
    assert_eq!(dryer.status, MachineStatus::Available);
}

#[test]
fn test_broken_machine_cannot_start() {
    let mut state = LaundryState::default();
    let before = state.snapshot();

    let err = state.start_cycle(3).unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidPrecondition {
            machine_id: 3,
            status: MachineStatus::Broken,
        }
    );
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_start_then_report_leaking_washer() {
    let mut state = LaundryState::default();

    let machine = state.start_cycle(1).unwrap();
    assert_eq!((machine.status, machine.timer), (MachineStatus::InUse, 1800));

    let machine = state.report_fault(1, "leaking").unwrap();
    assert_eq!((machine.status, machine.timer), (MachineStatus::Broken, 0));
    assert_eq!(state.find_machine(1).unwrap().status, MachineStatus::Broken);
}

#[test]
fn test_unknown_machine_is_not_found_without_mutation() {
    let mut state = LaundryState::default();
    let before = state.snapshot();

    assert_eq!(state.start_cycle(9999), Err(EngineError::NotFound { machine_id: 9999 }));
    assert_eq!(
        state.report_fault(9999, "missing"),
        Err(EngineError::NotFound { machine_id: 9999 })
    );
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_report_fault_is_idempotent() {
    let mut once = LaundryState::default();
    once.report_fault(5, "burning smell").unwrap();

    let mut twice = LaundryState::default();
    twice.report_fault(5, "burning smell").unwrap();
    twice.report_fault(5, "burning smell").unwrap();

    assert_eq!(once.snapshot(), twice.snapshot());
    assert_eq!(twice.find_machine(5).unwrap().status, MachineStatus::Broken);
    assert_eq!(twice.find_machine(5).unwrap().timer, 0);
}

#[test]
fn test_report_on_already_broken_machine_is_accepted() {
    let mut state = LaundryState::default();

    let machine = state.report_fault(12, "still broken").unwrap();
    assert_eq!(machine.status, MachineStatus::Broken);
}

#[test]
fn test_broken_is_terminal_under_ticks_and_start() {
    let mut state = LaundryState::default();
    state.report_fault(2, "door won't close").unwrap();

    tick_n(&mut state, 5000);
    assert_eq!(state.find_machine(2).unwrap().status, MachineStatus::Broken);
    assert!(state.start_cycle(2).is_err());
}

#[test]
fn test_each_tick_removes_exactly_one_second() {
    let mut state = single_machine(Machine::new(1, MachineKind::Dryer, MachineStatus::InUse, 2700));

    for expected in (2690..2700).rev() {
        state.tick();
        assert_eq!(state.find_machine(1).unwrap().timer, expected);
    }
}

#[test]
fn test_idle_machines_unchanged_by_many_ticks() {
    let mut state = LaundryState::default();
    let idle_before: Vec<Machine> = state
        .snapshot()
        .machines()
        .filter(|m| matches!(m.status, MachineStatus::Available | MachineStatus::Broken))
        .cloned()
        .collect();

    tick_n(&mut state, 4000);

    for machine in &idle_before {
        assert_eq!(state.find_machine(machine.id), Some(machine));
    }
}

#[test]
fn test_seeded_rooms_finish_all_cycles() {
    let mut state = LaundryState::default();

    // Longest seeded cycle is the 2700s dryer
    tick_n(&mut state, 2700);

    let snapshot = state.snapshot();
    assert!(snapshot.machines().all(|m| !m.status.is_running()));
    assert_eq!(
        snapshot
            .machines()
            .filter(|m| m.status == MachineStatus::Broken)
            .count(),
        2
    );
}

#[test]
fn test_short_custom_cycle_skips_in_use_range() {
    let settings = EngineSettings {
        washer_cycle_secs: 120,
        dryer_cycle_secs: 1,
        finishing_threshold_secs: 300,
    };
    let rooms = vec![LaundryRoom::new(
        "annex",
        "Annex",
        vec![
            Machine::available(1, MachineKind::Washer),
            Machine::available(2, MachineKind::Dryer),
        ],
    )];
    let mut state = LaundryState::with_rooms(rooms, settings).unwrap();

    state.start_cycle(1).unwrap();
    state.start_cycle(2).unwrap();
    state.tick();

    assert_eq!(state.find_machine(1).unwrap().status, MachineStatus::Finishing);
    assert_eq!(state.find_machine(1).unwrap().timer, 119);
    assert_eq!(state.find_machine(2).unwrap().status, MachineStatus::Available);
    assert_eq!(state.find_machine(2).unwrap().timer, 0);
}
