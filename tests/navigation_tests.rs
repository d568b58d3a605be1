// End-to-end runs of the wall follower against replayed sensor timelines.

use maze_walker::robot_interface::CommandRecord;
use maze_walker::{
    ControllerMode, MazeRunner, NavigationState, RecoveryPhase, ReplayRobot, Scenario,
    WallFollowerConfig, Wheel,
};
use rstest::rstest;

const MAX: f64 = 6.28;

fn reading(pairs: &[(usize, f64)]) -> [f64; 8] {
    let mut values = [0.0; 8];
    for &(i, v) in pairs {
        values[i] = v;
    }
    values
}

fn run(scenario: Scenario) -> (maze_walker::RunStatus, ReplayRobot) {
    let mut runner = MazeRunner::new(WallFollowerConfig::default(), ReplayRobot::new(scenario));
    let status = runner.run().unwrap();
    (status, runner.into_robot())
}

fn pairs_at(log: &[CommandRecord], tick: u64) -> Vec<(Wheel, f64)> {
    log.iter()
        .filter(|r| r.tick == tick)
        .map(|r| (r.wheel, r.value))
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[rstest]
#[case::open_space(reading(&[]), NavigationState::TakeLeft, 0.15 * MAX, 0.55 * MAX)]
#[case::wall_ahead(reading(&[(0, 150.0)]), NavigationState::TurnRight, 0.45 * MAX, -0.45 * MAX)]
#[case::far_left_wall(reading(&[(5, 90.0), (6, 90.0)]), NavigationState::Follow, 0.45 * MAX, 0.85 * MAX)]
#[case::hugging_left_wall(reading(&[(5, 300.0), (6, 300.0)]), NavigationState::MoveAway, 0.55 * MAX, 0.25 * MAX)]
fn single_tick_commands(
    #[case] values: [f64; 8],
    #[case] state: NavigationState,
    #[case] left: f64,
    #[case] right: f64,
) {
    let (status, robot) = run(Scenario::default().then(values, 1));
    assert_eq!(status.ticks, 1);
    assert_eq!(status.last_state, Some(state));
    assert!(status.terminated);
    assert_close(robot.last_velocity(Wheel::Left).unwrap(), left);
    assert_close(robot.last_velocity(Wheel::Right).unwrap(), right);
}

#[test]
fn wedged_in_corner_recovers_exactly_once() {
    let blocked = reading(&[(0, 400.0), (7, 400.0), (6, 400.0)]);
    let (status, robot) = run(Scenario::default().then(blocked, 200));
    let log = robot.command_log();

    // 151 TURN_RIGHT ticks (count 0..=150), recovery fires on tick 152
    for tick in 1..=151 {
        let pairs = pairs_at(log, tick);
        assert_eq!(pairs.len(), 2, "tick {tick}");
        assert_close(pairs[0].1, 0.45 * MAX);
    }
    assert_eq!(
        pairs_at(log, 152),
        vec![(Wheel::Left, 0.6 * MAX), (Wheel::Right, 0.6 * MAX)]
    );
    // push holds for 15 sub-ticks, then spin for 10
    for tick in 153..=166 {
        assert!(pairs_at(log, tick).is_empty(), "tick {tick}");
    }
    assert_eq!(
        pairs_at(log, 167),
        vec![(Wheel::Left, 0.5 * MAX), (Wheel::Right, -0.5 * MAX)]
    );
    for tick in 168..=177 {
        assert!(pairs_at(log, tick).is_empty(), "tick {tick}");
    }
    // normal output resumes on the next tick
    assert_close(pairs_at(log, 178)[0].1, 0.45 * MAX);

    assert_eq!(status.recoveries, 1);
    assert_eq!(status.recovery_ticks, 25);
    assert_eq!(status.ticks, 200);
    assert_eq!(status.mode, ControllerMode::Running);
    // count restarted from zero after recovery: ticks 178..=200
    assert_eq!(status.same_state_count, 23);
}

#[test]
fn long_follow_run_never_recovers() {
    let on_target = reading(&[(5, 140.0), (6, 100.0)]);
    let (status, robot) = run(Scenario::default().then(on_target, 1000));
    assert_eq!(status.recoveries, 0);
    assert_eq!(status.last_state, Some(NavigationState::Follow));
    assert_eq!(status.same_state_count, 999);
    assert_eq!(robot.command_log().len(), 2000);
}

#[test]
fn state_change_resets_the_stuck_count() {
    let blocked = reading(&[(0, 400.0)]);
    let open = reading(&[]);
    // 140 + 140 TURN_RIGHT ticks split by one TAKE_LEFT tick never reach 151 repeats
    let scenario = Scenario::default()
        .then(blocked, 140)
        .then(open, 1)
        .then(blocked, 140);
    let (status, _) = run(scenario);
    assert_eq!(status.recoveries, 0);
    assert_eq!(status.same_state_count, 139);
}

#[test]
fn termination_mid_push_stops_all_output() {
    let blocked = reading(&[(7, 400.0)]);
    // recovery starts on tick 152; the run ends five sub-ticks into the push
    let (status, robot) = run(Scenario::default().then(blocked, 157));
    assert!(status.terminated);
    assert!(matches!(
        status.mode,
        ControllerMode::Recovering {
            phase: RecoveryPhase::Push,
            ..
        }
    ));
    assert_eq!(status.recoveries, 0);
    let last = robot.command_log().last().unwrap();
    assert_eq!(last.tick, 152);
    assert_close(last.value, 0.6 * MAX);
}

#[test]
fn termination_mid_spin_stops_all_output() {
    let blocked = reading(&[(7, 400.0)]);
    // spin command goes out on tick 167; the run ends three sub-ticks later
    let (status, robot) = run(Scenario::default().then(blocked, 170));
    assert!(status.terminated);
    assert!(matches!(
        status.mode,
        ControllerMode::Recovering {
            phase: RecoveryPhase::Spin,
            ..
        }
    ));
    assert_eq!(status.recoveries, 0);
    let last = robot.command_log().last().unwrap();
    assert_eq!(last.tick, 167);
    assert_eq!(last.wheel, Wheel::Right);
    assert_close(last.value, -0.5 * MAX);
}

#[test]
fn every_command_is_within_bounds() {
    let scenario = Scenario::default()
        .then(reading(&[(5, -1e9), (6, 1e9)]), 50)
        .then(reading(&[(5, 1e12)]), 50)
        .then(reading(&[(0, f64::NAN), (5, f64::INFINITY)]), 50)
        .then(reading(&[(5, 81.0)]), 300);
    let (_, robot) = run(scenario);
    assert!(!robot.command_log().is_empty());
    for record in robot.command_log() {
        assert!(record.value.abs() <= MAX, "{record:?}");
    }
}

#[test]
fn bundled_demo_files_load_and_run() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let config = WallFollowerConfig::load(root.join("config.yaml")).unwrap();
    assert_eq!(config, WallFollowerConfig::default());

    let scenario = Scenario::load(root.join("scenarios/dead_end.yaml")).unwrap();
    assert_eq!(scenario.total_ticks(), 260);
    let mut runner = MazeRunner::new(config, ReplayRobot::new(scenario));
    let status = runner.run().unwrap();
    assert_eq!(status.ticks, 260);
    assert_eq!(status.recoveries, 1);
}
