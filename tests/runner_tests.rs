// Call-sequence checks for MazeRunner against a mocked robot runtime.

use maze_walker::{
    ActuatorPort, CycleOutcome, MazeRunner, SensorPort, SensorReading, StepPrimitive, StepStatus,
    TickOutput, WallFollowerConfig, WallFollowerError, Wheel,
};
use mockall::{Sequence, mock, predicate::*};

mock! {
    pub Robot {}

    impl SensorPort for Robot {
        fn enable(&mut self, interval_ms: u32) -> maze_walker::Result<()>;
        fn read(&mut self) -> maze_walker::Result<SensorReading>;
    }

    impl ActuatorPort for Robot {
        fn set_velocity(&mut self, wheel: Wheel, value: f64) -> maze_walker::Result<()>;
    }

    impl StepPrimitive for Robot {
        fn advance(&mut self, interval_ms: u32) -> StepStatus;
    }
}

fn blocked() -> SensorReading {
    SensorReading::new([400.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
}

fn quick_recovery_config() -> WallFollowerConfig {
    let mut config = WallFollowerConfig::default();
    config.stuck.stuck_steps = 1;
    config.recovery.push_steps = 3;
    config.recovery.spin_steps = 2;
    config
}

/// Advances `continue_for` times, then reports termination forever.
fn expect_ticks(robot: &mut MockRobot, continue_for: usize, total_calls: usize) {
    let mut calls = 0;
    robot
        .expect_advance()
        .with(eq(32))
        .times(total_calls)
        .returning(move |_| {
            calls += 1;
            if calls <= continue_for {
                StepStatus::Continue
            } else {
                StepStatus::Terminated
            }
        });
}

#[test]
fn run_cycle_requires_initialize() {
    let robot = MockRobot::new();
    let mut runner = MazeRunner::new(WallFollowerConfig::default(), robot);
    assert!(matches!(
        runner.run_cycle(),
        Err(WallFollowerError::NotInitialized)
    ));
}

#[test]
fn initialize_enables_sensors_once_at_control_period() {
    let mut robot = MockRobot::new();
    robot
        .expect_enable()
        .with(eq(32))
        .times(1)
        .returning(|_| Ok(()));
    let mut runner = MazeRunner::new(WallFollowerConfig::default(), robot);
    runner.initialize().unwrap();
    runner.initialize().unwrap();
}

#[test]
fn immediate_termination_reads_and_writes_nothing() {
    let mut robot = MockRobot::new();
    robot.expect_enable().returning(|_| Ok(()));
    expect_ticks(&mut robot, 0, 1);
    robot.expect_read().never();
    robot.expect_set_velocity().never();

    let status = MazeRunner::new(WallFollowerConfig::default(), robot)
        .run()
        .unwrap();
    assert_eq!(status.ticks, 0);
    assert!(status.terminated);
    assert_eq!(status.last_command, None);
}

#[test]
fn each_command_sets_left_then_right() {
    let mut robot = MockRobot::new();
    let mut seq = Sequence::new();
    robot.expect_enable().returning(|_| Ok(()));
    expect_ticks(&mut robot, 1, 2);
    robot
        .expect_read()
        .times(1)
        .returning(|| Ok(SensorReading::default()));
    robot
        .expect_set_velocity()
        .with(eq(Wheel::Left), function(|v: &f64| (v - 0.15 * 6.28).abs() < 1e-9))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    robot
        .expect_set_velocity()
        .with(eq(Wheel::Right), function(|v: &f64| (v - 0.55 * 6.28).abs() < 1e-9))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let status = MazeRunner::new(WallFollowerConfig::default(), robot)
        .run()
        .unwrap();
    assert_eq!(status.ticks, 1);
}

#[test]
fn recovery_skips_sensor_reads_and_holds_commands() {
    let mut robot = MockRobot::new();
    robot.expect_enable().returning(|_| Ok(()));
    // ticks 1-2 drive, tick 3 trigger, 3 push sub-ticks, 2 spin sub-ticks, tick 9 drive
    expect_ticks(&mut robot, 9, 10);
    robot.expect_read().times(4).returning(|| Ok(blocked()));
    // drive, drive, push, spin, drive: two wheels each
    robot
        .expect_set_velocity()
        .times(10)
        .returning(|_, _| Ok(()));

    let mut runner = MazeRunner::new(quick_recovery_config(), robot);
    runner.initialize().unwrap();

    let mut outputs = Vec::new();
    while let CycleOutcome::Ticked(output) = runner.run_cycle().unwrap() {
        outputs.push(output);
    }

    assert_eq!(outputs.len(), 9);
    assert!(matches!(outputs[0], TickOutput::Drive { .. }));
    assert!(matches!(outputs[1], TickOutput::Drive { .. }));
    assert!(matches!(outputs[2], TickOutput::RecoveryStarted { .. }));
    assert!(matches!(outputs[3], TickOutput::RecoveryHold { .. }));
    assert!(matches!(outputs[4], TickOutput::RecoveryHold { .. }));
    assert!(matches!(outputs[5], TickOutput::RecoveryPhaseChanged { .. }));
    assert!(matches!(outputs[6], TickOutput::RecoveryHold { .. }));
    assert!(matches!(outputs[7], TickOutput::RecoveryFinished));
    assert!(matches!(outputs[8], TickOutput::Drive { .. }));

    let status = runner.status();
    assert_eq!(status.recoveries, 1);
    assert_eq!(status.recovery_ticks, 5);
    // count restarts from zero after recovery, so tick 9 only reaches 1
    assert_eq!(status.same_state_count, 1);
}

#[test]
fn termination_is_sticky() {
    let mut robot = MockRobot::new();
    robot.expect_enable().returning(|_| Ok(()));
    expect_ticks(&mut robot, 0, 1);
    let mut runner = MazeRunner::new(WallFollowerConfig::default(), robot);
    runner.initialize().unwrap();
    for _ in 0..3 {
        assert_eq!(runner.run_cycle().unwrap(), CycleOutcome::Terminated);
    }
}

#[test]
fn sensor_failure_propagates() {
    let mut robot = MockRobot::new();
    robot.expect_enable().returning(|_| Ok(()));
    robot.expect_advance().returning(|_| StepStatus::Continue);
    robot
        .expect_read()
        .times(1)
        .returning(|| Err(WallFollowerError::NoSensorData));
    robot.expect_set_velocity().never();

    let err = MazeRunner::new(WallFollowerConfig::default(), robot)
        .run()
        .unwrap_err();
    assert!(matches!(err, WallFollowerError::NoSensorData));
}
