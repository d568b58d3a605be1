//! Maze Walker - reactive left-hand wall following
//!
//! This library turns a ring of 8 proximity readings into differential-drive
//! wheel velocities once per control tick, following the left wall of a maze
//! and escaping corners the robot would otherwise spin in forever.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod config;
pub mod decision;
pub mod navigation;
pub mod robot_interface;

// Re-export commonly used items for easier access
pub use config::WallFollowerConfig;
pub use decision::{InterpretedSignals, NavigationState, SensorReading, StuckTracker};
pub use navigation::{ControllerMode, RecoveryPhase, TickOutput, WallFollower, WheelCommand};
pub use robot_interface::{
    ActuatorPort, ReplayRobot, RobotRuntime, Scenario, SensorPort, StepPrimitive, StepStatus,
    Wheel,
};

use log::{info, trace, warn};

/// Maze Walker error types
#[derive(thiserror::Error, Debug)]
pub enum WallFollowerError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// YAML document did not match the expected shape
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Configuration values out of range
    #[error("Configuration error: {0}")]
    Config(String),
    /// Runtime delivered the wrong number of proximity values
    #[error("expected {expected} proximity values, got {actual}")]
    InvalidReading {
        /// Sensors the controller expects
        expected: usize,
        /// Values actually received
        actual: usize,
    },
    /// Sensors were read before being enabled
    #[error("proximity sensors read before enable")]
    SensorsDisabled,
    /// Runtime has not delivered any proximity data yet
    #[error("no proximity data received yet")]
    NoSensorData,
    /// ROS 2 transport error
    #[error("ROS error: {0}")]
    Ros(String),
    /// Runner used before `initialize`
    #[error("controller not initialized")]
    NotInitialized,
}

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, WallFollowerError>;

/// What happened during one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// The runtime advanced and the controller produced `output`
    Ticked(TickOutput),
    /// The runtime reported end of run; nothing was read or sent
    Terminated,
}

/// Snapshot of a run, for logging and inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatus {
    /// Loop iterations in which the runtime advanced
    pub ticks: u64,
    /// Of those, iterations spent inside the recovery maneuver
    pub recovery_ticks: u64,
    /// Completed recovery maneuvers
    pub recoveries: u32,
    /// Current controller mode
    pub mode: ControllerMode,
    /// Last classified navigation state
    pub last_state: Option<NavigationState>,
    /// Consecutive repeats of `last_state`
    pub same_state_count: u32,
    /// Last command sent to the wheels
    pub last_command: Option<WheelCommand>,
    /// Whether the runtime has ended the run
    pub terminated: bool,
}

/// Drives a `WallFollower` against a robot runtime.
pub struct MazeRunner<R: RobotRuntime> {
    robot: R,
    follower: WallFollower,
    ticks: u64,
    recovery_ticks: u64,
    last_command: Option<WheelCommand>,
    is_initialized: bool,
    terminated: bool,
}

impl<R: RobotRuntime> MazeRunner<R> {
    /// Create a runner; the configuration is fixed for its whole lifetime.
    pub fn new(config: WallFollowerConfig, robot: R) -> Self {
        MazeRunner {
            robot,
            follower: WallFollower::new(config),
            ticks: 0,
            recovery_ticks: 0,
            last_command: None,
            is_initialized: false,
            terminated: false,
        }
    }

    /// Enables the proximity sensors at the control period.
    pub fn initialize(&mut self) -> Result<()> {
        if self.is_initialized {
            return Ok(());
        }
        let timestep_ms = self.follower.config().timestep_ms;
        self.robot.enable(timestep_ms)?;
        self.is_initialized = true;
        info!("Maze walker initialized ({} ms control period)", timestep_ms);
        Ok(())
    }

    /// Advances the runtime once and handles the resulting tick.
    ///
    /// Once the runtime has reported termination every later call returns
    /// `Terminated` without touching the robot again.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        if !self.is_initialized {
            return Err(WallFollowerError::NotInitialized);
        }
        if self.terminated {
            return Ok(CycleOutcome::Terminated);
        }

        let timestep_ms = self.follower.config().timestep_ms;
        if self.robot.advance(timestep_ms).is_terminated() {
            self.terminated = true;
            if let ControllerMode::Recovering { phase, .. } = self.follower.mode() {
                warn!("Run ended during recovery ({} phase)", phase.name());
            }
            return Ok(CycleOutcome::Terminated);
        }
        self.ticks += 1;

        let output = match self.follower.continue_recovery() {
            Some(output) => {
                self.recovery_ticks += 1;
                output
            }
            None => {
                let reading = self.robot.read()?;
                self.follower.tick(&reading)
            }
        };

        if let Some(command) = output.command() {
            self.send(command)?;
        }
        Ok(CycleOutcome::Ticked(output))
    }

    /// Loops until the runtime ends the run.
    pub fn run(&mut self) -> Result<RunStatus> {
        self.initialize()?;
        info!("Starting wall following");
        while let CycleOutcome::Ticked(_) = self.run_cycle()? {}
        let status = self.status();
        info!(
            "Run ended after {} ticks, {} recoveries ({})",
            status.ticks,
            status.recoveries,
            status.mode.name()
        );
        Ok(status)
    }

    /// Current run status
    pub fn status(&self) -> RunStatus {
        let tracker = self.follower.tracker();
        RunStatus {
            ticks: self.ticks,
            recovery_ticks: self.recovery_ticks,
            recoveries: self.follower.recoveries_completed(),
            mode: self.follower.mode(),
            last_state: tracker.last_state(),
            same_state_count: tracker.same_state_count(),
            last_command: self.last_command,
            terminated: self.terminated,
        }
    }

    /// The controller being driven
    pub fn follower(&self) -> &WallFollower {
        &self.follower
    }

    /// Borrow the runtime
    pub fn robot(&self) -> &R {
        &self.robot
    }

    /// Consume the runner, returning the runtime
    pub fn into_robot(self) -> R {
        self.robot
    }

    fn send(&mut self, command: WheelCommand) -> Result<()> {
        trace!(
            "wheels left={:.3} right={:.3}",
            command.left_speed, command.right_speed
        );
        self.robot.set_velocity(Wheel::Left, command.left_speed)?;
        self.robot.set_velocity(Wheel::Right, command.right_speed)?;
        self.last_command = Some(command);
        Ok(())
    }
}
