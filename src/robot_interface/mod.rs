//! Robot runtime interface for Maze Walker
//!
//! The controller only ever talks to the robot through three capabilities:
//! - reading the proximity ring (`SensorPort`)
//! - setting wheel velocities (`ActuatorPort`)
//! - advancing simulated or wall-clock time (`StepPrimitive`)
//!
//! `ReplayRobot` implements all three from a recorded scenario; `RosRobot`
//! (feature `ros`) bridges them to ROS 2 topics.

mod replay;
#[cfg(feature = "ros")]
mod ros;

pub use replay::{CommandRecord, ReplayRobot, Scenario, ScenarioSegment};
#[cfg(feature = "ros")]
pub use ros::RosRobot;

use crate::Result;
use crate::decision::SensorReading;

/// Drive wheel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Wheel {
    /// Left drive wheel
    Left,
    /// Right drive wheel
    Right,
}

/// Outcome of advancing the runtime by one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Time advanced; sensors hold fresh values
    Continue,
    /// The run has ended; nothing more may be sent
    Terminated,
}

impl StepStatus {
    /// True for `Terminated`
    pub fn is_terminated(self) -> bool {
        self == StepStatus::Terminated
    }
}

/// Proximity sensor ring.
pub trait SensorPort {
    /// One-time setup; sensors refresh every `interval_ms` afterwards.
    fn enable(&mut self, interval_ms: u32) -> Result<()>;

    /// Latest values for all 8 sensors.
    fn read(&mut self) -> Result<SensorReading>;
}

/// Wheel motors. Values arrive already clamped by the controller.
pub trait ActuatorPort {
    /// Sets one wheel's target velocity until the next call for that wheel.
    fn set_velocity(&mut self, wheel: Wheel, value: f64) -> Result<()>;
}

/// The runtime's clock. This is the controller's only blocking point.
pub trait StepPrimitive {
    /// Blocks for one control period and reports whether the run goes on.
    fn advance(&mut self, interval_ms: u32) -> StepStatus;
}

/// Everything the controller needs from one runtime.
pub trait RobotRuntime: SensorPort + ActuatorPort + StepPrimitive {}

impl<T: SensorPort + ActuatorPort + StepPrimitive> RobotRuntime for T {}
