//! Navigation for Maze Walker
//!
//! Turns classified navigation states into wheel commands and drives the
//! wall-follower state machine, including the open-loop recovery maneuver.

pub mod controller;
pub mod follower;
pub mod recovery;

pub use controller::{MotionController, WheelCommand};
pub use follower::{ControllerMode, TickOutput, WallFollower};
pub use recovery::RecoveryPhase;
