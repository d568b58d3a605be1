// src/navigation/controller.rs
//! Turns a navigation state into wheel velocities. FOLLOW runs a proportional
//! controller on the left wall distance; the other states are fixed arcs.

use serde::{Deserialize, Serialize};

use crate::config::WallFollowerConfig;
use crate::decision::{NavigationState, SensorReading};

/// Left/right wheel velocities in the runtime's units (rad/s for most motors).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelCommand {
    /// Left wheel
    pub left_speed: f64,
    /// Right wheel
    pub right_speed: f64,
}

impl WheelCommand {
    /// Builds a command with both wheels clamped to `[-max_speed, max_speed]`.
    pub fn clamped(left_speed: f64, right_speed: f64, max_speed: f64) -> Self {
        WheelCommand {
            left_speed: clamp(left_speed, -max_speed, max_speed),
            right_speed: clamp(right_speed, -max_speed, max_speed),
        }
    }

    /// Command from `(left, right)` fractions of max speed.
    pub fn from_ratios((left, right): (f64, f64), max_speed: f64) -> Self {
        WheelCommand::clamped(left * max_speed, right * max_speed, max_speed)
    }

}

// Unlike f64::clamp this never panics on inverted bounds, and a NaN input
// becomes zero (or the nearest bound) instead of reaching the motors.
fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else if x.is_nan() {
        lo.max(0.0).min(hi)
    } else {
        x
    }
}

/// Velocity synthesizer for the normal (non-recovery) path.
pub struct MotionController<'a> {
    config: &'a WallFollowerConfig,
}

impl<'a> MotionController<'a> {
    /// Borrows the tunables for the lifetime of the controller.
    pub fn new(config: &'a WallFollowerConfig) -> Self {
        MotionController { config }
    }

    /// Computes the command for `state`. The reading is only consulted while
    /// following.
    pub fn command_for(&self, state: NavigationState, reading: &SensorReading) -> WheelCommand {
        let max_speed = self.config.max_speed;
        let motions = &self.config.motions;
        match state {
            NavigationState::TurnRight => WheelCommand::from_ratios(motions.turn_right, max_speed),
            NavigationState::TakeLeft => WheelCommand::from_ratios(motions.take_left, max_speed),
            NavigationState::MoveAway => WheelCommand::from_ratios(motions.move_away, max_speed),
            NavigationState::Follow => self.follow_wall(reading),
        }
    }

    /// Steering correction as a fraction of max speed. Positive means the
    /// wall is too far and the robot should steer left.
    pub fn wall_correction(&self, reading: &SensorReading) -> f64 {
        let follow = &self.config.follow;
        let error = follow.target_left - reading.left_measure();
        clamp(
            follow.kp * error,
            -follow.correction_limit,
            follow.correction_limit,
        )
    }

    fn follow_wall(&self, reading: &SensorReading) -> WheelCommand {
        let max_speed = self.config.max_speed;
        let correction = self.wall_correction(reading);
        let base = self.config.follow.base_ratio * max_speed;
        WheelCommand::clamped(
            base - correction * max_speed,
            base + correction * max_speed,
            max_speed,
        )
    }
}
