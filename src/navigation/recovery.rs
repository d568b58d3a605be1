//! Open-loop escape maneuver for concave corners.
//!
//! Two fixed-length phases: push straight ahead to clear the corner, then
//! spin right to face away from it. Neither phase looks at the sensors.

use serde::{Deserialize, Serialize};

use super::controller::WheelCommand;
use crate::config::WallFollowerConfig;

/// Recovery phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryPhase {
    /// Drive forward at `push_ratio`
    Push,
    /// Rotate right in place at `spin_ratio`
    Spin,
}

impl RecoveryPhase {
    /// Wheel command held for the whole phase.
    pub fn command(self, config: &WallFollowerConfig) -> WheelCommand {
        let max_speed = config.max_speed;
        match self {
            RecoveryPhase::Push => {
                let ratio = config.recovery.push_ratio;
                WheelCommand::from_ratios((ratio, ratio), max_speed)
            }
            RecoveryPhase::Spin => {
                let ratio = config.recovery.spin_ratio;
                WheelCommand::from_ratios((ratio, -ratio), max_speed)
            }
        }
    }

    /// Number of sub-ticks the phase lasts.
    pub fn steps(self, config: &WallFollowerConfig) -> u32 {
        match self {
            RecoveryPhase::Push => config.recovery.push_steps,
            RecoveryPhase::Spin => config.recovery.spin_steps,
        }
    }

    /// Phase that follows this one, `None` when the maneuver is over.
    pub fn next(self) -> Option<RecoveryPhase> {
        match self {
            RecoveryPhase::Push => Some(RecoveryPhase::Spin),
            RecoveryPhase::Spin => None,
        }
    }

    /// Lowercase phase name for logs
    pub fn name(self) -> &'static str {
        match self {
            RecoveryPhase::Push => "push",
            RecoveryPhase::Spin => "spin",
        }
    }
}
