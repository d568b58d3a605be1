//! Wall-follower state machine.
//!
//! The controller is either `Running` (one sensor-driven decision per tick)
//! or `Recovering` (replaying a fixed maneuver one sub-tick at a time). Both
//! modes are advanced from the same loop, so termination is checked at a
//! single place no matter which mode is active.

use log::{debug, info, trace};

use super::controller::{MotionController, WheelCommand};
use super::recovery::RecoveryPhase;
use crate::config::WallFollowerConfig;
use crate::decision::{NavigationState, SensorReading, StuckTracker, classify, interpret};

/// Controller mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerMode {
    /// Reading sensors and steering every tick
    Running,
    /// Executing the escape maneuver
    Recovering {
        /// Phase being executed
        phase: RecoveryPhase,
        /// Sub-ticks left before the phase ends
        remaining_steps: u32,
    },
}

impl ControllerMode {
    /// Mode name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            ControllerMode::Running => "Running",
            ControllerMode::Recovering { .. } => "Recovering",
        }
    }
}

/// Result of one tick or recovery sub-tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutput {
    /// Normal path: the classified state and its wheel command
    Drive {
        /// Classified state
        state: NavigationState,
        /// Command for that state
        command: WheelCommand,
    },
    /// Stuck detected; the command is the first recovery phase's and replaces
    /// the normal output for this tick
    RecoveryStarted {
        /// Turning state the robot was stuck in
        state: NavigationState,
        /// Push command
        command: WheelCommand,
    },
    /// A new recovery phase begins with this command
    RecoveryPhaseChanged {
        /// Phase now starting
        phase: RecoveryPhase,
        /// That phase's command
        command: WheelCommand,
    },
    /// Mid-phase sub-tick; the previous command stays in effect
    RecoveryHold {
        /// Phase in progress
        phase: RecoveryPhase,
        /// Sub-ticks left in it
        remaining_steps: u32,
    },
    /// Maneuver complete, back to `Running` on the next tick
    RecoveryFinished,
}

impl TickOutput {
    /// Command to send to the wheels, if this tick changes them.
    pub fn command(&self) -> Option<WheelCommand> {
        match self {
            TickOutput::Drive { command, .. }
            | TickOutput::RecoveryStarted { command, .. }
            | TickOutput::RecoveryPhaseChanged { command, .. } => Some(*command),
            TickOutput::RecoveryHold { .. } | TickOutput::RecoveryFinished => None,
        }
    }

    /// Navigation state classified on this tick; `None` during recovery.
    pub fn state(&self) -> Option<NavigationState> {
        match self {
            TickOutput::Drive { state, .. } | TickOutput::RecoveryStarted { state, .. } => {
                Some(*state)
            }
            _ => None,
        }
    }
}

/// Left-hand wall follower with deadlock recovery.
pub struct WallFollower {
    config: WallFollowerConfig,
    tracker: StuckTracker,
    mode: ControllerMode,
    recoveries_completed: u32,
}

impl WallFollower {
    /// Starts in `Running` with an empty stuck tracker.
    pub fn new(config: WallFollowerConfig) -> Self {
        WallFollower {
            config,
            tracker: StuckTracker::new(),
            mode: ControllerMode::Running,
            recoveries_completed: 0,
        }
    }

    /// Active tunables
    pub fn config(&self) -> &WallFollowerConfig {
        &self.config
    }

    /// Current mode
    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    /// Stuck tracker state
    pub fn tracker(&self) -> &StuckTracker {
        &self.tracker
    }

    /// Maneuvers run to completion
    pub fn recoveries_completed(&self) -> u32 {
        self.recoveries_completed
    }

    /// Whether the next tick will consume a sensor reading.
    pub fn needs_reading(&self) -> bool {
        matches!(self.mode, ControllerMode::Running)
    }

    /// Runs one control tick on `reading`.
    ///
    /// While recovering the reading is ignored and the maneuver advances by
    /// one sub-tick instead.
    pub fn tick(&mut self, reading: &SensorReading) -> TickOutput {
        if let Some(output) = self.continue_recovery() {
            return output;
        }

        let signals = interpret(reading, &self.config.thresholds);
        let state = classify(&signals);
        let count = self.tracker.update(state);

        if self.tracker.is_stuck(self.config.stuck.stuck_steps) {
            info!(
                "Stuck in {} for {} ticks, starting recovery",
                state, count
            );
            let phase = RecoveryPhase::Push;
            self.mode = ControllerMode::Recovering {
                phase,
                remaining_steps: phase.steps(&self.config),
            };
            return TickOutput::RecoveryStarted {
                state,
                command: phase.command(&self.config),
            };
        }

        let command = MotionController::new(&self.config).command_for(state, reading);
        trace!(
            "{} -> left={:.3} right={:.3}",
            state, command.left_speed, command.right_speed
        );
        TickOutput::Drive { state, command }
    }

    /// Advances the recovery maneuver by one sub-tick. Returns `None` when
    /// the controller is running normally.
    pub fn continue_recovery(&mut self) -> Option<TickOutput> {
        let ControllerMode::Recovering {
            phase,
            remaining_steps,
        } = self.mode
        else {
            return None;
        };

        let remaining_steps = remaining_steps.saturating_sub(1);
        if remaining_steps > 0 {
            self.mode = ControllerMode::Recovering {
                phase,
                remaining_steps,
            };
            return Some(TickOutput::RecoveryHold {
                phase,
                remaining_steps,
            });
        }

        match phase.next() {
            Some(next) => {
                debug!("Recovery {} phase done, starting {}", phase.name(), next.name());
                self.mode = ControllerMode::Recovering {
                    phase: next,
                    remaining_steps: next.steps(&self.config),
                };
                Some(TickOutput::RecoveryPhaseChanged {
                    phase: next,
                    command: next.command(&self.config),
                })
            }
            None => {
                self.tracker.reset_count();
                self.mode = ControllerMode::Running;
                self.recoveries_completed += 1;
                info!(
                    "Recovery finished ({} so far), resuming wall following",
                    self.recoveries_completed
                );
                Some(TickOutput::RecoveryFinished)
            }
        }
    }
}
