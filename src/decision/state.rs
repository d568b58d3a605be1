// decision/state.rs

//! Left-hand-rule state classification and the stuck tracker that watches for
//! the robot spinning in place without making progress.

use log::debug;
use serde::{Deserialize, Serialize};

use super::perception::InterpretedSignals;

/// What the robot should be doing this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationState {
    /// Obstacle ahead, rotate in place
    TurnRight,
    /// Lost the left wall, arc left to find one
    TakeLeft,
    /// Hugging the left wall, arc right
    MoveAway,
    /// Nominal wall following
    Follow,
}

impl NavigationState {
    /// Turning states are the only ones a deadlock can hide in.
    pub fn is_turning(self) -> bool {
        matches!(self, NavigationState::TurnRight | NavigationState::TakeLeft)
    }

    /// State name for logging
    pub fn name(self) -> &'static str {
        match self {
            NavigationState::TurnRight => "TURN_RIGHT",
            NavigationState::TakeLeft => "TAKE_LEFT",
            NavigationState::MoveAway => "MOVE_AWAY",
            NavigationState::Follow => "FOLLOW",
        }
    }
}

impl std::fmt::Display for NavigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps signals to a state. Front obstruction wins over everything, then the
/// search for a left wall, then the too-close correction.
pub fn classify(signals: &InterpretedSignals) -> NavigationState {
    if signals.front_wall {
        NavigationState::TurnRight
    } else if !signals.left_wall {
        NavigationState::TakeLeft
    } else if signals.too_close_left {
        NavigationState::MoveAway
    } else {
        NavigationState::Follow
    }
}

/// Counts how long the classifier has been repeating itself.
///
/// `same_state_count` is the number of consecutive ticks after the first on
/// which the classified state matched `last_state`; it is 0 on the tick of any
/// change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StuckTracker {
    last_state: Option<NavigationState>,
    same_state_count: u32,
}

impl StuckTracker {
    /// Fresh tracker with no state seen yet.
    pub fn new() -> Self {
        StuckTracker::default()
    }

    /// Records this tick's state and returns the updated count.
    pub fn update(&mut self, state: NavigationState) -> u32 {
        if self.last_state == Some(state) {
            self.same_state_count = self.same_state_count.saturating_add(1);
        } else {
            if let Some(previous) = self.last_state {
                debug!("Navigation state {} -> {}", previous, state);
            } else {
                debug!("Initial navigation state {}", state);
            }
            self.last_state = Some(state);
            self.same_state_count = 0;
        }
        self.same_state_count
    }

    /// True once a turning state has outlasted `stuck_steps`.
    pub fn is_stuck(&self, stuck_steps: u32) -> bool {
        self.same_state_count > stuck_steps && self.last_state.is_some_and(|s| s.is_turning())
    }

    /// Called after a recovery run. The last state is kept, so only a fresh
    /// run of `stuck_steps` repeats can trigger again.
    pub fn reset_count(&mut self) {
        self.same_state_count = 0;
    }

    /// State classified on the most recent tick
    pub fn last_state(&self) -> Option<NavigationState> {
        self.last_state
    }

    /// Consecutive repeats of `last_state`
    pub fn same_state_count(&self) -> u32 {
        self.same_state_count
    }
}
