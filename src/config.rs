// src/config.rs
//! Tunables for the wall follower, loaded once at startup and never mutated.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{Result, WallFollowerError};

/// Complete controller configuration.
///
/// Every field has a default, so an empty YAML document (or a partial one)
/// yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallFollowerConfig {
    /// Wheel velocity bound; every command is clamped to `[-max_speed, max_speed]`
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// Control period handed to the runtime's step primitive and sensor enable
    #[serde(default = "default_timestep_ms")]
    pub timestep_ms: u32,
    /// Proximity thresholds used by the sensor interpreter
    #[serde(default)]
    pub thresholds: SensorThresholds,
    /// Wall-distance P-controller gains
    #[serde(default)]
    pub follow: FollowConfig,
    /// Open-loop wheel ratios for the turning states
    #[serde(default)]
    pub motions: MotionRatios,
    /// Deadlock detection
    #[serde(default)]
    pub stuck: StuckConfig,
    /// Recovery maneuver timing and speeds
    #[serde(default)]
    pub recovery: RecoveryConfig,
    /// ROS 2 bridge settings (only read with the `ros` feature)
    #[serde(default)]
    pub ros: RosConfig,
}

/// Raw proximity values above which a wall counts as present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorThresholds {
    /// Wall ahead (sensors 0 and 7)
    #[serde(default = "default_th_front")]
    pub front: f64,
    /// Trackable wall on the left (sensors 5 and 6)
    #[serde(default = "default_th_left")]
    pub left: f64,
    /// Hugging the left wall (sensor 6)
    #[serde(default = "default_th_too_close")]
    pub too_close: f64,
}

/// Proportional wall-distance controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowConfig {
    /// Desired left proximity reading
    #[serde(default = "default_target_left")]
    pub target_left: f64,
    /// Correction gain per reading unit
    #[serde(default = "default_kp")]
    pub kp: f64,
    /// Correction saturates at +/- this fraction of max speed
    #[serde(default = "default_correction_limit")]
    pub correction_limit: f64,
    /// Forward speed as a fraction of max speed
    #[serde(default = "default_base_ratio")]
    pub base_ratio: f64,
}

/// `(left, right)` fractions of max speed for each open-loop state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionRatios {
    /// Rotate in place away from a wall ahead
    #[serde(default = "default_turn_right")]
    pub turn_right: (f64, f64),
    /// Arc left to reacquire a lost wall
    #[serde(default = "default_take_left")]
    pub take_left: (f64, f64),
    /// Arc right away from a wall that is too close
    #[serde(default = "default_move_away")]
    pub move_away: (f64, f64),
}

/// Stuck detection threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuckConfig {
    /// Recovery fires once a turning state repeats more than this many ticks
    #[serde(default = "default_stuck_steps")]
    pub stuck_steps: u32,
}

/// Recovery maneuver: push forward, then spin right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Sub-ticks spent driving straight
    #[serde(default = "default_push_steps")]
    pub push_steps: u32,
    /// Push speed as a fraction of max speed
    #[serde(default = "default_push_ratio")]
    pub push_ratio: f64,
    /// Sub-ticks spent spinning right
    #[serde(default = "default_spin_steps")]
    pub spin_steps: u32,
    /// Spin speed as a fraction of max speed
    #[serde(default = "default_spin_ratio")]
    pub spin_ratio: f64,
}

/// ROS 2 node and topic names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosConfig {
    /// Node name
    #[serde(default = "default_node_name")]
    pub node_name: String,
    /// Node namespace, empty for the root
    #[serde(default)]
    pub namespace: String,
    /// `std_msgs/Float64MultiArray` carrying the 8 proximity values
    #[serde(default = "default_sensor_topic")]
    pub sensor_topic: String,
    /// `std_msgs/Float64` left wheel velocity topic
    #[serde(default = "default_left_wheel_topic")]
    pub left_wheel_topic: String,
    /// `std_msgs/Float64` right wheel velocity topic
    #[serde(default = "default_right_wheel_topic")]
    pub right_wheel_topic: String,
    /// `std_msgs/Empty` topic; any message ends the run
    #[serde(default = "default_shutdown_topic")]
    pub shutdown_topic: String,
}

fn default_max_speed() -> f64 {
    6.28
}
fn default_timestep_ms() -> u32 {
    32
}
fn default_th_front() -> f64 {
    120.0
}
fn default_th_left() -> f64 {
    80.0
}
fn default_th_too_close() -> f64 {
    220.0
}
fn default_target_left() -> f64 {
    140.0
}
fn default_kp() -> f64 {
    0.004
}
fn default_correction_limit() -> f64 {
    0.2
}
fn default_base_ratio() -> f64 {
    0.65
}
fn default_turn_right() -> (f64, f64) {
    (0.45, -0.45)
}
fn default_take_left() -> (f64, f64) {
    (0.15, 0.55)
}
fn default_move_away() -> (f64, f64) {
    (0.55, 0.25)
}
fn default_stuck_steps() -> u32 {
    150
}
fn default_push_steps() -> u32 {
    15
}
fn default_push_ratio() -> f64 {
    0.6
}
fn default_spin_steps() -> u32 {
    10
}
fn default_spin_ratio() -> f64 {
    0.5
}
fn default_node_name() -> String {
    "maze_walker".to_string()
}
fn default_sensor_topic() -> String {
    "/proximity".to_string()
}
fn default_left_wheel_topic() -> String {
    "/left_wheel/cmd_vel".to_string()
}
fn default_right_wheel_topic() -> String {
    "/right_wheel/cmd_vel".to_string()
}
fn default_shutdown_topic() -> String {
    "/maze_walker/shutdown".to_string()
}

impl Default for WallFollowerConfig {
    fn default() -> Self {
        WallFollowerConfig {
            max_speed: default_max_speed(),
            timestep_ms: default_timestep_ms(),
            thresholds: SensorThresholds::default(),
            follow: FollowConfig::default(),
            motions: MotionRatios::default(),
            stuck: StuckConfig::default(),
            recovery: RecoveryConfig::default(),
            ros: RosConfig::default(),
        }
    }
}

impl Default for SensorThresholds {
    fn default() -> Self {
        SensorThresholds {
            front: default_th_front(),
            left: default_th_left(),
            too_close: default_th_too_close(),
        }
    }
}

impl Default for FollowConfig {
    fn default() -> Self {
        FollowConfig {
            target_left: default_target_left(),
            kp: default_kp(),
            correction_limit: default_correction_limit(),
            base_ratio: default_base_ratio(),
        }
    }
}

impl Default for MotionRatios {
    fn default() -> Self {
        MotionRatios {
            turn_right: default_turn_right(),
            take_left: default_take_left(),
            move_away: default_move_away(),
        }
    }
}

impl Default for StuckConfig {
    fn default() -> Self {
        StuckConfig {
            stuck_steps: default_stuck_steps(),
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        RecoveryConfig {
            push_steps: default_push_steps(),
            push_ratio: default_push_ratio(),
            spin_steps: default_spin_steps(),
            spin_ratio: default_spin_ratio(),
        }
    }
}

impl Default for RosConfig {
    fn default() -> Self {
        RosConfig {
            node_name: default_node_name(),
            namespace: String::new(),
            sensor_topic: default_sensor_topic(),
            left_wheel_topic: default_left_wheel_topic(),
            right_wheel_topic: default_right_wheel_topic(),
            shutdown_topic: default_shutdown_topic(),
        }
    }
}

impl WallFollowerConfig {
    /// Loads and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| WallFollowerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: WallFollowerConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: WallFollowerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(WallFollowerError::Config(format!(
                "max_speed must be positive and finite, got {}",
                self.max_speed
            )));
        }
        if self.timestep_ms == 0 {
            return Err(WallFollowerError::Config(
                "timestep_ms must be at least 1".to_string(),
            ));
        }
        if self.recovery.push_steps == 0 || self.recovery.spin_steps == 0 {
            return Err(WallFollowerError::Config(format!(
                "recovery phases need at least one step (push={}, spin={})",
                self.recovery.push_steps, self.recovery.spin_steps
            )));
        }
        if self.follow.correction_limit.is_nan() || self.follow.correction_limit < 0.0 {
            return Err(WallFollowerError::Config(format!(
                "follow.correction_limit must be non-negative, got {}",
                self.follow.correction_limit
            )));
        }
        Ok(())
    }
}
