// src/robot_interface/replay.rs
//! Deterministic runtime that replays recorded proximity readings and logs the
//! wheel commands it receives. Used by the CLI's `replay` mode and by tests.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{ActuatorPort, SensorPort, StepPrimitive, StepStatus, Wheel};
use crate::decision::SensorReading;
use crate::{Result, WallFollowerError};

/// A run of identical readings lasting `ticks` control periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSegment {
    /// Reading repeated for the whole segment
    pub readings: SensorReading,
    /// Segment length in control periods
    pub ticks: u64,
}

/// Recorded sensor timeline. The run ends once every segment is consumed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Label used in logs
    #[serde(default)]
    pub name: String,
    /// Played back in order
    #[serde(default)]
    pub segments: Vec<ScenarioSegment>,
}

impl Scenario {
    /// Reads a scenario from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| WallFollowerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scenario = Self::from_yaml_str(&data)?;
        info!(
            "Loaded scenario '{}' ({} segments, {} ticks)",
            scenario.name,
            scenario.segments.len(),
            scenario.total_ticks()
        );
        Ok(scenario)
    }

    /// Parses a scenario from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Appends a segment; handy for building scenarios in code.
    pub fn then(mut self, readings: impl Into<SensorReading>, ticks: u64) -> Self {
        self.segments.push(ScenarioSegment {
            readings: readings.into(),
            ticks,
        });
        self
    }

    /// Run length in control periods
    pub fn total_ticks(&self) -> u64 {
        self.segments.iter().map(|s| s.ticks).sum()
    }

    /// Reading in effect during zero-based tick `tick`. Past the end the last
    /// segment's reading persists.
    fn reading_at(&self, tick: u64) -> SensorReading {
        let mut start = 0;
        for segment in &self.segments {
            if tick < start + segment.ticks {
                return segment.readings;
            }
            start += segment.ticks;
        }
        self.segments
            .last()
            .map(|s| s.readings)
            .unwrap_or_default()
    }
}

/// One `set_velocity` call as seen by the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandRecord {
    /// Ticks elapsed when the command was issued
    pub tick: u64,
    /// Target wheel
    pub wheel: Wheel,
    /// Requested velocity
    pub value: f64,
}

/// In-process runtime backed by a `Scenario`.
pub struct ReplayRobot {
    scenario: Scenario,
    sensor_interval_ms: Option<u32>,
    ticks_elapsed: u64,
    command_log: Vec<CommandRecord>,
}

impl ReplayRobot {
    /// Runtime at tick 0 with sensors disabled.
    pub fn new(scenario: Scenario) -> Self {
        ReplayRobot {
            scenario,
            sensor_interval_ms: None,
            ticks_elapsed: 0,
            command_log: Vec::new(),
        }
    }

    /// Periods advanced so far
    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks_elapsed
    }

    /// Interval passed to `enable`, if it was called
    pub fn sensor_interval_ms(&self) -> Option<u32> {
        self.sensor_interval_ms
    }

    /// Every command received, oldest first
    pub fn command_log(&self) -> &[CommandRecord] {
        &self.command_log
    }

    /// Most recent velocity sent to `wheel`, if any.
    pub fn last_velocity(&self, wheel: Wheel) -> Option<f64> {
        self.command_log
            .iter()
            .rev()
            .find(|record| record.wheel == wheel)
            .map(|record| record.value)
    }
}

impl SensorPort for ReplayRobot {
    fn enable(&mut self, interval_ms: u32) -> Result<()> {
        debug!("Replay sensors enabled every {} ms", interval_ms);
        self.sensor_interval_ms = Some(interval_ms);
        Ok(())
    }

    fn read(&mut self) -> Result<SensorReading> {
        if self.sensor_interval_ms.is_none() {
            return Err(WallFollowerError::SensorsDisabled);
        }
        Ok(self
            .scenario
            .reading_at(self.ticks_elapsed.saturating_sub(1)))
    }
}

impl ActuatorPort for ReplayRobot {
    fn set_velocity(&mut self, wheel: Wheel, value: f64) -> Result<()> {
        self.command_log.push(CommandRecord {
            tick: self.ticks_elapsed,
            wheel,
            value,
        });
        Ok(())
    }
}

impl StepPrimitive for ReplayRobot {
    fn advance(&mut self, _interval_ms: u32) -> StepStatus {
        if self.ticks_elapsed >= self.scenario.total_ticks() {
            return StepStatus::Terminated;
        }
        self.ticks_elapsed += 1;
        StepStatus::Continue
    }
}
