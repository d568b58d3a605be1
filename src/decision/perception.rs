// decision/perception.rs

//! Reduces the 8-sensor proximity ring into the three signals the classifier
//! needs. Index layout (e-puck style, clockwise from front-right):
//! 0 front-right, 1 right-front, 2 right, 3 rear-right,
//! 4 rear-left, 5 left, 6 left-front, 7 front-left.

use serde::{Deserialize, Serialize};

use crate::config::SensorThresholds;
use crate::{Result, WallFollowerError};

/// Number of proximity sensors around the robot.
pub const SENSOR_COUNT: usize = 8;

const FRONT_RIGHT: usize = 0;
const LEFT: usize = 5;
const LEFT_FRONT: usize = 6;
const FRONT_LEFT: usize = 7;

/// One tick's raw proximity values. Larger means closer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading(pub [f64; SENSOR_COUNT]);

impl SensorReading {
    /// Wraps raw values in sensor index order.
    pub fn new(values: [f64; SENSOR_COUNT]) -> Self {
        SensorReading(values)
    }

    /// Builds a reading from a runtime-provided slice, which must hold exactly
    /// one value per sensor.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let values: [f64; SENSOR_COUNT] =
            values
                .try_into()
                .map_err(|_| WallFollowerError::InvalidReading {
                    expected: SENSOR_COUNT,
                    actual: values.len(),
                })?;
        Ok(SensorReading(values))
    }

    /// Combined left-side proximity used by the wall-distance controller.
    pub fn left_measure(&self) -> f64 {
        self.0[LEFT].max(self.0[LEFT_FRONT])
    }
}

impl std::ops::Index<usize> for SensorReading {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl From<[f64; SENSOR_COUNT]> for SensorReading {
    fn from(values: [f64; SENSOR_COUNT]) -> Self {
        SensorReading(values)
    }
}

/// Walls detected around the robot on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterpretedSignals {
    /// Either front sensor above the front threshold
    pub front_wall: bool,
    /// Either left sensor above the left threshold
    pub left_wall: bool,
    /// Left-front sensor above the too-close threshold
    pub too_close_left: bool,
}

/// Pure threshold test over a single reading.
///
/// Any numeric input is accepted: zero or negative values simply read as
/// "no wall", and NaN never exceeds a threshold.
pub fn interpret(reading: &SensorReading, thresholds: &SensorThresholds) -> InterpretedSignals {
    // Both front corners, so a wall met at an angle is still seen
    let front_wall =
        reading[FRONT_RIGHT] > thresholds.front || reading[FRONT_LEFT] > thresholds.front;
    let left_wall = reading[LEFT] > thresholds.left || reading[LEFT_FRONT] > thresholds.left;
    // Left-front only: this is what spikes right after a left turn
    let too_close_left = reading[LEFT_FRONT] > thresholds.too_close;

    InterpretedSignals {
        front_wall,
        left_wall,
        too_close_left,
    }
}
