// decision/mod.rs

//! Per-tick decision core: sensor interpretation, state classification and the
//! stuck tracker. Everything here is synchronous and free of I/O.

pub mod perception;
pub mod state;

pub use perception::{InterpretedSignals, SENSOR_COUNT, SensorReading, interpret};
pub use state::{NavigationState, StuckTracker, classify};
