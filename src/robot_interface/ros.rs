// src/robot_interface/ros.rs
//! ROS 2 runtime over r2r. Proximity values arrive as Float64MultiArray, wheel
//! velocities leave as one Float64 per wheel, and each control period is one
//! spin of the node.
//!
//! The subscription streams stay open for as long as the node lives, so the
//! end of a run is signalled explicitly: any `std_msgs/Empty` on the shutdown
//! topic terminates it.

use std::time::Duration;

use futures::{FutureExt, Stream, StreamExt};
use log::{info, warn};
use r2r::std_msgs::msg::{Empty, Float64, Float64MultiArray};
use r2r::{Context, Node, QosProfile};

use super::{ActuatorPort, SensorPort, StepPrimitive, StepStatus, Wheel};
use crate::config::RosConfig;
use crate::decision::SensorReading;
use crate::{Result, WallFollowerError};

type SensorStream = Box<dyn Stream<Item = Float64MultiArray> + Unpin>;
type ShutdownStream = Box<dyn Stream<Item = Empty> + Unpin>;

/// Robot runtime backed by a ROS 2 node.
pub struct RosRobot {
    node: Node,
    sensor_stream: SensorStream,
    shutdown_stream: ShutdownStream,
    left_wheel: r2r::Publisher<Float64>,
    right_wheel: r2r::Publisher<Float64>,
    latest: Option<Float64MultiArray>,
    spin_period: Option<Duration>,
    stream_closed: bool,
    shutdown_requested: bool,
}

fn ros_error(e: r2r::Error) -> WallFollowerError {
    WallFollowerError::Ros(e.to_string())
}

impl RosRobot {
    /// Creates the node, the proximity subscription and both wheel publishers.
    pub fn new(config: &RosConfig) -> Result<Self> {
        let context = Context::create().map_err(ros_error)?;
        let mut node =
            Node::create(context, &config.node_name, &config.namespace).map_err(ros_error)?;

        let sensor_stream = node
            .subscribe::<Float64MultiArray>(&config.sensor_topic, QosProfile::sensor_data())
            .map_err(ros_error)?;
        let shutdown_stream = node
            .subscribe::<Empty>(&config.shutdown_topic, QosProfile::default())
            .map_err(ros_error)?;
        let left_wheel = node
            .create_publisher::<Float64>(&config.left_wheel_topic, QosProfile::default())
            .map_err(ros_error)?;
        let right_wheel = node
            .create_publisher::<Float64>(&config.right_wheel_topic, QosProfile::default())
            .map_err(ros_error)?;

        info!(
            "ROS node '{}' reading {} and driving {} / {}, stop on {}",
            config.node_name,
            config.sensor_topic,
            config.left_wheel_topic,
            config.right_wheel_topic,
            config.shutdown_topic
        );

        Ok(RosRobot {
            node,
            sensor_stream: Box::new(sensor_stream),
            shutdown_stream: Box::new(shutdown_stream),
            left_wheel,
            right_wheel,
            latest: None,
            spin_period: None,
            stream_closed: false,
            shutdown_requested: false,
        })
    }

    // Keeps only the newest proximity message delivered by the last spin.
    fn drain_streams(&mut self) {
        loop {
            match self.sensor_stream.next().now_or_never() {
                Some(Some(msg)) => self.latest = Some(msg),
                Some(None) => {
                    self.stream_closed = true;
                    break;
                }
                None => break,
            }
        }
        // A closed shutdown stream means the node is going away as well
        while let Some(msg) = self.shutdown_stream.next().now_or_never() {
            self.shutdown_requested = true;
            if msg.is_none() {
                break;
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.stream_closed || self.shutdown_requested
    }
}

impl SensorPort for RosRobot {
    fn enable(&mut self, interval_ms: u32) -> Result<()> {
        self.spin_period = Some(Duration::from_millis(u64::from(interval_ms)));
        Ok(())
    }

    fn read(&mut self) -> Result<SensorReading> {
        if self.spin_period.is_none() {
            return Err(WallFollowerError::SensorsDisabled);
        }
        match &self.latest {
            Some(msg) => SensorReading::from_slice(&msg.data),
            None => Err(WallFollowerError::NoSensorData),
        }
    }
}

impl ActuatorPort for RosRobot {
    fn set_velocity(&mut self, wheel: Wheel, value: f64) -> Result<()> {
        let publisher = match wheel {
            Wheel::Left => &self.left_wheel,
            Wheel::Right => &self.right_wheel,
        };
        publisher.publish(&Float64 { data: value }).map_err(ros_error)
    }
}

impl StepPrimitive for RosRobot {
    fn advance(&mut self, interval_ms: u32) -> StepStatus {
        let period = self
            .spin_period
            .unwrap_or(Duration::from_millis(u64::from(interval_ms)));
        self.node.spin_once(period);
        self.drain_streams();
        // Block until the first proximity message so read() never comes up empty
        while self.latest.is_none() && !self.should_stop() {
            self.node.spin_once(period);
            self.drain_streams();
        }
        if self.shutdown_requested {
            info!("Shutdown requested, ending run");
            return StepStatus::Terminated;
        }
        if self.stream_closed {
            warn!("Proximity subscription closed, ending run");
            return StepStatus::Terminated;
        }
        StepStatus::Continue
    }
}
