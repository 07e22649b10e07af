pub mod math;
pub mod ring_buffer;
pub mod error;
pub mod config;
pub mod platform;
pub mod command;
pub mod sensor;
pub mod pid;
pub mod actuator;
pub mod controller;

pub use ring_buffer::RingBuffer;
pub use error::{Error, Result};
pub use config::ControllerConfig;

pub use platform::{Platform, RackModel, SerialPlatform, SimPlatform};
pub use command::{Command, CommandParser, FrameError, FrameKind, PollResult};
pub use sensor::{HeadingReading, HeadingSensor};
pub use pid::{PidController, PidGains};
pub use actuator::ActuatorDriver;
pub use controller::{
    ControlState, ControllerContext, CycleReport, LinkState,
    SteeringController, WatchdogState,
};
