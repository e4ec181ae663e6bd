//! robot-hw: the composition root tying storage, interfaces and transmissions
//!
//! [`RobotBackend`] owns the raw storage a driver reads and writes, registers
//! handles to it in the standard hardware interfaces (plus any custom ones),
//! and loads the robot's transmissions from a description so that
//! [`RobotBackend::read`] and [`RobotBackend::write`] move values between
//! actuator and joint space every cycle.

mod error;
pub use error::{BackendError, Result};

mod config;
pub use config::{load_config_file, BackendConfig, JointConfig};

mod storage;
pub use storage::{ActuatorStorage, JointStorage, ModeStorage, ResourceStorage};

mod backend;
pub use backend::{RobotBackend, RobotBackendBuilder};
