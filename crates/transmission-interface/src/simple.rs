//! One actuator driving one joint through a fixed reduction.
//!
//! ```text
//! joint position = actuator position / reduction + offset
//! joint velocity = actuator velocity / reduction
//! joint effort   = actuator effort * reduction
//! ```

use crate::error::ParameterError;
use crate::transmission::{check_offset, check_ratio, Quantity, Transmission};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleTransmission {
    reduction: f64,
    offset: f64,
}

impl SimpleTransmission {
    pub const KIND: &'static str = "SimpleTransmission";

    pub fn new(reduction: f64, offset: f64) -> Result<Self, ParameterError> {
        Ok(Self {
            reduction: check_ratio("mechanical_reduction".into(), reduction)?,
            offset: check_offset("offset".into(), offset)?,
        })
    }

    pub fn reduction(&self) -> f64 {
        self.reduction
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl Transmission for SimpleTransmission {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn num_actuators(&self) -> usize {
        1
    }

    fn num_joints(&self) -> usize {
        1
    }

    fn actuator_to_joint(&self, quantity: Quantity, actuator: &[f64], joint: &mut [f64]) {
        debug_assert!(actuator.len() == 1 && joint.len() == 1);
        let a = actuator[0];
        joint[0] = match quantity {
            Quantity::Position => a / self.reduction + self.offset,
            Quantity::Velocity => a / self.reduction,
            Quantity::Effort => a * self.reduction,
        };
    }

    fn joint_to_actuator(&self, quantity: Quantity, joint: &[f64], actuator: &mut [f64]) {
        debug_assert!(actuator.len() == 1 && joint.len() == 1);
        let j = joint[0];
        actuator[0] = match quantity {
            Quantity::Position => (j - self.offset) * self.reduction,
            Quantity::Velocity => j * self.reduction,
            Quantity::Effort => j / self.reduction,
        };
    }
}
