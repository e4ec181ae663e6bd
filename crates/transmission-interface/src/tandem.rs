//! Two actuators driving a single joint in tandem.
//!
//! The joint reads the mean of both actuators; effort is the sum of what
//! each actuator contributes. Commands split the effort evenly. Actuators
//! that disagree cannot be reconstructed from the joint, so only the
//! joint → actuator → joint round trip is exact.

use crate::error::ParameterError;
use crate::transmission::{check_offset, check_ratio, Invertibility, Quantity, Transmission};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TandemTransmission {
    actuator_reduction: [f64; 2],
    joint_offset: f64,
}

impl TandemTransmission {
    pub const KIND: &'static str = "TandemTransmission";

    pub fn new(actuator_reduction: [f64; 2], joint_offset: f64) -> Result<Self, ParameterError> {
        for (i, r) in actuator_reduction.iter().enumerate() {
            check_ratio(format!("actuator_reduction[{i}]"), *r)?;
        }
        Ok(Self {
            actuator_reduction,
            joint_offset: check_offset("joint_offset".into(), joint_offset)?,
        })
    }

    pub fn actuator_reduction(&self) -> [f64; 2] {
        self.actuator_reduction
    }

    pub fn joint_offset(&self) -> f64 {
        self.joint_offset
    }
}

impl Transmission for TandemTransmission {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn num_actuators(&self) -> usize {
        2
    }

    fn num_joints(&self) -> usize {
        1
    }

    fn invertibility(&self) -> Invertibility {
        Invertibility::ActuatorRedundant
    }

    fn actuator_to_joint(&self, quantity: Quantity, actuator: &[f64], joint: &mut [f64]) {
        debug_assert!(actuator.len() == 2 && joint.len() == 1);
        let r = self.actuator_reduction;
        joint[0] = match quantity {
            Quantity::Effort => actuator[0] * r[0] + actuator[1] * r[1],
            Quantity::Velocity => (actuator[0] / r[0] + actuator[1] / r[1]) / 2.0,
            Quantity::Position => {
                (actuator[0] / r[0] + actuator[1] / r[1]) / 2.0 + self.joint_offset
            }
        };
    }

    fn joint_to_actuator(&self, quantity: Quantity, joint: &[f64], actuator: &mut [f64]) {
        debug_assert!(actuator.len() == 2 && joint.len() == 1);
        let r = self.actuator_reduction;
        let j = joint[0];
        for (a, ri) in actuator.iter_mut().zip(r) {
            *a = match quantity {
                Quantity::Effort => j / (2.0 * ri),
                Quantity::Velocity => j * ri,
                Quantity::Position => (j - self.joint_offset) * ri,
            };
        }
    }
}
