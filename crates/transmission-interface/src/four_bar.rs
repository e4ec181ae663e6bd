//! Two actuators, two joints, where the second joint is driven through a
//! four-bar linkage mounted on the first.
//!
//! The first actuator moves only the first joint; the second joint sees the
//! second actuator's motion relative to the first joint.
//!
//! ```text
//! jv0 = av0 / (jr0 ar0)
//! jv1 = (av1 / ar1 - jv0) / jr1
//! ```
//!
//! Efforts use the power-conjugate map so that `av . ae == jv . je`.

use crate::error::ParameterError;
use crate::transmission::{check_offset, check_ratio, Quantity, Transmission};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourBarLinkageTransmission {
    actuator_reduction: [f64; 2],
    joint_reduction: [f64; 2],
    joint_offset: [f64; 2],
}

impl FourBarLinkageTransmission {
    pub const KIND: &'static str = "FourBarLinkageTransmission";

    pub fn new(
        actuator_reduction: [f64; 2],
        joint_reduction: [f64; 2],
        joint_offset: [f64; 2],
    ) -> Result<Self, ParameterError> {
        for (i, r) in actuator_reduction.iter().enumerate() {
            check_ratio(format!("actuator_reduction[{i}]"), *r)?;
        }
        for (i, r) in joint_reduction.iter().enumerate() {
            check_ratio(format!("joint_reduction[{i}]"), *r)?;
        }
        for (i, o) in joint_offset.iter().enumerate() {
            check_offset(format!("joint_offset[{i}]"), *o)?;
        }
        Ok(Self {
            actuator_reduction,
            joint_reduction,
            joint_offset,
        })
    }

    pub fn actuator_reduction(&self) -> [f64; 2] {
        self.actuator_reduction
    }

    pub fn joint_reduction(&self) -> [f64; 2] {
        self.joint_reduction
    }

    pub fn joint_offset(&self) -> [f64; 2] {
        self.joint_offset
    }
}

impl Transmission for FourBarLinkageTransmission {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn num_actuators(&self) -> usize {
        2
    }

    fn num_joints(&self) -> usize {
        2
    }

    fn actuator_to_joint(&self, quantity: Quantity, actuator: &[f64], joint: &mut [f64]) {
        debug_assert!(actuator.len() == 2 && joint.len() == 2);
        let ar = self.actuator_reduction;
        let jr = self.joint_reduction;
        match quantity {
            Quantity::Effort => {
                joint[0] = jr[0] * ar[0] * actuator[0] + ar[1] * actuator[1];
                joint[1] = jr[1] * ar[1] * actuator[1];
            }
            Quantity::Velocity | Quantity::Position => {
                let j0 = actuator[0] / (jr[0] * ar[0]);
                let j1 = (actuator[1] / ar[1] - j0) / jr[1];
                joint[0] = j0;
                joint[1] = j1;
                if quantity == Quantity::Position {
                    joint[0] += self.joint_offset[0];
                    joint[1] += self.joint_offset[1];
                }
            }
        }
    }

    fn joint_to_actuator(&self, quantity: Quantity, joint: &[f64], actuator: &mut [f64]) {
        debug_assert!(actuator.len() == 2 && joint.len() == 2);
        let ar = self.actuator_reduction;
        let jr = self.joint_reduction;
        match quantity {
            Quantity::Effort => {
                actuator[1] = joint[1] / (jr[1] * ar[1]);
                actuator[0] = (joint[0] - ar[1] * actuator[1]) / (jr[0] * ar[0]);
            }
            Quantity::Velocity | Quantity::Position => {
                let (mut j0, mut j1) = (joint[0], joint[1]);
                if quantity == Quantity::Position {
                    j0 -= self.joint_offset[0];
                    j1 -= self.joint_offset[1];
                }
                actuator[0] = jr[0] * ar[0] * j0;
                actuator[1] = ar[1] * (jr[1] * j1 + j0);
            }
        }
    }
}
