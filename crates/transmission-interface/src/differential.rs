//! Two actuators coupled to two joints through a differential.
//!
//! Typical of wrists: driving both actuators the same way moves the first
//! joint, driving them in opposition moves the second.
//!
//! ```text
//! jv0 = (av0/ar0 + av1/ar1) / (2 jr0)        je0 = jr0 (ae0 ar0 + ae1 ar1)
//! jv1 = (av0/ar0 - av1/ar1) / (2 jr1)        je1 = jr1 (ae0 ar0 - ae1 ar1)
//! ```
//!
//! Positions follow velocities plus the joint offsets.

use crate::error::ParameterError;
use crate::transmission::{check_offset, check_ratio, Quantity, Transmission};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialTransmission {
    actuator_reduction: [f64; 2],
    joint_reduction: [f64; 2],
    joint_offset: [f64; 2],
}

impl DifferentialTransmission {
    pub const KIND: &'static str = "DifferentialTransmission";

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

impl Transmission for DifferentialTransmission {
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
                joint[0] = jr[0] * (actuator[0] * ar[0] + actuator[1] * ar[1]);
                joint[1] = jr[1] * (actuator[0] * ar[0] - actuator[1] * ar[1]);
            }
            Quantity::Velocity | Quantity::Position => {
                let a0 = actuator[0] / ar[0];
                let a1 = actuator[1] / ar[1];
                joint[0] = (a0 + a1) / (2.0 * jr[0]);
                joint[1] = (a0 - a1) / (2.0 * jr[1]);
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
                let j0 = joint[0] / jr[0];
                let j1 = joint[1] / jr[1];
                actuator[0] = (j0 + j1) / (2.0 * ar[0]);
                actuator[1] = (j0 - j1) / (2.0 * ar[1]);
            }
            Quantity::Velocity | Quantity::Position => {
                let (mut j0, mut j1) = (joint[0], joint[1]);
                if quantity == Quantity::Position {
                    j0 -= self.joint_offset[0];
                    j1 -= self.joint_offset[1];
                }
                actuator[0] = (j0 * jr[0] + j1 * jr[1]) * ar[0];
                actuator[1] = (j0 * jr[0] - j1 * jr[1]) * ar[1];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transmission::testing::{assert_actuator_round_trip, assert_joint_round_trip, close};

    #[test]
    fn zero_reductions_are_rejected() {
        let err = DifferentialTransmission::new([10.0, 0.0], [1.0, 1.0], [0.0, 0.0]).unwrap_err();
        assert_eq!(err.parameter, "actuator_reduction[1]");
        assert!(DifferentialTransmission::new([10.0, 10.0], [0.0, 1.0], [0.0, 0.0]).is_err());
    }

    #[test]
    fn common_and_differential_motion() {
        let t = DifferentialTransmission::new([10.0, 10.0], [1.0, 1.0], [0.0, 0.0]).unwrap();
        let mut j = [0.0; 2];
        t.actuator_to_joint(Quantity::Velocity, &[10.0, 10.0], &mut j);
        assert!(close(j[0], 1.0) && close(j[1], 0.0));
        t.actuator_to_joint(Quantity::Velocity, &[10.0, -10.0], &mut j);
        assert!(close(j[0], 0.0) && close(j[1], 1.0));
        t.actuator_to_joint(Quantity::Effort, &[1.0, 1.0], &mut j);
        assert!(close(j[0], 20.0) && close(j[1], 0.0));
    }

    #[test]
    fn offsets_shift_positions() {
        let t = DifferentialTransmission::new([10.0, 10.0], [1.0, 1.0], [0.5, -0.5]).unwrap();
        let mut j = [0.0; 2];
        t.actuator_to_joint(Quantity::Position, &[0.0, 0.0], &mut j);
        assert!(close(j[0], 0.5) && close(j[1], -0.5));
        t.actuator_to_joint(Quantity::Velocity, &[0.0, 0.0], &mut j);
        assert!(close(j[0], 0.0) && close(j[1], 0.0));
    }

    #[test]
    fn power_is_conserved() {
        let t = DifferentialTransmission::new([20.0, -15.0], [2.0, 0.5], [0.0, 0.0]).unwrap();
        let (av, ae) = ([3.0, -1.5], [0.2, 0.7]);
        let (mut jv, mut je) = ([0.0; 2], [0.0; 2]);
        t.actuator_to_joint(Quantity::Velocity, &av, &mut jv);
        t.actuator_to_joint(Quantity::Effort, &ae, &mut je);
        let p_act = av[0] * ae[0] + av[1] * ae[1];
        let p_jnt = jv[0] * je[0] + jv[1] * je[1];
        assert!(close(p_act, p_jnt));
    }

    #[test]
    fn round_trips() {
        let t = DifferentialTransmission::new([20.0, -15.0], [2.0, 0.5], [0.1, -0.2]).unwrap();
        assert_joint_round_trip(&t);
        assert_actuator_round_trip(&t);
    }
}
