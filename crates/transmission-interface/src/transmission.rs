//! The [`Transmission`] trait: numeric maps between actuator and joint space.
//!
//! Implementations are pure and stateless beyond their fixed parameters.
//! Inputs and outputs are plain slices whose lengths match
//! [`Transmission::num_actuators`] and [`Transmission::num_joints`]; the
//! loader guarantees this before a transmission becomes active.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// The physical quantity a value represents; each transforms differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Position,
    Velocity,
    Effort,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::Position, Quantity::Velocity, Quantity::Effort];
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Position => write!(f, "position"),
            Quantity::Velocity => write!(f, "velocity"),
            Quantity::Effort => write!(f, "effort"),
        }
    }
}

/// Which round trips reproduce their input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Invertibility {
    /// actuator → joint → actuator and joint → actuator → joint are both
    /// the identity.
    Bijective,
    /// More actuators than joints: joint → actuator → joint is the identity,
    /// actuator → joint → actuator is not (disagreeing actuators are averaged).
    ActuatorRedundant,
}

pub trait Transmission: fmt::Debug + Send + Sync {
    /// Type tag, e.g. `"SimpleTransmission"`.
    fn kind(&self) -> &'static str;

    fn num_actuators(&self) -> usize;

    fn num_joints(&self) -> usize;

    fn invertibility(&self) -> Invertibility {
        Invertibility::Bijective
    }

    /// Map actuator values to joint values.
    fn actuator_to_joint(&self, quantity: Quantity, actuator: &[f64], joint: &mut [f64]);

    /// Map joint values to actuator values.
    fn joint_to_actuator(&self, quantity: Quantity, joint: &[f64], actuator: &mut [f64]);
}

pub(crate) fn check_ratio(parameter: String, value: f64) -> Result<f64, ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError {
            parameter,
            value,
            reason: "must be finite",
        });
    }
    if value == 0.0 {
        return Err(ParameterError {
            parameter,
            value,
            reason: "must be non-zero",
        });
    }
    Ok(value)
}

pub(crate) fn check_offset(parameter: String, value: f64) -> Result<f64, ParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError {
            parameter,
            value,
            reason: "must be finite",
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) const EPS: f64 = 1e-9;

    /// Representative values: zero, negatives, fractions and large magnitudes.
    pub(crate) const SAMPLES: [f64; 7] = [0.0, 1.0, -1.0, 0.5, -3.75, 1.0e6, -2.5e7];

    pub(crate) fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS * (1.0 + a.abs().max(b.abs()))
    }

    // Tolerance scaled by the largest magnitude in the vector being compared.
    fn close_in(a: f64, b: f64, values: &[f64]) -> bool {
        let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        (a - b).abs() <= EPS * (1.0 + scale)
    }

    /// joint → actuator → joint for every quantity and sample pair.
    pub(crate) fn assert_joint_round_trip(t: &dyn Transmission) {
        for q in Quantity::ALL {
            for x in SAMPLES {
                for y in SAMPLES {
                    let jnt: Vec<f64> = [x, y].into_iter().take(t.num_joints()).collect();
                    let mut act = vec![0.0; t.num_actuators()];
                    let mut back = vec![0.0; t.num_joints()];
                    t.joint_to_actuator(q, &jnt, &mut act);
                    t.actuator_to_joint(q, &act, &mut back);
                    for (a, b) in jnt.iter().zip(&back) {
                        assert!(close_in(*a, *b, &jnt), "{q}: {jnt:?} -> {act:?} -> {back:?}");
                    }
                }
            }
        }
    }

    /// actuator → joint → actuator for every quantity and sample pair.
    pub(crate) fn assert_actuator_round_trip(t: &dyn Transmission) {
        for q in Quantity::ALL {
            for x in SAMPLES {
                for y in SAMPLES {
                    let act: Vec<f64> = [x, y].into_iter().take(t.num_actuators()).collect();
                    let mut jnt = vec![0.0; t.num_joints()];
                    let mut back = vec![0.0; t.num_actuators()];
                    t.actuator_to_joint(q, &act, &mut jnt);
                    t.joint_to_actuator(q, &jnt, &mut back);
                    for (a, b) in act.iter().zip(&back) {
                        assert!(close_in(*a, *b, &act), "{q}: {act:?} -> {jnt:?} -> {back:?}");
                    }
                }
            }
        }
    }
}
