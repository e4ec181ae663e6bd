//! Table of known transmission types and how to build them.

use core::fmt;
use std::collections::BTreeMap;

use crate::differential::DifferentialTransmission;
use crate::error::ParameterError;
use crate::four_bar::FourBarLinkageTransmission;
use crate::simple::SimpleTransmission;
use crate::tandem::TandemTransmission;
use crate::transmission::Transmission;

/// Prefix some descriptions put in front of type tags.
pub const TYPE_PREFIX: &str = "transmission_interface/";

/// Numeric parameters of one transmission, in role order.
///
/// The loader fills every vector to the arity of the type: joint reductions
/// default to 1 and offsets to 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransmissionParameters {
    pub actuator_reduction: Vec<f64>,
    pub joint_reduction: Vec<f64>,
    pub joint_offset: Vec<f64>,
}

pub type BuildFn = fn(&TransmissionParameters) -> Result<Box<dyn Transmission>, ParameterError>;

/// Arity, role names and constructor of one transmission type.
#[derive(Clone, Copy)]
pub struct TransmissionSpec {
    pub kind: &'static str,
    pub actuators: usize,
    pub joints: usize,
    /// Expected actuator roles, in order. Empty when the type has none.
    pub actuator_roles: &'static [&'static str],
    pub joint_roles: &'static [&'static str],
    /// Whether joints may declare a `mechanical_reduction`.
    pub joint_reduction: bool,
    pub build: BuildFn,
}

impl fmt::Debug for TransmissionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransmissionSpec")
            .field("kind", &self.kind)
            .field("actuators", &self.actuators)
            .field("joints", &self.joints)
            .field("actuator_roles", &self.actuator_roles)
            .field("joint_roles", &self.joint_roles)
            .field("joint_reduction", &self.joint_reduction)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransmissionFactory {
    specs: BTreeMap<&'static str, TransmissionSpec>,
}

impl TransmissionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory knowing the four built-in types.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        for spec in [SIMPLE, DIFFERENTIAL, FOUR_BAR, TANDEM] {
            factory.register(spec);
        }
        factory
    }

    /// Add a type, returning the one it replaces.
    pub fn register(&mut self, spec: TransmissionSpec) -> Option<TransmissionSpec> {
        self.specs.insert(spec.kind, spec)
    }

    /// Look up a type tag, ignoring the `transmission_interface/` prefix.
    pub fn spec(&self, kind: &str) -> Option<&TransmissionSpec> {
        let kind = kind.strip_prefix(TYPE_PREFIX).unwrap_or(kind);
        self.specs.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }
}

fn pair(values: &[f64]) -> [f64; 2] {
    [
        values.first().copied().unwrap_or_default(),
        values.get(1).copied().unwrap_or_default(),
    ]
}

fn build_simple(p: &TransmissionParameters) -> Result<Box<dyn Transmission>, ParameterError> {
    let [reduction, _] = pair(&p.actuator_reduction);
    let [offset, _] = pair(&p.joint_offset);
    Ok(Box::new(SimpleTransmission::new(reduction, offset)?))
}

fn build_differential(p: &TransmissionParameters) -> Result<Box<dyn Transmission>, ParameterError> {
    Ok(Box::new(DifferentialTransmission::new(
        pair(&p.actuator_reduction),
        pair(&p.joint_reduction),
        pair(&p.joint_offset),
    )?))
}

fn build_four_bar(p: &TransmissionParameters) -> Result<Box<dyn Transmission>, ParameterError> {
    Ok(Box::new(FourBarLinkageTransmission::new(
        pair(&p.actuator_reduction),
        pair(&p.joint_reduction),
        pair(&p.joint_offset),
    )?))
}

fn build_tandem(p: &TransmissionParameters) -> Result<Box<dyn Transmission>, ParameterError> {
    let [offset, _] = pair(&p.joint_offset);
    Ok(Box::new(TandemTransmission::new(
        pair(&p.actuator_reduction),
        offset,
    )?))
}

const TWO_ACTUATORS: &[&str] = &["actuator1", "actuator2"];
const TWO_JOINTS: &[&str] = &["joint1", "joint2"];

pub const SIMPLE: TransmissionSpec = TransmissionSpec {
    kind: SimpleTransmission::KIND,
    actuators: 1,
    joints: 1,
    actuator_roles: &[],
    joint_roles: &[],
    joint_reduction: false,
    build: build_simple,
};

pub const DIFFERENTIAL: TransmissionSpec = TransmissionSpec {
    kind: DifferentialTransmission::KIND,
    actuators: 2,
    joints: 2,
    actuator_roles: TWO_ACTUATORS,
    joint_roles: TWO_JOINTS,
    joint_reduction: true,
    build: build_differential,
};

pub const FOUR_BAR: TransmissionSpec = TransmissionSpec {
    kind: FourBarLinkageTransmission::KIND,
    actuators: 2,
    joints: 2,
    actuator_roles: TWO_ACTUATORS,
    joint_roles: TWO_JOINTS,
    joint_reduction: true,
    build: build_four_bar,
};

pub const TANDEM: TransmissionSpec = TransmissionSpec {
    kind: TandemTransmission::KIND,
    actuators: 2,
    joints: 1,
    actuator_roles: TWO_ACTUATORS,
    joint_roles: &[],
    joint_reduction: false,
    build: build_tandem,
};
