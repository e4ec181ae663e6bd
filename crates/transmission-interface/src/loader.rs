//! Turning transmission declarations into wired, active transmissions.
//!
//! Each declaration moves through `Unloaded → Validated → Wired → Active`.
//! The first two steps are separate methods on [`TransmissionLoader`] so
//! callers can check a description without touching storage; [`load`]
//! runs all of them and keeps going past broken declarations.
//!
//! [`load`]: TransmissionLoader::load

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use hardware_interface::{
    ActuatorState, ActuatorStateHandle, DiagnosticSink, InterfaceKind, InterfaceSet, JointState,
    JointStateHandle, Slot, StateHandle, TracingSink,
};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::debug;

use crate::bindings::InterfaceBindings;
use crate::error::{Result, TransmissionError};
use crate::factory::{TransmissionFactory, TransmissionParameters, TransmissionSpec};
use crate::info::TransmissionInfo;
use crate::robot_transmissions::{ActiveTransmission, ChannelBinding, RobotTransmissions};
use crate::transmission::{Quantity, Transmission};

const COMPONENT: &str = "transmission_loader";

/// How far one declaration got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionState {
    Unloaded,
    Validated,
    Wired,
    Active,
}

/// A declaration that passed every check, with roles in canonical order and
/// its numeric mapping built.
#[derive(Debug)]
pub struct ValidatedTransmission {
    info: TransmissionInfo,
    transmission: Box<dyn Transmission>,
}

impl ValidatedTransmission {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &TransmissionInfo {
        &self.info
    }

    pub fn transmission(&self) -> &dyn Transmission {
        self.transmission.as_ref()
    }
}

/// A validated transmission bound to storage, ready to join a
/// [`RobotTransmissions`] set.
#[derive(Debug)]
pub struct WiredTransmission {
    active: ActiveTransmission,
}

impl WiredTransmission {
    pub fn name(&self) -> &str {
        self.active.name()
    }

    pub fn state_channels(&self) -> &[ChannelBinding] {
        self.active.state_channels()
    }

    pub fn command_channels(&self) -> &[ChannelBinding] {
        self.active.command_channels()
    }

    pub fn activate(self, set: &mut RobotTransmissions) {
        set.push(self.active);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub name: String,
    pub state: TransmissionState,
    #[serde(serialize_with = "error_message")]
    pub error: Option<TransmissionError>,
}

fn error_message<S: serde::Serializer>(
    error: &Option<TransmissionError>,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Result of [`TransmissionLoader::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub outcomes: Vec<LoadOutcome>,
    pub transmissions: RobotTransmissions,
}

impl LoadReport {
    pub fn failures(&self) -> impl Iterator<Item = &LoadOutcome> + '_ {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    /// True when every declaration became active.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn outcome(&self, name: &str) -> Option<&LoadOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

pub struct TransmissionLoader<'a> {
    interfaces: &'a InterfaceSet,
    factory: TransmissionFactory,
    bindings: InterfaceBindings,
    sink: Arc<dyn DiagnosticSink>,
}

impl<'a> TransmissionLoader<'a> {
    pub fn new(interfaces: &'a InterfaceSet) -> Self {
        Self {
            interfaces,
            factory: TransmissionFactory::with_defaults(),
            bindings: InterfaceBindings::standard(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_factory(mut self, factory: TransmissionFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_bindings(mut self, bindings: InterfaceBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Load every declaration, skipping (and reporting) the ones that fail.
    ///
    /// Besides the per-declaration checks, a transmission name may be used
    /// once and a joint or actuator may be driven by one transmission only.
    pub fn load(&self, infos: &[TransmissionInfo]) -> LoadReport {
        let mut report = LoadReport::default();
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        for info in infos {
            let (state, error) = match self.load_one(info, &report.transmissions, &owners) {
                Ok(wired) => {
                    for name in wired.active.actuators.iter().chain(&wired.active.joints) {
                        owners.insert(name.clone(), info.name.clone());
                    }
                    wired.activate(&mut report.transmissions);
                    (TransmissionState::Active, None)
                }
                Err((state, e)) => {
                    self.sink
                        .warning(COMPONENT, format!("skipping transmission: {e}"));
                    (state, Some(e))
                }
            };
            report.outcomes.push(LoadOutcome {
                name: info.name.clone(),
                state,
                error,
            });
        }
        self.sink.info(
            COMPONENT,
            format!(
                "loaded {} of {} transmissions",
                report.transmissions.len(),
                infos.len()
            ),
        );
        report
    }

    fn load_one(
        &self,
        info: &TransmissionInfo,
        active: &RobotTransmissions,
        owners: &BTreeMap<String, String>,
    ) -> core::result::Result<WiredTransmission, (TransmissionState, TransmissionError)> {
        if active.get(&info.name).is_some() {
            return Err((
                TransmissionState::Unloaded,
                TransmissionError::configuration(&info.name, "name is already in use"),
            ));
        }
        let validated = self
            .validate(info)
            .map_err(|e| (TransmissionState::Unloaded, e))?;
        let resources = validated
            .info
            .actuators
            .iter()
            .map(|a| (&a.name, "actuator"))
            .chain(validated.info.joints.iter().map(|j| (&j.name, "joint")));
        for (name, role) in resources {
            if let Some(owner) = owners.get(name) {
                return Err((
                    TransmissionState::Validated,
                    TransmissionError::configuration(
                        &info.name,
                        format!("{role} '{name}' is already driven by transmission '{owner}'"),
                    ),
                ));
            }
        }
        self.wire(validated)
            .map_err(|e| (TransmissionState::Validated, e))
    }

    /// Check one declaration and build its numeric mapping.
    pub fn validate(&self, info: &TransmissionInfo) -> Result<ValidatedTransmission> {
        let name = info.name.as_str();
        if name.trim().is_empty() {
            return Err(TransmissionError::configuration(name, "name is empty"));
        }
        let spec = self
            .factory
            .spec(&info.kind)
            .ok_or_else(|| TransmissionError::UnknownType {
                transmission: name.to_string(),
                kind: info.kind.clone(),
            })?;
        check_arity(name, "actuator", spec.actuators, info.actuators.len())?;
        check_arity(name, "joint", spec.joints, info.joints.len())?;

        let mut seen = BTreeSet::new();
        for resource in info
            .actuators
            .iter()
            .map(|a| &a.name)
            .chain(info.joints.iter().map(|j| &j.name))
        {
            if resource.trim().is_empty() {
                return Err(TransmissionError::configuration(
                    name,
                    "actuator and joint names must not be empty",
                ));
            }
            if !seen.insert(resource.as_str()) {
                return Err(TransmissionError::configuration(
                    name,
                    format!("'{resource}' is listed more than once"),
                ));
            }
        }

        let mut info = info.clone();
        let actuator_roles: Vec<Option<&str>> =
            info.actuators.iter().map(|a| a.role.as_deref()).collect();
        let order = role_order(name, "actuator", spec.actuator_roles, &actuator_roles)?;
        info.actuators = order
            .into_iter()
            .map(|i| info.actuators[i].clone())
            .collect();
        let joint_roles: Vec<Option<&str>> =
            info.joints.iter().map(|j| j.role.as_deref()).collect();
        let order = role_order(name, "joint", spec.joint_roles, &joint_roles)?;
        info.joints = order.into_iter().map(|i| info.joints[i].clone()).collect();

        let params = parameters(&info, spec)?;

        for joint in &info.joints {
            if joint.hardware_interfaces.is_empty() {
                return Err(TransmissionError::configuration(
                    name,
                    format!("joint '{}' declares no hardware interface", joint.name),
                ));
            }
        }

        let actuator_state = self.interfaces.get::<ActuatorState>()?;
        for actuator in &info.actuators {
            if !actuator_state.contains(&actuator.name) {
                return Err(missing(name, ActuatorState::NAME, &actuator.name));
            }
        }
        let joint_state = self.interfaces.get::<JointState>()?;
        for joint in &info.joints {
            if !joint_state.contains(&joint.name) {
                return Err(missing(name, JointState::NAME, &joint.name));
            }
        }

        let transmission = (spec.build)(&params).map_err(|source| TransmissionError::Build {
            transmission: name.to_string(),
            source,
        })?;
        // a custom build fn must agree with the arity its type declares
        check_arity(name, "actuator", spec.actuators, transmission.num_actuators())?;
        check_arity(name, "joint", spec.joints, transmission.num_joints())?;
        debug!(transmission = name, kind = spec.kind, "validated transmission");
        Ok(ValidatedTransmission { info, transmission })
    }

    /// Bind a validated transmission to the handles registered in the
    /// interface set.
    pub fn wire(&self, validated: ValidatedTransmission) -> Result<WiredTransmission> {
        let ValidatedTransmission { info, transmission } = validated;
        let name = info.name.as_str();
        let actuator_state = self.interfaces.get::<ActuatorState>()?;
        let joint_state = self.interfaces.get::<JointState>()?;
        let actuators = info
            .actuators
            .iter()
            .map(|a| actuator_state.handle(&a.name))
            .collect::<hardware_interface::Result<Vec<ActuatorStateHandle>>>()?;
        let joints = info
            .joints
            .iter()
            .map(|j| joint_state.handle(&j.name))
            .collect::<hardware_interface::Result<Vec<JointStateHandle>>>()?;

        let mut state = Vec::new();
        for quantity in Quantity::ALL {
            state.push(ChannelBinding {
                label: quantity.to_string(),
                quantity,
                actuators: state_slots(name, &actuators, quantity)?,
                joints: state_slots(name, &joints, quantity)?,
            });
        }
        for (channel, quantity) in self.bindings.state_channels() {
            let a: Option<SmallVec<[Slot; 2]>> = actuators
                .iter()
                .map(|h| h.channel_slot(channel).cloned())
                .collect();
            let j: Option<SmallVec<[Slot; 2]>> = joints
                .iter()
                .map(|h| h.channel_slot(channel).cloned())
                .collect();
            if let (Some(actuators), Some(joints)) = (a, j) {
                state.push(ChannelBinding {
                    label: channel.to_string(),
                    quantity,
                    actuators,
                    joints,
                });
            }
        }

        let mut declared: Vec<&str> = Vec::new();
        for interface in info.joints.iter().flat_map(|j| &j.hardware_interfaces) {
            if !declared.contains(&interface.as_str()) {
                declared.push(interface);
            }
        }
        let mut commands = Vec::new();
        for interface in declared {
            let route = self.bindings.route(interface).ok_or_else(|| {
                TransmissionError::configuration(
                    name,
                    format!("unsupported hardware interface '{interface}'"),
                )
            })?;
            let joint_slots = info
                .joints
                .iter()
                .map(|j| {
                    route.joint_slot(self.interfaces, &j.name).ok_or_else(|| {
                        wrong_interface(name, &j.name, route.joint_interface)
                    })
                })
                .collect::<Result<SmallVec<[Slot; 2]>>>()?;
            let actuator_slots = info
                .actuators
                .iter()
                .map(|a| {
                    route.actuator_slot(self.interfaces, &a.name).ok_or_else(|| {
                        wrong_interface(name, &a.name, route.actuator_interface)
                    })
                })
                .collect::<Result<SmallVec<[Slot; 2]>>>()?;
            commands.push(ChannelBinding {
                label: route.joint_interface.to_string(),
                quantity: route.quantity,
                actuators: actuator_slots,
                joints: joint_slots,
            });
        }

        debug!(
            transmission = name,
            state_channels = state.len(),
            command_channels = commands.len(),
            "wired transmission"
        );
        Ok(WiredTransmission {
            active: ActiveTransmission {
                name: info.name.clone(),
                transmission,
                actuators: info.actuators.iter().map(|a| a.name.clone()).collect(),
                joints: info.joints.iter().map(|j| j.name.clone()).collect(),
                state,
                commands,
            },
        })
    }
}

fn check_arity(transmission: &str, role: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(TransmissionError::Arity {
            transmission: transmission.to_string(),
            role,
            expected,
            found,
        })
    }
}

fn missing(transmission: &str, interface: &str, name: &str) -> TransmissionError {
    TransmissionError::MissingResource {
        transmission: transmission.to_string(),
        interface: interface.to_string(),
        name: name.to_string(),
    }
}

fn wrong_interface(transmission: &str, resource: &str, interface: &str) -> TransmissionError {
    TransmissionError::WrongInterface {
        transmission: transmission.to_string(),
        resource: resource.to_string(),
        interface: interface.to_string(),
    }
}

/// Indices putting `given` roles into the order of `expected`.
///
/// Roles are all-or-nothing; without roles the declaration order is kept.
/// Types without role names ignore them.
fn role_order(
    transmission: &str,
    kind: &str,
    expected: &[&str],
    given: &[Option<&str>],
) -> Result<Vec<usize>> {
    let declared = given.iter().filter(|r| r.is_some()).count();
    if expected.is_empty() || declared == 0 {
        return Ok((0..given.len()).collect());
    }
    if declared != given.len() {
        return Err(TransmissionError::configuration(
            transmission,
            format!("either every {kind} has a role or none does"),
        ));
    }
    let mut order = Vec::with_capacity(expected.len());
    for role in expected {
        let matches: Vec<usize> = given
            .iter()
            .enumerate()
            .filter(|(_, r)| **r == Some(*role))
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [i] => order.push(*i),
            [] => {
                return Err(TransmissionError::configuration(
                    transmission,
                    format!(
                        "no {kind} has role '{role}' (expected {})",
                        expected.join(", ")
                    ),
                ))
            }
            _ => {
                return Err(TransmissionError::configuration(
                    transmission,
                    format!("role '{role}' is given to more than one {kind}"),
                ))
            }
        }
    }
    Ok(order)
}

fn parameters(info: &TransmissionInfo, spec: &TransmissionSpec) -> Result<TransmissionParameters> {
    let name = info.name.as_str();
    let mut params = TransmissionParameters::default();
    for actuator in &info.actuators {
        let reduction =
            actuator
                .mechanical_reduction
                .ok_or_else(|| TransmissionError::MissingParameter {
                    transmission: name.to_string(),
                    resource: actuator.name.clone(),
                    parameter: "mechanical_reduction",
                })?;
        params
            .actuator_reduction
            .push(ratio(name, &actuator.name, "mechanical_reduction", reduction)?);
    }
    for joint in &info.joints {
        let reduction = match joint.mechanical_reduction {
            Some(_) if !spec.joint_reduction => {
                return Err(TransmissionError::UnexpectedParameter {
                    transmission: name.to_string(),
                    resource: joint.name.clone(),
                    parameter: "mechanical_reduction",
                })
            }
            Some(r) => ratio(name, &joint.name, "mechanical_reduction", r)?,
            None => 1.0,
        };
        let offset = joint.offset.unwrap_or(0.0);
        if !offset.is_finite() {
            return Err(TransmissionError::InvalidParameter {
                transmission: name.to_string(),
                resource: joint.name.clone(),
                parameter: "offset",
                value: offset,
            });
        }
        params.joint_reduction.push(reduction);
        params.joint_offset.push(offset);
    }
    Ok(params)
}

fn ratio(transmission: &str, resource: &str, parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value != 0.0 {
        Ok(value)
    } else {
        Err(TransmissionError::InvalidParameter {
            transmission: transmission.to_string(),
            resource: resource.to_string(),
            parameter,
            value,
        })
    }
}

fn state_slots<S: hardware_interface::Space>(
    transmission: &str,
    handles: &[StateHandle<S>],
    quantity: Quantity,
) -> Result<SmallVec<[Slot; 2]>> {
    handles
        .iter()
        .map(|h| {
            let slot = match quantity {
                Quantity::Position => h.position_slot(),
                Quantity::Velocity => h.velocity_slot(),
                Quantity::Effort => h.effort_slot(),
            };
            slot.cloned().ok_or_else(|| {
                TransmissionError::configuration(
                    transmission,
                    format!("'{}' has no {quantity} storage", h.name()),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{ActuatorInfo, JointInfo};
    use hardware_interface::{
        ActuatorHandle, ActuatorStateInterface, CollectingSink, JointHandle, JointStateInterface,
        PositionActuatorInterface, PositionJointInterface, Severity,
    };

    struct Rig {
        set: InterfaceSet,
        act_pos: Vec<Slot>,
        jnt_pos: Vec<Slot>,
        act_cmd: Vec<Slot>,
        jnt_cmd: Vec<Slot>,
    }

    fn slots() -> [Option<Slot>; 3] {
        [Some(Slot::default()), Some(Slot::default()), Some(Slot::default())]
    }

    fn rig(actuators: &[&str], joints: &[&str]) -> Rig {
        let mut act_state = ActuatorStateInterface::new();
        let mut act_cmd_iface = PositionActuatorInterface::new();
        let mut jnt_state = JointStateInterface::new();
        let mut jnt_cmd_iface = PositionJointInterface::new();
        let mut rig_slots = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        for name in actuators {
            let [p, v, e] = slots();
            let h = StateHandle::new(*name, p, v, e).unwrap();
            rig_slots.0.push(h.position_slot().cloned().unwrap());
            let cmd = Slot::default();
            rig_slots.2.push(cmd.clone());
            act_cmd_iface
                .register_handle(ActuatorHandle::new(h.clone(), Some(cmd)).unwrap())
                .unwrap();
            act_state.register_handle(h).unwrap();
        }
        for name in joints {
            let [p, v, e] = slots();
            let h = StateHandle::new(*name, p, v, e).unwrap();
            rig_slots.1.push(h.position_slot().cloned().unwrap());
            let cmd = Slot::default();
            rig_slots.3.push(cmd.clone());
            jnt_cmd_iface
                .register_handle(JointHandle::new(h.clone(), Some(cmd)).unwrap())
                .unwrap();
            jnt_state.register_handle(h).unwrap();
        }
        let mut set = InterfaceSet::new();
        set.register(act_state).unwrap();
        set.register(act_cmd_iface).unwrap();
        set.register(jnt_state).unwrap();
        set.register(jnt_cmd_iface).unwrap();
        Rig {
            set,
            act_pos: rig_slots.0,
            jnt_pos: rig_slots.1,
            act_cmd: rig_slots.2,
            jnt_cmd: rig_slots.3,
        }
    }

    fn simple(name: &str, actuator: &str, joint: &str, reduction: f64) -> TransmissionInfo {
        TransmissionInfo::new(name, "transmission_interface/SimpleTransmission")
            .with_actuator(ActuatorInfo::new(actuator).reduction(reduction))
            .with_joint(JointInfo::new(joint).hardware_interface("PositionJointInterface"))
    }

    #[test]
    fn validation_catches_each_rule() {
        let rig = rig(&["a1", "a2"], &["j1", "j2"]);
        let loader = TransmissionLoader::new(&rig.set);

        let err = loader.validate(&simple("", "a1", "j1", 2.0)).unwrap_err();
        assert!(matches!(err, TransmissionError::Configuration { .. }));

        let mut info = simple("t", "a1", "j1", 2.0);
        info.kind = "Gearbox".into();
        assert!(matches!(
            loader.validate(&info).unwrap_err(),
            TransmissionError::UnknownType { .. }
        ));

        let info = simple("t", "a1", "j1", 2.0).with_joint(
            JointInfo::new("j2").hardware_interface("PositionJointInterface"),
        );
        assert!(matches!(
            loader.validate(&info).unwrap_err(),
            TransmissionError::Arity { role: "joint", expected: 1, found: 2, .. }
        ));

        let mut info = simple("t", "a1", "j1", 2.0);
        info.actuators[0].mechanical_reduction = None;
        assert!(matches!(
            loader.validate(&info).unwrap_err(),
            TransmissionError::MissingParameter { .. }
        ));

        let mut info = simple("t", "a1", "j1", 2.0);
        info.joints[0].mechanical_reduction = Some(2.0);
        assert!(matches!(
            loader.validate(&info).unwrap_err(),
            TransmissionError::UnexpectedParameter { .. }
        ));

        let err = loader.validate(&simple("t", "a1", "j1", 0.0)).unwrap_err();
        assert!(matches!(
            err,
            TransmissionError::InvalidParameter { parameter: "mechanical_reduction", .. }
        ));

        let mut info = simple("t", "a1", "j1", 2.0);
        info.joints[0].hardware_interfaces.clear();
        assert!(loader.validate(&info).is_err());

        let err = loader.validate(&simple("t", "ghost", "j1", 2.0)).unwrap_err();
        assert_eq!(
            err,
            TransmissionError::MissingResource {
                transmission: "t".into(),
                interface: "ActuatorStateInterface".into(),
                name: "ghost".into(),
            }
        );
    }

    #[test]
    fn roles_reorder_declarations() {
        let rig = rig(&["a1", "a2"], &["j1", "j2"]);
        let loader = TransmissionLoader::new(&rig.set);
        let info = TransmissionInfo::new("wrist", "DifferentialTransmission")
            .with_actuator(ActuatorInfo::new("a2").role("actuator2").reduction(10.0))
            .with_actuator(ActuatorInfo::new("a1").role("actuator1").reduction(10.0))
            .with_joint(
                JointInfo::new("j1")
                    .role("joint1")
                    .hardware_interface("PositionJointInterface"),
            )
            .with_joint(
                JointInfo::new("j2")
                    .role("joint2")
                    .hardware_interface("PositionJointInterface"),
            );
        let validated = loader.validate(&info).unwrap();
        let names: Vec<_> = validated.info().actuators.iter().map(|a| &a.name).collect();
        assert_eq!(names, ["a1", "a2"]);

        let mut bad = info.clone();
        bad.actuators[0].role = Some("actuator1".into());
        assert!(loader.validate(&bad).is_err());
        let mut partial = info;
        partial.joints[1].role = None;
        assert!(loader.validate(&partial).is_err());
    }

    #[test]
    fn load_propagates_both_ways() {
        let rig = rig(&["a1"], &["j1"]);
        let report = TransmissionLoader::new(&rig.set).load(&[simple("t", "a1", "j1", 2.0)]);
        assert!(report.is_complete());
        assert_eq!(report.outcomes[0].state, TransmissionState::Active);

        rig.act_pos[0].set(1.0);
        report.transmissions.propagate_state();
        assert_eq!(rig.jnt_pos[0].get(), 0.5);

        rig.jnt_cmd[0].set(1.0);
        report.transmissions.propagate_commands();
        assert_eq!(rig.act_cmd[0].get(), 2.0);
    }

    #[test]
    fn failures_are_reported_and_skipped() {
        let rig = rig(&["a1", "a2"], &["j1", "j2"]);
        let sink = Arc::new(CollectingSink::new());
        let report = TransmissionLoader::new(&rig.set)
            .with_sink(sink.clone())
            .load(&[
                simple("bad", "a1", "j1", 0.0),
                simple("good", "a2", "j2", 4.0),
                simple("good", "a1", "j1", 1.0),
            ]);
        assert_eq!(report.transmissions.len(), 1);
        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.outcome("bad").unwrap().state, TransmissionState::Unloaded);
        assert_eq!(sink.count(Severity::Warning), 2);
        assert_eq!(sink.count(Severity::Info), 1);
    }

    #[test]
    fn one_transmission_per_joint() {
        let rig = rig(&["a1", "a2"], &["j1"]);
        let report = TransmissionLoader::new(&rig.set).load(&[
            simple("first", "a1", "j1", 2.0),
            simple("second", "a2", "j1", 2.0),
        ]);
        let second = report.outcome("second").unwrap();
        assert_eq!(second.state, TransmissionState::Validated);
        assert!(second
            .error
            .as_ref()
            .is_some_and(|e| e.to_string().contains("already driven by transmission 'first'")));
    }

    #[test]
    fn undeclared_command_interface_is_a_wiring_error() {
        let rig = rig(&["a1"], &["j1"]);
        let loader = TransmissionLoader::new(&rig.set);
        let mut info = simple("t", "a1", "j1", 2.0);
        info.joints[0].hardware_interfaces = vec!["EffortJointInterface".into()];
        let validated = loader.validate(&info).unwrap();
        let err = loader.wire(validated).unwrap_err();
        assert_eq!(
            err,
            TransmissionError::WrongInterface {
                transmission: "t".into(),
                resource: "j1".into(),
                interface: "EffortJointInterface".into(),
            }
        );

        info.joints[0].hardware_interfaces = vec!["hardware_interface/TeleportJointInterface".into()];
        let validated = loader.validate(&info).unwrap();
        assert!(matches!(
            loader.wire(validated).unwrap_err(),
            TransmissionError::Configuration { .. }
        ));
    }

    #[test]
    fn builder_disagreeing_with_declared_arity_is_rejected() {
        let rig = rig(&["a1", "a2"], &["j1"]);
        let mut factory = TransmissionFactory::with_defaults();
        factory.register(TransmissionSpec {
            kind: "MislabelledTandem",
            build: crate::factory::SIMPLE.build,
            ..crate::factory::TANDEM
        });
        let info = TransmissionInfo::new("t", "MislabelledTandem")
            .with_actuator(ActuatorInfo::new("a1").reduction(2.0))
            .with_actuator(ActuatorInfo::new("a2").reduction(2.0))
            .with_joint(JointInfo::new("j1").hardware_interface("PositionJointInterface"));
        let report = TransmissionLoader::new(&rig.set)
            .with_factory(factory)
            .load(&[info]);

        assert!(!report.is_complete());
        assert!(report.transmissions.is_empty());
        let outcome = report.outcome("t").unwrap();
        assert_eq!(outcome.state, TransmissionState::Unloaded);
        assert!(matches!(
            outcome.error,
            Some(TransmissionError::Arity { role: "actuator", expected: 2, found: 1, .. })
        ));
        // nothing active, so a pass is a no-op rather than a panic
        rig.act_pos[0].set(1.0);
        report.transmissions.propagate_state();
        assert_eq!(rig.jnt_pos[0].get(), 0.0);
    }

    #[test]
    fn missing_state_interface_surfaces() {
        let set = InterfaceSet::new();
        let err = TransmissionLoader::new(&set)
            .validate(&simple("t", "a1", "j1", 2.0))
            .unwrap_err();
        assert!(matches!(err, TransmissionError::Interface(_)));
    }
}
