//! [`RobotBackend`]: owns storage, registers interfaces, runs transmissions.

use std::sync::Arc;

use hardware_interface::{
    ActuatorHandle, ActuatorStateInterface, DiagnosticSink, EffortActuator, EffortJoint,
    InterfaceKind, InterfaceSet, JointHandle, JointModeHandle, JointModeInterface,
    JointStateInterface, ModeSlot, PositionActuator, PositionJoint, ResourceRegistry,
    TracingSink, VelocityActuator, VelocityJoint,
};
use tracing::info;
use transmission_interface::{
    read_description, DescriptionParser, FileRetriever, InterfaceBindings, LoadOutcome,
    Quantity, ResourceRetriever, RobotTransmissions, TransmissionInfo, TransmissionLoader,
    YamlDescriptionParser,
};

use crate::config::{BackendConfig, JointConfig};
use crate::error::{BackendError, Result};
use crate::storage::{ActuatorStorage, JointStorage, ModeStorage};

type RegisterFn =
    fn(&mut InterfaceSet, &[ActuatorStorage], &[JointStorage]) -> hardware_interface::Result<()>;

/// A joint command interface, the actuator interface it feeds and the
/// transform between them.
#[derive(Clone, Copy)]
struct CommandKind {
    joint_interface: &'static str,
    actuator_interface: &'static str,
    quantity: Quantity,
    register: RegisterFn,
    bind: fn(InterfaceBindings, Quantity) -> InterfaceBindings,
}

impl CommandKind {
    fn of<J, A>(quantity: Quantity) -> Self
    where
        J: InterfaceKind<Handle = JointHandle>,
        A: InterfaceKind<Handle = ActuatorHandle>,
    {
        Self {
            joint_interface: J::NAME,
            actuator_interface: A::NAME,
            quantity,
            register: register_commands::<J, A>,
            bind: |bindings, quantity| bindings.bind_command::<J, A>(quantity),
        }
    }
}

fn register_commands<J, A>(
    set: &mut InterfaceSet,
    actuators: &[ActuatorStorage],
    joints: &[JointStorage],
) -> hardware_interface::Result<()>
where
    J: InterfaceKind<Handle = JointHandle>,
    A: InterfaceKind<Handle = ActuatorHandle>,
{
    let mut registry = ResourceRegistry::<A>::new();
    for actuator in actuators {
        let command = actuator.command(A::NAME).cloned();
        registry.register_handle(ActuatorHandle::new(actuator.state_handle()?, command)?)?;
    }
    set.register(registry)?;
    let mut registry = ResourceRegistry::<J>::new();
    for joint in joints {
        let command = joint.command(J::NAME).cloned();
        registry.register_handle(JointHandle::new(joint.state_handle()?, command)?)?;
    }
    set.register(registry)
}

pub struct RobotBackendBuilder {
    name: String,
    actuators: Vec<String>,
    joints: Vec<JointConfig>,
    state_channels: Vec<(String, Quantity)>,
    commands: Vec<CommandKind>,
    sink: Arc<dyn DiagnosticSink>,
    strict: bool,
}

impl RobotBackendBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actuators: Vec::new(),
            joints: Vec::new(),
            state_channels: Vec::new(),
            commands: vec![
                CommandKind::of::<PositionJoint, PositionActuator>(Quantity::Position),
                CommandKind::of::<VelocityJoint, VelocityActuator>(Quantity::Velocity),
                CommandKind::of::<EffortJoint, EffortActuator>(Quantity::Effort),
            ],
            sink: Arc::new(TracingSink),
            strict: false,
        }
    }

    pub fn actuator(mut self, name: impl Into<String>) -> Self {
        self.actuators.push(name.into());
        self
    }

    pub fn joint(mut self, joint: JointConfig) -> Self {
        self.joints.push(joint);
        self
    }

    /// Give every actuator and joint a custom sensed channel, propagated
    /// with the transform for `quantity`.
    pub fn state_channel(mut self, channel: impl Into<String>, quantity: Quantity) -> Self {
        self.state_channels.push((channel.into(), quantity));
        self
    }

    /// Give every joint command storage for interface `J` and every actuator
    /// command storage for interface `A`, and route one to the other.
    ///
    /// Each joint interface and each actuator interface may appear in one
    /// route only; [`build`](Self::build) rejects a second route onto either
    /// with [`BackendError::Config`].
    pub fn command_interface<J, A>(mut self, quantity: Quantity) -> Self
    where
        J: InterfaceKind<Handle = JointHandle>,
        A: InterfaceKind<Handle = ActuatorHandle>,
    {
        self.commands.push(CommandKind::of::<J, A>(quantity));
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn check_command_routes(&self) -> Result<()> {
        for (i, kind) in self.commands.iter().enumerate() {
            for earlier in &self.commands[..i] {
                if earlier.joint_interface == kind.joint_interface
                    || earlier.actuator_interface == kind.actuator_interface
                {
                    return Err(BackendError::Config(format!(
                        "command route {} -> {} overlaps route {} -> {}",
                        kind.joint_interface,
                        kind.actuator_interface,
                        earlier.joint_interface,
                        earlier.actuator_interface
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn build(self) -> Result<RobotBackend> {
        let config = BackendConfig {
            name: self.name.clone(),
            actuators: self.actuators.clone(),
            joints: self.joints.clone(),
            ..BackendConfig::default()
        };
        config.validate()?;
        self.check_command_routes()?;

        let channels = || self.state_channels.iter().map(|(c, _)| c.as_str());
        let actuators: Vec<ActuatorStorage> = self
            .actuators
            .iter()
            .map(|name| {
                ActuatorStorage::new(
                    name.as_str(),
                    channels(),
                    self.commands.iter().map(|k| k.actuator_interface),
                )
            })
            .collect();
        let joints: Vec<JointStorage> = self
            .joints
            .iter()
            .map(|j| {
                JointStorage::new(
                    j.name.as_str(),
                    channels(),
                    self.commands.iter().map(|k| k.joint_interface),
                )
            })
            .collect();

        let mut interfaces = InterfaceSet::new();
        let mut act_state = ActuatorStateInterface::new();
        for actuator in &actuators {
            act_state.register_handle(actuator.state_handle()?)?;
        }
        interfaces.register(act_state)?;
        let mut jnt_state = JointStateInterface::new();
        for joint in &joints {
            jnt_state.register_handle(joint.state_handle()?)?;
        }
        interfaces.register(jnt_state)?;

        let mut bindings = InterfaceBindings::empty();
        for kind in &self.commands {
            (kind.register)(&mut interfaces, &actuators, &joints)?;
            bindings = (kind.bind)(bindings, kind.quantity);
        }
        for (channel, quantity) in &self.state_channels {
            bindings = bindings.bind_state_channel(channel.as_str(), *quantity);
        }

        let mut modes = Vec::with_capacity(self.joints.len());
        let mut mode_iface = JointModeInterface::new();
        for joint in &self.joints {
            let slot = ModeSlot::default();
            mode_iface.register_handle(JointModeHandle::new(
                joint.name.as_str(),
                Some(slot.clone()),
                joint.start_mode(),
                joint.modes.iter().cloned(),
            )?)?;
            modes.push(ModeStorage {
                joint: joint.name.clone(),
                mode: slot,
            });
        }
        interfaces.register(mode_iface)?;

        info!(
            backend = %self.name,
            actuators = actuators.len(),
            joints = joints.len(),
            interfaces = interfaces.kind_names().count(),
            "backend ready"
        );
        Ok(RobotBackend {
            name: self.name,
            actuators,
            joints,
            modes,
            interfaces,
            bindings,
            transmissions: RobotTransmissions::new(),
            outcomes: Vec::new(),
            sink: self.sink,
            strict: self.strict,
        })
    }
}

/// The composition root of one robot.
///
/// A cycle looks like: driver fills actuator state, [`read`](Self::read),
/// [`begin_cycle`](Self::begin_cycle), controllers claim and command joints,
/// [`write`](Self::write), driver consumes actuator commands.
pub struct RobotBackend {
    name: String,
    actuators: Vec<ActuatorStorage>,
    joints: Vec<JointStorage>,
    modes: Vec<ModeStorage>,
    interfaces: InterfaceSet,
    bindings: InterfaceBindings,
    transmissions: RobotTransmissions,
    outcomes: Vec<LoadOutcome>,
    sink: Arc<dyn DiagnosticSink>,
    strict: bool,
}

impl RobotBackend {
    pub fn builder(name: impl Into<String>) -> RobotBackendBuilder {
        RobotBackendBuilder::new(name)
    }

    /// Build from configuration and load its description, if it names one,
    /// from the filesystem.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let mut builder = Self::builder(config.name.as_str()).strict(config.strict);
        for actuator in &config.actuators {
            builder = builder.actuator(actuator.as_str());
        }
        for joint in &config.joints {
            builder = builder.joint(joint.clone());
        }
        let mut backend = builder.build()?;
        if let Some(uri) = &config.description {
            let retriever = config
                .package_roots
                .iter()
                .fold(FileRetriever::new(), |r, (package, root)| {
                    r.with_package(package.as_str(), root.as_path())
                });
            backend.load_description(&retriever, &YamlDescriptionParser, uri)?;
        }
        Ok(backend)
    }

    /// Retrieve and parse a description, then load its transmissions.
    pub fn load_description(
        &mut self,
        retriever: &dyn ResourceRetriever,
        parser: &dyn DescriptionParser,
        uri: &str,
    ) -> Result<&[LoadOutcome]> {
        let infos = read_description(retriever, parser, uri).map_err(BackendError::description)?;
        self.init_transmissions(&infos)
    }

    /// Replace the active transmissions with the ones loaded from `infos`.
    ///
    /// Declarations that fail are reported and skipped, unless the backend
    /// is strict, in which case the first failure is returned and the
    /// previous transmissions stay in place.
    pub fn init_transmissions(&mut self, infos: &[TransmissionInfo]) -> Result<&[LoadOutcome]> {
        let report = TransmissionLoader::new(&self.interfaces)
            .with_bindings(self.bindings.clone())
            .with_sink(self.sink.clone())
            .load(infos);
        if self.strict {
            if let Some(failed) = report.failures().next() {
                if let Some(source) = failed.error.clone() {
                    return Err(BackendError::Transmission {
                        name: failed.name.clone(),
                        source,
                    });
                }
            }
        }
        info!(
            backend = %self.name,
            active = report.transmissions.len(),
            failed = report.failures().count(),
            "transmissions initialised"
        );
        self.transmissions = report.transmissions;
        self.outcomes = report.outcomes;
        Ok(&self.outcomes)
    }

    /// Actuator state → joint state.
    pub fn read(&self) {
        self.transmissions.propagate_state();
    }

    /// Joint commands → actuator commands.
    pub fn write(&self) {
        self.transmissions.propagate_commands();
    }

    /// Release every claim so controllers can claim afresh.
    pub fn begin_cycle(&mut self) {
        self.interfaces.clear_claims();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interfaces(&self) -> &InterfaceSet {
        &self.interfaces
    }

    pub fn interfaces_mut(&mut self) -> &mut InterfaceSet {
        &mut self.interfaces
    }

    pub fn transmissions(&self) -> &RobotTransmissions {
        &self.transmissions
    }

    pub fn load_outcomes(&self) -> &[LoadOutcome] {
        &self.outcomes
    }

    pub fn actuators(&self) -> &[ActuatorStorage] {
        &self.actuators
    }

    pub fn joints(&self) -> &[JointStorage] {
        &self.joints
    }

    pub fn actuator(&self, name: &str) -> Option<&ActuatorStorage> {
        self.actuators.iter().find(|a| a.name() == name)
    }

    pub fn joint(&self, name: &str) -> Option<&JointStorage> {
        self.joints.iter().find(|j| j.name() == name)
    }

    pub fn joint_mode(&self, joint: &str) -> Option<&ModeSlot> {
        self.modes.iter().find(|m| m.joint == joint).map(|m| &m.mode)
    }
}
