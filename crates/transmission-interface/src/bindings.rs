//! Which registries a joint's declared hardware interface maps to.
//!
//! A joint declaring `PositionJointInterface` is commanded through the
//! position joint registry; its transmission writes the result into the
//! position actuator registry and applies the position transform. Custom
//! interfaces declared with [`hardware_interface::interface_kind!`] are bound
//! the same way and reuse one of the three standard transforms.

use core::fmt;
use std::collections::BTreeMap;

use hardware_interface::{
    ActuatorHandle, EffortActuator, EffortJoint, InterfaceKind, InterfaceSet, JointHandle,
    PositionActuator, PositionJoint, Slot, VelocityActuator, VelocityJoint,
};

use crate::transmission::Quantity;

/// Prefix some descriptions put in front of interface names.
pub const INTERFACE_PREFIX: &str = "hardware_interface/";

/// Resolves the command slot of one resource in one registry.
pub type SlotLookup = fn(&InterfaceSet, &str) -> Option<Slot>;

fn joint_command<K: InterfaceKind<Handle = JointHandle>>(
    set: &InterfaceSet,
    name: &str,
) -> Option<Slot> {
    set.get::<K>().ok()?.handle(name).ok()?.command_slot().cloned()
}

fn actuator_command<K: InterfaceKind<Handle = ActuatorHandle>>(
    set: &InterfaceSet,
    name: &str,
) -> Option<Slot> {
    set.get::<K>().ok()?.handle(name).ok()?.command_slot().cloned()
}

/// One joint command interface and the actuator interface it feeds.
#[derive(Clone, Copy)]
pub struct CommandRoute {
    pub joint_interface: &'static str,
    pub actuator_interface: &'static str,
    pub quantity: Quantity,
    joint_slot: SlotLookup,
    actuator_slot: SlotLookup,
}

impl CommandRoute {
    pub fn joint_slot(&self, set: &InterfaceSet, joint: &str) -> Option<Slot> {
        (self.joint_slot)(set, joint)
    }

    pub fn actuator_slot(&self, set: &InterfaceSet, actuator: &str) -> Option<Slot> {
        (self.actuator_slot)(set, actuator)
    }
}

impl fmt::Debug for CommandRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRoute")
            .field("joint_interface", &self.joint_interface)
            .field("actuator_interface", &self.actuator_interface)
            .field("quantity", &self.quantity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceBindings {
    commands: BTreeMap<&'static str, CommandRoute>,
    state_channels: BTreeMap<String, Quantity>,
}

impl Default for InterfaceBindings {
    fn default() -> Self {
        Self::standard()
    }
}

impl InterfaceBindings {
    /// No bindings at all.
    pub fn empty() -> Self {
        Self {
            commands: BTreeMap::new(),
            state_channels: BTreeMap::new(),
        }
    }

    /// Position, velocity and effort joint interfaces.
    pub fn standard() -> Self {
        Self::empty()
            .bind_command::<PositionJoint, PositionActuator>(Quantity::Position)
            .bind_command::<VelocityJoint, VelocityActuator>(Quantity::Velocity)
            .bind_command::<EffortJoint, EffortActuator>(Quantity::Effort)
    }

    /// Route commands from joint interface `J` to actuator interface `A`
    /// through the transform for `quantity`.
    pub fn bind_command<J, A>(mut self, quantity: Quantity) -> Self
    where
        J: InterfaceKind<Handle = JointHandle>,
        A: InterfaceKind<Handle = ActuatorHandle>,
    {
        self.commands.insert(
            J::NAME,
            CommandRoute {
                joint_interface: J::NAME,
                actuator_interface: A::NAME,
                quantity,
                joint_slot: joint_command::<J>,
                actuator_slot: actuator_command::<A>,
            },
        );
        self
    }

    /// Propagate the named custom state channel with the transform for
    /// `quantity`, wherever every actuator and joint carries it.
    pub fn bind_state_channel(mut self, channel: impl Into<String>, quantity: Quantity) -> Self {
        self.state_channels.insert(channel.into(), quantity);
        self
    }

    /// Route for a declared interface name, with or without the
    /// `hardware_interface/` prefix.
    pub fn route(&self, interface: &str) -> Option<&CommandRoute> {
        let interface = interface.strip_prefix(INTERFACE_PREFIX).unwrap_or(interface);
        self.commands.get(interface)
    }

    pub fn routes(&self) -> impl Iterator<Item = &CommandRoute> + '_ {
        self.commands.values()
    }

    pub fn state_channels(&self) -> impl Iterator<Item = (&str, Quantity)> + '_ {
        self.state_channels.iter().map(|(k, q)| (k.as_str(), *q))
    }
}
