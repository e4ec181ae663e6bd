//! The set of active transmissions and the two per-cycle passes.

use core::fmt;

use hardware_interface::Slot;
use smallvec::SmallVec;

use crate::transmission::{Quantity, Transmission};

type Slots = SmallVec<[Slot; 2]>;
type Scratch = SmallVec<[f64; 4]>;

/// Actuator and joint slots of one propagated value, in role order.
#[derive(Debug, Clone)]
pub struct ChannelBinding {
    pub label: String,
    pub quantity: Quantity,
    pub actuators: Slots,
    pub joints: Slots,
}

impl ChannelBinding {
    fn forward(&self, transmission: &dyn Transmission) {
        let input: Scratch = self.actuators.iter().map(Slot::get).collect();
        let mut output = Scratch::from_elem(0.0, self.joints.len());
        transmission.actuator_to_joint(self.quantity, &input, &mut output);
        for (slot, value) in self.joints.iter().zip(&output) {
            slot.set(*value);
        }
    }

    fn inverse(&self, transmission: &dyn Transmission) {
        let input: Scratch = self.joints.iter().map(Slot::get).collect();
        let mut output = Scratch::from_elem(0.0, self.actuators.len());
        transmission.joint_to_actuator(self.quantity, &input, &mut output);
        for (slot, value) in self.actuators.iter().zip(&output) {
            slot.set(*value);
        }
    }
}

/// A transmission wired to storage and taking part in every pass.
pub struct ActiveTransmission {
    pub(crate) name: String,
    pub(crate) transmission: Box<dyn Transmission>,
    pub(crate) actuators: Vec<String>,
    pub(crate) joints: Vec<String>,
    pub(crate) state: Vec<ChannelBinding>,
    pub(crate) commands: Vec<ChannelBinding>,
}

impl ActiveTransmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transmission(&self) -> &dyn Transmission {
        self.transmission.as_ref()
    }

    pub fn actuator_names(&self) -> &[String] {
        &self.actuators
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joints
    }

    /// State channels propagated actuator → joint.
    pub fn state_channels(&self) -> &[ChannelBinding] {
        &self.state
    }

    /// Command channels propagated joint → actuator.
    pub fn command_channels(&self) -> &[ChannelBinding] {
        &self.commands
    }

    pub fn propagate_state(&self) {
        for channel in &self.state {
            channel.forward(self.transmission.as_ref());
        }
    }

    pub fn propagate_commands(&self) {
        for channel in &self.commands {
            channel.inverse(self.transmission.as_ref());
        }
    }
}

impl fmt::Debug for ActiveTransmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveTransmission")
            .field("name", &self.name)
            .field("kind", &self.transmission.kind())
            .field("actuators", &self.actuators)
            .field("joints", &self.joints)
            .field(
                "state",
                &self.state.iter().map(|c| &c.label).collect::<Vec<_>>(),
            )
            .field(
                "commands",
                &self.commands.iter().map(|c| &c.label).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Active transmissions in load order.
#[derive(Debug, Default)]
pub struct RobotTransmissions {
    transmissions: Vec<ActiveTransmission>,
}

impl RobotTransmissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, transmission: ActiveTransmission) {
        self.transmissions.push(transmission);
    }

    pub fn get(&self, name: &str) -> Option<&ActiveTransmission> {
        self.transmissions.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveTransmission> + '_ {
        self.transmissions.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.transmissions.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.transmissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transmissions.is_empty()
    }

    /// Which active transmission, if any, drives `joint`.
    pub fn driving_joint(&self, joint: &str) -> Option<&ActiveTransmission> {
        self.transmissions
            .iter()
            .find(|t| t.joints.iter().any(|j| j == joint))
    }

    /// Which active transmission, if any, drives `actuator`.
    pub fn driving_actuator(&self, actuator: &str) -> Option<&ActiveTransmission> {
        self.transmissions
            .iter()
            .find(|t| t.actuators.iter().any(|a| a == actuator))
    }

    /// Actuator state → joint state for every active transmission.
    pub fn propagate_state(&self) {
        for t in &self.transmissions {
            t.propagate_state();
        }
    }

    /// Joint commands → actuator commands for every active transmission.
    pub fn propagate_commands(&self) {
        for t in &self.transmissions {
            t.propagate_commands();
        }
    }
}
