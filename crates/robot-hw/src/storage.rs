//! Raw per-resource storage owned by the backend.
//!
//! The driver side reads commands from and writes sensor values into these
//! slots; handles registered in the interface set share the same slots.

use core::marker::PhantomData;
use std::collections::BTreeMap;

use hardware_interface::{ActuatorSpace, JointSpace, ModeSlot, Slot, Space, StateHandle};

#[derive(Debug, Clone)]
pub struct ResourceStorage<S: Space> {
    name: String,
    pub position: Slot,
    pub velocity: Slot,
    pub effort: Slot,
    channels: BTreeMap<String, Slot>,
    commands: BTreeMap<&'static str, Slot>,
    space: PhantomData<S>,
}

pub type ActuatorStorage = ResourceStorage<ActuatorSpace>;
pub type JointStorage = ResourceStorage<JointSpace>;

impl<S: Space> ResourceStorage<S> {
    pub(crate) fn new<'a>(
        name: impl Into<String>,
        channels: impl IntoIterator<Item = &'a str>,
        commands: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            name: name.into(),
            position: Slot::default(),
            velocity: Slot::default(),
            effort: Slot::default(),
            channels: channels
                .into_iter()
                .map(|c| (c.to_string(), Slot::default()))
                .collect(),
            commands: commands
                .into_iter()
                .map(|c| (c, Slot::default()))
                .collect(),
            space: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Custom sensed channel, e.g. `"foo"`.
    pub fn channel(&self, channel: &str) -> Option<&Slot> {
        self.channels.get(channel)
    }

    /// Command storage fed through the named interface, e.g.
    /// `"PositionActuatorInterface"`.
    pub fn command(&self, interface: &str) -> Option<&Slot> {
        self.commands.get(interface)
    }

    pub fn command_interfaces(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    pub(crate) fn state_handle(&self) -> hardware_interface::Result<StateHandle<S>> {
        let handle = StateHandle::new(
            self.name.as_str(),
            Some(self.position.clone()),
            Some(self.velocity.clone()),
            Some(self.effort.clone()),
        )?;
        Ok(self
            .channels
            .iter()
            .fold(handle, |h, (name, slot)| h.with_channel(name.as_str(), slot.clone())))
    }
}

/// Mode storage of one joint.
#[derive(Debug, Clone)]
pub struct ModeStorage {
    pub joint: String,
    pub mode: ModeSlot,
}
