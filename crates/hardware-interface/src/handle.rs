//! Handles: named, non-owning views of backend storage.
//!
//! State handles expose sensed position, velocity and effort plus any number
//! of named custom channels. Command handles *contain* a state handle and add
//! the command field, an optional PID gain triple and an optional feed-forward
//! term. Both are parameterised by the space they live in so an actuator
//! handle can never be registered where a joint handle is expected.
//!
//! Handles are cheap to clone; clones share storage.

use core::fmt;
use core::marker::PhantomData;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::{HardwareInterfaceError, Result};
use crate::slot::{ModeSlot, Slot, SlotArray};

/// Anything a [`ResourceRegistry`](crate::ResourceRegistry) can store.
pub trait Resource: Clone + Send + Sync + 'static {
    fn name(&self) -> &str;
}

/// Marker for the coordinate space a handle belongs to.
pub trait Space: fmt::Debug + Clone + Copy + Default + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Motor-level coordinates, before the mechanical transmission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorSpace;

/// Controller-facing coordinates, after the mechanical transmission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JointSpace;

impl Space for ActuatorSpace {
    const NAME: &'static str = "actuator";
}

impl Space for JointSpace {
    const NAME: &'static str = "joint";
}

pub type ActuatorStateHandle = StateHandle<ActuatorSpace>;
pub type JointStateHandle = StateHandle<JointSpace>;
pub type ActuatorHandle = CommandHandle<ActuatorSpace>;
pub type JointHandle = CommandHandle<JointSpace>;

fn required(resource: &str, field: &str, slot: Option<Slot>) -> Result<Slot> {
    slot.ok_or_else(|| {
        HardwareInterfaceError::configuration(resource, format!("{field} data slot is missing"))
    })
}

// Reaching this means a handle was used before being wired to storage.
#[track_caller]
#[allow(clippy::panic)]
fn bound<'a>(slot: Option<&'a Slot>, resource: &str, field: &str) -> &'a Slot {
    match slot {
        Some(slot) => slot,
        None => panic!("handle '{resource}' has no {field} storage bound"),
    }
}

/// Read access to the sensed state of one actuator or joint.
#[derive(Debug, Clone, Default)]
pub struct StateHandle<S: Space> {
    name: String,
    position: Option<Slot>,
    velocity: Option<Slot>,
    effort: Option<Slot>,
    channels: BTreeMap<String, Slot>,
    space: PhantomData<S>,
}

impl<S: Space> StateHandle<S> {
    /// Position, velocity and effort storage are all mandatory.
    pub fn new(
        name: impl Into<String>,
        position: Option<Slot>,
        velocity: Option<Slot>,
        effort: Option<Slot>,
    ) -> Result<Self> {
        let name = name.into();
        let position = required(&name, "position", position)?;
        let velocity = required(&name, "velocity", velocity)?;
        let effort = required(&name, "effort", effort)?;
        Ok(Self {
            name,
            position: Some(position),
            velocity: Some(velocity),
            effort: Some(effort),
            channels: BTreeMap::new(),
            space: PhantomData,
        })
    }

    /// Attach a custom sensed channel, e.g. a vendor-specific temperature.
    pub fn with_channel(mut self, channel: impl Into<String>, slot: Slot) -> Self {
        self.channels.insert(channel.into(), slot);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> f64 {
        bound(self.position.as_ref(), &self.name, "position").get()
    }

    pub fn velocity(&self) -> f64 {
        bound(self.velocity.as_ref(), &self.name, "velocity").get()
    }

    pub fn effort(&self) -> f64 {
        bound(self.effort.as_ref(), &self.name, "effort").get()
    }

    pub fn position_slot(&self) -> Option<&Slot> {
        self.position.as_ref()
    }

    pub fn velocity_slot(&self) -> Option<&Slot> {
        self.velocity.as_ref()
    }

    pub fn effort_slot(&self) -> Option<&Slot> {
        self.effort.as_ref()
    }

    pub fn channel(&self, channel: &str) -> Option<f64> {
        self.channels.get(channel).map(Slot::get)
    }

    pub fn channel_slot(&self, channel: &str) -> Option<&Slot> {
        self.channels.get(channel)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.keys().map(String::as_str)
    }
}

impl<S: Space> Resource for StateHandle<S> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// PID gains as stored in a command handle's gain triple.
///
/// The integral clamps are not part of the stored triple and read back as NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub i_max: f64,
    pub i_min: f64,
}

/// Read and command access to one actuator or joint.
#[derive(Debug, Clone, Default)]
pub struct CommandHandle<S: Space> {
    state: StateHandle<S>,
    command: Option<Slot>,
    pid_gains: Option<SlotArray>,
    ff_term: Option<Slot>,
}

impl<S: Space> CommandHandle<S> {
    pub const PID_GAIN_COUNT: usize = 3;

    pub fn new(state: StateHandle<S>, command: Option<Slot>) -> Result<Self> {
        Self::with_gains(state, command, None, None)
    }

    /// Build a command handle that also carries PID gain and feed-forward
    /// storage. The gain array, when given, must hold exactly three values.
    pub fn with_gains(
        state: StateHandle<S>,
        command: Option<Slot>,
        pid_gains: Option<SlotArray>,
        ff_term: Option<Slot>,
    ) -> Result<Self> {
        let command = required(state.name(), "command", command)?;
        if let Some(gains) = &pid_gains {
            if gains.len() != Self::PID_GAIN_COUNT {
                return Err(HardwareInterfaceError::configuration(
                    state.name(),
                    format!(
                        "PID gains storage holds {} values, expected {}",
                        gains.len(),
                        Self::PID_GAIN_COUNT
                    ),
                ));
            }
        }
        Ok(Self {
            state,
            command: Some(command),
            pid_gains,
            ff_term,
        })
    }

    pub fn state(&self) -> &StateHandle<S> {
        &self.state
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn position(&self) -> f64 {
        self.state.position()
    }

    pub fn velocity(&self) -> f64 {
        self.state.velocity()
    }

    pub fn effort(&self) -> f64 {
        self.state.effort()
    }

    pub fn set_command(&self, command: f64) {
        bound(self.command.as_ref(), self.name(), "command").set(command);
    }

    pub fn command(&self) -> f64 {
        bound(self.command.as_ref(), self.name(), "command").get()
    }

    pub fn command_slot(&self) -> Option<&Slot> {
        self.command.as_ref()
    }

    pub fn set_pid_gains(&self, p: f64, i: f64, d: f64) {
        let gains = self.gains();
        gains.set(0, p);
        gains.set(1, i);
        gains.set(2, d);
    }

    pub fn pid_gains(&self) -> PidGains {
        let gains = self.gains();
        PidGains {
            p: gains.get(0).unwrap_or(f64::NAN),
            i: gains.get(1).unwrap_or(f64::NAN),
            d: gains.get(2).unwrap_or(f64::NAN),
            i_max: f64::NAN,
            i_min: f64::NAN,
        }
    }

    pub fn pid_gains_slot(&self) -> Option<&SlotArray> {
        self.pid_gains.as_ref()
    }

    pub fn set_ff_term(&self, ff_term: f64) {
        bound(self.ff_term.as_ref(), self.name(), "feed-forward").set(ff_term);
    }

    pub fn ff_term(&self) -> f64 {
        bound(self.ff_term.as_ref(), self.name(), "feed-forward").get()
    }

    pub fn ff_term_slot(&self) -> Option<&Slot> {
        self.ff_term.as_ref()
    }

    #[track_caller]
    #[allow(clippy::panic)]
    fn gains(&self) -> &SlotArray {
        match &self.pid_gains {
            Some(gains) => gains,
            None => panic!("handle '{}' has no PID gains storage bound", self.name()),
        }
    }
}

impl<S: Space> Resource for CommandHandle<S> {
    fn name(&self) -> &str {
        self.state.name()
    }
}

/// Read and switch the control mode of one joint.
#[derive(Debug, Clone, Default)]
pub struct JointModeHandle {
    name: String,
    mode: Option<ModeSlot>,
    allowed: Arc<BTreeSet<String>>,
}

impl JointModeHandle {
    /// Writes `start_mode` into the storage. An empty `allowed_modes` set
    /// accepts any later mode.
    pub fn new<I, M>(
        name: impl Into<String>,
        mode: Option<ModeSlot>,
        start_mode: &str,
        allowed_modes: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let name = name.into();
        let mode = mode.ok_or_else(|| {
            HardwareInterfaceError::configuration(&name, "mode data slot is missing")
        })?;
        mode.set(start_mode);
        Ok(Self {
            name,
            mode: Some(mode),
            allowed: Arc::new(allowed_modes.into_iter().map(Into::into).collect()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_mode(&self, mode: &str) -> Result<()> {
        let slot = self.mode_storage();
        if self.allowed.is_empty() || self.allowed.contains(mode) {
            slot.set(mode);
            Ok(())
        } else {
            Err(HardwareInterfaceError::ModeRejected {
                resource: self.name.clone(),
                mode: mode.to_string(),
            })
        }
    }

    pub fn mode(&self) -> String {
        self.mode_storage().get()
    }

    pub fn available_modes(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    pub fn mode_slot(&self) -> Option<&ModeSlot> {
        self.mode.as_ref()
    }

    #[track_caller]
    #[allow(clippy::panic)]
    fn mode_storage(&self) -> &ModeSlot {
        match &self.mode {
            Some(mode) => mode,
            None => panic!("handle '{}' has no mode storage bound", self.name),
        }
    }
}

impl Resource for JointModeHandle {
    fn name(&self) -> &str {
        &self.name
    }
}
