//! hardware-interface: typed handles and claim-aware registries
//!
//! A hardware backend owns raw storage ([`Slot`]s), wraps it in handles and
//! registers those handles into one [`ResourceRegistry`] per interface kind.
//! Controllers fetch handles from the backend's [`InterfaceSet`] without
//! knowing the driver's types; joint command interfaces track claims so two
//! controllers never write the same joint in one cycle.

mod error;
pub use error::{HardwareInterfaceError, Result};

mod slot;
pub use slot::{ModeSlot, Slot, SlotArray};

mod handle;
pub use handle::{
    ActuatorHandle, ActuatorSpace, ActuatorStateHandle, CommandHandle, JointHandle,
    JointModeHandle, JointSpace, JointStateHandle, PidGains, Resource, Space, StateHandle,
};

mod registry;
pub use registry::{InterfaceKind, ResourceRegistry};

pub mod interfaces;
pub use interfaces::*;

mod interface_set;
pub use interface_set::{ControllerClaims, InterfaceResources, InterfaceSet};

mod diagnostics;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink};
