//! transmission-interface: mechanical transmissions between actuators and joints
//!
//! A [`Transmission`] maps actuator position, velocity and effort to joint
//! space and back. Declarations ([`TransmissionInfo`]) come from a robot
//! description; the [`TransmissionLoader`] validates them, wires them to the
//! handles a backend registered in its `InterfaceSet`, and collects the
//! result in [`RobotTransmissions`], which runs the per-cycle passes.

mod error;
pub use error::{ParameterError, Result, RetrievalError, TransmissionError};

mod transmission;
pub use transmission::{Invertibility, Quantity, Transmission};

mod differential;
mod four_bar;
mod simple;
mod tandem;
pub use differential::DifferentialTransmission;
pub use four_bar::FourBarLinkageTransmission;
pub use simple::SimpleTransmission;
pub use tandem::TandemTransmission;

mod info;
pub use info::{ActuatorInfo, JointInfo, TransmissionInfo};

pub mod factory;
pub use factory::{TransmissionFactory, TransmissionParameters, TransmissionSpec};

mod bindings;
pub use bindings::{CommandRoute, InterfaceBindings, SlotLookup, INTERFACE_PREFIX};

mod robot_transmissions;
pub use robot_transmissions::{ActiveTransmission, ChannelBinding, RobotTransmissions};

mod loader;
pub use loader::{
    LoadOutcome, LoadReport, TransmissionLoader, TransmissionState, ValidatedTransmission,
    WiredTransmission,
};

mod retriever;
pub use retriever::{FileRetriever, MemoryRetriever, ResourceRetriever};

mod parser;
pub use parser::{read_description, DescriptionParser, TransmissionDocument, YamlDescriptionParser};
