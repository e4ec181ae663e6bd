//! The standard hardware interface kinds.
//!
//! State interfaces and actuator command interfaces never claim: many
//! readers are fine, and actuator commands are written by transmissions, not
//! by controllers. Joint command and joint mode interfaces claim, so two
//! controllers cannot drive the same joint in one cycle.

use crate::handle::{ActuatorHandle, ActuatorStateHandle, JointHandle, JointModeHandle, JointStateHandle};
use crate::interface_kind;

interface_kind!(
    /// Sensed actuator state.
    pub ActuatorState => ActuatorStateInterface, handle = ActuatorStateHandle, claims = false
);
interface_kind!(
    /// Actuator commands of unspecified meaning.
    pub ActuatorCommand => ActuatorCommandInterface, handle = ActuatorHandle, claims = false
);
interface_kind!(
    /// Position commands for actuators.
    pub PositionActuator => PositionActuatorInterface, handle = ActuatorHandle, claims = false
);
interface_kind!(
    /// Velocity commands for actuators.
    pub VelocityActuator => VelocityActuatorInterface, handle = ActuatorHandle, claims = false
);
interface_kind!(
    /// Effort commands for actuators.
    pub EffortActuator => EffortActuatorInterface, handle = ActuatorHandle, claims = false
);
interface_kind!(
    /// Sensed joint state.
    pub JointState => JointStateInterface, handle = JointStateHandle, claims = false
);
interface_kind!(
    /// Joint commands of unspecified meaning.
    pub JointCommand => JointCommandInterface, handle = JointHandle, claims = true
);
interface_kind!(
    /// Position commands for joints.
    pub PositionJoint => PositionJointInterface, handle = JointHandle, claims = true
);
interface_kind!(
    /// Velocity commands for joints.
    pub VelocityJoint => VelocityJointInterface, handle = JointHandle, claims = true
);
interface_kind!(
    /// Effort commands for joints.
    pub EffortJoint => EffortJointInterface, handle = JointHandle, claims = true
);
interface_kind!(
    /// Control-mode switching for joints.
    pub JointMode => JointModeInterface, handle = JointModeHandle, claims = true
);
