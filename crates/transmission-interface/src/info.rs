//! Parsed transmission declarations.
//!
//! These are plain data as read from a robot description. Nothing here is
//! checked; [`crate::TransmissionLoader::validate`] does that once at load
//! time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransmissionInfo {
    pub name: String,
    /// Type tag, with or without the `transmission_interface/` prefix.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub actuators: Vec<ActuatorInfo>,
    #[serde(default)]
    pub joints: Vec<JointInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hardware_interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanical_reduction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hardware_interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanical_reduction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

impl TransmissionInfo {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_actuator(mut self, actuator: ActuatorInfo) -> Self {
        self.actuators.push(actuator);
        self
    }

    pub fn with_joint(mut self, joint: JointInfo) -> Self {
        self.joints.push(joint);
        self
    }
}

impl ActuatorInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn hardware_interface(mut self, interface: impl Into<String>) -> Self {
        self.hardware_interfaces.push(interface.into());
        self
    }

    pub fn reduction(mut self, reduction: f64) -> Self {
        self.mechanical_reduction = Some(reduction);
        self
    }
}

impl JointInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn hardware_interface(mut self, interface: impl Into<String>) -> Self {
        self.hardware_interfaces.push(interface.into());
        self
    }

    pub fn reduction(mut self, reduction: f64) -> Self {
        self.mechanical_reduction = Some(reduction);
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }
}
