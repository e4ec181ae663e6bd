//! Backend configuration, read from YAML.
//!
//! ```yaml
//! name: arm
//! actuators: [shoulder_motor, elbow_motor]
//! joints:
//!   - name: shoulder
//!     modes: [PositionJointInterface, EffortJointInterface]
//!   - { name: elbow }
//! description: package://arm_description/transmissions.yaml
//! package_roots:
//!   arm_description: /opt/arm/share
//! strict: false
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{BackendError, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    #[serde(default)]
    pub actuators: Vec<String>,
    #[serde(default)]
    pub joints: Vec<JointConfig>,
    /// URI of the description holding the transmissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Directories `package://` URIs resolve against.
    #[serde(default)]
    pub package_roots: BTreeMap<String, PathBuf>,
    /// Abort on the first transmission that fails to load.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointConfig {
    pub name: String,
    /// Allowed control modes; empty allows any.
    #[serde(default)]
    pub modes: Vec<String>,
    /// Defaults to the first allowed mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_mode: Option<String>,
}

impl JointConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_modes<I, M>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.modes = modes.into_iter().map(Into::into).collect();
        self
    }

    pub fn start_mode(&self) -> &str {
        self.start_mode
            .as_deref()
            .or(self.modes.first().map(String::as_str))
            .unwrap_or_default()
    }
}

impl BackendConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let val: Value = serde_yaml::from_str(raw)
            .map_err(|e| BackendError::Config(format!("parsing yaml: {e}")))?;
        let config: BackendConfig = serde_yaml::from_value(val)
            .map_err(|e| BackendError::Config(format!("decoding backend config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Names must be non-empty and unique, start modes must be allowed.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BackendError::Config("backend name is empty".into()));
        }
        let mut seen = BTreeSet::new();
        for actuator in &self.actuators {
            check_name("actuator", actuator, &mut seen)?;
        }
        let mut seen = BTreeSet::new();
        for joint in &self.joints {
            check_name("joint", &joint.name, &mut seen)?;
            let start = joint.start_mode();
            if !joint.modes.is_empty() && !joint.modes.iter().any(|m| m == start) {
                return Err(BackendError::Config(format!(
                    "joint '{}' starts in mode '{start}' which is not among its modes",
                    joint.name
                )));
            }
        }
        Ok(())
    }
}

fn check_name<'a>(kind: &str, name: &'a str, seen: &mut BTreeSet<&'a str>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BackendError::Config(format!("{kind} with empty name")));
    }
    if !seen.insert(name) {
        return Err(BackendError::Config(format!("{kind} '{name}' is listed twice")));
    }
    Ok(())
}

pub fn load_config_file(path: impl AsRef<Path>) -> Result<BackendConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| BackendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    BackendConfig::from_yaml_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARM: &str = "
name: arm
actuators: [shoulder_motor, elbow_motor]
joints:
  - name: shoulder
    modes: [PositionJointInterface, EffortJointInterface]
  - { name: elbow, start_mode: VelocityJointInterface }
description: package://arm_description/transmissions.yaml
package_roots:
  arm_description: /opt/arm/share
";

    #[test]
    fn parses_full_config() {
        let config = BackendConfig::from_yaml_str(ARM).unwrap();
        assert_eq!(config.actuators.len(), 2);
        assert_eq!(config.joints[0].start_mode(), "PositionJointInterface");
        assert_eq!(config.joints[1].start_mode(), "VelocityJointInterface");
        assert!(config.joints[1].modes.is_empty());
        assert_eq!(
            config.package_roots["arm_description"],
            PathBuf::from("/opt/arm/share")
        );
        assert!(!config.strict);
    }

    #[test]
    fn rejects_inconsistent_configs() {
        let dup = "name: arm\nactuators: [m, m]\n";
        assert!(matches!(
            BackendConfig::from_yaml_str(dup),
            Err(BackendError::Config(_))
        ));
        let bad_mode =
            "name: arm\njoints:\n  - { name: j, modes: [A], start_mode: B }\n";
        assert!(BackendConfig::from_yaml_str(bad_mode).is_err());
        assert!(BackendConfig::from_yaml_str("actuators: []").is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arm.yaml");
        fs::write(&path, ARM).unwrap();
        assert_eq!(load_config_file(&path).unwrap().name, "arm");
        assert!(matches!(
            load_config_file(dir.path().join("missing.yaml")),
            Err(BackendError::Io { .. })
        ));
    }
}
