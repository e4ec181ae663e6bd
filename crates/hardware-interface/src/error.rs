use thiserror::Error;

pub type Result<T, E = HardwareInterfaceError> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardwareInterfaceError {
    #[error("cannot create handle '{resource}': {reason}")]
    Configuration { resource: String, reason: String },
    #[error("resource '{name}' is already registered in '{interface}'")]
    DuplicateResource { interface: String, name: String },
    #[error("could not find resource '{name}' in '{interface}'")]
    NotFound { interface: String, name: String },
    #[error("resource '{name}' in '{interface}' is already claimed")]
    ClaimConflict { interface: String, name: String },
    #[error("joint '{resource}' does not allow mode '{mode}'")]
    ModeRejected { resource: String, mode: String },
    #[error("hardware interface '{0}' is not registered")]
    InterfaceNotRegistered(String),
    #[error("hardware interface '{0}' is already registered")]
    InterfaceAlreadyRegistered(String),
    #[error("resource '{resource}' is requested by more than one controller: {controllers}")]
    ControllerConflict {
        resource: String,
        controllers: String,
    },
}

impl HardwareInterfaceError {
    pub(crate) fn configuration(resource: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }
}
