use hardware_interface::HardwareInterfaceError;
use thiserror::Error;

pub type Result<T, E = TransmissionError> = core::result::Result<T, E>;

/// A numeric parameter a transmission cannot work with.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parameter {parameter} = {value} is invalid: {reason}")]
pub struct ParameterError {
    pub parameter: String,
    pub value: f64,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("unknown package '{package}' in {uri}")]
    UnknownPackage { package: String, uri: String },
    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(String),
    #[error("I/O error reading {uri}: {message}")]
    Io { uri: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransmissionError {
    #[error("transmission '{transmission}': {reason}")]
    Configuration { transmission: String, reason: String },
    #[error("transmission '{transmission}': unknown type '{kind}'")]
    UnknownType { transmission: String, kind: String },
    #[error("transmission '{transmission}': expected {expected} {role}(s), found {found}")]
    Arity {
        transmission: String,
        role: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("transmission '{transmission}': '{resource}' is missing parameter {parameter}")]
    MissingParameter {
        transmission: String,
        resource: String,
        parameter: &'static str,
    },
    #[error("transmission '{transmission}': '{resource}' does not accept parameter {parameter}")]
    UnexpectedParameter {
        transmission: String,
        resource: String,
        parameter: &'static str,
    },
    #[error("transmission '{transmission}': '{resource}' has invalid {parameter} = {value}")]
    InvalidParameter {
        transmission: String,
        resource: String,
        parameter: &'static str,
        value: f64,
    },
    #[error("transmission '{transmission}': {source}")]
    Build {
        transmission: String,
        #[source]
        source: ParameterError,
    },
    #[error("transmission '{transmission}': '{name}' is not registered in '{interface}'")]
    MissingResource {
        transmission: String,
        interface: String,
        name: String,
    },
    #[error("transmission '{transmission}': '{resource}' has no handle in '{interface}'")]
    WrongInterface {
        transmission: String,
        resource: String,
        interface: String,
    },
    #[error("description parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Interface(#[from] HardwareInterfaceError),
}

impl TransmissionError {
    pub(crate) fn configuration(transmission: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            transmission: transmission.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the transmission the error belongs to, when there is one.
    pub fn transmission(&self) -> Option<&str> {
        match self {
            Self::Configuration { transmission, .. }
            | Self::UnknownType { transmission, .. }
            | Self::Arity { transmission, .. }
            | Self::MissingParameter { transmission, .. }
            | Self::UnexpectedParameter { transmission, .. }
            | Self::InvalidParameter { transmission, .. }
            | Self::Build { transmission, .. }
            | Self::MissingResource { transmission, .. }
            | Self::WrongInterface { transmission, .. } => Some(transmission),
            Self::Parse(_) | Self::Retrieval(_) | Self::Interface(_) => None,
        }
    }
}
