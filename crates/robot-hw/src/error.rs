use std::path::PathBuf;

use hardware_interface::HardwareInterfaceError;
use thiserror::Error;
use transmission_interface::{RetrievalError, TransmissionError};

pub type Result<T, E = BackendError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend configuration: {0}")]
    Config(String),
    #[error("reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("retrieving robot description: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("reading robot description: {0}")]
    Description(#[source] TransmissionError),
    #[error("transmission '{name}' failed to load: {source}")]
    Transmission {
        name: String,
        #[source]
        source: TransmissionError,
    },
    #[error(transparent)]
    Interface(#[from] HardwareInterfaceError),
}

impl BackendError {
    /// Split description errors into retrieval and parse failures.
    pub(crate) fn description(err: TransmissionError) -> Self {
        match err {
            TransmissionError::Retrieval(e) => Self::Retrieval(e),
            other => Self::Description(other),
        }
    }
}
