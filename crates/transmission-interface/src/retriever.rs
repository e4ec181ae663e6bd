//! Fetching robot descriptions by URI.
//!
//! Supported forms: `package://<package>/<path>` resolved against configured
//! package roots, `file://<path>`, and plain filesystem paths.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::RetrievalError;

pub trait ResourceRetriever: Send + Sync {
    fn get(&self, uri: &str) -> Result<Vec<u8>, RetrievalError>;
}

#[derive(Debug, Clone, Default)]
pub struct FileRetriever {
    package_roots: BTreeMap<String, PathBuf>,
}

impl FileRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.package_roots.insert(package.into(), root.into());
        self
    }

    /// Filesystem path a URI refers to.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf, RetrievalError> {
        if let Some(rest) = uri.strip_prefix("package://") {
            let (package, relative) = rest.split_once('/').unwrap_or((rest, ""));
            let root = self.package_roots.get(package).ok_or_else(|| {
                RetrievalError::UnknownPackage {
                    package: package.to_string(),
                    uri: uri.to_string(),
                }
            })?;
            return Ok(root.join(relative));
        }
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(RetrievalError::UnsupportedScheme(scheme.to_string()));
        }
        Ok(PathBuf::from(uri))
    }
}

impl ResourceRetriever for FileRetriever {
    fn get(&self, uri: &str) -> Result<Vec<u8>, RetrievalError> {
        let path = self.resolve(uri)?;
        read(&path, uri)
    }
}

fn read(path: &Path, uri: &str) -> Result<Vec<u8>, RetrievalError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RetrievalError::NotFound(uri.to_string()),
        io::ErrorKind::PermissionDenied => RetrievalError::PermissionDenied(uri.to_string()),
        _ => RetrievalError::Io {
            uri: uri.to_string(),
            message: e.to_string(),
        },
    })
}

/// Serves descriptions from memory, keyed by exact URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryRetriever {
    resources: BTreeMap<String, Vec<u8>>,
}

impl MemoryRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.resources.insert(uri.into(), contents.into());
    }
}

impl ResourceRetriever for MemoryRetriever {
    fn get(&self, uri: &str) -> Result<Vec<u8>, RetrievalError> {
        self.resources
            .get(uri)
            .cloned()
            .ok_or_else(|| RetrievalError::NotFound(uri.to_string()))
    }
}
