//! Injected diagnostic reporting.
//!
//! Components that detect configuration problems report them through a
//! [`DiagnosticSink`] handed to them by the composition root instead of
//! writing to a process-wide logger.

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub component: String,
    pub message: String,
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn info(&self, component: &str, message: String) {
        self.report(Diagnostic {
            severity: Severity::Info,
            component: component.to_string(),
            message,
        });
    }

    fn warning(&self, component: &str, message: String) {
        self.report(Diagnostic {
            severity: Severity::Warning,
            component: component.to_string(),
            message,
        });
    }

    fn error(&self, component: &str, message: String) {
        self.report(Diagnostic {
            severity: Severity::Error,
            component: component.to_string(),
            message,
        });
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, d: Diagnostic) {
        match d.severity {
            Severity::Info => tracing::info!(component = %d.component, "{}", d.message),
            Severity::Warning => tracing::warn!(component = %d.component, "{}", d.message),
            Severity::Error => tracing::error!(component = %d.component, "{}", d.message),
        }
    }
}

/// Keeps every diagnostic in memory; handy for tests and CLI summaries.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}
