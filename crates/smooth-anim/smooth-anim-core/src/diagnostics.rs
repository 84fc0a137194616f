//! Structured diagnostics.
//!
//! The controller never calls the `log` macros directly. It reports through a
//! [`DiagnosticSink`] handed to it at construction, so tests can capture
//! exactly what was reported with [`RecordingSink`]. Production hosts use
//! [`LogSink`], which forwards to the `log` facade.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

pub const LOG_TARGET: &str = "smooth_anim";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
    /// Also report the persisted vector after every read and write.
    pub trace_state: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg {
            enabled: true,
            trace_state: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Instance code of the system that reported it.
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            source: source.into(),
            message: message.into(),
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, d: Diagnostic) {
        match d.severity {
            Severity::Trace => log::trace!(target: LOG_TARGET, "[{}] {}", d.source, d.message),
            Severity::Debug => log::debug!(target: LOG_TARGET, "[{}] {}", d.source, d.message),
            Severity::Info => log::info!(target: LOG_TARGET, "[{}] {}", d.source, d.message),
            Severity::Warn => log::warn!(target: LOG_TARGET, "[{}] {}", d.source, d.message),
            Severity::Error => log::error!(target: LOG_TARGET, "[{}] {}", d.source, d.message),
        }
    }
}

/// Collects diagnostics in memory. Clones share the same buffer, so one clone
/// can be boxed into a controller while the test keeps the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn records(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.lock()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}

/// Render a bit-vector as `true,false,...`.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter()
        .map(|b| if *b { "true" } else { "false" })
        .collect::<Vec<_>>()
        .join(",")
}
