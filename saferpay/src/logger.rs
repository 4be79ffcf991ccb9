//! Diagnostic event sinks
//!
//! The client reports protocol events through [`EventLogger`] so callers can
//! route them anywhere. [`TracingLogger`] forwards to `tracing`.

use tracing::{debug, error};

/// Severity of a protocol event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Wire-level detail (URLs, payloads, raw bodies)
    Debug,
    /// A failure that aborts the current step
    Critical,
}

/// Leveled sink for protocol events
pub trait EventLogger: Send + Sync {
    /// Record one event with optional structured fields
    fn log(&self, severity: Severity, message: &str, fields: &[(&str, &str)]);

    /// Record a debug event
    fn debug(&self, message: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Debug, message, fields);
    }

    /// Record a critical event
    fn critical(&self, message: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Critical, message, fields);
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl EventLogger for NoopLogger {
    fn log(&self, _severity: Severity, _message: &str, _fields: &[(&str, &str)]) {}
}

/// Forwards events to `tracing` under the `saferpay` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl EventLogger for TracingLogger {
    fn log(&self, severity: Severity, message: &str, fields: &[(&str, &str)]) {
        let fields = format_fields(fields);
        match severity {
            Severity::Debug => debug!(target: "saferpay", fields = %fields, "{}", message),
            Severity::Critical => error!(target: "saferpay", fields = %fields, "{}", message),
        }
    }
}

fn format_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}
