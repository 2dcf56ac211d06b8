//! Port for pipeline audit logging.
//!
//! Separate from `tracing`: tracing carries diagnostics, while audit events
//! record each run's lifecycle in a machine-readable form (JSONL).

use serde_json::Value;

/// A structured audit event.
pub struct AuditEvent {
    /// Event type identifier (e.g., "review_started", "review_failed").
    pub event_type: &'static str,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Records audit events. Never fails the caller.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when audit logging is disabled.
pub struct NoAuditLog;

impl AuditLogger for NoAuditLog {
    fn log(&self, _event: AuditEvent) {}
}
