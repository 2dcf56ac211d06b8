//! Logging infrastructure: the JSONL audit log.
//!
//! Provides [`JsonlAuditLogger`], which implements the
//! [`AuditLogger`](vetting_application::AuditLogger) port.

mod jsonl_audit;

pub use jsonl_audit::JsonlAuditLogger;
