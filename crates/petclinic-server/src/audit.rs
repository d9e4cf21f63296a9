// crates/petclinic-server/src/audit.rs
// ============================================================================
// Module: Clinic Audit Logging
// Description: Structured audit events for clinic request handling.
// Purpose: Emit JSON-line audit records to stderr, a file, or nowhere.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are serialized as single JSON lines. The server records one
//! [`RequestAuditEvent`] per request, the router records an
//! [`AuthAuditEvent`] per authorization decision, and startup posture
//! warnings are recorded as [`SecurityAuditEvent`]s. Internal error detail
//! that is withheld from clients is kept here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::auth::AuthAuditEvent;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier.
    pub request_id: Option<String>,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// HTTP method.
    pub method: &'static str,
    /// Route label.
    pub route: &'static str,
    /// Raw owner id path segment, when the route has one.
    pub owner_id: Option<String>,
    /// Raw pet id path segment, when the route has one.
    pub pet_id: Option<String>,
    /// HTTP status code returned.
    pub status: u16,
    /// Request outcome (`ok` or `error`).
    pub outcome: &'static str,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Error detail, including detail withheld from the client.
    pub error_detail: Option<String>,
}

/// Inputs required to construct a request audit event.
pub struct RequestAuditEventParams {
    /// Request identifier.
    pub request_id: Option<String>,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// HTTP method.
    pub method: &'static str,
    /// Route label.
    pub route: &'static str,
    /// Raw owner id path segment.
    pub owner_id: Option<String>,
    /// Raw pet id path segment.
    pub pet_id: Option<String>,
    /// HTTP status code returned.
    pub status: u16,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Error detail.
    pub error_detail: Option<String>,
}

impl RequestAuditEvent {
    /// Creates a new request audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RequestAuditEventParams) -> Self {
        Self {
            event: "clinic_request",
            timestamp_ms: now_ms(),
            request_id: params.request_id,
            peer_ip: params.peer_ip,
            method: params.method,
            route: params.route,
            owner_id: params.owner_id,
            pet_id: params.pet_id,
            status: params.status,
            outcome: if params.error_kind.is_some() { "error" } else { "ok" },
            error_kind: params.error_kind,
            error_detail: params.error_detail,
        }
    }
}

/// Security posture audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Security event kind.
    pub kind: String,
    /// Optional message.
    pub message: Option<String>,
}

impl SecurityAuditEvent {
    /// Creates a new security audit event with a consistent timestamp.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: Option<String>) -> Self {
        Self {
            event: "security_audit",
            timestamp_ms: now_ms(),
            kind: kind.into(),
            message,
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for clinic events.
pub trait AuditSink: Send + Sync {
    /// Record a request audit event.
    fn record_request(&self, event: &RequestAuditEvent);

    /// Record an auth decision.
    fn record_auth(&self, _event: &AuthAuditEvent) {}

    /// Record a security posture event.
    fn record_security(&self, _event: &SecurityAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_auth(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_security(&self, event: &SecurityAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized payload line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        self.append(event);
    }

    fn record_auth(&self, event: &AuthAuditEvent) {
        self.append(event);
    }

    fn record_security(&self, event: &SecurityAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_request(&self, _event: &RequestAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
