// crates/petclinic-server/src/lib.rs
// ============================================================================
// Module: Pet Clinic Server Library
// Description: HTTP surface for the pet clinic service.
// Purpose: Expose auth, audit, routing, and server wiring.
// Dependencies: axum, petclinic-config, petclinic-core, tokio
// ============================================================================

//! ## Overview
//! `petclinic-server` serves the clinic API over HTTP. Mutating routes are
//! authenticated by [`DefaultRequestAuthz`], dispatched by [`ClinicRouter`],
//! and audited through an [`AuditSink`]. Inputs are untrusted and validated
//! before they reach the store.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod router;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::RequestAuditEventParams;
pub use audit::SecurityAuditEvent;
pub use audit::StderrAuditSink;
pub use auth::AuthAction;
pub use auth::AuthAuditEvent;
pub use auth::AuthContext;
pub use auth::AuthError;
pub use auth::AuthMethod;
pub use auth::DefaultRequestAuthz;
pub use auth::RequestAuthz;
pub use auth::RequestContext;
pub use router::ClinicError;
pub use router::ClinicRouter;
pub use router::TodayFn;
pub use server::PetClinicServer;
pub use server::ServerError;
pub use server::build_app;
