// crates/petclinic-core/src/core/mod.rs
// ============================================================================
// Module: Pet Clinic Core Types
// Description: Identifiers and the owner/pet aggregate.
// Purpose: Group the serializable domain types used across the workspace.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types are plain data: identifiers are non-zero integers assigned by a
//! store, and [`model::Owner`] is the aggregate root that exclusively owns its
//! [`model::Pet`] collection.

pub mod identifiers;
pub mod model;
