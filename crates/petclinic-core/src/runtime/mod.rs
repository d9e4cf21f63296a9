// crates/petclinic-core/src/runtime/mod.rs
// ============================================================================
// Module: Pet Clinic Runtime
// Description: Clinic workflows and in-memory store implementations.
// Purpose: Execute owner/pet workflows against any OwnerStore.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the clinic workflows and the in-memory store.
//! Every transport must call into [`ClinicService`] so lookup and deletion
//! semantics stay identical across entry points.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod service;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use service::ClinicService;
pub use service::ClinicServiceError;
pub use store::InMemoryOwnerStore;
pub use store::SharedOwnerStore;
