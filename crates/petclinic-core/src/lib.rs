// crates/petclinic-core/src/lib.rs
// ============================================================================
// Module: Pet Clinic Core
// Description: Domain model, store interface, and clinic workflows.
// Purpose: Provide backend-agnostic owner/pet semantics for all crates.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! `petclinic-core` defines the owner/pet aggregate, the [`OwnerStore`]
//! persistence contract, and the [`ClinicService`] workflows (owner lookup,
//! owner creation, pet registration, pet deletion). Transport and
//! authorization concerns live in `petclinic-server`; durable storage lives in
//! `petclinic-store-sqlite`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::identifiers::OwnerId;
pub use crate::core::identifiers::PetId;
pub use crate::core::identifiers::PetTypeId;
pub use crate::core::model::Owner;
pub use crate::core::model::Pet;
pub use crate::core::model::PetType;
pub use crate::core::model::ValidationError;
pub use crate::core::model::format_iso_date;
pub use crate::core::model::parse_iso_date;
pub use crate::interfaces::OwnerStore;
pub use crate::interfaces::StoreError;
pub use crate::runtime::ClinicService;
pub use crate::runtime::ClinicServiceError;
pub use crate::runtime::InMemoryOwnerStore;
pub use crate::runtime::SharedOwnerStore;
