// crates/petclinic-core/src/interfaces/mod.rs
// ============================================================================
// Module: Pet Clinic Interfaces
// Description: Backend-agnostic persistence interface for owners and pets.
// Purpose: Define the storage contract used by clinic workflows.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`OwnerStore`] persists the owner aggregate. Implementations assign
//! identifiers, keep every saved pet reachable from exactly one owner, and
//! make [`OwnerStore::add_pet`] and [`OwnerStore::delete_pet`] atomic with
//! respect to the owner's pet collection. A pet type id names one type for
//! the whole store; a second name for a known id is rejected. Implementations
//! must fail closed on invalid or corrupt data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::OwnerId;
use crate::core::identifiers::PetId;
use crate::core::model::Owner;
use crate::core::model::Pet;

// ============================================================================
// SECTION: Owner Store
// ============================================================================

/// Owner store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store backend error.
    #[error("store error: {0}")]
    Store(String),
    /// Store corruption.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid data supplied to or read from the store.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// The owner already has a pet with this name (case-insensitive).
    #[error("pet name {name} already exists for owner {owner_id}")]
    DuplicatePetName {
        /// Owner identifier.
        owner_id: u64,
        /// Rejected pet name.
        name: String,
    },
    /// A pet type id is already registered under a different name.
    #[error("pet type {type_id} is registered as {stored}, not {requested}")]
    PetTypeConflict {
        /// Pet type identifier.
        type_id: u64,
        /// Name already stored for the type.
        stored: String,
        /// Name supplied by the caller.
        requested: String,
    },
}

/// Persistence contract for the owner aggregate.
pub trait OwnerStore {
    /// Persists an owner and its pets.
    ///
    /// Assigns identifiers to a new owner and to any new pets, writing them
    /// back into `owner`. Pets previously saved under this owner but missing
    /// from `owner.pets` are deleted, so saving an existing owner replaces
    /// its whole collection. Adding or removing a single pet goes through
    /// [`OwnerStore::add_pet`] and [`OwnerStore::delete_pet`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when `owner.id` is unknown or a pet id
    /// belongs to a different owner, [`StoreError::PetTypeConflict`] when a
    /// pet type id is stored under another name, and other [`StoreError`]
    /// variants when persistence fails.
    fn save(&self, owner: &mut Owner) -> Result<(), StoreError>;

    /// Returns all owners ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn find_all(&self) -> Result<Vec<Owner>, StoreError>;

    /// Returns the owner with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn find_by_id(&self, owner_id: OwnerId) -> Result<Option<Owner>, StoreError>;

    /// Atomically appends a new pet to an existing owner.
    ///
    /// The duplicate-name check, the pet type check, and the insert run as
    /// one unit. Returns the stored pet with its assigned identifier, or
    /// `Ok(None)` when the owner is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicatePetName`] when the owner already has a
    /// pet with the same name, [`StoreError::PetTypeConflict`] when the pet
    /// type id is stored under another name, [`StoreError::Invalid`] when the
    /// pet already carries an identifier, and other [`StoreError`] variants
    /// when persistence fails.
    fn add_pet(&self, owner_id: OwnerId, pet: Pet) -> Result<Option<Pet>, StoreError>;

    /// Atomically removes a pet from an owner's collection and the store.
    ///
    /// Returns `Ok(None)` when the owner is unknown or does not own the pet;
    /// the store is left unchanged in that case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn delete_pet(&self, owner_id: OwnerId, pet_id: PetId) -> Result<Option<Pet>, StoreError>;
}
