// crates/petclinic-core/src/runtime/service.rs
// ============================================================================
// Module: Pet Clinic Service
// Description: Owner lookup, owner creation, pet registration, pet deletion.
// Purpose: Implement clinic workflows once for every transport.
// Dependencies: crate::{core, interfaces}, thiserror, time
// ============================================================================

//! ## Overview
//! [`ClinicService`] wraps a [`SharedOwnerStore`] and implements the owner and
//! pet workflows. It performs no authorization; callers must authorize
//! mutating requests before invoking it. Errors are explicit values so the
//! transport decides how each maps to a status code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;
use time::Date;

use crate::core::identifiers::OwnerId;
use crate::core::identifiers::PetId;
use crate::core::identifiers::PetTypeId;
use crate::core::model::Owner;
use crate::core::model::Pet;
use crate::core::model::PetType;
use crate::core::model::ValidationError;
use crate::interfaces::OwnerStore;
use crate::interfaces::StoreError;
use crate::runtime::store::SharedOwnerStore;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Clinic workflow errors.
#[derive(Debug, Error)]
pub enum ClinicServiceError {
    /// No owner exists with the requested identifier.
    #[error("Owner with ID {owner_id} not found")]
    OwnerNotFound {
        /// Requested owner identifier.
        owner_id: u64,
    },
    /// The owner exists but does not own the requested pet.
    #[error("Pet with ID {pet_id} not found for owner with ID {owner_id}")]
    PetNotFound {
        /// Requested owner identifier.
        owner_id: u64,
        /// Requested pet identifier.
        pet_id: u64,
    },
    /// Input failed field validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Clinic workflows over a shared owner store.
#[derive(Clone)]
pub struct ClinicService {
    /// Backing owner store.
    store: SharedOwnerStore,
}

impl ClinicService {
    /// Creates a clinic service over the provided store.
    #[must_use]
    pub const fn new(store: SharedOwnerStore) -> Self {
        Self {
            store,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &SharedOwnerStore {
        &self.store
    }

    /// Lists owners, optionally filtered by a last-name prefix.
    ///
    /// An empty prefix matches every owner.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicServiceError::Store`] when the store cannot be read.
    pub fn find_owners(&self, last_name: Option<&str>) -> Result<Vec<Owner>, ClinicServiceError> {
        let owners = self.store.find_all()?;
        let Some(prefix) = last_name.filter(|prefix| !prefix.is_empty()) else {
            return Ok(owners);
        };
        Ok(owners.into_iter().filter(|owner| owner.last_name.starts_with(prefix)).collect())
    }

    /// Returns the owner with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicServiceError::OwnerNotFound`] when absent.
    pub fn owner(&self, owner_id: OwnerId) -> Result<Owner, ClinicServiceError> {
        self.store.find_by_id(owner_id)?.ok_or(ClinicServiceError::OwnerNotFound {
            owner_id: owner_id.get(),
        })
    }

    /// Validates and stores a new owner (with any new pets it carries).
    ///
    /// # Errors
    ///
    /// Returns [`ClinicServiceError::Validation`] for invalid input and
    /// [`ClinicServiceError::Store`] when persistence fails.
    pub fn create_owner(&self, mut owner: Owner, today: Date) -> Result<Owner, ClinicServiceError> {
        if !owner.is_new() {
            return Err(ValidationError::new("id", "new owner must not carry an id").into());
        }
        owner.validate()?;
        let pets = std::mem::take(&mut owner.pets);
        for pet in pets {
            owner.validate_new_pet(&pet, today)?;
            owner.add_pet(pet);
        }
        self.store.save(&mut owner).map_err(store_error)?;
        Ok(owner)
    }

    /// Validates and registers a new pet under an existing owner.
    ///
    /// Field checks run against a snapshot of the owner; the duplicate-name
    /// check and the insert are repeated atomically by the store, so
    /// overlapping requests never drop each other's pets.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicServiceError::OwnerNotFound`] when the owner is absent,
    /// [`ClinicServiceError::Validation`] for invalid input, a duplicate name,
    /// or a pet type name that disagrees with the stored one, and
    /// [`ClinicServiceError::Store`] when persistence fails.
    pub fn add_pet(
        &self,
        owner_id: OwnerId,
        pet: Pet,
        today: Date,
    ) -> Result<Pet, ClinicServiceError> {
        let owner = self.owner(owner_id)?;
        owner.validate_new_pet(&pet, today)?;
        self.store.add_pet(owner_id, pet).map_err(store_error)?.ok_or(
            ClinicServiceError::OwnerNotFound {
                owner_id: owner_id.get(),
            },
        )
    }

    /// Deletes a pet owned by the given owner.
    ///
    /// The owner is resolved first, then the pet is resolved within that
    /// owner's collection, then the store removes it atomically. Deleting an
    /// already deleted pet yields [`ClinicServiceError::PetNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`ClinicServiceError::OwnerNotFound`] when the owner is absent,
    /// [`ClinicServiceError::PetNotFound`] when the owner does not own the
    /// pet, and [`ClinicServiceError::Store`] when persistence fails.
    pub fn delete_pet(&self, owner_id: OwnerId, pet_id: PetId) -> Result<Pet, ClinicServiceError> {
        let owner = self.owner(owner_id)?;
        let not_found = || ClinicServiceError::PetNotFound {
            owner_id: owner_id.get(),
            pet_id: pet_id.get(),
        };
        if owner.pet(pet_id).is_none() {
            return Err(not_found());
        }
        // A concurrent delete may win between the lookup and the removal.
        self.store.delete_pet(owner_id, pet_id)?.ok_or_else(not_found)
    }

    /// Returns the distinct pet types referenced by stored pets, by name.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicServiceError::Store`] when the store cannot be read.
    pub fn pet_types(&self) -> Result<Vec<PetType>, ClinicServiceError> {
        let mut types: BTreeMap<PetTypeId, PetType> = BTreeMap::new();
        for owner in self.store.find_all()? {
            for pet in owner.pets {
                types.entry(pet.pet_type.id).or_insert(pet.pet_type);
            }
        }
        let mut types: Vec<PetType> = types.into_values().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(types)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps store conflicts caused by caller input to validation errors.
fn store_error(error: StoreError) -> ClinicServiceError {
    match error {
        StoreError::DuplicatePetName {
            ..
        } => ValidationError::new("name", "already exists for this owner").into(),
        StoreError::PetTypeConflict {
            type_id,
            stored,
            ..
        } => ValidationError::new("type", format!("id {type_id} is already named {stored}")).into(),
        other => ClinicServiceError::Store(other),
    }
}
