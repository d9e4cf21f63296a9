// crates/petclinic-core/src/runtime/store.rs
// ============================================================================
// Module: Pet Clinic In-Memory Store
// Description: Mutex-guarded in-memory owner store and shared store wrapper.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryOwnerStore`] keeps every owner in one map behind a single mutex,
//! so each operation (including [`OwnerStore::add_pet`] and
//! [`OwnerStore::delete_pet`]) is atomic with respect to concurrent callers.
//! Pet type names are registered on first use and never renamed. Clones share
//! the same underlying map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::identifiers::OwnerId;
use crate::core::identifiers::PetId;
use crate::core::identifiers::PetTypeId;
use crate::core::model::Owner;
use crate::core::model::Pet;
use crate::core::model::PetType;
use crate::interfaces::OwnerStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable store contents guarded by the store mutex.
#[derive(Debug)]
struct Inner {
    /// Owners keyed by identifier.
    owners: BTreeMap<OwnerId, Owner>,
    /// Reverse index from pet to owning owner.
    pet_owners: BTreeMap<PetId, OwnerId>,
    /// Registered pet type names.
    pet_types: BTreeMap<PetTypeId, String>,
    /// Next owner identifier to assign.
    next_owner_id: u64,
    /// Next pet identifier to assign.
    next_pet_id: u64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            owners: BTreeMap::new(),
            pet_owners: BTreeMap::new(),
            pet_types: BTreeMap::new(),
            next_owner_id: 1,
            next_pet_id: 1,
        }
    }
}

impl Inner {
    /// Allocates the next owner identifier.
    fn allocate_owner_id(&mut self) -> Result<OwnerId, StoreError> {
        let id = OwnerId::from_raw(self.next_owner_id)
            .ok_or_else(|| StoreError::Store("owner id counter is zero".to_string()))?;
        self.next_owner_id = self
            .next_owner_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Store("owner id space exhausted".to_string()))?;
        Ok(id)
    }

    /// Allocates the next pet identifier.
    fn allocate_pet_id(&mut self) -> Result<PetId, StoreError> {
        let id = PetId::from_raw(self.next_pet_id)
            .ok_or_else(|| StoreError::Store("pet id counter is zero".to_string()))?;
        self.next_pet_id = self
            .next_pet_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Store("pet id space exhausted".to_string()))?;
        Ok(id)
    }

    /// Checks pet types against the registry and each other.
    fn check_pet_types<'a>(
        &self,
        pet_types: impl IntoIterator<Item = &'a PetType>,
    ) -> Result<(), StoreError> {
        let mut staged: BTreeMap<PetTypeId, &str> = BTreeMap::new();
        for pet_type in pet_types {
            let stored = self
                .pet_types
                .get(&pet_type.id)
                .map(String::as_str)
                .or_else(|| staged.get(&pet_type.id).copied());
            match stored {
                Some(stored) if stored != pet_type.name => {
                    return Err(StoreError::PetTypeConflict {
                        type_id: pet_type.id.get(),
                        stored: stored.to_string(),
                        requested: pet_type.name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    staged.insert(pet_type.id, &pet_type.name);
                }
            }
        }
        Ok(())
    }

    /// Registers a pet type name; callers check for conflicts first.
    fn register_pet_type(&mut self, pet_type: &PetType) {
        self.pet_types.entry(pet_type.id).or_insert_with(|| pet_type.name.clone());
    }
}

/// In-memory owner store for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOwnerStore {
    /// Store contents protected by a mutex.
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryOwnerStore {
    /// Creates a new, empty in-memory owner store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store contents.
    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Store("owner store mutex poisoned".to_string()))
    }
}

impl OwnerStore for InMemoryOwnerStore {
    fn save(&self, owner: &mut Owner) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if let Some(owner_id) = owner.id
            && !guard.owners.contains_key(&owner_id)
        {
            return Err(StoreError::Invalid(format!("unknown owner id {owner_id}")));
        }
        let mut seen = BTreeSet::new();
        for pet in &owner.pets {
            let Some(pet_id) = pet.id else {
                continue;
            };
            if !seen.insert(pet_id) {
                return Err(StoreError::Invalid(format!("duplicate pet id {pet_id}")));
            }
            let owned_by =
                owner.id.is_some_and(|owner_id| guard.pet_owners.get(&pet_id) == Some(&owner_id));
            if !owned_by {
                return Err(StoreError::Invalid(format!("pet {pet_id} is not owned by this owner")));
            }
        }
        guard.check_pet_types(owner.pets.iter().map(|pet| &pet.pet_type))?;

        let owner_id = match owner.id {
            Some(owner_id) => owner_id,
            None => guard.allocate_owner_id()?,
        };
        for pet in &mut owner.pets {
            if pet.id.is_none() {
                pet.id = Some(guard.allocate_pet_id()?);
            }
        }
        owner.id = Some(owner_id);

        if let Some(previous) = guard.owners.get(&owner_id) {
            let orphaned: Vec<PetId> = previous
                .pets
                .iter()
                .filter_map(|pet| pet.id)
                .filter(|pet_id| owner.pet(*pet_id).is_none())
                .collect();
            for pet_id in orphaned {
                guard.pet_owners.remove(&pet_id);
            }
        }
        for pet in &owner.pets {
            if let Some(pet_id) = pet.id {
                guard.pet_owners.insert(pet_id, owner_id);
            }
            guard.register_pet_type(&pet.pet_type);
        }
        guard.owners.insert(owner_id, owner.clone());
        drop(guard);
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Owner>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.owners.values().cloned().collect())
    }

    fn find_by_id(&self, owner_id: OwnerId) -> Result<Option<Owner>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.owners.get(&owner_id).cloned())
    }

    fn add_pet(&self, owner_id: OwnerId, mut pet: Pet) -> Result<Option<Pet>, StoreError> {
        if let Some(pet_id) = pet.id {
            return Err(StoreError::Invalid(format!("new pet already carries id {pet_id}")));
        }
        let mut guard = self.lock()?;
        let Some(owner) = guard.owners.get(&owner_id) else {
            return Ok(None);
        };
        if owner.pet_by_name(&pet.name).is_some() {
            return Err(StoreError::DuplicatePetName {
                owner_id: owner_id.get(),
                name: pet.name,
            });
        }
        guard.check_pet_types([&pet.pet_type])?;
        let pet_id = guard.allocate_pet_id()?;
        pet.id = Some(pet_id);
        guard.register_pet_type(&pet.pet_type);
        guard.pet_owners.insert(pet_id, owner_id);
        if let Some(owner) = guard.owners.get_mut(&owner_id) {
            owner.add_pet(pet.clone());
        }
        drop(guard);
        Ok(Some(pet))
    }

    fn delete_pet(&self, owner_id: OwnerId, pet_id: PetId) -> Result<Option<Pet>, StoreError> {
        let mut guard = self.lock()?;
        let removed = guard.owners.get_mut(&owner_id).and_then(|owner| owner.remove_pet(pet_id));
        if removed.is_some() {
            guard.pet_owners.remove(&pet_id);
        }
        drop(guard);
        Ok(removed)
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared owner store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedOwnerStore {
    /// Inner store implementation.
    inner: Arc<dyn OwnerStore + Send + Sync>,
}

impl SharedOwnerStore {
    /// Wraps an owner store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl OwnerStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn OwnerStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl OwnerStore for SharedOwnerStore {
    fn save(&self, owner: &mut Owner) -> Result<(), StoreError> {
        self.inner.save(owner)
    }

    fn find_all(&self) -> Result<Vec<Owner>, StoreError> {
        self.inner.find_all()
    }

    fn find_by_id(&self, owner_id: OwnerId) -> Result<Option<Owner>, StoreError> {
        self.inner.find_by_id(owner_id)
    }

    fn add_pet(&self, owner_id: OwnerId, pet: Pet) -> Result<Option<Pet>, StoreError> {
        self.inner.add_pet(owner_id, pet)
    }

    fn delete_pet(&self, owner_id: OwnerId, pet_id: PetId) -> Result<Option<Pet>, StoreError> {
        self.inner.delete_pet(owner_id, pet_id)
    }
}
