// crates/petclinic-core/tests/proptest_delete.rs
// ============================================================================
// Module: Pet Deletion Property Tests
// Description: Property-based checks for the delete-pet workflow.
// Purpose: Ensure deleted pets never reappear and other pets are untouched.
// Dependencies: petclinic-core, proptest, time
// ============================================================================

//! Property-based tests for pet deletion across generated owners.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

use petclinic_core::ClinicService;
use petclinic_core::ClinicServiceError;
use petclinic_core::InMemoryOwnerStore;
use petclinic_core::Owner;
use petclinic_core::OwnerStore;
use petclinic_core::Pet;
use petclinic_core::PetId;
use petclinic_core::PetType;
use petclinic_core::PetTypeId;
use petclinic_core::SharedOwnerStore;
use proptest::prelude::*;
use time::Date;
use time::macros::date;

const TODAY: Date = date!(2024 - 06 - 01);

fn build_service(pets_per_owner: &[usize]) -> ClinicService {
    let service = ClinicService::new(SharedOwnerStore::from_store(InMemoryOwnerStore::new()));
    let dog = PetType::new(PetTypeId::from_raw(1).expect("nonzero pet type"), "dog");
    for (owner_index, pet_count) in pets_per_owner.iter().enumerate() {
        let mut owner =
            Owner::new("First", format!("Last{owner_index}"), "1 Road", "Town", "1234567890");
        for pet_index in 0..*pet_count {
            owner.add_pet(Pet::new(format!("pet-{pet_index}"), date!(2020 - 01 - 01), dog.clone()));
        }
        service.create_owner(owner, TODAY).unwrap();
    }
    service
}

proptest! {
    #[test]
    fn deleted_pet_never_reappears(
        pets_per_owner in prop::collection::vec(1usize..5, 1..5),
        owner_pick in any::<prop::sample::Index>(),
        pet_pick in any::<prop::sample::Index>(),
    ) {
        let service = build_service(&pets_per_owner);
        let owners = service.find_owners(None).unwrap();
        let owner = owner_pick.get(&owners);
        let target = pet_pick.get(&owner.pets).clone();
        let owner_id = owner.id.unwrap();
        let target_id = target.id.unwrap();
        let total_before: usize = owners.iter().map(|owner| owner.pets.len()).sum();

        let removed = service.delete_pet(owner_id, target_id).unwrap();
        prop_assert_eq!(&removed, &target);

        for _ in 0..2 {
            let reloaded = service.store().find_by_id(owner_id).unwrap().unwrap();
            prop_assert!(!reloaded.pets.contains(&target));
            let all = service.find_owners(None).unwrap();
            prop_assert!(all.iter().all(|owner| owner.pet(target_id).is_none()));
            let total_after: usize = all.iter().map(|owner| owner.pets.len()).sum();
            prop_assert_eq!(total_after, total_before - 1);
        }

        let again = service.delete_pet(owner_id, target_id);
        let is_not_found = matches!(again, Err(ClinicServiceError::PetNotFound { .. }));
        prop_assert!(is_not_found);
    }

    #[test]
    fn deleting_missing_pet_leaves_store_unchanged(
        pets_per_owner in prop::collection::vec(0usize..4, 1..4),
        missing in 1_000u64..2_000,
    ) {
        let service = build_service(&pets_per_owner);
        let before = service.find_owners(None).unwrap();
        for owner in &before {
            let result = service.delete_pet(owner.id.unwrap(), PetId::from_raw(missing).unwrap());
            let is_not_found = matches!(result, Err(ClinicServiceError::PetNotFound { .. }));
            prop_assert!(is_not_found);
        }
        prop_assert_eq!(service.find_owners(None).unwrap(), before);
    }
}
