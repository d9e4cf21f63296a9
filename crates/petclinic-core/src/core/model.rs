// crates/petclinic-core/src/core/model.rs
// ============================================================================
// Module: Pet Clinic Model
// Description: Owner aggregate, pets, pet types, and field validation.
// Purpose: Encode aggregate ownership rules independent of storage backends.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! [`Owner`] is the aggregate root: pets are added and removed only through
//! the owner, and a pet belongs to exactly one owner at a time. Identifiers
//! are `None` until a store assigns them. Birth dates serialize as ISO
//! calendar dates (`YYYY-MM-DD`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::core::identifiers::OwnerId;
use crate::core::identifiers::PetId;
use crate::core::identifiers::PetTypeId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Calendar date format used on the wire and in storage.
const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// Maximum number of digits accepted for a telephone number.
pub const MAX_TELEPHONE_DIGITS: usize = 10;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Shared pet category (for example "dog" or "cat").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetType {
    /// Pet type identifier.
    pub id: PetTypeId,
    /// Display name.
    pub name: String,
}

impl PetType {
    /// Creates a pet type.
    #[must_use]
    pub fn new(id: PetTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Animal owned by exactly one [`Owner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Store-assigned identifier (`None` until saved).
    #[serde(default)]
    pub id: Option<PetId>,
    /// Pet name, unique per owner (case-insensitive).
    pub name: String,
    /// Birth date.
    #[serde(with = "iso_date")]
    pub birth_date: Date,
    /// Pet category.
    #[serde(rename = "type")]
    pub pet_type: PetType,
}

impl Pet {
    /// Creates an unsaved pet.
    #[must_use]
    pub fn new(name: impl Into<String>, birth_date: Date, pet_type: PetType) -> Self {
        Self {
            id: None,
            name: name.into(),
            birth_date,
            pet_type,
        }
    }

    /// Returns true when the pet has not been persisted yet.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Validates pet fields against the provided calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a field is blank or the birth date is
    /// after `today`.
    pub fn validate(&self, today: Date) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        if self.birth_date > today {
            return Err(ValidationError::new("birthDate", "must not be in the future"));
        }
        require_text("type", &self.pet_type.name)
    }
}

/// Clinic customer and aggregate root for pets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// Store-assigned identifier (`None` until saved).
    #[serde(default)]
    pub id: Option<OwnerId>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Telephone number (digits only).
    pub telephone: String,
    /// Owned pets in insertion order.
    #[serde(default)]
    pub pets: Vec<Pet>,
}

impl Owner {
    /// Creates an unsaved owner with no pets.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        telephone: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            city: city.into(),
            telephone: telephone.into(),
            pets: Vec::new(),
        }
    }

    /// Returns true when the owner has not been persisted yet.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Appends a pet to the owner's collection.
    pub fn add_pet(&mut self, pet: Pet) {
        self.pets.push(pet);
    }

    /// Returns the pet with the given identifier, if owned.
    #[must_use]
    pub fn pet(&self, pet_id: PetId) -> Option<&Pet> {
        self.pets.iter().find(|pet| pet.id == Some(pet_id))
    }

    /// Returns the first pet whose name matches case-insensitively.
    #[must_use]
    pub fn pet_by_name(&self, name: &str) -> Option<&Pet> {
        let wanted = name.to_lowercase();
        self.pets.iter().find(|pet| pet.name.to_lowercase() == wanted)
    }

    /// Removes and returns the pet with the given identifier.
    pub fn remove_pet(&mut self, pet_id: PetId) -> Option<Pet> {
        let index = self.pets.iter().position(|pet| pet.id == Some(pet_id))?;
        Some(self.pets.remove(index))
    }

    /// Validates owner contact fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for blank fields or a malformed telephone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        require_text("address", &self.address)?;
        require_text("city", &self.city)?;
        require_text("telephone", &self.telephone)?;
        if !self.telephone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("telephone", "must contain digits only"));
        }
        if self.telephone.len() > MAX_TELEPHONE_DIGITS {
            return Err(ValidationError::new(
                "telephone",
                format!("must have at most {MAX_TELEPHONE_DIGITS} digits"),
            ));
        }
        Ok(())
    }

    /// Validates a pet that is about to be added to this owner.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the pet is invalid, already carries an
    /// identifier, or duplicates an existing pet name.
    pub fn validate_new_pet(&self, pet: &Pet, today: Date) -> Result<(), ValidationError> {
        if !pet.is_new() {
            return Err(ValidationError::new("id", "new pet must not carry an id"));
        }
        pet.validate(today)?;
        if self.pet_by_name(&pet.name).is_some() {
            return Err(ValidationError::new("name", "already exists for this owner"));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    /// Field name as it appears on the wire.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for a field.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Dates
// ============================================================================

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`time::error::Parse`] when the input is not a valid date.
pub fn parse_iso_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, ISO_DATE)
}

/// Formats a calendar date as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`time::error::Format`] when the date cannot be rendered.
pub fn format_iso_date(date: Date) -> Result<String, time::error::Format> {
    date.format(ISO_DATE)
}

/// Serde adapter for ISO calendar dates.
mod iso_date {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use time::Date;

    /// Serializes a date as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = super::format_iso_date(*date).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Deserializes a date from `YYYY-MM-DD`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_iso_date(&text).map_err(D::Error::custom)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects empty or whitespace-only text.
fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap for clarity."
    )]

    use time::macros::date;

    use super::*;

    fn dog() -> PetType {
        PetType::new(PetTypeId::from_raw(1).expect("nonzero"), "dog")
    }

    fn saved_pet(raw: u64, name: &str) -> Pet {
        let mut pet = Pet::new(name, date!(2020 - 01 - 01), dog());
        pet.id = PetId::from_raw(raw);
        pet
    }

    #[test]
    fn remove_pet_preserves_order_of_remaining() {
        let mut owner = Owner::new("John", "Doe", "123 Main Street", "Anytown", "1234567890");
        owner.add_pet(saved_pet(1, "Fido"));
        owner.add_pet(saved_pet(2, "Rex"));
        owner.add_pet(saved_pet(3, "Spot"));
        let removed = owner.remove_pet(PetId::from_raw(2).unwrap());
        assert_eq!(removed.map(|pet| pet.name), Some("Rex".to_string()));
        let names: Vec<&str> = owner.pets.iter().map(|pet| pet.name.as_str()).collect();
        assert_eq!(names, vec!["Fido", "Spot"]);
        assert!(owner.remove_pet(PetId::from_raw(2).unwrap()).is_none());
    }

    #[test]
    fn telephone_rejects_letters_and_overflow() {
        let mut owner = Owner::new("John", "Doe", "123 Main Street", "Anytown", "12345abc");
        assert_eq!(owner.validate().unwrap_err().field, "telephone");
        owner.telephone = "12345678901".to_string();
        assert_eq!(owner.validate().unwrap_err().field, "telephone");
        owner.telephone = "1234567890".to_string();
        assert!(owner.validate().is_ok());
    }

    #[test]
    fn new_pet_rejects_duplicate_name_ignoring_case() {
        let mut owner = Owner::new("John", "Doe", "123 Main Street", "Anytown", "1234567890");
        owner.add_pet(saved_pet(1, "Fido"));
        let candidate = Pet::new("fido", date!(2021 - 05 - 05), dog());
        let err = owner.validate_new_pet(&candidate, date!(2024 - 01 - 01)).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn pet_birth_date_in_future_is_rejected() {
        let pet = Pet::new("Fido", date!(2030 - 01 - 01), dog());
        let err = pet.validate(date!(2024 - 01 - 01)).unwrap_err();
        assert_eq!(err.field, "birthDate");
        assert!(pet.validate(date!(2030 - 01 - 01)).is_ok());
    }

    #[test]
    fn iso_date_parse_rejects_garbage() {
        assert!(parse_iso_date("2020-13-01").is_err());
        assert_eq!(parse_iso_date("2020-01-01").unwrap(), date!(2020 - 01 - 01));
        assert_eq!(format_iso_date(date!(2020 - 01 - 01)).unwrap(), "2020-01-01");
    }
}
