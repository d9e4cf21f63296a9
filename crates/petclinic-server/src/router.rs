// crates/petclinic-server/src/router.rs
// ============================================================================
// Module: Clinic Router
// Description: Request dispatch for owner and pet operations.
// Purpose: Authorize, parse identifiers, and map workflow outcomes.
// Dependencies: petclinic-core, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! [`ClinicRouter`] is transport-agnostic: it takes raw path segments and
//! raw JSON bodies, enforces authentication before parsing or store access
//! on mutating routes, and returns explicit [`ClinicError`] values. The HTTP
//! status for each error is chosen by the server.
//!
//! The delete route reports an unknown owner as [`ClinicError::Internal`]
//! while the show and add-pet routes report it as [`ClinicError::NotFound`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use petclinic_core::ClinicService;
use petclinic_core::ClinicServiceError;
use petclinic_core::Owner;
use petclinic_core::OwnerId;
use petclinic_core::Pet;
use petclinic_core::PetId;
use petclinic_core::PetType;
use serde::de::DeserializeOwned;
use thiserror::Error;
use time::Date;
use time::OffsetDateTime;

use crate::audit::AuditSink;
use crate::auth::AuthAction;
use crate::auth::AuthAuditEvent;
use crate::auth::AuthContext;
use crate::auth::AuthError;
use crate::auth::RequestAuthz;
use crate::auth::RequestContext;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Clinic request errors.
#[derive(Debug, Error)]
pub enum ClinicError {
    /// Missing or invalid credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Malformed identifier, body, or field values.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Server-side fault; the detail is not shown to clients.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClinicError {
    /// Returns a stable label for audit records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<AuthError> for ClinicError {
    fn from(error: AuthError) -> Self {
        let AuthError::Unauthenticated(message) = error;
        Self::Unauthenticated(message)
    }
}

/// Maps workflow errors for routes where a missing owner is a 404.
fn lookup_error(error: ClinicServiceError) -> ClinicError {
    match error {
        ClinicServiceError::OwnerNotFound {
            ..
        }
        | ClinicServiceError::PetNotFound {
            ..
        } => ClinicError::NotFound(error.to_string()),
        ClinicServiceError::Validation(err) => ClinicError::BadRequest(err.to_string()),
        ClinicServiceError::Store(err) => ClinicError::Internal(err.to_string()),
    }
}

/// Maps workflow errors for the delete route.
fn delete_error(error: ClinicServiceError) -> ClinicError {
    match error {
        ClinicServiceError::OwnerNotFound {
            ..
        } => ClinicError::Internal(error.to_string()),
        other => lookup_error(other),
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Clock used for birth-date validation.
pub type TodayFn = Arc<dyn Fn() -> Date + Send + Sync>;

/// Request router for clinic operations.
#[derive(Clone)]
pub struct ClinicRouter {
    /// Clinic workflows.
    service: ClinicService,
    /// Authn policy for mutating routes.
    authz: Arc<dyn RequestAuthz>,
    /// Audit sink for auth decisions.
    audit: Arc<dyn AuditSink>,
    /// Current date source.
    today: TodayFn,
}

impl ClinicRouter {
    /// Builds a router over the given service, policy, and audit sink.
    #[must_use]
    pub fn new(
        service: ClinicService,
        authz: Arc<dyn RequestAuthz>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            service,
            authz,
            audit,
            today: Arc::new(|| OffsetDateTime::now_utc().date()),
        }
    }

    /// Returns a copy that uses `today` as the current date.
    #[must_use]
    pub fn with_today(mut self, today: TodayFn) -> Self {
        self.today = today;
        self
    }

    /// Returns the underlying clinic service.
    #[must_use]
    pub const fn service(&self) -> &ClinicService {
        &self.service
    }

    /// Deletes a pet owned by an owner.
    ///
    /// Authentication runs before any identifier parsing or store access.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Unauthenticated`] for bad credentials,
    /// [`ClinicError::BadRequest`] for non-numeric ids,
    /// [`ClinicError::Internal`] when the owner does not exist, and
    /// [`ClinicError::NotFound`] when the owner does not own the pet.
    pub fn delete_pet(
        &self,
        ctx: &RequestContext,
        owner_id: &str,
        pet_id: &str,
    ) -> Result<Pet, ClinicError> {
        self.authorize(ctx, AuthAction::DeletePet)?;
        let owner_raw = parse_id("owner", owner_id)?;
        let pet_raw = parse_id("pet", pet_id)?;
        let Some(owner_id) = OwnerId::from_raw(owner_raw) else {
            return Err(delete_error(ClinicServiceError::OwnerNotFound {
                owner_id: owner_raw,
            }));
        };
        let Some(pet_id) = PetId::from_raw(pet_raw) else {
            self.service.owner(owner_id).map_err(delete_error)?;
            return Err(delete_error(ClinicServiceError::PetNotFound {
                owner_id: owner_raw,
                pet_id: pet_raw,
            }));
        };
        self.service.delete_pet(owner_id, pet_id).map_err(delete_error)
    }

    /// Lists owners, optionally filtered by last-name prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Internal`] when the store fails.
    pub fn list_owners(&self, last_name: Option<&str>) -> Result<Vec<Owner>, ClinicError> {
        self.service.find_owners(last_name).map_err(lookup_error)
    }

    /// Returns one owner with pets.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::BadRequest`] for a non-numeric id and
    /// [`ClinicError::NotFound`] when the owner does not exist.
    pub fn show_owner(&self, owner_id: &str) -> Result<Owner, ClinicError> {
        let owner_id = resolve_owner_id(owner_id)?;
        self.service.owner(owner_id).map_err(lookup_error)
    }

    /// Creates an owner (and any pets it carries) from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Unauthenticated`] for bad credentials and
    /// [`ClinicError::BadRequest`] for malformed JSON or failed validation.
    pub fn create_owner(&self, ctx: &RequestContext, body: &[u8]) -> Result<Owner, ClinicError> {
        self.authorize(ctx, AuthAction::CreateOwner)?;
        let owner: Owner = decode_body(body)?;
        self.service.create_owner(owner, (self.today)()).map_err(lookup_error)
    }

    /// Registers a new pet under an owner from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Unauthenticated`] for bad credentials,
    /// [`ClinicError::BadRequest`] for a non-numeric id, malformed JSON, or an
    /// invalid pet, and [`ClinicError::NotFound`] when the owner does not
    /// exist.
    pub fn add_pet(
        &self,
        ctx: &RequestContext,
        owner_id: &str,
        body: &[u8],
    ) -> Result<Pet, ClinicError> {
        self.authorize(ctx, AuthAction::AddPet)?;
        let owner_id = resolve_owner_id(owner_id)?;
        let pet: Pet = decode_body(body)?;
        self.service.add_pet(owner_id, pet, (self.today)()).map_err(lookup_error)
    }

    /// Lists pet types referenced by stored pets.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Internal`] when the store fails.
    pub fn pet_types(&self) -> Result<Vec<PetType>, ClinicError> {
        self.service.pet_types().map_err(lookup_error)
    }

    /// Authorizes an action and emits an auth audit record.
    fn authorize(
        &self,
        ctx: &RequestContext,
        action: AuthAction,
    ) -> Result<AuthContext, ClinicError> {
        match self.authz.authorize(ctx, action) {
            Ok(auth) => {
                self.audit.record_auth(&AuthAuditEvent::allowed(ctx, action, &auth));
                Ok(auth)
            }
            Err(err) => {
                self.audit.record_auth(&AuthAuditEvent::denied(ctx, action, &err));
                Err(err.into())
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a JSON request body.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClinicError> {
    serde_json::from_slice(body)
        .map_err(|err| ClinicError::BadRequest(format!("invalid json body: {err}")))
}

/// Parses an owner id where `0` is treated as an unknown owner.
fn resolve_owner_id(raw: &str) -> Result<OwnerId, ClinicError> {
    let owner_raw = parse_id("owner", raw)?;
    OwnerId::from_raw(owner_raw).ok_or_else(|| {
        lookup_error(ClinicServiceError::OwnerNotFound {
            owner_id: owner_raw,
        })
    })
}

/// Parses a decimal path identifier made only of ASCII digits.
fn parse_id(label: &str, raw: &str) -> Result<u64, ClinicError> {
    let invalid = || ClinicError::BadRequest(format!("invalid {label} id: {raw}"));
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<u64>().map_err(|_| invalid())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
