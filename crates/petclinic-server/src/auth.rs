// crates/petclinic-server/src/auth.rs
// ============================================================================
// Module: Clinic Authn
// Description: Authentication enforcement for mutating clinic requests.
// Purpose: Provide a strict, fail-closed token check with audit events.
// Dependencies: petclinic-config, serde, sha2, subtle, thiserror
// ============================================================================

//! ## Overview
//! This module defines the authentication interface for mutating clinic
//! requests and a default token policy derived from `[server.auth]`. Tokens
//! are compared in constant time and only their SHA-256 fingerprint ever
//! reaches the audit log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;

use petclinic_config::ServerAuthConfig;
use petclinic_config::ServerAuthMode;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted `Authorization` header length in bytes.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request context used for auth decisions and auditing.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Authorization header value.
    pub auth_header: Option<String>,
    /// Optional request identifier for auditing.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Builds an HTTP request context.
    #[must_use]
    pub const fn http(peer_ip: Option<IpAddr>, auth_header: Option<String>) -> Self {
        Self {
            peer_ip,
            auth_header,
            request_id: None,
        }
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

// ============================================================================
// SECTION: Auth Context
// ============================================================================

/// Authenticated caller context.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authentication method.
    pub method: AuthMethod,
    /// Token fingerprint (sha256, lowercase hex).
    pub token_fingerprint: String,
}

/// Authentication method used for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Raw token header, optionally with a bearer scheme.
    Token,
    /// `Bearer <token>` header.
    BearerToken,
}

impl AuthMethod {
    /// Returns the audit label for the method.
    const fn label(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::BearerToken => "bearer_token",
        }
    }
}

/// Mutating clinic action being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// `POST /owners`.
    CreateOwner,
    /// `POST /owners/{ownerId}/pets`.
    AddPet,
    /// `POST /owners/{ownerId}/pets/{petId}/delete`.
    DeletePet,
}

impl AuthAction {
    /// Returns the audit label for the action.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreateOwner => "create_owner",
            Self::AddPet => "add_pet",
            Self::DeletePet => "delete_pet",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or invalid authentication.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Authn interface for mutating clinic requests.
pub trait RequestAuthz: Send + Sync {
    /// Authorize a request. Returns an authenticated context on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the caller is not allowed to proceed.
    fn authorize(
        &self,
        ctx: &RequestContext,
        action: AuthAction,
    ) -> Result<AuthContext, AuthError>;
}

// ============================================================================
// SECTION: Default Policy
// ============================================================================

/// Default token policy derived from server config.
pub struct DefaultRequestAuthz {
    /// Header matching mode.
    mode: ServerAuthMode,
    /// Accepted tokens.
    tokens: Vec<String>,
}

impl DefaultRequestAuthz {
    /// Builds the default policy from server auth configuration.
    ///
    /// A missing config yields a policy that rejects every request.
    #[must_use]
    pub fn from_config(config: Option<&ServerAuthConfig>) -> Self {
        Self {
            mode: config.map_or(ServerAuthMode::BearerToken, |cfg| cfg.mode),
            tokens: config.map(|cfg| cfg.tokens.clone()).unwrap_or_default(),
        }
    }

    /// Returns the configured auth mode.
    #[must_use]
    pub const fn mode(&self) -> ServerAuthMode {
        self.mode
    }

    /// Returns true when `candidate` matches a configured token.
    fn accepts(&self, candidate: &str) -> bool {
        // No early exit: every configured token is compared.
        self.tokens.iter().fold(false, |matched, token| {
            let equal: bool = token.as_bytes().ct_eq(candidate.as_bytes()).into();
            matched | equal
        })
    }
}

impl RequestAuthz for DefaultRequestAuthz {
    fn authorize(
        &self,
        ctx: &RequestContext,
        _action: AuthAction,
    ) -> Result<AuthContext, AuthError> {
        let header = ctx
            .auth_header
            .as_deref()
            .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
        if header.len() > MAX_AUTH_HEADER_BYTES {
            return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
        }
        let (method, token) = match self.mode {
            ServerAuthMode::Token => parse_token(header)?,
            ServerAuthMode::BearerToken => (AuthMethod::BearerToken, parse_bearer_token(header)?),
        };
        if !self.accepts(token) {
            return Err(AuthError::Unauthenticated("invalid token".to_string()));
        }
        Ok(AuthContext {
            method,
            token_fingerprint: token_fingerprint(token),
        })
    }
}

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Auth audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuthAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Decision outcome.
    decision: &'static str,
    /// Clinic action label.
    action: &'static str,
    /// Caller IP address (if available).
    peer_ip: Option<String>,
    /// Auth method label.
    auth_method: Option<&'static str>,
    /// Token fingerprint (sha256).
    token_fingerprint: Option<String>,
    /// Failure reason (for deny events).
    reason: Option<String>,
    /// Request identifier (if provided).
    request_id: Option<String>,
}

impl AuthAuditEvent {
    /// Builds an allow event.
    #[must_use]
    pub fn allowed(ctx: &RequestContext, action: AuthAction, auth: &AuthContext) -> Self {
        Self {
            event: "clinic_authz",
            decision: "allow",
            action: action.label(),
            peer_ip: ctx.peer_ip.map(|ip| ip.to_string()),
            auth_method: Some(auth.method.label()),
            token_fingerprint: Some(auth.token_fingerprint.clone()),
            reason: None,
            request_id: ctx.request_id.clone(),
        }
    }

    /// Builds a deny event.
    #[must_use]
    pub fn denied(ctx: &RequestContext, action: AuthAction, error: &AuthError) -> Self {
        Self {
            event: "clinic_authz",
            decision: "deny",
            action: action.label(),
            peer_ip: ctx.peer_ip.map(|ip| ip.to_string()),
            auth_method: None,
            token_fingerprint: None,
            reason: Some(error.to_string()),
            request_id: ctx.request_id.clone(),
        }
    }

    /// Returns the decision label (`allow` or `deny`).
    #[must_use]
    pub const fn decision(&self) -> &'static str {
        self.decision
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Accepts a bare token or a `Bearer <token>` header.
fn parse_token(header: &str) -> Result<(AuthMethod, &str), AuthError> {
    let trimmed = header.trim();
    if let Some((scheme, rest)) = trimmed.split_once(' ')
        && scheme.eq_ignore_ascii_case("bearer")
    {
        let token = rest.trim();
        if token.is_empty() {
            return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
        }
        return Ok((AuthMethod::BearerToken, token));
    }
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok((AuthMethod::Token, trimmed))
}

/// Requires a `Bearer <token>` header.
fn parse_bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token)
}

/// Returns the lowercase hex SHA-256 digest of a token.
fn token_fingerprint(token: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let digest = Sha256::digest(token.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
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
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only auth assertions."
    )]

    use petclinic_config::ServerAuthConfig;
    use petclinic_config::ServerAuthMode;

    use super::AuthAction;
    use super::AuthError;
    use super::AuthMethod;
    use super::DefaultRequestAuthz;
    use super::RequestAuthz;
    use super::RequestContext;
    use super::token_fingerprint;

    fn authz(mode: ServerAuthMode) -> DefaultRequestAuthz {
        DefaultRequestAuthz::from_config(Some(&ServerAuthConfig {
            mode,
            tokens: vec!["valid-token".to_string(), "second".to_string()],
        }))
    }

    fn ctx(header: Option<&str>) -> RequestContext {
        RequestContext::http(None, header.map(str::to_string))
    }

    #[test]
    fn token_mode_accepts_bare_and_bearer_headers() {
        let authz = authz(ServerAuthMode::Token);
        let bare = authz.authorize(&ctx(Some("valid-token")), AuthAction::DeletePet).unwrap();
        assert_eq!(bare.method, AuthMethod::Token);
        let bearer = authz.authorize(&ctx(Some("bearer second")), AuthAction::DeletePet).unwrap();
        assert_eq!(bearer.method, AuthMethod::BearerToken);
        assert_eq!(bearer.token_fingerprint, token_fingerprint("second"));
    }

    #[test]
    fn bearer_mode_rejects_bare_token() {
        let authz = authz(ServerAuthMode::BearerToken);
        let err = authz.authorize(&ctx(Some("valid-token")), AuthAction::AddPet).unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(_)));
        authz.authorize(&ctx(Some("Bearer valid-token")), AuthAction::AddPet).unwrap();
    }

    #[test]
    fn missing_and_unknown_tokens_are_rejected() {
        let authz = authz(ServerAuthMode::Token);
        let missing = authz.authorize(&ctx(None), AuthAction::DeletePet).unwrap_err();
        assert!(missing.to_string().contains("missing authorization"));
        let unknown = authz.authorize(&ctx(Some("nope")), AuthAction::DeletePet).unwrap_err();
        assert!(unknown.to_string().contains("invalid token"));
        let prefix = authz.authorize(&ctx(Some("valid")), AuthAction::DeletePet).unwrap_err();
        assert!(matches!(prefix, AuthError::Unauthenticated(_)));
    }

    #[test]
    fn oversized_header_is_rejected() {
        let authz = authz(ServerAuthMode::Token);
        let header = "a".repeat(8 * 1024 + 1);
        let err = authz.authorize(&ctx(Some(&header)), AuthAction::CreateOwner).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn missing_config_rejects_everything() {
        let authz = DefaultRequestAuthz::from_config(None);
        let err = authz.authorize(&ctx(Some("Bearer anything")), AuthAction::DeletePet);
        assert!(err.is_err());
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            token_fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
