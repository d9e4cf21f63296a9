// crates/petclinic-config/src/config.rs
// ============================================================================
// Module: Pet Clinic Configuration
// Description: TOML configuration model, loader, and validation.
// Purpose: Turn `petclinic.toml` into a validated server configuration.
// Dependencies: petclinic-core, petclinic-store-sqlite, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! [`PetClinicConfig::load`] resolves the config path (explicit argument, then
//! `PETCLINIC_CONFIG`, then `petclinic.toml`), enforces path and size limits,
//! parses TOML, and validates every section. Authentication is mandatory:
//! a config without `[server.auth]` is rejected regardless of bind address.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use petclinic_core::Owner;
use petclinic_core::Pet;
use petclinic_core::PetType;
use petclinic_core::PetTypeId;
use petclinic_core::parse_iso_date;
use petclinic_store_sqlite::SqliteStoreConfig;
use petclinic_store_sqlite::SqliteStoreMode;
use petclinic_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default config filename.
const DEFAULT_CONFIG_NAME: &str = "petclinic.toml";
/// Environment variable override for the config path.
const CONFIG_ENV_VAR: &str = "PETCLINIC_CONFIG";
/// Maximum allowed config file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length for config-related paths.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum number of configured auth tokens.
const MAX_AUTH_TOKENS: usize = 64;
/// Maximum length of a single auth token.
const MAX_AUTH_TOKEN_LENGTH: usize = 256;
/// Default request body limit in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Upper bound for the request body limit in bytes.
const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Upper bound for the `SQLite` busy timeout in milliseconds.
const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Maximum number of seeded owners.
const MAX_SEED_OWNERS: usize = 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading the config file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Builds an [`ConfigError::Invalid`] from a message.
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Pet clinic configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PetClinicConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Owner store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Owners saved at startup.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl PetClinicConfig {
    /// Loads configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved, "config")?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::invalid("config file exceeds size limit"));
        }
        let content =
            std::str::from_utf8(&bytes).map_err(|_| ConfigError::invalid("config file must be utf-8"))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.seed.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:8080`.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Authentication policy for mutating requests.
    #[serde(default)]
    pub auth: Option<ServerAuthConfig>,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind address is missing or
    /// malformed.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self
            .bind
            .as_deref()
            .map(str::trim)
            .filter(|bind| !bind.is_empty())
            .ok_or_else(|| ConfigError::invalid("server.bind is required"))?;
        bind.parse::<SocketAddr>()
            .map_err(|_| ConfigError::invalid(format!("invalid server.bind address: {bind}")))
    }

    /// Validates the server section.
    fn validate(&self) -> Result<(), ConfigError> {
        let addr = self.bind_addr()?;
        match &self.auth {
            Some(auth) => auth.validate()?,
            None if addr.ip().is_loopback() => {
                return Err(ConfigError::invalid("server.auth is required"));
            }
            None => {
                return Err(ConfigError::invalid("non-loopback bind disallowed without auth policy"));
            }
        }
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        self.audit.validate()
    }
}

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// How the `Authorization` header is matched against configured tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerAuthMode {
    /// Header equals a token, with or without a `Bearer` scheme.
    #[default]
    Token,
    /// Header must be `Bearer <token>`.
    BearerToken,
}

/// Authentication policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuthConfig {
    /// Header matching mode.
    #[serde(default)]
    pub mode: ServerAuthMode,
    /// Accepted tokens.
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl ServerAuthConfig {
    /// Validates the auth section.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.is_empty() {
            return Err(ConfigError::invalid("server.auth.tokens must not be empty"));
        }
        if self.tokens.len() > MAX_AUTH_TOKENS {
            return Err(ConfigError::invalid(format!(
                "server.auth.tokens exceeds max of {MAX_AUTH_TOKENS}"
            )));
        }
        for token in &self.tokens {
            if token.trim().is_empty() {
                return Err(ConfigError::invalid("server.auth.tokens entries must be non-empty"));
            }
            if token.len() > MAX_AUTH_TOKEN_LENGTH {
                return Err(ConfigError::invalid(format!(
                    "server.auth.tokens entry exceeds max length of {MAX_AUTH_TOKEN_LENGTH}"
                )));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(ConfigError::invalid(
                    "server.auth.tokens entries must not contain whitespace",
                ));
            }
        }
        Ok(())
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuditConfig {
    /// Whether audit events are emitted.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional JSON-lines file path (stderr when unset).
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates the audit section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            if path.trim().is_empty() {
                return Err(ConfigError::invalid("audit.path must be non-empty"));
            }
            validate_path(Path::new(path), "audit")?;
        }
        Ok(())
    }
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// Owner store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// In-memory store; contents are lost on restart.
    #[default]
    Memory,
    /// `SQLite`-backed store.
    Sqlite,
}

/// Owner store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// `SQLite` busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::Memory,
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` store configuration when the sqlite backend is
    /// selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        if self.store_type != StoreType::Sqlite {
            return None;
        }
        let path = self.path.clone()?;
        Some(SqliteStoreConfig {
            path,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        })
    }

    /// Validates the store section.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.store_type, &self.path) {
            (StoreType::Memory, Some(_)) => {
                Err(ConfigError::invalid("memory store does not accept store.path"))
            }
            (StoreType::Memory, None) => Ok(()),
            (StoreType::Sqlite, None) => Err(ConfigError::invalid("sqlite store requires store.path")),
            (StoreType::Sqlite, Some(path)) => {
                validate_path(path, "store")?;
                if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
                    return Err(ConfigError::invalid(format!(
                        "store.busy_timeout_ms exceeds max of {MAX_BUSY_TIMEOUT_MS}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Seed Config
// ============================================================================

/// Owners saved at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Seeded owners, saved in order.
    #[serde(default)]
    pub owners: Vec<SeedOwnerConfig>,
}

impl SeedConfig {
    /// Validates seeded owners.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.owners.len() > MAX_SEED_OWNERS {
            return Err(ConfigError::invalid(format!(
                "seed.owners exceeds max of {MAX_SEED_OWNERS}"
            )));
        }
        for owner in &self.owners {
            owner.to_owner()?;
        }
        Ok(())
    }
}

/// A seeded owner with nested pets.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedOwnerConfig {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Telephone digits.
    pub telephone: String,
    /// Pets registered to the owner.
    #[serde(default)]
    pub pets: Vec<SeedPetConfig>,
}

impl SeedOwnerConfig {
    /// Builds a new (unsaved) owner from the seed entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when owner fields or pet entries are
    /// invalid.
    pub fn to_owner(&self) -> Result<Owner, ConfigError> {
        let mut owner = Owner::new(
            self.first_name.clone(),
            self.last_name.clone(),
            self.address.clone(),
            self.city.clone(),
            self.telephone.clone(),
        );
        owner
            .validate()
            .map_err(|err| ConfigError::invalid(format!("seed owner {}: {err}", self.last_name)))?;
        for pet in &self.pets {
            owner.add_pet(pet.to_pet()?);
        }
        Ok(owner)
    }
}

/// A seeded pet.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedPetConfig {
    /// Pet name.
    pub name: String,
    /// Birth date as `YYYY-MM-DD`.
    pub birth_date: String,
    /// Pet type identifier (non-zero).
    pub type_id: u64,
    /// Pet type name.
    pub type_name: String,
}

impl SeedPetConfig {
    /// Builds a new (unsaved) pet from the seed entry.
    fn to_pet(&self) -> Result<Pet, ConfigError> {
        let birth_date = parse_iso_date(&self.birth_date).map_err(|err| {
            ConfigError::invalid(format!("seed pet {} birth_date: {err}", self.name))
        })?;
        let type_id = PetTypeId::from_raw(self.type_id).ok_or_else(|| {
            ConfigError::invalid(format!("seed pet {} type_id must be non-zero", self.name))
        })?;
        Ok(Pet::new(self.name.clone(), birth_date, PetType::new(type_id, self.type_name.clone())))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from explicit input or environment.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::invalid("config path exceeds max length"));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates path length and components for the labelled path.
fn validate_path(path: &Path, label: &str) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::invalid(format!("{label} path exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::invalid(format!("{label} path component too long")));
        }
    }
    Ok(())
}
