// crates/petclinic-config/src/lib.rs
// ============================================================================
// Module: Pet Clinic Config Library
// Description: Configuration model and loader for the pet clinic server.
// Purpose: Expose a single validated configuration entry point.
// Dependencies: petclinic-core, petclinic-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `petclinic-config` parses `petclinic.toml`, applies defaults, and validates
//! every section before the server is wired. Validation fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::PetClinicConfig;
pub use config::SeedConfig;
pub use config::SeedOwnerConfig;
pub use config::SeedPetConfig;
pub use config::ServerAuditConfig;
pub use config::ServerAuthConfig;
pub use config::ServerAuthMode;
pub use config::ServerConfig;
pub use config::StoreConfig;
pub use config::StoreType;
