// crates/petclinic-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Owner Store
// Description: Durable OwnerStore backend using SQLite.
// Purpose: Provide persistent storage for owners, pets, and pet types.
// Dependencies: petclinic-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`petclinic_core::OwnerStore`]. Owners,
//! pets, and pet types live in normalized tables; every operation runs in a
//! single transaction so pet deletion is atomic with respect to the owner's
//! pet collection.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteOwnerStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
