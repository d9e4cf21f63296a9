// crates/petclinic-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Owner Store
// Description: Durable OwnerStore backed by SQLite.
// Purpose: Persist owners and pets with transactional updates.
// Dependencies: petclinic-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`OwnerStore`] using `SQLite`. Each call
//! runs in one transaction on a mutex-guarded connection. Pet types are
//! inserted once and never renamed. Rows are decoded strictly: zero or
//! negative identifiers and malformed dates fail closed as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use petclinic_core::Owner;
use petclinic_core::OwnerId;
use petclinic_core::OwnerStore;
use petclinic_core::Pet;
use petclinic_core::PetId;
use petclinic_core::PetType;
use petclinic_core::PetTypeId;
use petclinic_core::StoreError;
use petclinic_core::format_iso_date;
use petclinic_core::parse_iso_date;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Pet projection shared by every pet query.
const PET_COLUMNS: &str = "pets.id, pets.name, pets.birth_date, pet_types.id, pet_types.name";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` owner store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default tuning.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored rows violate store invariants.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// The owner already has a pet with this name.
    #[error("pet name {name} already exists for owner {owner_id}")]
    DuplicatePetName {
        /// Owner identifier.
        owner_id: u64,
        /// Rejected pet name.
        name: String,
    },
    /// A pet type id is already stored under a different name.
    #[error("pet type {type_id} is registered as {stored}, not {requested}")]
    PetTypeConflict {
        /// Pet type identifier.
        type_id: u64,
        /// Stored name.
        stored: String,
        /// Requested name.
        requested: String,
    },
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::DuplicatePetName {
                owner_id,
                name,
            } => Self::DuplicatePetName {
                owner_id,
                name,
            },
            SqliteStoreError::PetTypeConflict {
                type_id,
                stored,
                requested,
            } => Self::PetTypeConflict {
                type_id,
                stored,
                requested,
            },
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed owner store.
#[derive(Clone)]
pub struct SqliteOwnerStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteOwnerStore {
    /// Opens an `SQLite`-backed owner store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

impl OwnerStore for SqliteOwnerStore {
    fn save(&self, owner: &mut Owner) -> Result<(), StoreError> {
        self.save_owner(owner).map_err(StoreError::from)
    }

    fn find_all(&self) -> Result<Vec<Owner>, StoreError> {
        self.load_all().map_err(StoreError::from)
    }

    fn find_by_id(&self, owner_id: OwnerId) -> Result<Option<Owner>, StoreError> {
        self.load_owner(owner_id).map_err(StoreError::from)
    }

    fn add_pet(&self, owner_id: OwnerId, pet: Pet) -> Result<Option<Pet>, StoreError> {
        self.insert_pet(owner_id, pet).map_err(StoreError::from)
    }

    fn delete_pet(&self, owner_id: OwnerId, pet_id: PetId) -> Result<Option<Pet>, StoreError> {
        self.remove_pet(owner_id, pet_id).map_err(StoreError::from)
    }
}

impl SqliteOwnerStore {
    /// Saves an owner aggregate, assigning identifiers on success only.
    fn save_owner(&self, owner: &mut Owner) -> Result<(), SqliteStoreError> {
        let mut staged = owner.clone();
        {
            let mut guard = self.lock()?;
            let tx = guard.transaction()?;
            let owner_id = match staged.id {
                Some(owner_id) => {
                    let updated = tx.execute(
                        "UPDATE owners SET first_name = ?1, last_name = ?2, address = ?3, city = \
                         ?4, telephone = ?5 WHERE id = ?6",
                        params![
                            staged.first_name,
                            staged.last_name,
                            staged.address,
                            staged.city,
                            staged.telephone,
                            to_sql_id(owner_id.get())?
                        ],
                    )?;
                    if updated == 0 {
                        return Err(SqliteStoreError::Invalid(format!(
                            "unknown owner id {owner_id}"
                        )));
                    }
                    owner_id
                }
                None => {
                    tx.execute(
                        "INSERT INTO owners (first_name, last_name, address, city, telephone) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            staged.first_name,
                            staged.last_name,
                            staged.address,
                            staged.city,
                            staged.telephone
                        ],
                    )?;
                    decode_owner_id(tx.last_insert_rowid())?
                }
            };
            let owner_sql_id = to_sql_id(owner_id.get())?;

            let existing = pet_ids_for_owner(&tx, owner_sql_id)?;
            let mut kept = BTreeSet::new();
            for pet in &staged.pets {
                if let Some(pet_id) = pet.id {
                    if !existing.contains(&pet_id) {
                        return Err(SqliteStoreError::Invalid(format!(
                            "pet {pet_id} is not owned by owner {owner_id}"
                        )));
                    }
                    if !kept.insert(pet_id) {
                        return Err(SqliteStoreError::Invalid(format!("duplicate pet id {pet_id}")));
                    }
                }
            }
            for orphan in existing.difference(&kept) {
                tx.execute("DELETE FROM pets WHERE id = ?1", params![to_sql_id(orphan.get())?])?;
            }

            for pet in &mut staged.pets {
                ensure_pet_type(&tx, &pet.pet_type)?;
                let birth_date = format_iso_date(pet.birth_date)
                    .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
                let type_id = to_sql_id(pet.pet_type.id.get())?;
                match pet.id {
                    Some(pet_id) => {
                        tx.execute(
                            "UPDATE pets SET name = ?1, birth_date = ?2, type_id = ?3 WHERE id = \
                             ?4",
                            params![pet.name, birth_date, type_id, to_sql_id(pet_id.get())?],
                        )?;
                    }
                    None => {
                        tx.execute(
                            "INSERT INTO pets (owner_id, name, birth_date, type_id) VALUES (?1, \
                             ?2, ?3, ?4)",
                            params![owner_sql_id, pet.name, birth_date, type_id],
                        )?;
                        pet.id = Some(decode_pet_id(tx.last_insert_rowid())?);
                    }
                }
            }
            staged.id = Some(owner_id);
            tx.commit()?;
            drop(guard);
        }
        *owner = staged;
        Ok(())
    }

    /// Loads every owner ordered by identifier.
    fn load_all(&self) -> Result<Vec<Owner>, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let mut owners = {
            let mut statement = tx.prepare(
                "SELECT id, first_name, last_name, address, city, telephone FROM owners ORDER BY \
                 id",
            )?;
            let rows = statement.query_map([], read_owner_row)?;
            let mut owners = Vec::new();
            for row in rows {
                owners.push(decode_owner(row?)?);
            }
            owners
        };
        for owner in &mut owners {
            if let Some(owner_id) = owner.id {
                owner.pets = pets_for_owner(&tx, to_sql_id(owner_id.get())?)?;
            }
        }
        tx.commit()?;
        drop(guard);
        Ok(owners)
    }

    /// Loads one owner with its pets.
    fn load_owner(&self, owner_id: OwnerId) -> Result<Option<Owner>, SqliteStoreError> {
        let owner_sql_id = to_sql_id(owner_id.get())?;
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let row = tx
            .query_row(
                "SELECT id, first_name, last_name, address, city, telephone FROM owners WHERE id \
                 = ?1",
                params![owner_sql_id],
                read_owner_row,
            )
            .optional()?;
        let owner = match row {
            None => None,
            Some(row) => {
                let mut owner = decode_owner(row)?;
                owner.pets = pets_for_owner(&tx, owner_sql_id)?;
                Some(owner)
            }
        };
        tx.commit()?;
        drop(guard);
        Ok(owner)
    }

    /// Appends one pet to one owner inside a single transaction.
    fn insert_pet(&self, owner_id: OwnerId, mut pet: Pet) -> Result<Option<Pet>, SqliteStoreError> {
        if let Some(pet_id) = pet.id {
            return Err(SqliteStoreError::Invalid(format!("new pet already carries id {pet_id}")));
        }
        let owner_sql_id = to_sql_id(owner_id.get())?;
        let birth_date = format_iso_date(pet.birth_date)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let type_id = to_sql_id(pet.pet_type.id.get())?;
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let exists = tx
            .query_row("SELECT 1 FROM owners WHERE id = ?1", params![owner_sql_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Ok(None);
        }
        let wanted = pet.name.to_lowercase();
        if pet_names_for_owner(&tx, owner_sql_id)?.iter().any(|name| name.to_lowercase() == wanted)
        {
            return Err(SqliteStoreError::DuplicatePetName {
                owner_id: owner_id.get(),
                name: pet.name,
            });
        }
        ensure_pet_type(&tx, &pet.pet_type)?;
        tx.execute(
            "INSERT INTO pets (owner_id, name, birth_date, type_id) VALUES (?1, ?2, ?3, ?4)",
            params![owner_sql_id, pet.name, birth_date, type_id],
        )?;
        pet.id = Some(decode_pet_id(tx.last_insert_rowid())?);
        tx.commit()?;
        drop(guard);
        Ok(Some(pet))
    }

    /// Removes one pet from one owner inside a single transaction.
    fn remove_pet(&self, owner_id: OwnerId, pet_id: PetId) -> Result<Option<Pet>, SqliteStoreError> {
        let owner_sql_id = to_sql_id(owner_id.get())?;
        let pet_sql_id = to_sql_id(pet_id.get())?;
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let row = tx
            .query_row(
                &format!(
                    "SELECT {PET_COLUMNS} FROM pets JOIN pet_types ON pet_types.id = \
                     pets.type_id WHERE pets.id = ?1 AND pets.owner_id = ?2"
                ),
                params![pet_sql_id, owner_sql_id],
                read_pet_row,
            )
            .optional()?;
        let removed = match row {
            None => None,
            Some(row) => {
                let pet = decode_pet(row)?;
                tx.execute(
                    "DELETE FROM pets WHERE id = ?1 AND owner_id = ?2",
                    params![pet_sql_id, owner_sql_id],
                )?;
                Some(pet)
            }
        };
        tx.commit()?;
        drop(guard);
        Ok(removed)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Raw owner columns.
type OwnerRow = (i64, String, String, String, String, String);
/// Raw pet columns joined with the pet type.
type PetRow = (i64, String, String, i64, String);

/// Reads owner columns from a row.
fn read_owner_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OwnerRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
}

/// Reads pet columns from a row.
fn read_pet_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PetRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// Builds an owner (without pets) from raw columns.
fn decode_owner(row: OwnerRow) -> Result<Owner, SqliteStoreError> {
    let (id, first_name, last_name, address, city, telephone) = row;
    let mut owner = Owner::new(first_name, last_name, address, city, telephone);
    owner.id = Some(decode_owner_id(id)?);
    Ok(owner)
}

/// Builds a pet from raw columns.
fn decode_pet(row: PetRow) -> Result<Pet, SqliteStoreError> {
    let (id, name, birth_date, type_id, type_name) = row;
    let birth_date = parse_iso_date(&birth_date)
        .map_err(|err| SqliteStoreError::Corrupt(format!("pet {id} birth_date: {err}")))?;
    let type_id = PetTypeId::from_raw(decode_raw_id(type_id)?)
        .ok_or_else(|| SqliteStoreError::Corrupt("zero pet type id".to_string()))?;
    let mut pet = Pet::new(name, birth_date, PetType::new(type_id, type_name));
    pet.id = Some(decode_pet_id(id)?);
    Ok(pet)
}

/// Converts a stored rowid into an owner identifier.
fn decode_owner_id(raw: i64) -> Result<OwnerId, SqliteStoreError> {
    OwnerId::from_raw(decode_raw_id(raw)?)
        .ok_or_else(|| SqliteStoreError::Corrupt("zero owner id".to_string()))
}

/// Converts a stored rowid into a pet identifier.
fn decode_pet_id(raw: i64) -> Result<PetId, SqliteStoreError> {
    PetId::from_raw(decode_raw_id(raw)?)
        .ok_or_else(|| SqliteStoreError::Corrupt("zero pet id".to_string()))
}

/// Converts a stored rowid into an unsigned identifier.
fn decode_raw_id(raw: i64) -> Result<u64, SqliteStoreError> {
    u64::try_from(raw).map_err(|_| SqliteStoreError::Corrupt(format!("negative id {raw}")))
}

/// Converts an identifier into an `SQLite` integer.
fn to_sql_id(raw: u64) -> Result<i64, SqliteStoreError> {
    i64::try_from(raw).map_err(|_| SqliteStoreError::Invalid(format!("id {raw} out of range")))
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Returns the identifiers of pets currently stored under an owner.
fn pet_ids_for_owner(
    tx: &Transaction<'_>,
    owner_sql_id: i64,
) -> Result<BTreeSet<PetId>, SqliteStoreError> {
    let mut statement = tx.prepare("SELECT id FROM pets WHERE owner_id = ?1")?;
    let rows = statement.query_map(params![owner_sql_id], |row| row.get::<_, i64>(0))?;
    let mut ids = BTreeSet::new();
    for row in rows {
        ids.insert(decode_pet_id(row?)?);
    }
    Ok(ids)
}

/// Loads an owner's pets in insertion order.
fn pets_for_owner(tx: &Transaction<'_>, owner_sql_id: i64) -> Result<Vec<Pet>, SqliteStoreError> {
    let mut statement = tx.prepare(&format!(
        "SELECT {PET_COLUMNS} FROM pets JOIN pet_types ON pet_types.id = pets.type_id WHERE \
         pets.owner_id = ?1 ORDER BY pets.id"
    ))?;
    let rows = statement.query_map(params![owner_sql_id], read_pet_row)?;
    let mut pets = Vec::new();
    for row in rows {
        pets.push(decode_pet(row?)?);
    }
    Ok(pets)
}

/// Returns the names of pets currently stored under an owner.
fn pet_names_for_owner(
    tx: &Transaction<'_>,
    owner_sql_id: i64,
) -> Result<Vec<String>, SqliteStoreError> {
    let mut statement = tx.prepare("SELECT name FROM pets WHERE owner_id = ?1")?;
    let rows = statement.query_map(params![owner_sql_id], |row| row.get::<_, String>(0))?;
    let mut names = Vec::new();
    for row in rows {
        names.push(row?);
    }
    Ok(names)
}

/// Inserts a pet type on first use and rejects a different name later.
fn ensure_pet_type(tx: &Transaction<'_>, pet_type: &PetType) -> Result<(), SqliteStoreError> {
    let type_sql_id = to_sql_id(pet_type.id.get())?;
    let stored: Option<String> = tx
        .query_row("SELECT name FROM pet_types WHERE id = ?1", params![type_sql_id], |row| {
            row.get(0)
        })
        .optional()?;
    match stored {
        None => {
            tx.execute(
                "INSERT INTO pet_types (id, name) VALUES (?1, ?2) ON CONFLICT(id) DO NOTHING",
                params![type_sql_id, pet_type.name],
            )?;
            Ok(())
        }
        Some(stored) if stored == pet_type.name => Ok(()),
        Some(stored) => Err(SqliteStoreError::PetTypeConflict {
            type_id: pet_type.id.get(),
            stored,
            requested: pet_type.name.clone(),
        }),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS owners (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    address TEXT NOT NULL,
                    city TEXT NOT NULL,
                    telephone TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS pet_types (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS pets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    birth_date TEXT NOT NULL,
                    type_id INTEGER NOT NULL,
                    FOREIGN KEY (owner_id) REFERENCES owners(id) ON DELETE CASCADE,
                    FOREIGN KEY (type_id) REFERENCES pet_types(id)
                );
                CREATE INDEX IF NOT EXISTS idx_pets_owner_id ON pets (owner_id);
                CREATE INDEX IF NOT EXISTS idx_owners_last_name ON owners (last_name);",
            )?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}
