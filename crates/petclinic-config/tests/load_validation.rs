//! Config load validation tests for petclinic-config.
// crates/petclinic-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, parse).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use petclinic_config::ConfigError;
use petclinic_config::PetClinicConfig;
use petclinic_config::ServerAuthMode;
use petclinic_config::StoreType;
use tempfile::NamedTempFile;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<PetClinicConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_accepts_minimal_config() -> TestResult {
    let file = write_config(common::MINIMAL_TOML.as_bytes())?;
    let config = PetClinicConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.server.bind.as_deref() != Some("127.0.0.1:8080") {
        return Err("unexpected bind".to_string());
    }
    let auth = config.server.auth.ok_or("missing auth")?;
    if auth.mode != ServerAuthMode::Token || auth.tokens != vec!["valid-token".to_string()] {
        return Err("unexpected auth defaults".to_string());
    }
    if config.store.store_type != StoreType::Memory || config.store.sqlite_config().is_some() {
        return Err("expected memory store by default".to_string());
    }
    if !config.server.audit.enabled {
        return Err("audit should default to enabled".to_string());
    }
    Ok(())
}

#[test]
fn load_accepts_full_config() -> TestResult {
    let toml = br#"
[server]
bind = "127.0.0.1:9966"
max_body_bytes = 4096

[server.auth]
mode = "bearer_token"
tokens = ["alpha", "beta"]

[server.audit]
enabled = true
path = "audit.jsonl"

[store]
type = "sqlite"
path = "data/clinic.db"
busy_timeout_ms = 2000
journal_mode = "delete"
sync_mode = "normal"

[[seed.owners]]
first_name = "George"
last_name = "Franklin"
address = "110 W. Liberty St."
city = "Madison"
telephone = "6085551023"

[[seed.owners.pets]]
name = "Leo"
birth_date = "2010-09-07"
type_id = 1
type_name = "cat"
"#;
    let file = write_config(toml)?;
    let config = PetClinicConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let sqlite = config.store.sqlite_config().ok_or("expected sqlite config")?;
    if sqlite.busy_timeout_ms != 2000 || sqlite.path != Path::new("data/clinic.db") {
        return Err("unexpected sqlite config".to_string());
    }
    let owner = config.seed.owners[0].to_owner().map_err(|err| err.to_string())?;
    if owner.pets.len() != 1 || owner.pets[0].pet_type.name != "cat" {
        return Err("unexpected seeded pets".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(PetClinicConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(PetClinicConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("missing.toml");
    assert_invalid(PetClinicConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'a'; 1_048_577])?;
    assert_invalid(PetClinicConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(PetClinicConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config(
        b"[server]\nbind = \"127.0.0.1:8080\"\nport = 1\n[server.auth]\ntokens = [\"t\"]\n",
    )?;
    assert_invalid(PetClinicConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_store_type() -> TestResult {
    let file = write_config(
        b"[server]\nbind = \"127.0.0.1:8080\"\n[server.auth]\ntokens = [\"t\"]\n[store]\ntype = \"postgres\"\n",
    )?;
    assert_invalid(PetClinicConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}
