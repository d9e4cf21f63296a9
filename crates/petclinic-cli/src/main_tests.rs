// crates/petclinic-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Tests
// Description: Unit tests for argument parsing and config validation.
// Purpose: Ensure the command surface parses and config errors fail closed.
// Dependencies: clap, tempfile
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::ConfigValidateCommand;
use super::command_config_validate;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes a config file into `dir`.
fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("petclinic.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn serve_accepts_config_flag() {
    let cli = Cli::try_parse_from(["petclinic", "serve", "--config", "clinic.toml"]).unwrap();
    match cli.command {
        Some(Commands::Serve(command)) => {
            assert_eq!(command.config, Some(PathBuf::from("clinic.toml")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn config_validate_parses_without_path() {
    let cli = Cli::try_parse_from(["petclinic", "config", "validate"]).unwrap();
    match cli.command {
        Some(Commands::Config {
            command: ConfigCommand::Validate(command),
        }) => assert!(command.config.is_none()),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["petclinic", "migrate"]).is_err());
}

#[test]
fn config_validate_accepts_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "[server]\nbind = \"127.0.0.1:8080\"\n\n[server.auth]\ntokens = [\"valid-token\"]\n",
    );
    let command = ConfigValidateCommand {
        config: Some(path),
    };
    assert_eq!(command_config_validate(&command).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn config_validate_reports_missing_auth() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\nbind = \"127.0.0.1:8080\"\n");
    let command = ConfigValidateCommand {
        config: Some(path),
    };
    let err = command_config_validate(&command).unwrap_err();
    assert!(err.to_string().contains("server.auth is required"), "error: {err}");
}
