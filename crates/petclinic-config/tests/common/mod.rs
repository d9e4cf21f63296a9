// crates/petclinic-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for config validation tests.
// Purpose: Build minimal valid configurations for targeted mutation.
// ============================================================================

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use petclinic_config::ConfigError;
use petclinic_config::PetClinicConfig;

/// Minimal valid TOML configuration.
pub const MINIMAL_TOML: &str = r#"
[server]
bind = "127.0.0.1:8080"

[server.auth]
tokens = ["valid-token"]
"#;

/// Parses the minimal valid configuration.
pub fn minimal_config() -> Result<PetClinicConfig, ConfigError> {
    PetClinicConfig::from_toml(MINIMAL_TOML)
}
