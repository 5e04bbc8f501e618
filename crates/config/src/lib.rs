//! Configuration loading and validation.
//!
//! Config files: `pwvault.toml`, `pwvault.yaml`, or `pwvault.json`
//! Searched in `./` then `~/.config/pwvault/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        config_dir, discover_and_load, find_config_file, find_or_default_config_path,
        load_config, save_config,
    },
    schema::{GeneratorConfig, PwvaultConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
