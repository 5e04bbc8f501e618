/// Config schema types.
use {
    pwvault_core::{KdfParams, PasswordPolicy},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwvaultConfig {
    pub generator: GeneratorConfig,
    pub kdf: KdfParams,
}

/// Password generator defaults and the lengths a caller may request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Policy used when the caller does not override it.
    #[serde(flatten)]
    pub policy: PasswordPolicy,
    /// Shortest accepted length. Defaults to 4.
    pub min_length: usize,
    /// Longest accepted length. Defaults to 64.
    pub max_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            policy: PasswordPolicy::default(),
            min_length: 4,
            max_length: 64,
        }
    }
}
