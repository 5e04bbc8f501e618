//! Random password generation from a character-class policy.

use {
    rand::{CryptoRng, Rng},
    serde::{Deserialize, Serialize},
};

use crate::error::VaultError;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters that are easy to confuse with one another.
pub const SIMILAR_CHARS: &str = "il1Lo0O";

/// Which characters a generated password may contain, and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub length: usize,
    #[serde(alias = "includeUppercase")]
    pub include_uppercase: bool,
    #[serde(alias = "includeLowercase")]
    pub include_lowercase: bool,
    #[serde(alias = "includeNumbers")]
    pub include_numbers: bool,
    #[serde(alias = "includeSymbols")]
    pub include_symbols: bool,
    #[serde(alias = "excludeSimilar")]
    pub exclude_similar: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            exclude_similar: true,
        }
    }
}

impl PasswordPolicy {
    /// Reject lengths outside `min..=max`.
    pub fn validate_length(&self, min: usize, max: usize) -> Result<(), VaultError> {
        if (min..=max).contains(&self.length) {
            Ok(())
        } else {
            Err(VaultError::InvalidPolicy(format!(
                "length {} is outside {min}..={max}",
                self.length
            )))
        }
    }
}

/// The characters `policy` allows, in class order.
pub fn effective_charset(policy: &PasswordPolicy) -> Vec<char> {
    let classes = [
        (policy.include_uppercase, UPPERCASE),
        (policy.include_lowercase, LOWERCASE),
        (policy.include_numbers, NUMBERS),
        (policy.include_symbols, SYMBOLS),
    ];

    classes
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, chars)| chars.chars())
        .filter(|c| !(policy.exclude_similar && SIMILAR_CHARS.contains(*c)))
        .collect()
}

/// Generate a password with the thread-local CSPRNG.
///
/// Every position is sampled independently and uniformly from the effective
/// charset. There is no guarantee that each enabled class appears at least
/// once; callers that need that should re-generate or score the result.
pub fn generate(policy: &PasswordPolicy) -> Result<String, VaultError> {
    generate_with(policy, &mut rand::rng())
}

/// [`generate`] with a caller-supplied cryptographically secure RNG.
pub fn generate_with<R: CryptoRng>(
    policy: &PasswordPolicy,
    rng: &mut R,
) -> Result<String, VaultError> {
    if policy.length == 0 {
        return Err(VaultError::InvalidPolicy(
            "length must be at least 1".to_string(),
        ));
    }

    let charset = effective_charset(policy);
    if charset.is_empty() {
        return Err(VaultError::InvalidPolicy(
            "at least one character type must be selected".to_string(),
        ));
    }

    let password = (0..policy.length)
        .map(|_| charset[rng.random_range(0..charset.len())])
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        length = policy.length,
        pool = charset.len(),
        "generated password"
    );

    Ok(password)
}
