//! Password-based key derivation: secret + salt → 256-bit vault key.
//!
//! PBKDF2-HMAC-SHA256 with a configurable iteration count is the default.
//! Argon2id is available for deployments that want a memory-hard function.

use std::fmt;

use {
    argon2::Argon2,
    secrecy::{ExposeSecret, SecretString},
    serde::{Deserialize, Serialize},
    sha2::Sha256,
    zeroize::Zeroizing,
};

use crate::error::VaultError;

/// Length of every derived key in bytes.
pub const KEY_LEN: usize = 32;

/// PBKDF2 round count used when nothing else is configured.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 10_000;

/// Suffix appended to the user's email to form the per-user salt.
const USER_SALT_SUFFIX: &str = "_vault_salt_2024";

/// Key derivation function and its cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum KdfParams {
    /// PBKDF2-HMAC-SHA256.
    Pbkdf2 { iterations: u32 },
    /// Argon2id (v0x13).
    Argon2id {
        /// Memory cost in KiB.
        m_cost: u32,
        /// Number of passes.
        t_cost: u32,
        /// Degree of parallelism.
        p_cost: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Pbkdf2 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Argon2id with the cost settings the vault recommends (64 MiB, 3 passes).
    pub fn argon2id() -> Self {
        Self::Argon2id {
            m_cost: 65536,
            t_cost: 3,
            p_cost: 1,
        }
    }

    /// Short algorithm name for logs and diagnostics.
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Pbkdf2 { .. } => "pbkdf2-sha256",
            Self::Argon2id { .. } => "argon2id",
        }
    }
}

/// A 256-bit symmetric key produced by [`derive_key`].
///
/// The bytes are zeroed on drop and never printed.
#[derive(Clone)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    /// Wrap raw key bytes, e.g. a key obtained out of band.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 256-bit key from `secret` and `salt`.
///
/// Deterministic: the same inputs always give the same key, so a session can
/// re-derive instead of persisting the key.
pub fn derive_key(
    secret: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<DerivedKey, VaultError> {
    let mut output = Zeroizing::new([0u8; KEY_LEN]);

    match *params {
        KdfParams::Pbkdf2 { iterations } => {
            if iterations == 0 {
                return Err(VaultError::Kdf(
                    "pbkdf2 iteration count must be at least 1".to_string(),
                ));
            }
            pbkdf2::pbkdf2_hmac::<Sha256>(secret, salt, iterations, output.as_mut());
        },
        KdfParams::Argon2id {
            m_cost,
            t_cost,
            p_cost,
        } => {
            let argon2_params = argon2::Params::new(m_cost, t_cost, p_cost, Some(KEY_LEN))
                .map_err(|e| VaultError::Kdf(format!("invalid argon2 params: {e}")))?;
            let argon2 = Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                argon2_params,
            );
            argon2
                .hash_password_into(secret, salt, output.as_mut())
                .map_err(|e| VaultError::Kdf(format!("argon2id failed: {e}")))?;
        },
    }

    Ok(DerivedKey(output))
}

/// Per-user salt derived from the account email.
pub fn user_salt(email: &str) -> String {
    format!("{email}{USER_SALT_SUFFIX}")
}

/// Where the secret half of the key derivation comes from.
#[derive(Debug)]
pub enum KeySource {
    /// A master passphrase chosen by the user.
    Passphrase {
        passphrase: SecretString,
        email: String,
    },
    /// The account id concatenated with the email.
    ///
    /// Both values are known to the server, so the resulting key offers no
    /// protection against it. Kept so vaults written that way stay readable.
    LegacyIdentity { user_id: String, email: String },
}

impl KeySource {
    pub fn email(&self) -> &str {
        match self {
            Self::Passphrase { email, .. } | Self::LegacyIdentity { email, .. } => email,
        }
    }

    /// Run the KDF for this source with the email-derived salt.
    pub fn derive(&self, params: &KdfParams) -> Result<DerivedKey, VaultError> {
        let salt = user_salt(self.email());

        #[cfg(feature = "tracing")]
        tracing::debug!(algorithm = params.algorithm(), "deriving vault key");

        match self {
            Self::Passphrase { passphrase, .. } => {
                derive_key(passphrase.expose_secret().as_bytes(), salt.as_bytes(), params)
            },
            Self::LegacyIdentity { user_id, email } => {
                #[cfg(feature = "tracing")]
                tracing::warn!("deriving vault key from account identity; set a master passphrase");

                let secret = Zeroizing::new(format!("{user_id}{email}"));
                derive_key(secret.as_bytes(), salt.as_bytes(), params)
            },
        }
    }
}
