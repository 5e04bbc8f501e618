//! Cipher trait for swappable authenticated encryption backends.

use crate::{error::VaultError, kdf::DerivedKey};

/// Output of a single [`Cipher::seal`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Fresh random nonce used for this encryption.
    pub nonce: Vec<u8>,
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

/// Trait for authenticated encryption with associated data (AEAD).
///
/// Implementations can be swapped without changing the codec. Each
/// implementation has a unique version tag recorded in the envelope,
/// enabling future cipher migrations.
pub trait Cipher: Send + Sync {
    /// Unique identifier for this cipher (stored as the envelope's `v`).
    fn version_tag(&self) -> u8;

    /// Nonce length in bytes.
    fn nonce_len(&self) -> usize;

    /// Encrypt `plaintext` under `key` with a freshly generated nonce.
    fn seal(&self, key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, VaultError>;

    /// Decrypt `ciphertext` previously produced by [`seal`](Self::seal).
    ///
    /// Callers must check `nonce.len() == self.nonce_len()` first.
    fn open(
        &self,
        key: &DerivedKey,
        nonce: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, VaultError>;
}
