//! Vault error types.

/// Why a ciphertext could not be turned back into plaintext.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecryptFailure {
    /// The envelope is structurally wrong: bad base64, wrong nonce length,
    /// or a cipher version this build does not know.
    #[error("malformed envelope: {0}")]
    Format(String),

    /// The AEAD tag did not verify. Either the key does not match or the
    /// ciphertext was modified; the primitive cannot tell which.
    #[error("authentication failed (wrong key or corrupted ciphertext)")]
    Authentication,

    /// The ciphertext authenticated but the plaintext is not UTF-8.
    #[error("decrypted bytes are not valid UTF-8")]
    Encoding,
}

/// Errors produced by vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The password policy leaves nothing to draw from.
    #[error("invalid password policy: {0}")]
    InvalidPolicy(String),

    /// Ciphertext could not be recovered.
    #[error("decryption failed: {0}")]
    DecryptionFailed(#[from] DecryptFailure),

    /// A stored secret matches none of the known storage shapes.
    #[error("stored secret is in an unrecognized format")]
    UnrecognizedEnvelopeFormat,

    /// Key derivation rejected its parameters or failed.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// Encryption failed.
    #[error("cipher error: {0}")]
    CipherError(String),

    /// A required vault item field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
