//! Storage codec for the vault item `password` field.
//!
//! Three storage shapes exist in the wild, detected in this order:
//!
//! 1. a JSON [`EncryptedEnvelope`] (starts with `{`),
//! 2. a legacy secret stored as plain base64,
//! 3. anything else, which cannot be recovered.
//!
//! Unpacking never fails outright. Unrecoverable values come back as
//! [`Unpacked::Failed`] so the caller can render them distinctly instead of
//! showing ciphertext as if it were the secret.

use base64::Engine;

use crate::{
    cipher::{self, EncryptedEnvelope},
    error::{DecryptFailure, VaultError},
    kdf::DerivedKey,
};

/// Text shown in place of a secret that could not be recovered.
pub const DECRYPTION_FAILED_SENTINEL: &str = "DECRYPTION_FAILED";

const ENVELOPE_MARKER: char = '{';

/// A stored `password` value, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSecret {
    Envelope(EncryptedEnvelope),
    /// Base64 text that decodes to printable UTF-8. Holds the decoded value.
    LegacyBase64(String),
    Unrecognized,
}

/// Why [`unpack_from_storage`] could not recover a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpackFailure {
    Decryption(DecryptFailure),
    UnrecognizedFormat,
}

/// Result of [`unpack_from_storage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unpacked {
    /// Decrypted from an envelope.
    Secret(String),
    /// Decoded from the legacy base64 shape.
    Legacy(String),
    /// Nothing usable. `raw` is the stored value, unchanged.
    Failed { raw: String, reason: UnpackFailure },
}

impl Unpacked {
    /// The recovered secret, if any.
    pub fn plaintext(&self) -> Option<&str> {
        match self {
            Self::Secret(s) | Self::Legacy(s) => Some(s),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Text safe to display: the secret, or [`DECRYPTION_FAILED_SENTINEL`].
    pub fn display(&self) -> &str {
        self.plaintext().unwrap_or(DECRYPTION_FAILED_SENTINEL)
    }

    pub fn into_result(self) -> Result<String, VaultError> {
        match self {
            Self::Secret(s) | Self::Legacy(s) => Ok(s),
            Self::Failed {
                reason: UnpackFailure::Decryption(failure),
                ..
            } => Err(VaultError::DecryptionFailed(failure)),
            Self::Failed {
                reason: UnpackFailure::UnrecognizedFormat,
                ..
            } => Err(VaultError::UnrecognizedEnvelopeFormat),
        }
    }
}

/// Encrypt `plaintext` and serialize the envelope for the storage layer.
pub fn pack_for_storage(plaintext: &str, key: &DerivedKey) -> Result<String, VaultError> {
    cipher::encrypt(plaintext, key)?.to_json()
}

/// Classify a stored value without decrypting it.
pub fn classify(stored: &str) -> StoredSecret {
    if stored.trim_start().starts_with(ENVELOPE_MARKER)
        && let Ok(envelope) = EncryptedEnvelope::from_json(stored)
    {
        return StoredSecret::Envelope(envelope);
    }

    match decode_legacy(stored) {
        Some(decoded) => StoredSecret::LegacyBase64(decoded),
        None => StoredSecret::Unrecognized,
    }
}

/// Recover the secret from a stored value.
pub fn unpack_from_storage(stored: &str, key: &DerivedKey) -> Unpacked {
    match classify(stored) {
        StoredSecret::Envelope(envelope) => match cipher::decrypt(&envelope, key) {
            Ok(secret) => Unpacked::Secret(secret),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "stored envelope could not be decrypted");

                let reason = match err {
                    VaultError::DecryptionFailed(failure) => UnpackFailure::Decryption(failure),
                    other => UnpackFailure::Decryption(DecryptFailure::Format(other.to_string())),
                };
                Unpacked::Failed {
                    raw: stored.to_string(),
                    reason,
                }
            },
        },
        StoredSecret::LegacyBase64(decoded) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("stored secret uses the legacy base64 format");

            Unpacked::Legacy(decoded)
        },
        StoredSecret::Unrecognized => {
            #[cfg(feature = "tracing")]
            tracing::warn!(len = stored.len(), "stored secret is in an unrecognized format");

            Unpacked::Failed {
                raw: stored.to_string(),
                reason: UnpackFailure::UnrecognizedFormat,
            }
        },
    }
}

fn decode_legacy(stored: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(stored)
        .ok()?;
    let text = String::from_utf8(bytes).ok()?;
    // Items never store an empty password, so an empty value is damage.
    if text.is_empty() {
        return None;
    }
    // Random bytes that happen to be valid UTF-8 are rarely free of control chars.
    if text.chars().any(char::is_control) {
        return None;
    }
    Some(text)
}
