//! Symmetric encryption of a single secret into an [`EncryptedEnvelope`].

use {
    base64::Engine,
    serde::{Deserialize, Serialize},
};

use crate::{
    error::{DecryptFailure, VaultError},
    kdf::DerivedKey,
    traits::Cipher,
    xchacha20::XChaCha20Poly1305Cipher,
};

/// Associated data bound into every envelope.
const ENVELOPE_AAD: &[u8] = b"pwvault:envelope";

/// Ciphertext plus the initialization material needed to decrypt it.
///
/// `iv` and `ciphertext` are standard base64. `v` is the cipher version tag;
/// envelopes written before versioning have no `v` and read as version 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    #[serde(default)]
    pub v: u8,
    pub iv: String,
    #[serde(alias = "data")]
    pub ciphertext: String,
}

impl EncryptedEnvelope {
    pub fn to_json(&self) -> Result<String, VaultError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, VaultError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Encrypt `plaintext` with the default cipher.
pub fn encrypt(plaintext: &str, key: &DerivedKey) -> Result<EncryptedEnvelope, VaultError> {
    encrypt_with(&XChaCha20Poly1305Cipher, plaintext, key)
}

/// Decrypt an envelope produced by [`encrypt`].
pub fn decrypt(envelope: &EncryptedEnvelope, key: &DerivedKey) -> Result<String, VaultError> {
    decrypt_with(&XChaCha20Poly1305Cipher, envelope, key)
}

pub fn encrypt_with<C: Cipher + ?Sized>(
    cipher: &C,
    plaintext: &str,
    key: &DerivedKey,
) -> Result<EncryptedEnvelope, VaultError> {
    let sealed = cipher.seal(key, plaintext.as_bytes(), ENVELOPE_AAD)?;
    let b64 = base64::engine::general_purpose::STANDARD;

    Ok(EncryptedEnvelope {
        v: cipher.version_tag(),
        iv: b64.encode(&sealed.nonce),
        ciphertext: b64.encode(&sealed.ciphertext),
    })
}

pub fn decrypt_with<C: Cipher + ?Sized>(
    cipher: &C,
    envelope: &EncryptedEnvelope,
    key: &DerivedKey,
) -> Result<String, VaultError> {
    if envelope.v != cipher.version_tag() {
        return Err(DecryptFailure::Format(format!(
            "unsupported cipher version: {:#04x}, expected {:#04x}",
            envelope.v,
            cipher.version_tag()
        ))
        .into());
    }

    let b64 = base64::engine::general_purpose::STANDARD;
    let nonce = b64
        .decode(&envelope.iv)
        .map_err(|e| DecryptFailure::Format(format!("iv is not base64: {e}")))?;
    let ciphertext = b64
        .decode(&envelope.ciphertext)
        .map_err(|e| DecryptFailure::Format(format!("ciphertext is not base64: {e}")))?;

    if nonce.len() != cipher.nonce_len() {
        return Err(DecryptFailure::Format(format!(
            "iv must be {} bytes, got {}",
            cipher.nonce_len(),
            nonce.len()
        ))
        .into());
    }

    let plaintext = cipher.open(key, &nonce, &ciphertext, ENVELOPE_AAD)?;
    String::from_utf8(plaintext).map_err(|_| VaultError::DecryptionFailed(DecryptFailure::Encoding))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*};

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes([byte; 32])
    }

    #[test]
    fn round_trip() {
        let envelope = encrypt("hunter2", &key(7)).unwrap();
        assert_eq!(envelope.v, 1);
        assert_eq!(decrypt(&envelope, &key(7)).unwrap(), "hunter2");
    }

    #[test]
    fn fresh_iv_every_call() {
        let k = key(7);
        let ivs: std::collections::HashSet<String> =
            (0..64).map(|_| encrypt("same", &k).unwrap().iv).collect();
        assert_eq!(ivs.len(), 64);
    }

    #[test]
    fn wrong_key_is_authentication_failure() {
        let envelope = encrypt("hunter2", &key(7)).unwrap();
        let err = decrypt(&envelope, &key(8)).unwrap_err();
        assert!(matches!(
            err,
            VaultError::DecryptionFailed(DecryptFailure::Authentication)
        ));
    }

    #[test]
    fn corrupt_ciphertext_is_authentication_failure() {
        let mut envelope = encrypt("hunter2", &key(7)).unwrap();
        let b64 = base64::engine::general_purpose::STANDARD;
        let mut bytes = b64.decode(&envelope.ciphertext).unwrap();
        bytes[0] ^= 0xff;
        envelope.ciphertext = b64.encode(bytes);

        let err = decrypt(&envelope, &key(7)).unwrap_err();
        assert!(matches!(
            err,
            VaultError::DecryptionFailed(DecryptFailure::Authentication)
        ));
    }

    #[test]
    fn bad_base64_is_format_failure() {
        let mut envelope = encrypt("hunter2", &key(7)).unwrap();
        envelope.iv = "@@not-base64@@".into();
        let err = decrypt(&envelope, &key(7)).unwrap_err();
        assert!(matches!(
            err,
            VaultError::DecryptionFailed(DecryptFailure::Format(_))
        ));
    }

    #[test]
    fn unknown_version_is_format_failure() {
        let mut envelope = encrypt("hunter2", &key(7)).unwrap();
        envelope.v = 0;
        let err = decrypt(&envelope, &key(7)).unwrap_err();
        assert!(matches!(
            err,
            VaultError::DecryptionFailed(DecryptFailure::Format(_))
        ));
    }

    #[test]
    fn legacy_field_names_parse_as_version_zero() {
        let legacy = EncryptedEnvelope::from_json(
            r#"{"data":"U2FsdGVkX1+abc=","iv":"000102030405060708090a0b0c0d0e0f"}"#,
        )
        .unwrap();
        assert_eq!(legacy.v, 0);
        assert_eq!(legacy.ciphertext, "U2FsdGVkX1+abc=");
    }

    #[test]
    fn json_shape() {
        let envelope = EncryptedEnvelope {
            v: 1,
            iv: "aXY=".into(),
            ciphertext: "Y3Q=".into(),
        };
        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"v":1,"iv":"aXY=","ciphertext":"Y3Q="}"#
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn decrypt_inverts_encrypt(plaintext in ".*", seed in any::<[u8; 32]>()) {
            let k = DerivedKey::from_bytes(seed);
            let envelope = encrypt(&plaintext, &k).unwrap();
            prop_assert_eq!(decrypt(&envelope, &k).unwrap(), plaintext);
        }
    }
}
