//! XChaCha20-Poly1305 implementation of the [`Cipher`] trait.

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore;

use crate::{
    error::{DecryptFailure, VaultError},
    kdf::DerivedKey,
    traits::{Cipher, Sealed},
};

/// Version tag for the XChaCha20-Poly1305 cipher.
pub const VERSION_TAG: u8 = 0x01;

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag size.
const TAG_LEN: usize = 16;

/// XChaCha20-Poly1305 AEAD cipher.
///
/// The 192-bit nonce is drawn at random on every call, so random nonces can
/// be used for the lifetime of a key without a realistic collision risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct XChaCha20Poly1305Cipher;

impl Cipher for XChaCha20Poly1305Cipher {
    fn version_tag(&self) -> u8 {
        VERSION_TAG
    }

    fn nonce_len(&self) -> usize {
        NONCE_LEN
    }

    #[allow(deprecated)]
    fn seal(&self, key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, VaultError> {
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, Payload {
                msg: plaintext,
                aad,
            })
            .map_err(|e| VaultError::CipherError(e.to_string()))?;

        Ok(Sealed {
            nonce: nonce_bytes.to_vec(),
            ciphertext,
        })
    }

    #[allow(deprecated)]
    fn open(
        &self,
        key: &DerivedKey,
        nonce: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, VaultError> {
        if nonce.len() != NONCE_LEN {
            return Err(DecryptFailure::Format(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                nonce.len()
            ))
            .into());
        }
        if ciphertext.len() < TAG_LEN {
            return Err(DecryptFailure::Format("ciphertext too short".to_string()).into());
        }

        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
        cipher
            .decrypt(XNonce::from_slice(nonce), Payload {
                msg: ciphertext,
                aad,
            })
            .map_err(|_| VaultError::DecryptionFailed(DecryptFailure::Authentication))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes([byte; 32])
    }

    #[test]
    fn round_trip_no_aad() {
        let cipher = XChaCha20Poly1305Cipher;
        let sealed = cipher.seal(&key(0x42), b"hello vault", b"").unwrap();
        let opened = cipher
            .open(&key(0x42), &sealed.nonce, &sealed.ciphertext, b"")
            .unwrap();
        assert_eq!(opened, b"hello vault");
    }

    #[test]
    fn round_trip_with_aad() {
        let cipher = XChaCha20Poly1305Cipher;
        let aad = b"vault:password";
        let sealed = cipher.seal(&key(0x42), b"secret data", aad).unwrap();
        let opened = cipher
            .open(&key(0x42), &sealed.nonce, &sealed.ciphertext, aad)
            .unwrap();
        assert_eq!(opened, b"secret data");
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let cipher = XChaCha20Poly1305Cipher;
        let sealed = cipher.seal(&key(0x42), b"secret", b"").unwrap();
        let result = cipher.open(&key(0x43), &sealed.nonce, &sealed.ciphertext, b"");
        assert!(matches!(
            result,
            Err(VaultError::DecryptionFailed(DecryptFailure::Authentication))
        ));
    }

    #[test]
    fn wrong_aad_fails() {
        let cipher = XChaCha20Poly1305Cipher;
        let sealed = cipher.seal(&key(0x42), b"secret", b"correct").unwrap();
        let result = cipher.open(&key(0x42), &sealed.nonce, &sealed.ciphertext, b"wrong");
        assert!(result.is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let cipher = XChaCha20Poly1305Cipher;
        let mut sealed = cipher.seal(&key(0x42), b"secret", b"").unwrap();
        let last = sealed.ciphertext.len() - 1;
        sealed.ciphertext[last] ^= 0x01;
        let result = cipher.open(&key(0x42), &sealed.nonce, &sealed.ciphertext, b"");
        assert!(matches!(
            result,
            Err(VaultError::DecryptionFailed(DecryptFailure::Authentication))
        ));
    }

    #[test]
    fn short_nonce_is_a_format_error() {
        let cipher = XChaCha20Poly1305Cipher;
        let result = cipher.open(&key(0x42), &[0u8; 12], &[0u8; 32], b"");
        assert!(matches!(
            result,
            Err(VaultError::DecryptionFailed(DecryptFailure::Format(_)))
        ));
    }

    #[test]
    fn too_short_ciphertext_fails() {
        let cipher = XChaCha20Poly1305Cipher;
        let result = cipher.open(&key(0x42), &[0u8; NONCE_LEN], &[0u8; 10], b"");
        assert!(matches!(
            result,
            Err(VaultError::DecryptionFailed(DecryptFailure::Format(_)))
        ));
    }

    #[test]
    fn different_nonces_for_same_input() {
        let cipher = XChaCha20Poly1305Cipher;
        let s1 = cipher.seal(&key(0x42), b"same input", b"").unwrap();
        let s2 = cipher.seal(&key(0x42), b"same input", b"").unwrap();
        assert_ne!(s1.nonce, s2.nonce);
        assert_ne!(s1.ciphertext, s2.ciphertext);
    }

    #[test]
    fn ciphertext_carries_tag() {
        let cipher = XChaCha20Poly1305Cipher;
        let sealed = cipher.seal(&key(0x42), b"hello", b"").unwrap();
        assert_eq!(sealed.nonce.len(), NONCE_LEN);
        assert_eq!(sealed.ciphertext.len(), 5 + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let cipher = XChaCha20Poly1305Cipher;
        let sealed = cipher.seal(&key(0x42), b"", b"").unwrap();
        let opened = cipher
            .open(&key(0x42), &sealed.nonce, &sealed.ciphertext, b"")
            .unwrap();
        assert!(opened.is_empty());
    }
}
