//! Password manager core: generation, strength scoring, key derivation and
//! the encrypted storage format for vault secrets.
//!
//! A [`VaultSession`] derives its key once from a [`KeySource`] and then packs
//! and unpacks item passwords with XChaCha20-Poly1305. The trait-based
//! [`Cipher`] design allows swapping the encryption backend.

pub mod cipher;
pub mod codec;
pub mod error;
pub mod generator;
pub mod item;
pub mod kdf;
pub mod session;
pub mod strength;
pub mod traits;
pub mod xchacha20;

pub use {
    cipher::{EncryptedEnvelope, decrypt, encrypt},
    codec::{
        DECRYPTION_FAILED_SENTINEL, StoredSecret, UnpackFailure, Unpacked, pack_for_storage,
        unpack_from_storage,
    },
    error::{DecryptFailure, VaultError},
    generator::{PasswordPolicy, generate},
    item::{VaultItem, VaultItemDraft, search},
    kdf::{DerivedKey, KdfParams, KeySource, derive_key, user_salt},
    session::VaultSession,
    strength::{StrengthLabel, StrengthReport, score},
    traits::Cipher,
    xchacha20::XChaCha20Poly1305Cipher,
};
