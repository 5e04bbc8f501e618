//! Per-session key holder.

use crate::{
    codec::{self, Unpacked},
    error::VaultError,
    item::{OpenedItem, VaultItem, VaultItemDraft},
    kdf::{DerivedKey, KdfParams, KeySource},
};

/// The vault key for one authenticated session.
///
/// Derive it once when the user's identity is known and drop it on logout;
/// the key bytes are zeroed when the session is dropped.
#[derive(Debug)]
pub struct VaultSession {
    user_id: String,
    key: DerivedKey,
}

impl VaultSession {
    /// Run key derivation for `source` and start a session.
    pub fn start(
        user_id: impl Into<String>,
        source: &KeySource,
        params: &KdfParams,
    ) -> Result<Self, VaultError> {
        let key = source.derive(params)?;
        let user_id = user_id.into();

        #[cfg(feature = "tracing")]
        tracing::info!(user_id = %user_id, algorithm = params.algorithm(), "vault session started");

        Ok(Self { user_id, key })
    }

    pub fn with_key(user_id: impl Into<String>, key: DerivedKey) -> Self {
        Self {
            user_id: user_id.into(),
            key,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn key(&self) -> &DerivedKey {
        &self.key
    }

    pub fn pack(&self, plaintext: &str) -> Result<String, VaultError> {
        codec::pack_for_storage(plaintext, &self.key)
    }

    pub fn unpack(&self, stored: &str) -> Unpacked {
        codec::unpack_from_storage(stored, &self.key)
    }

    pub fn seal_item(&self, draft: &VaultItemDraft) -> Result<VaultItem, VaultError> {
        VaultItem::seal(&self.user_id, draft, &self.key)
    }

    pub fn open_item<'a>(&self, item: &'a VaultItem) -> OpenedItem<'a> {
        item.open(&self.key)
    }
}
