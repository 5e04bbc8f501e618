//! Vault items as exchanged with the storage layer.
//!
//! The storage layer only ever sees [`VaultItem::password`] in its packed
//! form; everything else is stored as given.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use crate::{
    codec::{self, Unpacked},
    error::VaultError,
    kdf::DerivedKey,
};

/// A credential record as persisted by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    pub username: String,
    /// Packed secret, see [`codec`].
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User input for creating or editing an item. `password` is plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultItemDraft {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl VaultItemDraft {
    /// Title, username and password must be non-blank.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.title.trim().is_empty() {
            return Err(VaultError::MissingField("title"));
        }
        if self.username.trim().is_empty() {
            return Err(VaultError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(VaultError::MissingField("password"));
        }
        Ok(())
    }
}

/// Trim tags, drop empty ones and duplicates, keeping first occurrence order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// An item together with its recovered password.
#[derive(Debug)]
pub struct OpenedItem<'a> {
    pub item: &'a VaultItem,
    pub password: Unpacked,
}

impl VaultItem {
    /// Validate `draft` and build a new item with its password packed.
    pub fn seal(
        user_id: &str,
        draft: &VaultItemDraft,
        key: &DerivedKey,
    ) -> Result<Self, VaultError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: None,
            user_id: user_id.to_string(),
            title: draft.title.trim().to_string(),
            username: draft.username.trim().to_string(),
            password: codec::pack_for_storage(&draft.password, key)?,
            url: draft.url.clone().unwrap_or_default(),
            notes: draft.notes.clone().unwrap_or_default(),
            tags: normalize_tags(&draft.tags),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable fields with `draft`, re-packing the password.
    pub fn apply(&mut self, draft: &VaultItemDraft, key: &DerivedKey) -> Result<(), VaultError> {
        draft.validate()?;
        self.title = draft.title.trim().to_string();
        self.username = draft.username.trim().to_string();
        self.password = codec::pack_for_storage(&draft.password, key)?;
        self.url = draft.url.clone().unwrap_or_default();
        self.notes = draft.notes.clone().unwrap_or_default();
        self.tags = normalize_tags(&draft.tags);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn open(&self, key: &DerivedKey) -> OpenedItem<'_> {
        OpenedItem {
            item: self,
            password: codec::unpack_from_storage(&self.password, key),
        }
    }

    /// Case-insensitive match on title, username, url and notes.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.title, &self.username, &self.url, &self.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Items matching `term`; all items when `term` is empty.
pub fn search<'a>(items: &'a [VaultItem], term: &str) -> Vec<&'a VaultItem> {
    if term.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.matches(term)).collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn key() -> DerivedKey {
        DerivedKey::from_bytes([3; 32])
    }

    fn draft() -> VaultItemDraft {
        VaultItemDraft {
            title: " GitHub ".into(),
            username: "octocat".into(),
            password: "P4ssw0rd!2024".into(),
            url: Some("github.com".into()),
            notes: None,
            tags: vec!["work".into(), " work ".into(), "".into(), "dev".into()],
        }
    }

    #[test]
    fn seal_packs_password_and_normalizes() {
        let item = VaultItem::seal("u1", &draft(), &key()).unwrap();
        assert_eq!(item.title, "GitHub");
        assert_ne!(item.password, "P4ssw0rd!2024");
        assert!(item.password.starts_with('{'));
        assert_eq!(item.tags, vec!["work".to_string(), "dev".to_string()]);
        assert_eq!(item.notes, "");
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn open_recovers_password() {
        let item = VaultItem::seal("u1", &draft(), &key()).unwrap();
        let opened = item.open(&key());
        assert_eq!(opened.password.plaintext(), Some("P4ssw0rd!2024"));
    }

    #[rstest]
    #[case(VaultItemDraft { title: "  ".into(), ..draft() }, "title")]
    #[case(VaultItemDraft { username: "".into(), ..draft() }, "username")]
    #[case(VaultItemDraft { password: "".into(), ..draft() }, "password")]
    fn required_fields(#[case] draft: VaultItemDraft, #[case] field: &str) {
        match VaultItem::seal("u1", &draft, &key()) {
            Err(VaultError::MissingField(f)) => assert_eq!(f, field),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn apply_repacks_and_bumps_timestamp() {
        let mut item = VaultItem::seal("u1", &draft(), &key()).unwrap();
        let before = item.password.clone();
        let edited = VaultItemDraft {
            password: "n3w-secret".into(),
            ..draft()
        };
        item.apply(&edited, &key()).unwrap();
        assert_ne!(item.password, before);
        assert!(item.updated_at >= item.created_at);
        assert_eq!(item.open(&key()).password.plaintext(), Some("n3w-secret"));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let a = VaultItem::seal("u1", &draft(), &key()).unwrap();
        let b = VaultItem::seal(
            "u1",
            &VaultItemDraft {
                title: "Bank".into(),
                username: "me".into(),
                password: "x".into(),
                notes: Some("Savings ACCOUNT".into()),
                ..VaultItemDraft::default()
            },
            &key(),
        )
        .unwrap();
        let items = vec![a, b];

        assert_eq!(search(&items, "").len(), 2);
        assert_eq!(search(&items, "GITHUB.COM")[0].title, "GitHub");
        assert_eq!(search(&items, "account")[0].title, "Bank");
        assert!(search(&items, "nomatch").is_empty());
    }

    #[test]
    fn serde_uses_storage_field_names() {
        let mut item = VaultItem::seal("u1", &draft(), &key()).unwrap();
        item.id = Some("650c1f".into());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["_id"], "650c1f");
        assert_eq!(json["userId"], "u1");
        assert!(json.get("createdAt").is_some());

        let back: VaultItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
