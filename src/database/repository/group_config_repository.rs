//! Group configuration repository.
//!
//! Every write touches only the fields it names, so concurrent edits of
//! different settings on one group never overwrite each other. Nothing is
//! cached: admins in several chats can edit the same group at once.

use std::sync::Arc;

use mongodb::bson::{self, doc, Bson, Document};
use teloxide::types::ChatId;
use tracing::{debug, info};

use crate::database::models::{ConfigFlag, GroupConfig};
use crate::database::store::Store;
use crate::error::{GuardError, GuardResult};

const COLLECTION: &str = "group_configs";

/// Per-link result of a whitelist edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChange {
    pub link: String,
    /// For adds: the link was already listed. For removals: it was listed.
    pub was_present: bool,
}

/// Repository for group configuration.
pub struct GroupConfigRepository {
    store: Arc<dyn Store>,
}

impl GroupConfigRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn filter(group: ChatId) -> Document {
        doc! { "groupId": group.0 }
    }

    /// Get group config if exists.
    pub async fn get(&self, group: ChatId) -> GuardResult<Option<GroupConfig>> {
        let found = self
            .store
            .find_one(COLLECTION, Self::filter(group))
            .await
            .map_err(GuardError::Storage)?;
        debug!("DB get group config for {}: {:?}", group, found.is_some());

        found
            .map(|d| bson::from_document(d).map_err(GuardError::storage))
            .transpose()
    }

    /// Get group config, creating it with defaults on first use.
    pub async fn ensure(&self, group: ChatId) -> GuardResult<GroupConfig> {
        let mut defaults = bson::to_document(&GroupConfig::new(group.0)).map_err(GuardError::storage)?;
        defaults.remove("groupId");

        let outcome = self
            .store
            .update_one(
                COLLECTION,
                Self::filter(group),
                doc! { "$setOnInsert": defaults },
                true,
            )
            .await
            .map_err(GuardError::Storage)?;
        if outcome.upserted {
            info!("Created default config for group {}", group);
        }

        self.get(group).await?.ok_or(GuardError::NotConfigured(group.0))
    }

    /// Flip one flag and return its new value.
    ///
    /// `flag_name` usually comes straight from a callback payload, so it is
    /// checked against the enumerated set before touching the store.
    pub async fn toggle(&self, group: ChatId, flag_name: &str) -> GuardResult<bool> {
        let flag: ConfigFlag = flag_name.parse()?;
        let value = self
            .store
            .toggle(COLLECTION, Self::filter(group), flag.as_str())
            .await
            .map_err(GuardError::Storage)?
            .ok_or(GuardError::NotConfigured(group.0))?;

        info!("Group {} flag {} -> {}", group, flag, value);
        Ok(value)
    }

    /// Replace the whitelist. Duplicates are dropped, first occurrence wins.
    pub async fn set_white_list(&self, group: ChatId, links: &[String]) -> GuardResult<()> {
        let mut unique: Vec<&String> = Vec::with_capacity(links.len());
        for link in links {
            if !unique.contains(&link) {
                unique.push(link);
            }
        }
        self.set_field(group, "whiteList", Bson::from(unique.into_iter().cloned().collect::<Vec<_>>()))
            .await
    }

    /// Add links to the whitelist, reporting which were already present.
    pub async fn add_to_white_list(&self, group: ChatId, links: &[String]) -> GuardResult<Vec<LinkChange>> {
        let current = self.white_list(group).await?;
        let changes = links
            .iter()
            .map(|link| LinkChange {
                link: link.clone(),
                was_present: current.contains(link),
            })
            .collect();

        self.store
            .update_one(
                COLLECTION,
                Self::filter(group),
                doc! { "$addToSet": { "whiteList": { "$each": links.to_vec() } } },
                true,
            )
            .await
            .map_err(GuardError::Storage)?;

        Ok(changes)
    }

    /// Remove links from the whitelist, reporting which were present.
    pub async fn remove_from_white_list(
        &self,
        group: ChatId,
        links: &[String],
    ) -> GuardResult<Vec<LinkChange>> {
        let current = self.white_list(group).await?;
        let changes = links
            .iter()
            .map(|link| LinkChange {
                link: link.clone(),
                was_present: current.contains(link),
            })
            .collect();

        self.store
            .update_one(
                COLLECTION,
                Self::filter(group),
                doc! { "$pullAll": { "whiteList": links.to_vec() } },
                true,
            )
            .await
            .map_err(GuardError::Storage)?;

        Ok(changes)
    }

    /// Current whitelist, empty when the group has none.
    pub async fn white_list(&self, group: ChatId) -> GuardResult<Vec<String>> {
        Ok(self.get(group).await?.map(|c| c.white_list).unwrap_or_default())
    }

    /// Set the length limit. Zero (or anything negative) disables it.
    pub async fn set_max_message_length(&self, group: ChatId, length: i64) -> GuardResult<i64> {
        let length = length.max(0);
        self.set_field(group, "maxMessageLength", Bson::Int64(length)).await?;
        Ok(length)
    }

    /// Set the greeting template. Empty text clears it back to the built-in
    /// greeting; the `helloMsg` flag alone controls whether greetings are sent.
    pub async fn set_hello_message(&self, group: ChatId, text: Option<&str>) -> GuardResult<Option<String>> {
        let text = text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        let value = text.clone().map(Bson::String).unwrap_or(Bson::Null);
        self.set_field(group, "helloMsgString", value).await?;
        Ok(text)
    }

    async fn set_field(&self, group: ChatId, field: &str, value: Bson) -> GuardResult<()> {
        self.store
            .update_one(
                COLLECTION,
                Self::filter(group),
                doc! { "$set": { field: value } },
                true,
            )
            .await
            .map_err(GuardError::Storage)?;
        debug!("Updated {} for group {}", field, group);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    const GROUP: ChatId = ChatId(-100_123);

    fn repo() -> (Arc<MemoryStore>, GroupConfigRepository) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), GroupConfigRepository::new(store))
    }

    #[tokio::test]
    async fn test_ensure_creates_defaults_once() {
        let (store, repo) = repo();

        let first = repo.ensure(GROUP).await.unwrap();
        for flag in ConfigFlag::ALL {
            assert_eq!(first.flag(flag), flag.default_value(), "{}", flag);
        }
        assert!(!first.allow_admins_to_configure);
        assert_eq!(first.max_message_length, 0);
        assert!(first.white_list.is_empty());

        let second = repo.ensure(GROUP).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.count(COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_ensure_keeps_existing_values() {
        let (_, repo) = repo();
        repo.ensure(GROUP).await.unwrap();
        repo.toggle(GROUP, "urlMsg").await.unwrap();

        let config = repo.ensure(GROUP).await.unwrap();
        assert!(config.url_msg);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_value() {
        let (_, repo) = repo();
        repo.ensure(GROUP).await.unwrap();

        for flag in ConfigFlag::ALL {
            let original = repo.get(GROUP).await.unwrap().unwrap().flag(flag);
            assert_eq!(repo.toggle(GROUP, flag.as_str()).await.unwrap(), !original);
            assert_eq!(repo.toggle(GROUP, flag.as_str()).await.unwrap(), original);
        }
    }

    #[tokio::test]
    async fn test_toggle_does_not_clobber_other_flags() {
        let (_, repo) = repo();
        repo.ensure(GROUP).await.unwrap();
        repo.toggle(GROUP, "pinnedMsg").await.unwrap();

        repo.toggle(GROUP, "urlMsg").await.unwrap();

        let config = repo.get(GROUP).await.unwrap().unwrap();
        assert!(config.pinned_msg);
        assert!(config.url_msg);
        assert!(!config.joined_msg);
        assert!(!config.restrict_spam);
    }

    #[tokio::test]
    async fn test_toggle_rejects_unknown_flag() {
        let (_, repo) = repo();
        let before = repo.ensure(GROUP).await.unwrap();

        let err = repo.toggle(GROUP, "notAFlag").await.unwrap_err();
        assert!(matches!(err, GuardError::UnknownFlag(_)));
        let err = repo.toggle(GROUP, "maxMessageLength").await.unwrap_err();
        assert!(matches!(err, GuardError::UnknownFlag(_)));

        assert_eq!(repo.get(GROUP).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn test_toggle_unconfigured_group() {
        let (_, repo) = repo();
        let err = repo.toggle(GROUP, "urlMsg").await.unwrap_err();
        assert!(matches!(err, GuardError::NotConfigured(id) if id == GROUP.0));
    }

    #[tokio::test]
    async fn test_whitelist_add_is_idempotent() {
        let (_, repo) = repo();
        repo.ensure(GROUP).await.unwrap();
        let links = vec!["rust-lang.org".to_string()];

        let first = repo.add_to_white_list(GROUP, &links).await.unwrap();
        assert!(!first[0].was_present);

        let second = repo.add_to_white_list(GROUP, &links).await.unwrap();
        assert!(second[0].was_present);

        assert_eq!(repo.white_list(GROUP).await.unwrap(), links);
    }

    #[tokio::test]
    async fn test_whitelist_remove_and_clear() {
        let (_, repo) = repo();
        repo.ensure(GROUP).await.unwrap();
        let links = vec!["a.com".to_string(), "b.com".to_string()];
        repo.add_to_white_list(GROUP, &links).await.unwrap();

        let removed = repo
            .remove_from_white_list(GROUP, &["a.com".to_string(), "c.com".to_string()])
            .await
            .unwrap();
        assert!(removed[0].was_present);
        assert!(!removed[1].was_present);
        assert_eq!(repo.white_list(GROUP).await.unwrap(), vec!["b.com".to_string()]);

        repo.set_white_list(GROUP, &[]).await.unwrap();
        assert!(repo.white_list(GROUP).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_white_list_dedups() {
        let (_, repo) = repo();
        let links = vec!["a.com".to_string(), "a.com".to_string(), "b.com".to_string()];
        repo.set_white_list(GROUP, &links).await.unwrap();
        assert_eq!(repo.white_list(GROUP).await.unwrap(), vec!["a.com".to_string(), "b.com".to_string()]);
    }

    #[tokio::test]
    async fn test_setters_leave_flags_alone() {
        let (_, repo) = repo();
        repo.ensure(GROUP).await.unwrap();
        repo.toggle(GROUP, "helloMsg").await.unwrap();

        assert_eq!(repo.set_max_message_length(GROUP, 280).await.unwrap(), 280);
        assert_eq!(
            repo.set_hello_message(GROUP, Some("Hi $name")).await.unwrap(),
            Some("Hi $name".to_string())
        );

        let config = repo.get(GROUP).await.unwrap().unwrap();
        assert!(config.hello_msg);
        assert_eq!(config.max_message_length, 280);
        assert_eq!(config.hello_msg_string.as_deref(), Some("Hi $name"));
    }

    #[tokio::test]
    async fn test_negative_length_disables_limit() {
        let (_, repo) = repo();
        assert_eq!(repo.set_max_message_length(GROUP, -5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_hello_message_clears_template() {
        let (_, repo) = repo();
        repo.ensure(GROUP).await.unwrap();
        repo.set_hello_message(GROUP, Some("Welcome")).await.unwrap();

        assert_eq!(repo.set_hello_message(GROUP, Some("   ")).await.unwrap(), None);
        let config = repo.get(GROUP).await.unwrap().unwrap();
        assert_eq!(config.hello_msg_string, None);
    }
}
