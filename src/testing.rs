//! Test doubles for the outbound collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::bot::dispatcher::AppState;
use crate::bot::messenger::{MessageRef, Messenger, SendOptions};
use crate::config::EngineSettings;
use crate::database::{MemoryStore, SessionRepository};
use crate::keyboard::Control;
use crate::permissions::{AdminEntry, AdminRole, BotIdentity, ChatDirectory};

pub const BOT_ID: UserId = UserId(9_000);

pub fn owner(id: u64) -> AdminEntry {
    entry(id, AdminRole::Owner, true, true)
}

pub fn admin(id: u64) -> AdminEntry {
    entry(id, AdminRole::Administrator, true, true)
}

pub fn bot_admin(id: u64, can_delete_messages: bool, can_restrict_members: bool) -> AdminEntry {
    entry(id, AdminRole::Administrator, can_delete_messages, can_restrict_members)
}

fn entry(id: u64, role: AdminRole, can_delete_messages: bool, can_restrict_members: bool) -> AdminEntry {
    AdminEntry {
        user_id: UserId(id),
        first_name: format!("user{id}"),
        last_name: None,
        role,
        can_delete_messages,
        can_restrict_members,
    }
}

pub fn me() -> BotIdentity {
    BotIdentity {
        user_id: BOT_ID,
        username: "guard_bot".into(),
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Admin lists set per chat by the test.
#[derive(Default)]
pub struct FakeDirectory {
    admins: Mutex<HashMap<i64, Vec<AdminEntry>>>,
    failing: Mutex<bool>,
}

impl FakeDirectory {
    pub fn set(&self, group: ChatId, admins: Vec<AdminEntry>) {
        self.admins.lock().insert(group.0, admins);
    }

    pub fn fail(&self) {
        *self.failing.lock() = true;
    }
}

#[async_trait]
impl ChatDirectory for FakeDirectory {
    async fn list_admins(&self, group: ChatId) -> anyhow::Result<Vec<AdminEntry>> {
        if *self.failing.lock() {
            anyhow::bail!("directory unavailable");
        }
        Ok(self.admins.lock().get(&group.0).cloned().unwrap_or_default())
    }
}

/// Every outbound call, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { target: ChatId, text: String, controls: Option<Vec<Control>> },
    Controls { message: MessageRef, controls: Vec<Control> },
    Removed { group: ChatId, user: UserId },
    Restored { group: ChatId, user: UserId },
    Deleted { group: ChatId, message: MessageId },
}

#[derive(Default)]
pub struct FakeMessenger {
    log: Mutex<Vec<Sent>>,
    fail_removals: Mutex<bool>,
}

impl FakeMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.log.lock().clone()
    }

    pub fn texts(&self) -> Vec<(ChatId, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { target, text, .. } => Some((target, text)),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Removed { .. }))
            .count()
    }

    pub fn fail_removals(&self) {
        *self.fail_removals.lock() = true;
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send(&self, target: ChatId, text: &str, options: SendOptions) -> anyhow::Result<()> {
        self.log.lock().push(Sent::Text {
            target,
            text: text.to_string(),
            controls: options.controls,
        });
        Ok(())
    }

    async fn edit_controls(&self, controls: &[Control], message: MessageRef) -> anyhow::Result<()> {
        self.log.lock().push(Sent::Controls {
            message,
            controls: controls.to_vec(),
        });
        Ok(())
    }

    async fn remove_member(&self, group: ChatId, user: UserId) -> anyhow::Result<()> {
        if *self.fail_removals.lock() {
            anyhow::bail!("not enough rights to ban");
        }
        self.log.lock().push(Sent::Removed { group, user });
        Ok(())
    }

    async fn restore_member(&self, group: ChatId, user: UserId) -> anyhow::Result<()> {
        self.log.lock().push(Sent::Restored { group, user });
        Ok(())
    }

    async fn delete_message(&self, group: ChatId, message: MessageId) -> anyhow::Result<()> {
        self.log.lock().push(Sent::Deleted { group, message });
        Ok(())
    }
}

/// Application state wired to in-memory collaborators.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub directory: Arc<FakeDirectory>,
    pub messenger: Arc<FakeMessenger>,
    /// Same store and TTL as the services in `state`.
    pub sessions: SessionRepository,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let directory = Arc::new(FakeDirectory::default());
        let messenger = Arc::new(FakeMessenger::default());
        let settings = EngineSettings::default();
        let sessions = SessionRepository::new(store.clone(), settings.session_ttl);
        let state = AppState::new(
            store.clone(),
            directory.clone(),
            messenger.clone(),
            me(),
            settings,
        );

        Self {
            store,
            directory,
            messenger,
            sessions,
            state,
        }
    }
}
