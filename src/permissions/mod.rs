//! Permission system for checking user roles.
//!
//! - `directory` fetches (and briefly caches) a chat's admin list
//! - `checker` answers role questions against that list
//!
//! ## Usage
//!
//! ```rust,ignore
//! let admins = directory.list_admins(chat_id).await?;
//! if is_owner(&admins, user_id) {
//!     // ...
//! }
//! ```

mod checker;
mod directory;

pub use checker::{BotIdentity, bot_can_moderate, is_admin, is_owner};
pub use directory::{AdminEntry, AdminRole, ChatDirectory, TelegramDirectory};
