//! Session, permission and escalation workflows.
//!
//! Handlers in `plugins` translate Telegram updates into calls on these
//! types and turn the results into replies.

pub mod access;
pub mod configure;
pub mod ledger;

pub use access::AccessWorkflow;
pub use configure::{ConfigWorkflow, OpenOutcome};
pub use ledger::WarningLedger;
