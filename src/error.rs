//! Error taxonomy for the configuration and escalation engine.

use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// Every error is local to one invocation. Handlers decide how each variant
/// is shown to the user.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Actor lacks the role the operation requires.
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),

    /// Target of a warn is an administrator (or the bot itself).
    #[error("target {0} is protected")]
    ProtectedTarget(u64),

    /// No live configuration session for the user.
    #[error("no active configuration session")]
    SessionExpired,

    /// Undecodable callback token.
    #[error("malformed callback: {0}")]
    MalformedCallback(String),

    /// Flag name outside the enumerated set.
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// Group configuration record missing where one must exist.
    #[error("group {0} is not configured")]
    NotConfigured(i64),

    /// Read or write against the store failed.
    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),

    /// Outbound transport call failed.
    #[error("transport failure: {0}")]
    Transport(#[source] anyhow::Error),
}

impl GuardError {
    /// Wrap a store error.
    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        Self::Storage(err.into())
    }

    /// Callback payloads from adversarial input are dropped silently.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::MalformedCallback(_) | Self::UnknownFlag(_))
    }
}

pub type GuardResult<T> = Result<T, GuardError>;
