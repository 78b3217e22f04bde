//! Bot module - Core bot functionality.

pub mod dispatcher;
pub mod messenger;
mod runtime;
mod webhook;

pub use dispatcher::build_dispatcher;
pub use runtime::run;
