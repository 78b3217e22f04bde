//! Utility functions.

pub mod links;

pub use links::normalize_link;

/// Escape text for HTML parse mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
