//! Cache module - named caches built on Moka.
//!
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Cheap-to-clone handle to one cache
//! - `CacheConfig` - Capacity and TTL
//!
//! Only data fetched from Telegram is cached. Group settings, sessions and
//! warn counters always go to the store.

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
