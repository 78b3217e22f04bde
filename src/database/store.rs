//! Document store capability.
//!
//! Repositories talk to persistence only through [`Store`]. Filters use
//! equality plus `$gt`/`$gte`/`$lt`/`$lte`; updates use field-level
//! operators only, never whole-document replacement.

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

/// Result of a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub upserted: bool,
}

/// Minimal document store used by the repositories.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()>;

    /// Apply update operators (`$set`, `$setOnInsert`, `$inc`, `$addToSet`,
    /// `$pullAll`) to the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome>;

    /// Atomically add `by` to `field`, creating the document if absent.
    /// Returns the value after the increment.
    async fn increment(&self, collection: &str, filter: Document, field: &str, by: i64)
    -> Result<i64>;

    /// Atomically flip the boolean at `field`. Missing fields count as false.
    /// Returns `None` when no document matches.
    async fn toggle(&self, collection: &str, filter: Document, field: &str) -> Result<Option<bool>>;
}

/// Read any BSON number as i64.
pub fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}
