//! In-memory [`Store`] used by tests.
//!
//! Supports the same filter and update subset the repositories send to
//! MongoDB. Each call holds the lock for its whole read-modify-write, which
//! mirrors the single-document atomicity the server gives.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use parking_lot::Mutex;

use super::store::{Store, UpdateOutcome, as_i64};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let collections = self.collections.lock();
        let Some(docs) = collections.get(collection) else {
            return Ok(None);
        };
        for doc in docs {
            if matches(doc, &filter)? {
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();

        for doc in docs.iter_mut() {
            if matches(doc, &filter)? {
                apply_update(doc, &update, false)?;
                return Ok(UpdateOutcome {
                    matched: 1,
                    upserted: false,
                });
            }
        }

        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut doc = seed_from_filter(&filter);
        apply_update(&mut doc, &update, true)?;
        docs.push(doc);
        Ok(UpdateOutcome {
            matched: 0,
            upserted: true,
        })
    }

    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
        by: i64,
    ) -> Result<i64> {
        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();

        let mut position = None;
        for (idx, doc) in docs.iter().enumerate() {
            if matches(doc, &filter)? {
                position = Some(idx);
                break;
            }
        }
        let idx = match position {
            Some(idx) => idx,
            None => {
                docs.push(seed_from_filter(&filter));
                docs.len() - 1
            }
        };

        let doc = &mut docs[idx];
        let current = doc.get(field).and_then(as_i64).unwrap_or(0);
        let next = current + by;
        doc.insert(field, next);
        Ok(next)
    }

    async fn toggle(&self, collection: &str, filter: Document, field: &str) -> Result<Option<bool>> {
        let mut collections = self.collections.lock();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        for doc in docs.iter_mut() {
            if matches(doc, &filter)? {
                let next = !matches!(doc.get(field), Some(Bson::Boolean(true)));
                doc.insert(field, next);
                return Ok(Some(next));
            }
        }
        Ok(None)
    }
}

fn matches(doc: &Document, filter: &Document) -> Result<bool> {
    for (key, expected) in filter {
        let actual = doc.get(key);
        match expected {
            Bson::Document(ops) if is_operator_doc(ops) => {
                for (op, operand) in ops {
                    let Some(actual) = actual else {
                        return Ok(false);
                    };
                    let ordering = compare(actual, operand);
                    let ok = match op.as_str() {
                        "$gt" => ordering == Some(Ordering::Greater),
                        "$gte" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                        "$lt" => ordering == Some(Ordering::Less),
                        "$lte" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                        "$eq" => ordering == Some(Ordering::Equal),
                        other => bail!("unsupported filter operator {}", other),
                    };
                    if !ok {
                        return Ok(false);
                    }
                }
            }
            _ => {
                if !actual.is_some_and(|a| compare(a, expected) == Some(Ordering::Equal)) {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

fn is_operator_doc(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
}

fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
        return Some(x.cmp(&y));
    }
    match (a, b) {
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        _ if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

fn seed_from_filter(filter: &Document) -> Document {
    let mut doc = Document::new();
    for (key, value) in filter {
        if !matches!(value, Bson::Document(ops) if is_operator_doc(ops)) {
            doc.insert(key.clone(), value.clone());
        }
    }
    doc
}

fn apply_update(doc: &mut Document, update: &Document, inserting: bool) -> Result<()> {
    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            bail!("operator {} expects a document", op);
        };
        match op.as_str() {
            "$set" => {
                for (k, v) in fields {
                    doc.insert(k.clone(), v.clone());
                }
            }
            "$setOnInsert" => {
                if inserting {
                    for (k, v) in fields {
                        doc.insert(k.clone(), v.clone());
                    }
                }
            }
            "$inc" => {
                for (k, v) in fields {
                    let Some(by) = as_i64(v) else {
                        bail!("$inc on {} expects a number", k);
                    };
                    let current = doc.get(k).and_then(as_i64).unwrap_or(0);
                    doc.insert(k.clone(), current + by);
                }
            }
            "$addToSet" => {
                for (k, v) in fields {
                    let items = match v {
                        Bson::Document(each) if each.contains_key("$each") => match each.get("$each") {
                            Some(Bson::Array(items)) => items.clone(),
                            _ => bail!("$each on {} expects an array", k),
                        },
                        other => vec![other.clone()],
                    };
                    let array = array_field(doc, k)?;
                    for item in items {
                        if !array.contains(&item) {
                            array.push(item);
                        }
                    }
                }
            }
            "$pullAll" => {
                for (k, v) in fields {
                    let Bson::Array(items) = v else {
                        bail!("$pullAll on {} expects an array", k);
                    };
                    let array = array_field(doc, k)?;
                    array.retain(|existing| !items.contains(existing));
                }
            }
            other => bail!("unsupported update operator {}", other),
        }
    }
    Ok(())
}

fn array_field<'a>(doc: &'a mut Document, key: &str) -> Result<&'a mut Vec<Bson>> {
    if !doc.contains_key(key) {
        doc.insert(key, Bson::Array(Vec::new()));
    }
    match doc.get_mut(key) {
        Some(Bson::Array(array)) => Ok(array),
        _ => bail!("field {} is not an array", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, DateTime};

    #[tokio::test]
    async fn test_upsert_seeds_from_filter() {
        let store = MemoryStore::new();
        store
            .update_one("c", doc! { "k": 1 }, doc! { "$set": { "v": "a" } }, true)
            .await
            .unwrap();

        let found = store.find_one("c", doc! { "k": 1 }).await.unwrap().unwrap();
        assert_eq!(found.get_str("v").unwrap(), "a");
        assert_eq!(store.count("c"), 1);
    }

    #[tokio::test]
    async fn test_comparison_filter_on_dates() {
        let store = MemoryStore::new();
        store
            .insert_one("c", doc! { "k": 1, "date": DateTime::from_millis(1_000) })
            .await
            .unwrap();

        let hit = store
            .find_one("c", doc! { "k": 1, "date": { "$gt": DateTime::from_millis(999) } })
            .await
            .unwrap();
        let miss = store
            .find_one("c", doc! { "k": 1, "date": { "$gt": DateTime::from_millis(1_000) } })
            .await
            .unwrap();
        assert!(hit.is_some());
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_add_to_set_and_pull_all() {
        let store = MemoryStore::new();
        let filter = doc! { "k": 1 };
        store
            .update_one("c", filter.clone(), doc! { "$addToSet": { "xs": { "$each": ["a", "b", "a"] } } }, true)
            .await
            .unwrap();
        store
            .update_one("c", filter.clone(), doc! { "$pullAll": { "xs": ["a"] } }, false)
            .await
            .unwrap();

        let found = store.find_one("c", filter).await.unwrap().unwrap();
        assert_eq!(found.get_array("xs").unwrap(), &vec![Bson::String("b".into())]);
    }

    #[tokio::test]
    async fn test_toggle_missing_document() {
        let store = MemoryStore::new();
        assert_eq!(store.toggle("c", doc! { "k": 1 }, "flag").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unsupported_operator_is_an_error() {
        let store = MemoryStore::new();
        let result = store
            .update_one("c", doc! { "k": 1 }, doc! { "$rename": { "a": "b" } }, true)
            .await;
        assert!(result.is_err());
    }
}
