//! MongoDB database wrapper.

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument, UpdateOptions,
};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

use super::store::{Store, UpdateOutcome, as_i64};

/// Collections that carry a unique key.
const UNIQUE_KEYS: &[(&str, &[&str])] = &[
    ("group_configs", &["groupId"]),
    ("config_sessions", &["user"]),
    ("warns", &["user", "group"]),
    ("config_access", &["groupId"]),
];

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Create the unique indexes the repositories rely on for upserts.
    pub async fn ensure_indexes(&self) -> Result<()> {
        for (name, fields) in UNIQUE_KEYS {
            let mut keys = Document::new();
            for field in *fields {
                keys.insert(*field, 1);
            }
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection(name).create_index(model).await?;
            debug!("Ensured unique index on {} {:?}", name, fields);
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

#[async_trait]
impl Store for Database {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.collection(collection).insert_one(document).await?;
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        let options = UpdateOptions::builder().upsert(upsert).build();
        let result = self
            .collection(collection)
            .update_one(filter, update)
            .with_options(options)
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            upserted: result.upserted_id.is_some(),
        })
    }

    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
        by: i64,
    ) -> Result<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection(collection)
            .find_one_and_update(filter, doc! { "$inc": { field: by } })
            .with_options(options)
            .await?;

        updated
            .as_ref()
            .and_then(|d| d.get(field))
            .and_then(as_i64)
            .ok_or_else(|| anyhow::anyhow!("{}.{} missing after increment", collection, field))
    }

    async fn toggle(&self, collection: &str, filter: Document, field: &str) -> Result<Option<bool>> {
        // Pipeline update so the flip happens server-side in one step.
        let pipeline = vec![doc! {
            "$set": { field: { "$not": [format!("${}", field)] } }
        }];
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection(collection)
            .find_one_and_update(filter, pipeline)
            .with_options(options)
            .await?;

        Ok(updated.and_then(|d| match d.get(field) {
            Some(Bson::Boolean(b)) => Some(*b),
            _ => None,
        }))
    }
}
