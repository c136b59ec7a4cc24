use std::sync::Arc;

use bytes::Bytes;
use models::record::Record;

use crate::errors::ServiceError;
use crate::storage::blob_store::BlobStore;
use crate::storage::tabular;

const CSV_CONTENT_TYPE: &str = "text/csv";

/// Generic collection store: one CSV blob per collection, rewritten whole
/// on every change.
///
/// All higher-level writes go through [`mutate`](RecordStore::mutate) /
/// [`mutate_existing`](RecordStore::mutate_existing). There is no locking
/// and no versioning: two concurrent mutations of the same key race, and
/// the later full overwrite silently discards the earlier writer's changes.
/// Every load re-reads the blob, so there is no process-local staleness.
pub struct RecordStore {
    blobs: Arc<dyn BlobStore>,
}

impl RecordStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Arc<Self> {
        Arc::new(Self { blobs })
    }

    /// Load all records of a collection. A collection whose blob does not
    /// exist yet is the empty collection.
    pub async fn load_collection(&self, key: &str) -> Result<Vec<Record>, ServiceError> {
        if !self.blobs.exists(key).await? {
            return Ok(Vec::new());
        }
        let bytes = self.blobs.read(key).await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| ServiceError::Store(format!("collection {key} is not utf-8: {e}")))?;
        tabular::decode(text)
    }

    /// Load a collection that must already exist; `NotFound` otherwise.
    pub async fn load_required(&self, key: &str, entity: &str) -> Result<Vec<Record>, ServiceError> {
        if !self.blobs.exists(key).await? {
            return Err(ServiceError::not_found(entity));
        }
        self.load_collection(key).await
    }

    /// Encode and overwrite the whole collection blob.
    pub async fn save_collection(&self, key: &str, records: &[Record]) -> Result<(), ServiceError> {
        let text = tabular::encode(records);
        self.blobs
            .write(key, Bytes::from(text.into_bytes()), CSV_CONTENT_TYPE)
            .await
    }

    /// Load, apply a pure transform, save. An absent collection enters the
    /// transform as the empty sequence, so the first write creates it.
    pub async fn mutate<F>(&self, key: &str, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(Vec<Record>) -> Result<Vec<Record>, ServiceError>,
    {
        let records = self.load_collection(key).await?;
        self.apply(key, records, f).await
    }

    /// Like [`mutate`](RecordStore::mutate), but an absent collection is
    /// `NotFound` instead of empty.
    pub async fn mutate_existing<F>(&self, key: &str, entity: &str, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(Vec<Record>) -> Result<Vec<Record>, ServiceError>,
    {
        let records = self.load_required(key, entity).await?;
        self.apply(key, records, f).await
    }

    async fn apply<F>(&self, key: &str, records: Vec<Record>, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(Vec<Record>) -> Result<Vec<Record>, ServiceError>,
    {
        let next = f(records)?;
        self.save_collection(key, &next).await
    }
}
