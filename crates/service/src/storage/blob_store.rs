use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::errors::ServiceError;

/// The unified object-store interface for all persistence.
///
/// Every logical update is a full-object replacement; no partial or append
/// writes exist. Implementations must not cache: each call round-trips to
/// the backing store, so the only staleness comes from concurrent writers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check whether an object exists at the given key.
    async fn exists(&self, key: &str) -> Result<bool, ServiceError>;

    /// Read a whole object. Returns `NotFound` if the key does not exist.
    async fn read(&self, key: &str) -> Result<Bytes, ServiceError>;

    /// Write a whole object, creating or fully replacing it.
    async fn write(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), ServiceError>;

    /// Deterministic public URL for an object, composed from the configured
    /// bucket and region (or the override base when serving through a CDN).
    fn public_url(&self, key: &str) -> String;
}

/// How public object URLs are composed.
#[derive(Debug, Clone)]
pub struct PublicUrls {
    pub bucket: String,
    pub region: String,
    pub base_override: Option<String>,
}

impl PublicUrls {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>, base_override: Option<String>) -> Self {
        Self { bucket: bucket.into(), region: region.into(), base_override }
    }

    pub fn for_key(&self, key: &str) -> String {
        match &self.base_override {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key),
        }
    }
}

/// Object store rooted at a local directory, one file per key.
///
/// Serves as the bucket backend for single-node deployments; the key
/// namespace and URL composition match the remote layout, so swapping in a
/// remote implementation is invisible to callers.
pub struct FsBlobStore {
    root: PathBuf,
    urls: PublicUrls,
}

impl FsBlobStore {
    pub async fn new<P: Into<PathBuf>>(root: P, urls: PublicUrls) -> Result<Arc<Self>, ServiceError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| ServiceError::Store(format!("cannot create {}: {e}", root.display())))?;
        Ok(Arc::new(Self { root, urls }))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ServiceError> {
        // Keys are internal (collection constants and generated image keys),
        // but never let a stray component escape the root.
        if key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(ServiceError::Store(format!("invalid object key `{key}`")));
        }
        Ok(key.split('/').fold(self.root.clone(), |p, part| p.join(part)))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, ServiceError> {
        let path = self.path_for(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| ServiceError::Store(format!("stat {key}: {e}")))
    }

    async fn read(&self, key: &str) -> Result<Bytes, ServiceError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::not_found(&format!("object {key}")))
            }
            Err(e) => Err(ServiceError::Store(format!("read {key}: {e}"))),
        }
    }

    async fn write(&self, key: &str, data: Bytes, _content_type: &str) -> Result<(), ServiceError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            if parent != Path::new("") {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ServiceError::Store(format!("mkdir for {key}: {e}")))?;
            }
        }
        fs::write(&path, &data)
            .await
            .map_err(|e| ServiceError::Store(format!("write {key}: {e}")))
    }

    fn public_url(&self, key: &str) -> String {
        self.urls.for_key(key)
    }
}

/// Simple in-memory blob store for tests and doc examples
pub mod memory {
    use std::collections::HashMap;

    use tokio::sync::RwLock;

    use super::*;

    pub struct MemoryBlobStore {
        inner: RwLock<HashMap<String, Bytes>>,
        urls: PublicUrls,
    }

    impl MemoryBlobStore {
        pub fn new() -> Arc<Self> {
            Self::with_urls(PublicUrls::new("test-bucket", "eu-central-1", None))
        }

        pub fn with_urls(urls: PublicUrls) -> Arc<Self> {
            Arc::new(Self { inner: RwLock::new(HashMap::new()), urls })
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn exists(&self, key: &str) -> Result<bool, ServiceError> {
            Ok(self.inner.read().await.contains_key(key))
        }

        async fn read(&self, key: &str) -> Result<Bytes, ServiceError> {
            self.inner
                .read()
                .await
                .get(key)
                .cloned()
                .ok_or_else(|| ServiceError::not_found(&format!("object {key}")))
        }

        async fn write(&self, key: &str, data: Bytes, _content_type: &str) -> Result<(), ServiceError> {
            self.inner.write().await.insert(key.to_string(), data);
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            self.urls.for_key(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_store_round_trips_objects() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("blob_store_{}", uuid::Uuid::new_v4()));
        let store = FsBlobStore::new(&root, PublicUrls::new("b", "r", None)).await?;

        assert!(!store.exists("users/user.csv").await?);
        store.write("users/user.csv", Bytes::from_static(b"a,b\n1,2\n"), "text/csv").await?;
        assert!(store.exists("users/user.csv").await?);
        assert_eq!(store.read("users/user.csv").await?, Bytes::from_static(b"a,b\n1,2\n"));

        // full replacement, not append
        store.write("users/user.csv", Bytes::from_static(b"a,b\n"), "text/csv").await?;
        assert_eq!(store.read("users/user.csv").await?, Bytes::from_static(b"a,b\n"));

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn fs_store_read_missing_is_not_found() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("blob_store_{}", uuid::Uuid::new_v4()));
        let store = FsBlobStore::new(&root, PublicUrls::new("b", "r", None)).await?;
        match store.read("nope.csv").await {
            Err(ServiceError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn fs_store_rejects_traversal_keys() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("blob_store_{}", uuid::Uuid::new_v4()));
        let store = FsBlobStore::new(&root, PublicUrls::new("b", "r", None)).await?;
        assert!(store.read("../etc/passwd").await.is_err());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[test]
    fn public_url_virtual_hosted_style() {
        let urls = PublicUrls::new("recipe-share", "eu-central-1", None);
        assert_eq!(
            urls.for_key("recipes/images/1-a.png"),
            "https://recipe-share.s3.eu-central-1.amazonaws.com/recipes/images/1-a.png"
        );
    }

    #[test]
    fn public_url_base_override_wins() {
        let urls = PublicUrls::new("b", "r", Some("https://cdn.example.com/".into()));
        assert_eq!(urls.for_key("k/x.png"), "https://cdn.example.com/k/x.png");
    }
}
