//! Object storage for parsed payloads
//! Uses Apache Arrow object_store crate

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::{ObjectStore, path::Path as StoragePath};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Destination for parsed payloads
///
/// Writes are overwrite-idempotent: putting the same key twice leaves the
/// latest value.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, value: &Value) -> Result<UploadMetadata>;
}

/// Metadata returned after upload
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub key: String,
    pub etag: Option<String>,
    pub size: usize,
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    pub bucket: String,
    key_prefix: Option<String>,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self {
            store,
            bucket,
            key_prefix: None,
        }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "statfetch-local".to_string())
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let store: Arc<dyn ObjectStore> = match config.provider {
            StorageProvider::Memory => Arc::new(InMemory::new()),
            StorageProvider::Local => {
                std::fs::create_dir_all(&config.root)?;
                Arc::new(LocalFileSystem::new_with_prefix(&config.root)?)
            }
            StorageProvider::S3 => {
                let mut builder = AmazonS3Builder::new().with_bucket_name(&config.bucket);
                if let Some(region) = &config.region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                if let Some(access_key) = &config.access_key {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = &config.secret_key {
                    builder = builder.with_secret_access_key(secret_key);
                }
                Arc::new(builder.build()?)
            }
        };

        tracing::info!(
            provider = ?config.provider,
            bucket = %config.bucket,
            "Storage initialised"
        );

        let client = Self::new(store, config.bucket.clone());
        Ok(match &config.key_prefix {
            Some(prefix) => client.with_key_prefix(prefix),
            None => client,
        })
    }

    /// Prepend `prefix` to every key
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('/');
        self.key_prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    fn object_path(&self, key: &str) -> StoragePath {
        match &self.key_prefix {
            Some(prefix) => StoragePath::from(format!("{}/{}", prefix, key)),
            None => StoragePath::from(key),
        }
    }

    /// Upload bytes to storage
    pub async fn upload(&self, key: &str, data: Vec<u8>) -> Result<UploadMetadata> {
        let path = self.object_path(key);
        let size = data.len();

        let put_result = self
            .store
            .put(&path, data.into())
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", path, e)))?;

        tracing::info!(key = %path, size, "Uploaded to storage");

        Ok(UploadMetadata {
            key: path.to_string(),
            etag: put_result.e_tag,
            size,
        })
    }

    /// Download from storage
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key);

        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let bytes = result.bytes().await?;

        tracing::debug!(key = %path, size = bytes.len(), "Downloaded from storage");

        Ok(bytes.to_vec())
    }

    /// Fetch a stored payload back as JSON
    pub async fn get_json(&self, key: &str) -> Result<Value> {
        let bytes = self.download(key).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.object_path(key);

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BlobStore for StorageClient {
    async fn put(&self, key: &str, value: &Value) -> Result<UploadMetadata> {
        let data = serde_json::to_vec_pretty(value)?;
        self.upload(key, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_read_back() {
        let storage = StorageClient::in_memory();

        let meta = storage
            .put("2024-03-02_schedule.json", &json!({"response": []}))
            .await
            .unwrap();
        assert_eq!(meta.key, "2024-03-02_schedule.json");
        assert!(meta.size > 0);

        let value = storage.get_json("2024-03-02_schedule.json").await.unwrap();
        assert_eq!(value, json!({"response": []}));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let storage = StorageClient::in_memory();

        storage.put("k.json", &json!(1)).await.unwrap();
        storage.put("k.json", &json!(2)).await.unwrap();

        assert_eq!(storage.get_json("k.json").await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let storage = StorageClient::in_memory();

        assert!(!storage.exists("nope.json").await.unwrap());
        assert!(matches!(
            storage.download("nope.json").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_key_prefix() {
        let storage = StorageClient::in_memory().with_key_prefix("/football/raw/");

        let meta = storage.put("1_statistics.json", &json!({})).await.unwrap();
        assert_eq!(meta.key, "football/raw/1_statistics.json");
        assert!(storage.exists("1_statistics.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_local_provider_writes_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            provider: StorageProvider::Local,
            root: temp_dir.path().join("blobs"),
            ..StorageConfig::default()
        };

        let storage = StorageClient::from_config(&config).unwrap();
        storage.put("a.json", &json!({"x": 1})).await.unwrap();

        let on_disk = std::fs::read(temp_dir.path().join("blobs").join("a.json")).unwrap();
        let value: Value = serde_json::from_slice(&on_disk).unwrap();
        assert_eq!(value, json!({"x": 1}));
    }

    #[test]
    fn test_memory_provider() {
        let config = StorageConfig {
            provider: StorageProvider::Memory,
            ..StorageConfig::default()
        };
        let storage = StorageClient::from_config(&config).unwrap();
        assert_eq!(storage.bucket, "statfetch-raw");
    }
}
