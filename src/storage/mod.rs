//! Object storage abstraction for report attachments
//! Uses Apache Arrow object_store crate

use object_store::{path::Path as StoragePath, ObjectStore};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Attachments are stored out-of-band and referenced only by presence flags
/// on the report record, keyed under the report id.
pub fn attachment_key(report_id: &str, file_name: &str) -> String {
    format!("attachments/{}/{}", report_id, file_name)
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    pub bucket: String,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self { store, bucket }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            bucket: "quickbug-local".to_string(),
        }
    }

    /// Create filesystem-backed storage rooted at the given directory
    pub fn local(root: &std::path::Path) -> Result<Self> {
        std::fs::create_dir_all(root)
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let store = object_store::local::LocalFileSystem::new_with_prefix(root)?;
        Ok(Self {
            store: Arc::new(store),
            bucket: "quickbug-local".to_string(),
        })
    }

    /// Upload bytes to storage
    pub async fn upload(&self, key: &str, data: Vec<u8>) -> Result<usize> {
        let path = StoragePath::from(key);
        let size = data.len();

        self.store.put(&path, data.into()).await?;

        tracing::debug!(key, size, "Uploaded to storage");
        Ok(size)
    }

    /// Download from storage
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = StoragePath::from(key);

        let result = self.store.get(&path).await?;
        let bytes = result.bytes().await?;

        Ok(bytes.to_vec())
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = StoragePath::from(key);

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_keys_group_by_report() {
        assert_eq!(
            attachment_key("r-001", "bug-screenshot.png"),
            "attachments/r-001/bug-screenshot.png"
        );
    }

    #[tokio::test]
    async fn upload_download_round_trip() {
        let storage = StorageClient::in_memory();
        let key = attachment_key("r-001", "console-logs.txt");

        storage.upload(&key, b"=== Console Output ===".to_vec()).await.unwrap();

        assert!(storage.exists(&key).await.unwrap());
        assert!(!storage.exists("attachments/r-002/x").await.unwrap());

        let data = storage.download(&key).await.unwrap();
        assert_eq!(data, b"=== Console Output ===");
    }
}
