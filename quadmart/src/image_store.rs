//! Blob storage for listing images. The store hands back opaque URLs;
//! only those references are persisted.

use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use rand::distributions::{Alphanumeric, DistString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown image URL {0}")]
    UnknownUrl(String),
}

#[async_trait]
pub(crate) trait ImageStore: Send + Sync {
    /// Stores the bytes and returns the URL they will be served from.
    async fn store(&self, bytes: Bytes, extension: &str) -> Result<String, ImageStoreError>;
    async fn delete(&self, url: &str) -> Result<(), ImageStoreError>;
}

/// Disk-backed store writing under a media root that the router serves
/// statically.
pub(crate) struct DiskImageStore {
    root: PathBuf,
    base_url: String,
}

impl DiskImageStore {
    pub(crate) fn new(root: PathBuf, base_url: String) -> Self {
        Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn file_name_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let name = url.strip_prefix(&self.base_url)?.trim_start_matches('/');
        // reject anything that could escape the media root
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(name)
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn store(&self, bytes: Bytes, extension: &str) -> Result<String, ImageStoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let name = format!(
            "{}.{extension}",
            Alphanumeric.sample_string(&mut rand::thread_rng(), 16)
        );
        tokio::fs::write(self.root.join(&name), &bytes).await?;
        Ok(format!("{}/{name}", self.base_url))
    }

    async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
        let name = self
            .file_name_from_url(url)
            .ok_or_else(|| ImageStoreError::UnknownUrl(url.to_string()))?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_and_delete_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "quadmart-media-{}",
            Alphanumeric.sample_string(&mut rand::thread_rng(), 8)
        ));
        let store = DiskImageStore::new(dir.clone(), "/media".to_string());
        let url = store
            .store(Bytes::from_static(b"not really a png"), "png")
            .await
            .unwrap();
        assert!(url.starts_with("/media/"));
        assert!(url.ends_with(".png"));

        let name = url.strip_prefix("/media/").unwrap();
        assert!(dir.join(name).exists());
        store.delete(&url).await.unwrap();
        assert!(!dir.join(name).exists());
        // deleting again is fine
        store.delete(&url).await.unwrap();
        tokio::fs::remove_dir_all(dir).await.unwrap();
    }

    #[test]
    fn foreign_urls_are_rejected() {
        let store = DiskImageStore::new(PathBuf::from("/tmp/media"), "/media".to_string());
        assert!(store.file_name_from_url("/other/abc.png").is_none());
        assert!(store.file_name_from_url("/media/../etc/passwd").is_none());
        assert_eq!(store.file_name_from_url("/media/abc.png"), Some("abc.png"));
    }
}
