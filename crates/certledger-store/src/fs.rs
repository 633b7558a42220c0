//! Filesystem blob store.
//!
//! One file per blob, named by its content id, directly under the root.
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a reader never sees a partial document.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use certledger_core::ContentId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::BlobStore;

/// Content-addressed blob store on the local filesystem.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ContentId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, bytes: Bytes) -> Result<ContentId> {
        let id = ContentId::for_bytes(&bytes);
        let path = self.path_for(&id);
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            if path.exists() {
                return Ok(());
            }
            let mut tmp = NamedTempFile::new_in(&root)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
            Ok(())
        })
        .await??;

        debug!(content_id = %id, "stored blob");
        Ok(id)
    }

    async fn fetch(&self, id: &ContentId) -> Result<Option<Bytes>> {
        let path = self.path_for(id);
        let id = id.clone();

        tokio::task::spawn_blocking(move || {
            let data = match std::fs::read(&path) {
                Ok(data) => data,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(StoreError::Io(e)),
            };
            if ContentId::for_bytes(&data) != id {
                return Err(StoreError::InvalidData(format!(
                    "blob {id} does not match its content"
                )));
            }
            Ok(Some(Bytes::from(data)))
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path().join("blobs")).unwrap();

        let id = store.store(Bytes::from_static(b"%PDF-1.5 test")).await.unwrap();
        assert_eq!(id, ContentId::for_bytes(b"%PDF-1.5 test"));
        assert!(store.root().join(id.as_str()).is_file());
        assert_eq!(
            store.fetch(&id).await.unwrap().unwrap(),
            Bytes::from_static(b"%PDF-1.5 test")
        );
    }

    #[tokio::test]
    async fn test_store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        let a = store.store(Bytes::from_static(b"same")).await.unwrap();
        let b = store.store(Bytes::from_static(b"same")).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        assert!(store
            .fetch(&ContentId::for_bytes(b"absent"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_detects_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        let id = store.store(Bytes::from_static(b"original")).await.unwrap();
        std::fs::write(dir.path().join(id.as_str()), b"altered").unwrap();
        assert!(matches!(
            store.fetch(&id).await,
            Err(StoreError::InvalidData(_))
        ));
    }
}
