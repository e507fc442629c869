//! Object-storage seam for uploaded document files.
//!
//! The core only ever needs `put(bytes) -> reference` and
//! `get(reference) -> bytes`; which service sits behind that is a
//! deployment concern. Uploads report fractional progress so a UI can show
//! a progress bar, but are not cancellable mid-flight.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file backend error: {0}")]
    Backend(String),
}

/// Opaque reference to a stored file, suitable for persisting on a
/// document record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef(pub String);

impl std::fmt::Display for FileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub type ProgressFn = dyn Fn(f32) + Send + Sync;

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(
        &self,
        file: StoredFile,
        progress: Option<&ProgressFn>,
    ) -> Result<FileRef, FileStoreError>;
    async fn get(&self, reference: &FileRef) -> Result<StoredFile, FileStoreError>;
}

const PROGRESS_CHUNK: usize = 64 * 1024;

/// Development stand-in keeping blobs in process memory. Per-process only;
/// not shared across clients.
#[derive(Default)]
pub struct InMemoryFileStore {
    inner: RwLock<HashMap<String, StoredFile>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn put(
        &self,
        file: StoredFile,
        progress: Option<&ProgressFn>,
    ) -> Result<FileRef, FileStoreError> {
        if let Some(report) = progress {
            let total = file.bytes.len().max(1);
            let mut seen = 0usize;
            while seen < file.bytes.len() {
                seen = (seen + PROGRESS_CHUNK).min(file.bytes.len());
                report(seen as f32 / total as f32);
            }
            if file.bytes.is_empty() {
                report(1.0);
            }
        }
        let reference = FileRef(Uuid::new_v4().to_string());
        self.inner
            .write()
            .await
            .insert(reference.0.clone(), file);
        Ok(reference)
    }

    async fn get(&self, reference: &FileRef) -> Result<StoredFile, FileStoreError> {
        self.inner
            .read()
            .await
            .get(&reference.0)
            .cloned()
            .ok_or_else(|| FileStoreError::NotFound(reference.0.clone()))
    }
}
