//! Filesystem document store for todolist.
//!
//! [`FsDocumentStore`] implements the `DocumentStore` trait from
//! `todolist-core` on top of a single directory:
//!
//! - Every `create` produces a new file `<prefix><N>.json` where `N` is the
//!   smallest positive integer whose file does not exist yet
//! - Existing files are never overwritten
//! - Contents are written to a hidden temp file of their own, flushed, then
//!   linked into place, so a crash never leaves a half-written document behind
//!   and overlapping calls never see each other's bytes
//! - The directory is created on first write
//!
//! # Example
//!
//! ```no_run
//! use todolist_core::document::DocumentStore;
//! use todolist_storage::FsDocumentStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsDocumentStore::new("/home/me/Documents/ToDolist");
//! let saved = store.create(b"[]".to_vec()).await?;
//! println!("saved to {saved}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use todolist_core::document::{DocumentFuture, DocumentRef, DocumentStore, DocumentStoreError};
use tokio::io::AsyncWriteExt;

/// File name prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "storage";

/// Extension of every document created by the store.
pub const EXTENSION: &str = "json";

/// Sequence making every temp file name unique within the process
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Document store backed by numbered JSON files in one directory.
#[derive(Clone, Debug)]
pub struct FsDocumentStore {
    dir: PathBuf,
    prefix: String,
}

impl FsDocumentStore {
    /// Create a store writing to `dir` with the default `storage` prefix
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Use a different file name prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Directory the documents live in
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of the document with the given index
    #[must_use]
    pub fn document_name(&self, index: u32) -> String {
        format!("{}{index}.{EXTENSION}", self.prefix)
    }

    /// Index encoded in a file name produced by [`Self::document_name`]
    #[must_use]
    pub fn index_of(&self, file_name: &str) -> Option<u32> {
        let digits = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(EXTENSION)?
            .strip_suffix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|index| *index > 0)
    }

    /// Fresh temp file path, never shared by two `create` calls
    fn temp_path(&self) -> PathBuf {
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{}.{}.{sequence}.tmp",
            self.prefix,
            std::process::id()
        ))
    }

    async fn create_document(&self, contents: Vec<u8>) -> Result<DocumentRef, DocumentStoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DocumentStoreError::CreateDirectory {
                path: self.dir.display().to_string(),
                message: e.to_string(),
            })?;

        let temp = self.temp_path();
        if let Err(e) = write_synced(&temp, &contents).await {
            remove_temp(&temp).await;
            return Err(DocumentStoreError::Write {
                path: temp.display().to_string(),
                message: e.to_string(),
            });
        }

        let result = self.link_first_free(&temp).await;
        remove_temp(&temp).await;
        result
    }

    /// Publish `temp` under the first free document name
    async fn link_first_free(&self, temp: &Path) -> Result<DocumentRef, DocumentStoreError> {
        let mut index: u32 = 1;
        loop {
            let target = self.dir.join(self.document_name(index));

            let taken = tokio::fs::try_exists(&target)
                .await
                .map_err(|e| write_error(&target, &e))?;

            if !taken {
                match tokio::fs::hard_link(temp, &target).await {
                    Ok(()) => {
                        tracing::debug!(path = %target.display(), "Document created");
                        return Ok(DocumentRef::new(target));
                    },
                    // Lost a race for this name, try the next one
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {},
                    Err(e) if e.kind() == ErrorKind::Unsupported => {
                        tracing::debug!("Hard links unsupported, falling back to rename");
                        tokio::fs::rename(temp, &target)
                            .await
                            .map_err(|e| write_error(&target, &e))?;
                        return Ok(DocumentRef::new(target));
                    },
                    Err(e) => return Err(write_error(&target, &e)),
                }
            }

            index = index
                .checked_add(1)
                .ok_or_else(|| DocumentStoreError::Exhausted(self.dir.display().to_string()))?;
        }
    }

    async fn read_document(document: DocumentRef) -> Result<Vec<u8>, DocumentStoreError> {
        match tokio::fs::read(document.as_path()).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DocumentStoreError::NotFound(document)),
            Err(e) => Err(DocumentStoreError::Read {
                path: document.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRef>, DocumentStoreError> {
        let read_error = |e: std::io::Error| DocumentStoreError::Read {
            path: self.dir.display().to_string(),
            message: e.to_string(),
        };

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(e)),
        };

        let mut numbered = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let name = entry.file_name();
            if let Some(index) = name.to_str().and_then(|name| self.index_of(name)) {
                numbered.push((index, DocumentRef::new(entry.path())));
            }
        }
        numbered.sort_by_key(|(index, _)| *index);

        Ok(numbered.into_iter().map(|(_, document)| document).collect())
    }
}

impl DocumentStore for FsDocumentStore {
    fn create(&self, contents: Vec<u8>) -> DocumentFuture<'_, DocumentRef> {
        Box::pin(self.create_document(contents))
    }

    fn read(&self, document: DocumentRef) -> DocumentFuture<'_, Vec<u8>> {
        Box::pin(Self::read_document(document))
    }

    fn list(&self) -> DocumentFuture<'_, Vec<DocumentRef>> {
        Box::pin(self.list_documents())
    }
}

async fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

async fn remove_temp(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

fn write_error(path: &Path, error: &std::io::Error) -> DocumentStoreError {
    DocumentStoreError::Write {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
