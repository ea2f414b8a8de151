//! Document store trait and related types.
//!
//! A document store keeps whole serialized documents. It offers exactly what the
//! persistence gateway needs:
//!
//! - Create a new document without ever overwriting an existing one
//! - Read back any document the caller points at
//! - List the documents previously created in the store
//!
//! # Implementations
//!
//! - `FsDocumentStore` (in `todolist-storage` crate): numbered files in a directory
//! - `InMemoryDocumentStore` (in `todolist-testing` crate): fast, deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use todolist_core::document::{DocumentRef, DocumentStore, DocumentStoreError};
//!
//! async fn example<D: DocumentStore>(store: &D) -> Result<(), DocumentStoreError> {
//!     let created = store.create(b"[]".to_vec()).await?;
//!     let bytes = store.read(created.clone()).await?;
//!     assert_eq!(bytes, b"[]");
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`DocumentStore`] methods.
pub type DocumentFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, DocumentStoreError>> + Send + 'a>>;

/// Location of a document.
///
/// For the filesystem store this is a path; other stores treat it as an opaque key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentRef(PathBuf);

impl DocumentRef {
    /// Creates a reference from a path or key
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self(location.into())
    }

    /// Returns the underlying path
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns the final path component, if any
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|name| name.to_str())
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for DocumentRef {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&str> for DocumentRef {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

/// Errors that can occur during document store operations.
///
/// Every variant is an I/O-level failure; decoding the document contents is the
/// caller's concern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// The store directory could not be created.
    #[error("Failed to create directory {path}: {message}")]
    CreateDirectory {
        /// Directory that could not be created
        path: String,
        /// Underlying error message
        message: String,
    },

    /// The document could not be written.
    #[error("Failed to write document {path}: {message}")]
    Write {
        /// Document that could not be written
        path: String,
        /// Underlying error message
        message: String,
    },

    /// The document does not exist.
    #[error("Document not found: {0}")]
    NotFound(DocumentRef),

    /// The document exists but could not be read.
    #[error("Failed to read document {path}: {message}")]
    Read {
        /// Document that could not be read
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Every document index is taken.
    #[error("No free document name left in {0}")]
    Exhausted(String),
}

/// Document store abstraction for the persistence gateway.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be shared with effects running on
/// the async runtime.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so the environment can hold an `Arc<dyn DocumentStore>` that effects capture.
pub trait DocumentStore: Send + Sync {
    /// Create a new document holding `contents`.
    ///
    /// Never overwrites an existing document: the store picks the first free
    /// name. The document is either written completely or not at all.
    ///
    /// # Errors
    ///
    /// - `CreateDirectory`: The backing directory could not be created
    /// - `Write`: The contents could not be written
    /// - `Exhausted`: No free name is left
    fn create(&self, contents: Vec<u8>) -> DocumentFuture<'_, DocumentRef>;

    /// Read the full contents of `document`.
    ///
    /// The document need not have been created by this store.
    ///
    /// # Errors
    ///
    /// - `NotFound`: Nothing exists at `document`
    /// - `Read`: The document exists but could not be read
    fn read(&self, document: DocumentRef) -> DocumentFuture<'_, Vec<u8>>;

    /// List documents created by this store, oldest name first.
    ///
    /// A store whose backing location does not exist yet returns an empty list.
    ///
    /// # Errors
    ///
    /// - `Read`: The backing location could not be listed
    fn list(&self) -> DocumentFuture<'_, Vec<DocumentRef>>;
}
