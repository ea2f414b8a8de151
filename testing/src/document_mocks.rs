//! In-memory document store for fast, deterministic testing.
//!
//! [`InMemoryDocumentStore`] follows the same naming rule as the filesystem
//! store (`<prefix><N>.json`, smallest free `N`) and can be told to fail
//! reads or writes, or to answer slowly, so failure and timeout paths are
//! reachable from reducer tests.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use todolist_core::document::{DocumentFuture, DocumentRef, DocumentStore, DocumentStoreError};

/// Document store kept in a `BTreeMap`.
///
/// # Example
///
/// ```
/// use todolist_core::document::DocumentStore;
/// use todolist_testing::InMemoryDocumentStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new();
/// let first = store.create(b"[]".to_vec()).await?;
/// let second = store.create(b"[]".to_vec()).await?;
/// assert_eq!(first.file_name(), Some("storage1.json"));
/// assert_eq!(second.file_name(), Some("storage2.json"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryDocumentStore {
    root: PathBuf,
    prefix: String,
    documents: Arc<RwLock<BTreeMap<DocumentRef, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
}

impl InMemoryDocumentStore {
    /// Create an empty store rooted at `memory/` with the `storage` prefix
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("memory"),
            prefix: "storage".to_string(),
            documents: Arc::new(RwLock::new(BTreeMap::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
            fail_reads: Arc::new(AtomicBool::new(false)),
            latency_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Seed a document, e.g. one the user will "pick" for loading
    pub fn insert(&self, document: impl Into<DocumentRef>, contents: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .unwrap()
            .insert(document.into(), contents.into());
    }

    /// Make every following `create` fail with a write error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every following `read` fail with a read error
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Delay every following `create` and `read` answer by `latency`
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    async fn wait_latency(&self) {
        let millis = self.latency_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    /// Contents of a document, if present
    #[must_use]
    pub fn contents(&self, document: &DocumentRef) -> Option<Vec<u8>> {
        self.documents.read().unwrap().get(document).cloned()
    }

    /// Number of stored documents (seeded ones included)
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().unwrap().is_empty()
    }

    fn document_for(&self, index: u32) -> DocumentRef {
        DocumentRef::new(self.root.join(format!("{}{index}.json", self.prefix)))
    }

    fn index_of(&self, document: &DocumentRef) -> Option<u32> {
        if document.as_path().parent() != Some(self.root.as_path()) {
            return None;
        }
        document
            .file_name()?
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(".json")?
            .parse()
            .ok()
    }

    fn create_now(&self, contents: Vec<u8>) -> Result<DocumentRef, DocumentStoreError> {
        let mut documents = self.documents.write().unwrap();
        let mut index: u32 = 1;
        loop {
            let document = self.document_for(index);
            if !documents.contains_key(&document) {
                if self.fail_writes.load(Ordering::SeqCst) {
                    return Err(DocumentStoreError::Write {
                        path: document.to_string(),
                        message: "simulated write failure".to_string(),
                    });
                }
                documents.insert(document.clone(), contents);
                return Ok(document);
            }
            index = index
                .checked_add(1)
                .ok_or_else(|| DocumentStoreError::Exhausted(self.root.display().to_string()))?;
        }
    }

    fn read_now(&self, document: DocumentRef) -> Result<Vec<u8>, DocumentStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::Read {
                path: document.to_string(),
                message: "simulated read failure".to_string(),
            });
        }
        self.contents(&document)
            .ok_or(DocumentStoreError::NotFound(document))
    }

    fn list_now(&self) -> Vec<DocumentRef> {
        let documents = self.documents.read().unwrap();
        let mut numbered: Vec<(u32, DocumentRef)> = documents
            .keys()
            .filter_map(|document| self.index_of(document).map(|i| (i, document.clone())))
            .collect();
        numbered.sort_by_key(|(index, _)| *index);
        numbered.into_iter().map(|(_, document)| document).collect()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn create(&self, contents: Vec<u8>) -> DocumentFuture<'_, DocumentRef> {
        Box::pin(async move {
            self.wait_latency().await;
            self.create_now(contents)
        })
    }

    fn read(&self, document: DocumentRef) -> DocumentFuture<'_, Vec<u8>> {
        Box::pin(async move {
            self.wait_latency().await;
            self.read_now(document)
        })
    }

    fn list(&self) -> DocumentFuture<'_, Vec<DocumentRef>> {
        let result = self.list_now();
        Box::pin(async move { Ok(result) })
    }
}
