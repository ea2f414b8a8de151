//! Persistence gateway: task lists in, documents out.
//!
//! The gateway combines the JSON codec with a [`DocumentStore`]. It is the
//! only part of the app that performs I/O, and it runs inside effects, never
//! inside the reducer.

use crate::codec;
use crate::types::TaskList;
use std::sync::Arc;
use thiserror::Error;
use todolist_core::document::{DocumentRef, DocumentStore, DocumentStoreError};

/// Errors from saving or loading a task list
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The document could not be created, read or listed
    #[error("storage error: {0}")]
    Storage(#[from] DocumentStoreError),

    /// The document is not a valid task list
    #[error("invalid task document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PersistenceError {
    /// Metric label for this error
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage",
            Self::Parse(_) => "parse",
        }
    }
}

/// Saves and loads task lists through a document store
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn DocumentStore>,
}

impl PersistenceGateway {
    /// Creates a gateway over `store`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Writes `tasks` to a new document and returns it
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] if the document cannot be created.
    #[tracing::instrument(skip(self, tasks), fields(tasks = tasks.len()))]
    pub async fn save(&self, tasks: &TaskList) -> Result<DocumentRef, PersistenceError> {
        let result = self.write(tasks).await;

        match &result {
            Ok(document) => {
                tracing::info!(document = %document, "Tasks saved");
                metrics::counter!("todolist.save.total", "outcome" => "success").increment(1);
            },
            Err(e) => {
                tracing::warn!(error = %e, "Save failed");
                metrics::counter!("todolist.save.total", "outcome" => e.kind()).increment(1);
            },
        }
        result
    }

    /// Reads and decodes the document at `source`
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] if the document cannot be read
    /// and [`PersistenceError::Parse`] if it is not a valid task list.
    #[tracing::instrument(skip(self, source), fields(source = %source))]
    pub async fn load(&self, source: DocumentRef) -> Result<TaskList, PersistenceError> {
        let result = self.read(source).await;

        match &result {
            Ok(tasks) => {
                tracing::info!(tasks = tasks.len(), "Tasks loaded");
                metrics::counter!("todolist.load.total", "outcome" => "success").increment(1);
            },
            Err(e) => {
                tracing::warn!(error = %e, "Load failed");
                metrics::counter!("todolist.load.total", "outcome" => e.kind()).increment(1);
            },
        }
        result
    }

    async fn write(&self, tasks: &TaskList) -> Result<DocumentRef, PersistenceError> {
        let bytes = codec::encode(tasks)?;
        Ok(self.store.create(bytes).await?)
    }

    async fn read(&self, source: DocumentRef) -> Result<TaskList, PersistenceError> {
        let bytes = self.store.read(source).await?;
        Ok(codec::decode(&bytes)?)
    }

    /// Documents previously created by this gateway's store, oldest first
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] if the store cannot be listed.
    pub async fn saved_documents(&self) -> Result<Vec<DocumentRef>, PersistenceError> {
        Ok(self.store.list().await?)
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use crate::editor;
    use crate::types::TaskId;
    use todolist_testing::InMemoryDocumentStore;

    fn gateway() -> (PersistenceGateway, InMemoryDocumentStore) {
        let store = InMemoryDocumentStore::new();
        (PersistenceGateway::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn save_then_load_returns_same_list() {
        let (gateway, _) = gateway();
        let list = editor::add(&TaskList::new(), TaskId::new(1), "Buy milk", "2 litres").unwrap();

        let document = gateway.save(&list).await.unwrap();
        let loaded = gateway.load(document).await.unwrap();

        assert_eq!(loaded, list);
    }

    #[tokio::test]
    async fn every_save_creates_a_new_document() {
        let (gateway, store) = gateway();

        let first = gateway.save(&TaskList::new()).await.unwrap();
        let second = gateway.save(&TaskList::new()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(gateway.saved_documents().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn write_failure_is_a_storage_error() {
        let (gateway, store) = gateway();
        store.fail_writes(true);

        let result = gateway.save(&TaskList::new()).await;

        assert!(matches!(result, Err(PersistenceError::Storage(_))));
    }

    #[tokio::test]
    async fn missing_document_is_a_storage_error() {
        let (gateway, _) = gateway();

        let result = gateway.load(DocumentRef::from("downloads/none.json")).await;

        assert!(matches!(
            result,
            Err(PersistenceError::Storage(DocumentStoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn malformed_document_is_a_parse_error() {
        let (gateway, store) = gateway();
        store.insert("downloads/broken.json", b"{not json".to_vec());

        let result = gateway.load(DocumentRef::from("downloads/broken.json")).await;

        assert!(matches!(result, Err(PersistenceError::Parse(_))));
        assert_eq!(result.map_err(|e| e.kind()).err(), Some("parse"));
    }
}
