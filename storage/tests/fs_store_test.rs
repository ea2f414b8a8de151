//! Integration tests for `FsDocumentStore` against a real directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::collections::HashSet;
use todolist_core::document::{DocumentRef, DocumentStore, DocumentStoreError};
use todolist_storage::FsDocumentStore;

#[tokio::test]
async fn creates_directory_and_first_document() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("Documents").join("ToDolist");
    let store = FsDocumentStore::new(&dir);

    let created = store.create(b"[]".to_vec()).await.unwrap();

    assert_eq!(created.as_path(), dir.join("storage1.json"));
    assert_eq!(std::fs::read(created.as_path()).unwrap(), b"[]");
}

#[tokio::test]
async fn second_save_never_overwrites_first() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::new(tmp.path());

    let first = store.create(b"[1]".to_vec()).await.unwrap();
    let second = store.create(b"[2]".to_vec()).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(second.file_name(), Some("storage2.json"));
    assert_eq!(store.read(first).await.unwrap(), b"[1]");
    assert_eq!(store.read(second).await.unwrap(), b"[2]");
}

#[tokio::test]
async fn fills_smallest_free_index() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("storage1.json"), b"old").unwrap();
    std::fs::write(tmp.path().join("storage3.json"), b"old").unwrap();
    let store = FsDocumentStore::new(tmp.path());

    let created = store.create(b"new".to_vec()).await.unwrap();

    assert_eq!(created.file_name(), Some("storage2.json"));
    assert_eq!(std::fs::read(tmp.path().join("storage1.json")).unwrap(), b"old");
    assert_eq!(std::fs::read(tmp.path().join("storage3.json")).unwrap(), b"old");
}

#[tokio::test]
async fn leaves_no_temp_files_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::new(tmp.path());

    store.create(b"[]".to_vec()).await.unwrap();
    store.create(b"[]".to_vec()).await.unwrap();

    let mut names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["storage1.json", "storage2.json"]);
}

#[tokio::test]
async fn directory_creation_failure_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("ToDolist");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = FsDocumentStore::new(&blocker);

    let result = store.create(b"[]".to_vec()).await;

    assert!(matches!(
        result,
        Err(DocumentStoreError::CreateDirectory { .. })
    ));
}

#[tokio::test]
async fn read_missing_document_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::new(tmp.path());

    let missing = DocumentRef::new(tmp.path().join("nowhere.json"));
    let result = store.read(missing.clone()).await;

    assert_eq!(result, Err(DocumentStoreError::NotFound(missing)));
}

#[tokio::test]
async fn reads_documents_outside_its_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let picked = tmp.path().join("Downloads").join("shared.json");
    std::fs::create_dir_all(picked.parent().unwrap()).unwrap();
    std::fs::write(&picked, b"[]").unwrap();
    let store = FsDocumentStore::new(tmp.path().join("ToDolist"));

    let bytes = store.read(DocumentRef::new(&picked)).await.unwrap();

    assert_eq!(bytes, b"[]");
}

#[tokio::test]
async fn list_is_empty_before_first_save() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::new(tmp.path().join("ToDolist"));

    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_orders_numerically_and_ignores_other_files() {
    let tmp = tempfile::tempdir().unwrap();
    for name in ["storage10.json", "storage2.json", "notes.json", "storage1.txt"] {
        std::fs::write(tmp.path().join(name), b"[]").unwrap();
    }
    let store = FsDocumentStore::new(tmp.path());

    let names: Vec<String> = store
        .list()
        .await
        .unwrap()
        .iter()
        .filter_map(|document| document.file_name().map(str::to_string))
        .collect();

    assert_eq!(names, vec!["storage2.json", "storage10.json"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_creates_keep_their_own_contents() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::new(tmp.path());

    for round in 0..10_u8 {
        let handles: Vec<_> = (0..4_u8)
            .map(|i| {
                let store = store.clone();
                let body = vec![b'a' + round * 4 + i; 200_000];
                tokio::spawn(async move {
                    let created = store.create(body.clone()).await.unwrap();
                    (created, body)
                })
            })
            .collect();

        for handle in handles {
            let (created, body) = handle.await.unwrap();
            assert_eq!(std::fs::read(created.as_path()).unwrap(), body);
        }
    }

    let names: HashSet<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 40);
    assert!(names.iter().all(|name| name.ends_with(".json")));
}
