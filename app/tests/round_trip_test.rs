//! Saving and loading task lists through numbered JSON files on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use std::sync::Arc;
use todolist::editor;
use todolist::gateway::PersistenceGateway;
use todolist::types::{TaskId, TaskList};
use todolist_storage::FsDocumentStore;

fn list_of(tasks: &[(u64, &str, &str, bool)]) -> TaskList {
    tasks
        .iter()
        .fold(TaskList::new(), |list, &(id, title, description, done)| {
            let id = TaskId::new(id);
            let list = editor::add(&list, id, title, description).unwrap();
            if done {
                editor::toggle_complete(&list, id).unwrap()
            } else {
                list
            }
        })
}

#[tokio::test]
async fn saved_lists_load_back_equal_and_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let gateway = PersistenceGateway::new(Arc::new(FsDocumentStore::new(tmp.path())));

    let first = list_of(&[
        (3, "Buy milk", "2 litres", true),
        (1, "Call mom", "Sunday", false),
        (7, "  ", "spaces are text too", true),
    ]);
    let second = list_of(&[
        (1, "Call mom", "Sunday", false),
        (2, "Walk", "the dog", false),
        (9, "Pay rent", "before the 5th", true),
        (4, "Read", "chapter 3", false),
    ]);

    let first_document = gateway.save(&first).await.unwrap();
    let second_document = gateway.save(&second).await.unwrap();

    assert_eq!(first_document.file_name(), Some("storage1.json"));
    assert_eq!(second_document.file_name(), Some("storage2.json"));
    assert_eq!(gateway.load(first_document).await.unwrap(), first);
    assert_eq!(gateway.load(second_document).await.unwrap(), second);
}

#[tokio::test]
async fn empty_list_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let gateway = PersistenceGateway::new(Arc::new(FsDocumentStore::new(tmp.path())));

    let document = gateway.save(&TaskList::new()).await.unwrap();

    assert_eq!(std::fs::read(document.as_path()).unwrap(), b"[]");
    assert!(gateway.load(document).await.unwrap().is_empty());
}
