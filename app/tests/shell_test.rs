//! Scripted sessions against the interactive shell, persisting to a temp dir.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use todolist::gateway::PersistenceGateway;
use todolist::reducer::{TodoEnvironment, TodoReducer};
use todolist::shell::Shell;
use todolist::types::{TaskId, TodoState};
use todolist::TodoStore;
use todolist_storage::FsDocumentStore;
use todolist_testing::{test_clock, InMemoryDocumentStore};

fn store_in(dir: &Path) -> (TodoStore, PersistenceGateway) {
    let gateway = PersistenceGateway::new(Arc::new(FsDocumentStore::new(dir)));
    let env = TodoEnvironment::new(Arc::new(test_clock()), gateway.clone())
        .with_notification_ttl(Duration::from_millis(500));
    (
        TodoStore::new(TodoState::new(), TodoReducer::new(), env),
        gateway,
    )
}

async fn run_script(store: &TodoStore, gateway: &PersistenceGateway, dir: &Path, script: &str) -> String {
    let mut shell = Shell::new(store.clone(), gateway.clone(), dir, Vec::new());
    shell.run(script.as_bytes()).await.unwrap();
    String::from_utf8(shell.into_output()).unwrap()
}

#[tokio::test]
async fn add_toggle_and_save() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, gateway) = store_in(tmp.path());

    let output = run_script(
        &store,
        &gateway,
        tmp.path(),
        "add Buy milk | 2 litres\ntoggle 1\nsave\nquit\n",
    )
    .await;

    assert!(output.contains("[x]   1  Buy milk"));
    assert!(output.contains("* Data saved successfully"));

    let saved = std::fs::read_to_string(tmp.path().join("storage1.json")).unwrap();
    assert_eq!(
        saved,
        r#"[{"id":1,"title":"Buy milk","description":"2 litres","isCompleted":true}]"#
    );
}

#[tokio::test]
async fn dialog_reprompts_on_empty_input_and_can_be_cancelled() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, gateway) = store_in(tmp.path());

    let output = run_script(
        &store,
        &gateway,
        tmp.path(),
        "add\n\nWalk\nthe dog\nadd\nTitle\ncancel\nlist\n",
    )
    .await;

    assert!(output.contains("Title cannot be empty"));
    assert!(output.contains("Cancelled."));
    let titles: Vec<String> = store
        .state(|s| s.tasks.iter().map(|t| t.title.clone()).collect())
        .await;
    assert_eq!(titles, vec!["Walk".to_string()]);
}

#[tokio::test]
async fn edit_dialog_keeps_unchanged_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, gateway) = store_in(tmp.path());

    run_script(
        &store,
        &gateway,
        tmp.path(),
        "add Old | text\nedit 1\nNew\n\n",
    )
    .await;

    let task = store
        .state(|s| s.tasks.get(TaskId::new(1)).cloned())
        .await
        .unwrap();
    assert_eq!(task.title, "New");
    assert_eq!(task.description, "text");
}

#[tokio::test]
async fn load_by_file_name_from_data_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let (first, gateway) = store_in(tmp.path());
    run_script(&first, &gateway, tmp.path(), "add a | b\nadd c | d\nsave\n").await;

    let (second, gateway) = store_in(tmp.path());
    let output = run_script(&second, &gateway, tmp.path(), "load storage1.json\nfiles\n").await;

    assert!(output.contains("* Data loaded successfully"));
    assert!(output.contains("storage1.json"));
    assert_eq!(second.state(|s| s.tasks.len()).await, 2);
    assert_eq!(second.state(|s| s.ids.peek()).await, TaskId::new(3));
}

#[tokio::test]
async fn failed_load_reports_and_keeps_list() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("broken.json"), b"[{]").unwrap();
    let (store, gateway) = store_in(tmp.path());

    let output = run_script(
        &store,
        &gateway,
        tmp.path(),
        "add keep | me\nload broken.json\nload missing.json\n",
    )
    .await;

    assert_eq!(output.matches("! Failed to load data").count(), 2);
    assert_eq!(store.state(|s| s.tasks.len()).await, 1);
}

#[tokio::test]
async fn input_errors_are_reported_and_shell_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, gateway) = store_in(tmp.path());

    let output = run_script(
        &store,
        &gateway,
        tmp.path(),
        "bogus\ndelete x\ntoggle 9\nedit 9\nhelp\n",
    )
    .await;

    assert!(output.contains("unknown command `bogus`"));
    assert!(output.contains("`x` is not a task id"));
    assert_eq!(output.matches("Task 9 not found").count(), 2);
    assert!(output.contains("Commands:"));
}

#[tokio::test]
async fn slow_save_keeps_shell_running_and_reports_later() {
    let documents = InMemoryDocumentStore::new();
    documents.set_latency(Duration::from_millis(200));
    let gateway = PersistenceGateway::new(Arc::new(documents.clone()));
    let env = TodoEnvironment::new(Arc::new(test_clock()), gateway.clone())
        .with_notification_ttl(Duration::from_secs(60));
    let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);
    let mut shell = Shell::new(store.clone(), gateway, "memory", Vec::new())
        .with_persistence_timeout(Duration::from_millis(20));

    shell.run("add a | b\nsave\nsave\n".as_bytes()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    shell.run("list\n".as_bytes()).await.unwrap();

    let output = String::from_utf8(shell.into_output()).unwrap();
    let still = output.find("Still working").unwrap();
    let busy = output.find("A save or load is already in progress").unwrap();
    let saved = output.find("* Data saved successfully").unwrap();
    assert!(still < busy && busy < saved);
    assert_eq!(output.matches("* Data saved successfully").count(), 1);
    assert_eq!(documents.len(), 1);
}
