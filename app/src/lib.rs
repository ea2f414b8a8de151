//! # Todolist
//!
//! A single task list with JSON file persistence.
//!
//! - [`types`]: tasks, the list, ids, notifications and the actions
//! - [`editor`]: pure add/edit/toggle/delete over a [`TaskList`](types::TaskList)
//! - [`codec`] and [`gateway`]: JSON documents in a [`DocumentStore`](todolist_core::document::DocumentStore)
//! - [`reducer`]: the [`TodoReducer`](reducer::TodoReducer) driving a [`TodoStore`]
//! - [`shell`]: the interactive front end
//! - [`config`]: environment and defaults
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use todolist::{reducer::{TodoEnvironment, TodoReducer}, gateway::PersistenceGateway};
//! use todolist::types::{TodoAction, TodoState};
//! use todolist::TodoStore;
//! use todolist_core::environment::SystemClock;
//! use todolist_storage::FsDocumentStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = PersistenceGateway::new(Arc::new(FsDocumentStore::new("/tmp/ToDolist")));
//! let env = TodoEnvironment::new(Arc::new(SystemClock), gateway);
//! let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);
//!
//! store
//!     .send(TodoAction::AddTask { title: "Buy milk".into(), description: "2 litres".into() })
//!     .await?;
//! let mut handle = store.send(TodoAction::SaveTasks).await?;
//! handle.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod editor;
pub mod gateway;
pub mod reducer;
pub mod shell;
pub mod types;

use reducer::{TodoEnvironment, TodoReducer};
use todolist_runtime::Store;
use types::{TodoAction, TodoState};

/// Store running the task list reducer
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
