//! Domain types for the task list.
//!
//! A task list is an ordered sequence of tasks with unique ids. The list is
//! never edited in place: every change produces a new [`TaskList`] (see
//! [`crate::editor`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todolist_core::document::DocumentRef;
use todolist_macros::Action;

/// Unique identifier for a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Creates a `TaskId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single task
///
/// Serialized as `{"id", "title", "description", "isCompleted"}`; unknown or
/// missing fields are rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Whether the task is done
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

impl Task {
    /// Creates a new, not yet completed task
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            is_completed: false,
        }
    }
}

/// Ordered list of tasks with unique ids
///
/// Deserialization rejects documents that repeat an id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Task>", into = "Vec<Task>")]
pub struct TaskList(Vec<Task>);

impl TaskList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Wraps tasks already known to have unique ids
    pub(crate) const fn from_unique(tasks: Vec<Task>) -> Self {
        Self(tasks)
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the list has no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates tasks in list order
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    /// Tasks as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Task] {
        &self.0
    }

    /// Returns a task by id
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.0.iter().find(|task| task.id == id)
    }

    /// Checks if a task with `id` exists
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Largest id in the list
    #[must_use]
    pub fn max_id(&self) -> Option<TaskId> {
        self.0.iter().map(|task| task.id).max()
    }

    /// Number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|task| task.is_completed).count()
    }
}

impl TryFrom<Vec<Task>> for TaskList {
    type Error = ValidationError;

    fn try_from(tasks: Vec<Task>) -> Result<Self, Self::Error> {
        let mut seen = std::collections::HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(ValidationError::DuplicateId(task.id));
            }
        }
        Ok(Self(tasks))
    }
}

impl From<TaskList> for Vec<Task> {
    fn from(list: TaskList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Monotonic source of task ids
///
/// Starts at 1, only moves forward, and never hands out an id twice, even
/// after the task holding it was deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    /// Counter whose first id is 1
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// The id the next [`issue`](Self::issue) will return
    #[must_use]
    pub const fn peek(&self) -> TaskId {
        TaskId(self.next)
    }

    /// Hands out the next id
    pub fn issue(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Moves past `id` if it is not already behind the counter
    pub fn observe_id(&mut self, id: TaskId) {
        self.next = self.next.max(id.0.saturating_add(1));
    }

    /// Moves past every id in `list`
    pub fn observe(&mut self, list: &TaskList) {
        if let Some(max) = list.max_id() {
            self.observe_id(max);
        }
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reasons a command is rejected
///
/// A rejected command never changes the task list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty
    #[error("Title cannot be empty")]
    EmptyTitle,

    /// Description is empty
    #[error("Description cannot be empty")]
    EmptyDescription,

    /// No task has this id
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    /// Another task already has this id
    #[error("Task id {0} is already in use")]
    DuplicateId(TaskId),

    /// A save or load has not finished yet
    #[error("A save or load is already in progress")]
    PersistenceBusy,
}

/// Progress of the single persistence slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// No save or load running
    #[default]
    Idle,
    /// A save is running
    Saving,
    /// A load is running
    Loading,
}

/// Outcome shown to the user after a save or load
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Save succeeded
    Saved,
    /// Save failed
    SaveFailed,
    /// Load succeeded
    Loaded,
    /// Load failed
    LoadFailed,
}

impl NotificationKind {
    /// Text shown to the user
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Saved => "Data saved successfully",
            Self::SaveFailed => "Failed to save data",
            Self::Loaded => "Data loaded successfully",
            Self::LoadFailed => "Failed to load data",
        }
    }

    /// Whether this reports a failure
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::SaveFailed | Self::LoadFailed)
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Transient notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Sequence number, unique per posted notification
    pub seq: u64,
    /// What happened
    pub kind: NotificationKind,
    /// When it was posted
    pub posted_at: DateTime<Utc>,
}

/// State of the task list screen
///
/// The store is its only owner; the reducer is its only writer.
#[derive(Clone, Debug, Default)]
pub struct TodoState {
    /// Current tasks
    pub tasks: TaskList,
    /// Source of ids for new tasks
    pub ids: IdCounter,
    /// Whether a save or load is in flight
    pub persistence: PersistenceStatus,
    /// Notification currently shown, if any
    pub notification: Option<Notification>,
    /// Number of notifications posted so far
    pub notifications_posted: u64,
    /// Last rejected command (cleared by the next accepted one)
    pub last_error: Option<ValidationError>,
    /// Document last saved or loaded
    pub last_document: Option<DocumentRef>,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `tasks`, with the id counter past every task
    #[must_use]
    pub fn with_tasks(tasks: TaskList) -> Self {
        let mut ids = IdCounter::new();
        ids.observe(&tasks);
        Self {
            tasks,
            ids,
            ..Self::default()
        }
    }

    /// Posts a notification, replacing the current one, and returns its sequence number
    pub fn post_notification(&mut self, kind: NotificationKind, posted_at: DateTime<Utc>) -> u64 {
        self.notifications_posted += 1;
        let seq = self.notifications_posted;
        self.notification = Some(Notification {
            seq,
            kind,
            posted_at,
        });
        seq
    }
}

/// Actions representing commands and events for the task list
///
/// Commands are validated by the reducer and produce events. Events are
/// applied to state; persistence outcomes arrive as events fed back by effects.
#[derive(Action, Clone, Debug, PartialEq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Append a new task
    #[command]
    AddTask {
        /// Title of the task
        title: String,
        /// Description of the task
        description: String,
    },

    /// Command: Change title and description of a task
    #[command]
    EditTask {
        /// Task to edit
        id: TaskId,
        /// New title
        title: String,
        /// New description
        description: String,
    },

    /// Command: Flip the completion flag of a task
    #[command]
    ToggleComplete {
        /// Task to toggle
        id: TaskId,
    },

    /// Command: Remove a task
    #[command]
    DeleteTask {
        /// Task to delete
        id: TaskId,
    },

    /// Command: Write the whole list to a new document
    #[command]
    SaveTasks,

    /// Command: Replace the list with the contents of a document
    #[command]
    LoadTasks {
        /// Document chosen by the user
        source: DocumentRef,
    },

    /// Command: Hide the notification with this sequence number
    #[command]
    DismissNotification {
        /// Sequence number of the notification to hide
        seq: u64,
    },

    // ========== Events ==========
    /// Event: Task was appended
    #[event]
    TaskAdded {
        /// The new task
        task: Task,
    },

    /// Event: Task title/description changed
    #[event]
    TaskEdited {
        /// Task identifier
        id: TaskId,
        /// New title
        title: String,
        /// New description
        description: String,
    },

    /// Event: Task completion flag flipped
    #[event]
    TaskToggled {
        /// Task identifier
        id: TaskId,
    },

    /// Event: Task was removed
    #[event]
    TaskDeleted {
        /// Task identifier
        id: TaskId,
    },

    /// Event: Command validation failed
    #[event]
    ValidationFailed {
        /// Why the command was rejected
        error: ValidationError,
    },

    /// Event: List was written
    #[event]
    TasksSaved {
        /// Document that was created
        document: DocumentRef,
    },

    /// Event: Writing the list failed
    #[event]
    SaveFailed {
        /// Error message
        reason: String,
    },

    /// Event: List was read from a document
    #[event]
    TasksLoaded {
        /// Document that was read
        document: DocumentRef,
        /// Its tasks
        tasks: TaskList,
    },

    /// Event: Reading a document failed
    #[event]
    LoadFailed {
        /// Document that could not be loaded
        document: DocumentRef,
        /// Error message
        reason: String,
    },
}

impl TodoAction {
    /// Whether this action ends a save or load
    #[must_use]
    pub const fn is_persistence_outcome(&self) -> bool {
        matches!(
            self,
            Self::TasksSaved { .. }
                | Self::SaveFailed { .. }
                | Self::TasksLoaded { .. }
                | Self::LoadFailed { .. }
        )
    }
}
