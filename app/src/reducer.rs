//! Reducer for the task list screen.
//!
//! Commands are validated against the current state and turned into events;
//! events are applied to state. Save and load run as [`Effect::Future`]s
//! whose outcome comes back as an event, and every outcome posts a
//! notification that a [`Effect::Delay`] dismisses later.

use crate::editor;
use crate::gateway::PersistenceGateway;
use crate::types::{
    NotificationKind, PersistenceStatus, Task, TaskId, TaskList, TodoAction, TodoState,
    ValidationError,
};
use std::sync::Arc;
use std::time::Duration;
use todolist_core::document::DocumentRef;
use todolist_core::environment::Clock;
use todolist_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// How long a notification stays visible unless configured otherwise
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(2);

/// Environment dependencies for the task list reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for notification timestamps
    pub clock: Arc<dyn Clock>,
    /// Saves and loads task lists
    pub gateway: PersistenceGateway,
    /// How long a notification stays visible
    pub notification_ttl: Duration,
}

impl TodoEnvironment {
    /// Creates an environment with the default notification lifetime
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, gateway: PersistenceGateway) -> Self {
        Self {
            clock,
            gateway,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }

    /// Sets how long notifications stay visible
    #[must_use]
    pub const fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }
}

/// Reducer for task list commands and events
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_existing(state: &TodoState, id: TaskId) -> Result<(), ValidationError> {
        if state.tasks.contains(id) {
            Ok(())
        } else {
            Err(ValidationError::TaskNotFound(id))
        }
    }

    fn validate_idle(state: &TodoState) -> Result<(), ValidationError> {
        match state.persistence {
            PersistenceStatus::Idle => Ok(()),
            PersistenceStatus::Saving | PersistenceStatus::Loading => {
                Err(ValidationError::PersistenceBusy)
            },
        }
    }

    /// Applies an event to state
    ///
    /// Task events go through the pure editor, so an invalid event (for
    /// example one replayed against a different list) is recorded in
    /// `last_error` instead of corrupting the list.
    fn apply_event(state: &mut TodoState, action: &TodoAction, env: &TodoEnvironment) {
        match action {
            TodoAction::TaskAdded { task } => {
                let result = editor::add(&state.tasks, task.id, &task.title, &task.description);
                if result.is_ok() {
                    state.ids.observe_id(task.id);
                }
                Self::replace_tasks(state, result);
            },
            TodoAction::TaskEdited {
                id,
                title,
                description,
            } => {
                let result = editor::edit(&state.tasks, *id, title, description);
                Self::replace_tasks(state, result);
            },
            TodoAction::TaskToggled { id } => {
                let result = editor::toggle_complete(&state.tasks, *id);
                Self::replace_tasks(state, result);
            },
            TodoAction::TaskDeleted { id } => {
                let result = editor::delete(&state.tasks, *id);
                Self::replace_tasks(state, result);
            },
            TodoAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            TodoAction::TasksSaved { document } => {
                state.persistence = PersistenceStatus::Idle;
                state.last_document = Some(document.clone());
                state.post_notification(NotificationKind::Saved, env.clock.now());
            },
            TodoAction::SaveFailed { .. } => {
                state.persistence = PersistenceStatus::Idle;
                state.post_notification(NotificationKind::SaveFailed, env.clock.now());
            },
            TodoAction::TasksLoaded { document, tasks } => {
                state.tasks = tasks.clone();
                state.ids.observe(tasks);
                state.persistence = PersistenceStatus::Idle;
                state.last_document = Some(document.clone());
                state.last_error = None;
                state.post_notification(NotificationKind::Loaded, env.clock.now());
            },
            TodoAction::LoadFailed { .. } => {
                state.persistence = PersistenceStatus::Idle;
                state.post_notification(NotificationKind::LoadFailed, env.clock.now());
            },
            // Commands are not applied as events
            _ => {},
        }
    }

    fn replace_tasks(state: &mut TodoState, result: Result<TaskList, ValidationError>) {
        match result {
            Ok(tasks) => {
                state.tasks = tasks;
                state.last_error = None;
            },
            Err(error) => state.last_error = Some(error),
        }
    }

    /// Records a rejected command
    fn reject(
        state: &mut TodoState,
        error: ValidationError,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        tracing::debug!(%error, "Command rejected");
        Self::apply_event(state, &TodoAction::ValidationFailed { error }, env);
        smallvec![Effect::None]
    }

    /// Validates a command, then applies the event it produces
    fn decide(
        state: &mut TodoState,
        decision: Result<TodoAction, ValidationError>,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        match decision {
            Ok(event) => {
                Self::apply_event(state, &event, env);
                smallvec![Effect::None]
            },
            Err(error) => Self::reject(state, error, env),
        }
    }

    fn save_effect(state: &TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        let tasks = state.tasks.clone();
        let gateway = env.gateway.clone();
        Effect::future(async move {
            match gateway.save(&tasks).await {
                Ok(document) => Some(TodoAction::TasksSaved { document }),
                Err(e) => Some(TodoAction::SaveFailed {
                    reason: e.to_string(),
                }),
            }
        })
    }

    fn load_effect(source: DocumentRef, env: &TodoEnvironment) -> Effect<TodoAction> {
        let gateway = env.gateway.clone();
        Effect::future(async move {
            match gateway.load(source.clone()).await {
                Ok(tasks) => Some(TodoAction::TasksLoaded {
                    document: source,
                    tasks,
                }),
                Err(e) => Some(TodoAction::LoadFailed {
                    document: source,
                    reason: e.to_string(),
                }),
            }
        })
    }

    /// Schedules dismissal of the notification just posted
    fn dismiss_effect(state: &TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        state.notification.as_ref().map_or(Effect::None, |notification| {
            Effect::delay(
                env.notification_ttl,
                TodoAction::DismissNotification {
                    seq: notification.seq,
                },
            )
        })
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), "Reducing");

        match action {
            // ========== Commands ==========
            TodoAction::AddTask { title, description } => {
                let id = state.ids.peek();
                let decision = editor::validate_fields(&title, &description).map(|()| {
                    TodoAction::TaskAdded {
                        task: Task::new(id, title, description),
                    }
                });
                Self::decide(state, decision, env)
            },

            TodoAction::EditTask {
                id,
                title,
                description,
            } => {
                let decision = editor::validate_fields(&title, &description)
                    .and_then(|()| Self::validate_existing(state, id))
                    .map(|()| TodoAction::TaskEdited {
                        id,
                        title,
                        description,
                    });
                Self::decide(state, decision, env)
            },

            TodoAction::ToggleComplete { id } => {
                let decision =
                    Self::validate_existing(state, id).map(|()| TodoAction::TaskToggled { id });
                Self::decide(state, decision, env)
            },

            TodoAction::DeleteTask { id } => {
                let decision =
                    Self::validate_existing(state, id).map(|()| TodoAction::TaskDeleted { id });
                Self::decide(state, decision, env)
            },

            TodoAction::SaveTasks => {
                if let Err(error) = Self::validate_idle(state) {
                    return Self::reject(state, error, env);
                }
                state.persistence = PersistenceStatus::Saving;
                tracing::debug!(tasks = state.tasks.len(), "Saving tasks");
                smallvec![Self::save_effect(state, env)]
            },

            TodoAction::LoadTasks { source } => {
                if let Err(error) = Self::validate_idle(state) {
                    return Self::reject(state, error, env);
                }
                state.persistence = PersistenceStatus::Loading;
                tracing::debug!(%source, "Loading tasks");
                smallvec![Self::load_effect(source, env)]
            },

            TodoAction::DismissNotification { seq } => {
                if state
                    .notification
                    .as_ref()
                    .is_some_and(|notification| notification.seq == seq)
                {
                    state.notification = None;
                }
                smallvec![Effect::None]
            },

            // ========== Events ==========
            event if event.is_persistence_outcome() => {
                Self::apply_event(state, &event, env);
                smallvec![Self::dismiss_effect(state, env)]
            },

            event => {
                Self::apply_event(state, &event, env);
                smallvec![Effect::None]
            },
        }
    }
}
