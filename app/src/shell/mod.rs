//! Interactive line-based shell over a [`TodoStore`].
//!
//! The shell reads commands line by line, sends the matching actions to the
//! store and prints the result. It owns only view state (the open dialog and
//! the last notification it printed); the task list lives in the store.

pub mod command;
pub mod dialog;
pub mod view;

pub use command::{parse, CommandError, Fields, ShellCommand, HELP};
pub use dialog::{DialogOutcome, TaskDialog};

use crate::gateway::{PersistenceError, PersistenceGateway};
use crate::types::{TodoAction, ValidationError};
use crate::TodoStore;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use todolist_core::document::DocumentRef;
use todolist_runtime::StoreError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// How long the shell waits for a save or load to finish
pub const PERSISTENCE_TIMEOUT: Duration = Duration::from_secs(30);

const BANNER: &str = "To-do list. Type `help` for commands.\n";
const PROMPT: &str = "> ";
const STILL_RUNNING: &str = "Still working, the result is shown once it arrives.\n";

/// Errors that end the shell
#[derive(Error, Debug)]
pub enum ShellError {
    /// Reading input or writing output failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The store rejected an action
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Whether the shell keeps reading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Stop
    Quit,
}

/// Line-based front end
pub struct Shell<W> {
    store: TodoStore,
    gateway: PersistenceGateway,
    data_dir: PathBuf,
    output: W,
    dialog: Option<TaskDialog>,
    shown_notification: u64,
    persistence_timeout: Duration,
}

impl<W> Shell<W>
where
    W: AsyncWrite + Unpin,
{
    /// Creates a shell writing to `output`
    ///
    /// Bare file names given to `load` are looked up in `data_dir`.
    pub fn new(
        store: TodoStore,
        gateway: PersistenceGateway,
        data_dir: impl Into<PathBuf>,
        output: W,
    ) -> Self {
        Self {
            store,
            gateway,
            data_dir: data_dir.into(),
            output,
            dialog: None,
            shown_notification: 0,
            persistence_timeout: PERSISTENCE_TIMEOUT,
        }
    }

    /// Sets how long to wait for a save or load
    #[must_use]
    pub const fn with_persistence_timeout(mut self, timeout: Duration) -> Self {
        self.persistence_timeout = timeout;
        self
    }

    /// Consumes the shell and returns its output
    pub fn into_output(self) -> W {
        self.output
    }

    /// Reads commands until `quit` or end of input
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] if the terminal or the store fails.
    pub async fn run<R>(&mut self, input: R) -> Result<(), ShellError>
    where
        R: AsyncBufRead + Unpin,
    {
        self.write(BANNER).await?;
        self.prompt().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if self.handle_line(&line).await? == Flow::Quit {
                break;
            }
            self.show_new_notification().await?;
            self.prompt().await?;
        }
        Ok(())
    }

    /// Handles one line of input
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] if the terminal or the store fails.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        if let Some(dialog) = self.dialog.as_mut() {
            match dialog.input(line) {
                DialogOutcome::Continue => {},
                DialogOutcome::Rejected(error) => {
                    self.write(&format!("{error}\n")).await?;
                },
                DialogOutcome::Submit(action) => {
                    self.dialog = None;
                    self.dispatch(action).await?;
                },
                DialogOutcome::Cancelled => {
                    self.dialog = None;
                    self.write("Cancelled.\n").await?;
                },
            }
            return Ok(Flow::Continue);
        }

        match parse(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Ok(Flow::Continue),
            Err(error) => {
                self.write(&format!("{error}\n")).await?;
                Ok(Flow::Continue)
            },
        }
    }

    /// Executes a parsed command
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] if the terminal or the store fails.
    pub async fn execute(&mut self, command: ShellCommand) -> Result<Flow, ShellError> {
        match command {
            ShellCommand::List => self.print_tasks().await?,
            ShellCommand::Add(None) => self.dialog = Some(TaskDialog::add()),
            ShellCommand::Add(Some(Fields { title, description })) => {
                self.dispatch(TodoAction::AddTask { title, description })
                    .await?;
            },
            ShellCommand::Edit(id, None) => {
                match self.store.state(|s| s.tasks.get(id).cloned()).await {
                    Some(task) => self.dialog = Some(TaskDialog::edit(&task)),
                    None => {
                        let error = ValidationError::TaskNotFound(id);
                        self.write(&format!("{error}\n")).await?;
                    },
                }
            },
            ShellCommand::Edit(id, Some(Fields { title, description })) => {
                self.dispatch(TodoAction::EditTask {
                    id,
                    title,
                    description,
                })
                .await?;
            },
            ShellCommand::Toggle(id) => self.dispatch(TodoAction::ToggleComplete { id }).await?,
            ShellCommand::Delete(id) => self.dispatch(TodoAction::DeleteTask { id }).await?,
            ShellCommand::Save => self.persist(TodoAction::SaveTasks).await?,
            ShellCommand::Load(path) => {
                let source = DocumentRef::new(self.resolve(&path));
                self.persist(TodoAction::LoadTasks { source }).await?;
            },
            ShellCommand::Files => self.print_documents().await?,
            ShellCommand::Help => self.write(&format!("{HELP}\n")).await?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Sends a task command and prints either the new list or the rejection
    async fn dispatch(&mut self, action: TodoAction) -> Result<(), ShellError> {
        self.store.send(action).await?;
        match self.store.state(|s| s.last_error.clone()).await {
            Some(error) => self.write(&format!("{error}\n")).await,
            None => self.print_tasks().await,
        }
    }

    /// Sends a save or load and waits for its notification
    ///
    /// A save or load outlasting the timeout keeps running; its notification
    /// is printed after a later command.
    async fn persist(&mut self, action: TodoAction) -> Result<(), ShellError> {
        let mut handle = self.store.send(action).await?;
        if let Err(e) = handle.wait_with_timeout(self.persistence_timeout).await {
            tracing::warn!(
                error = %e,
                timeout = ?self.persistence_timeout,
                "Persistence still running"
            );
            return self.write(STILL_RUNNING).await;
        }

        if self.show_new_notification().await? {
            return Ok(());
        }
        let error = self.store.state(|s| s.last_error.clone()).await;
        if error == Some(ValidationError::PersistenceBusy) {
            self.write(&format!("{}\n", ValidationError::PersistenceBusy))
                .await?;
        }
        Ok(())
    }

    /// Prints the current notification unless it was already printed
    async fn show_new_notification(&mut self) -> Result<bool, ShellError> {
        let notification = self.store.state(|s| s.notification.clone()).await;
        match notification {
            Some(notification) if notification.seq > self.shown_notification => {
                self.shown_notification = notification.seq;
                self.write(&view::render_notification(&notification)).await?;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    async fn print_tasks(&mut self) -> Result<(), ShellError> {
        let text = self.store.state(|s| view::render_tasks(&s.tasks)).await;
        self.write(&text).await
    }

    async fn print_documents(&mut self) -> Result<(), ShellError> {
        let text = match self.gateway.saved_documents().await {
            Ok(documents) => view::render_documents(&documents),
            Err(PersistenceError::Storage(e)) => format!("Cannot list saved files: {e}\n"),
            Err(e) => format!("{e}\n"),
        };
        self.write(&text).await
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() && path.components().count() == 1 {
            self.data_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }

    async fn prompt(&mut self) -> Result<(), ShellError> {
        let prompt = self
            .dialog
            .as_ref()
            .map_or_else(|| PROMPT.to_string(), TaskDialog::prompt);
        self.write(&prompt).await
    }

    async fn write(&mut self, text: &str) -> Result<(), ShellError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}
