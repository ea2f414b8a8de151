//! Two-step title/description dialog.
//!
//! The dialog is view state only: it never touches the task list. When both
//! fields are valid it hands back the command to send to the store.

use crate::editor;
use crate::types::{Task, TaskId, TodoAction, ValidationError};

/// Word that closes the dialog without sending anything
pub const CANCEL: &str = "cancel";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Title,
    Description,
}

/// What the dialog does with a line of input
#[derive(Clone, Debug, PartialEq)]
pub enum DialogOutcome {
    /// More input is needed
    Continue,
    /// Input was rejected; the dialog starts over at the title
    Rejected(ValidationError),
    /// Both fields are valid; send this command
    Submit(TodoAction),
    /// The user cancelled
    Cancelled,
}

/// Dialog for adding a task or editing an existing one
#[derive(Clone, Debug)]
pub struct TaskDialog {
    editing: Option<TaskId>,
    current_title: String,
    current_description: String,
    title: String,
    step: Step,
}

impl TaskDialog {
    /// Dialog for a new task with empty fields
    #[must_use]
    pub const fn add() -> Self {
        Self {
            editing: None,
            current_title: String::new(),
            current_description: String::new(),
            title: String::new(),
            step: Step::Title,
        }
    }

    /// Dialog prefilled with an existing task; empty input keeps a field as is
    #[must_use]
    pub fn edit(task: &Task) -> Self {
        Self {
            editing: Some(task.id),
            current_title: task.title.clone(),
            current_description: task.description.clone(),
            title: String::new(),
            step: Step::Title,
        }
    }

    /// Prompt for the field currently asked for
    #[must_use]
    pub fn prompt(&self) -> String {
        let (label, current) = match self.step {
            Step::Title => ("Title", &self.current_title),
            Step::Description => ("Description", &self.current_description),
        };
        if self.editing.is_some() {
            format!("{label} [{current}]: ")
        } else {
            format!("{label}: ")
        }
    }

    /// Feeds one line of input; the line becomes the field value as typed
    pub fn input(&mut self, line: &str) -> DialogOutcome {
        if line.trim().eq_ignore_ascii_case(CANCEL) {
            return DialogOutcome::Cancelled;
        }

        match self.step {
            Step::Title => {
                self.title = self.value_or_current(line, Step::Title);
                if self.title.is_empty() {
                    return DialogOutcome::Rejected(ValidationError::EmptyTitle);
                }
                self.step = Step::Description;
                DialogOutcome::Continue
            },
            Step::Description => {
                let description = self.value_or_current(line, Step::Description);
                if let Err(error) = editor::validate_fields(&self.title, &description) {
                    self.step = Step::Title;
                    return DialogOutcome::Rejected(error);
                }
                let title = std::mem::take(&mut self.title);
                DialogOutcome::Submit(match self.editing {
                    Some(id) => TodoAction::EditTask {
                        id,
                        title,
                        description,
                    },
                    None => TodoAction::AddTask { title, description },
                })
            },
        }
    }

    fn value_or_current(&self, line: &str, step: Step) -> String {
        if self.editing.is_none() || !line.trim().is_empty() {
            return line.to_string();
        }
        match step {
            Step::Title => self.current_title.clone(),
            Step::Description => self.current_description.clone(),
        }
    }
}
