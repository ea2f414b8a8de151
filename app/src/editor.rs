//! Pure task list operations.
//!
//! Each operation takes the current list and returns a new one, or a
//! [`ValidationError`] when the input is rejected. The input list is never
//! modified, so a rejected operation leaves it exactly as it was.

use crate::types::{Task, TaskId, TaskList, ValidationError};

/// Checks that title and description are non-empty
///
/// Whitespace is text like any other, so `"  "` is a valid title.
///
/// # Errors
///
/// [`ValidationError::EmptyTitle`] is reported before
/// [`ValidationError::EmptyDescription`] when both are empty.
pub fn validate_fields(title: &str, description: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

/// Appends a new, not completed task with the given id
///
/// # Errors
///
/// Rejects empty fields and an id that is already in the list.
pub fn add(
    list: &TaskList,
    id: TaskId,
    title: &str,
    description: &str,
) -> Result<TaskList, ValidationError> {
    validate_fields(title, description)?;
    if list.contains(id) {
        return Err(ValidationError::DuplicateId(id));
    }

    let tasks = list
        .iter()
        .cloned()
        .chain(std::iter::once(Task::new(id, title, description)))
        .collect();
    Ok(TaskList::from_unique(tasks))
}

/// Replaces title and description of a task, keeping its id, position and completion flag
///
/// # Errors
///
/// Rejects empty fields and unknown ids.
pub fn edit(
    list: &TaskList,
    id: TaskId,
    title: &str,
    description: &str,
) -> Result<TaskList, ValidationError> {
    validate_fields(title, description)?;
    replace(list, id, |task| Task {
        title: title.to_string(),
        description: description.to_string(),
        ..task.clone()
    })
}

/// Flips the completion flag of a task
///
/// # Errors
///
/// Rejects unknown ids.
pub fn toggle_complete(list: &TaskList, id: TaskId) -> Result<TaskList, ValidationError> {
    replace(list, id, |task| Task {
        is_completed: !task.is_completed,
        ..task.clone()
    })
}

/// Removes a task, keeping the order of the others
///
/// # Errors
///
/// Rejects unknown ids.
pub fn delete(list: &TaskList, id: TaskId) -> Result<TaskList, ValidationError> {
    if !list.contains(id) {
        return Err(ValidationError::TaskNotFound(id));
    }
    let tasks = list.iter().filter(|task| task.id != id).cloned().collect();
    Ok(TaskList::from_unique(tasks))
}

fn replace(
    list: &TaskList,
    id: TaskId,
    update: impl Fn(&Task) -> Task,
) -> Result<TaskList, ValidationError> {
    if !list.contains(id) {
        return Err(ValidationError::TaskNotFound(id));
    }
    let tasks = list
        .iter()
        .map(|task| if task.id == id { update(task) } else { task.clone() })
        .collect();
    Ok(TaskList::from_unique(tasks))
}
