//! Plain-text rendering of state.

use crate::types::{Notification, TaskList};
use std::fmt::Write;
use todolist_core::document::DocumentRef;

/// Renders the list, one task per line, in list order
#[must_use]
pub fn render_tasks(tasks: &TaskList) -> String {
    if tasks.is_empty() {
        return "No tasks yet. Use `add` to create one.\n".to_string();
    }

    let mut out = String::new();
    for task in tasks {
        let mark = if task.is_completed { 'x' } else { ' ' };
        // Writing to a String cannot fail
        let _ = writeln!(out, "[{mark}] {:>3}  {}", task.id, task.title);
        let _ = writeln!(out, "         {}", task.description);
    }
    let _ = writeln!(
        out,
        "{} task(s), {} done",
        tasks.len(),
        tasks.completed_count()
    );
    out
}

/// Renders a notification as a single line
#[must_use]
pub fn render_notification(notification: &Notification) -> String {
    let marker = if notification.kind.is_failure() { '!' } else { '*' };
    format!("{marker} {}\n", notification.kind)
}

/// Renders saved document names
#[must_use]
pub fn render_documents(documents: &[DocumentRef]) -> String {
    if documents.is_empty() {
        return "No saved files.\n".to_string();
    }
    documents
        .iter()
        .map(|document| format!("  {document}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use crate::editor;
    use crate::types::{NotificationKind, TaskId};
    use todolist_testing::test_clock;
    use todolist_core::environment::Clock;

    #[test]
    fn empty_list_hint() {
        assert!(render_tasks(&TaskList::new()).starts_with("No tasks yet"));
    }

    #[test]
    fn tasks_render_in_order_with_marks() {
        let list = editor::add(&TaskList::new(), TaskId::new(1), "Buy milk", "2 litres").unwrap();
        let list = editor::add(&list, TaskId::new(2), "Call mom", "Sunday").unwrap();
        let list = editor::toggle_complete(&list, TaskId::new(2)).unwrap();

        let text = render_tasks(&list);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[ ]   1  Buy milk");
        assert_eq!(lines[1], "         2 litres");
        assert_eq!(lines[2], "[x]   2  Call mom");
        assert_eq!(lines[4], "2 task(s), 1 done");
    }

    #[test]
    fn notification_line() {
        let notification = Notification {
            seq: 1,
            kind: NotificationKind::LoadFailed,
            posted_at: test_clock().now(),
        };
        assert_eq!(render_notification(&notification), "! Failed to load data\n");
    }

    #[test]
    fn documents_listing() {
        assert_eq!(render_documents(&[]), "No saved files.\n");
        assert_eq!(
            render_documents(&[DocumentRef::from("docs/storage1.json")]),
            "  docs/storage1.json\n"
        );
    }
}
