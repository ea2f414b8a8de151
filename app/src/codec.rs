//! JSON encoding of task lists.
//!
//! A document is a JSON array of task objects:
//!
//! ```json
//! [{"id":1,"title":"Buy milk","description":"2 litres","isCompleted":false}]
//! ```

use crate::types::TaskList;

/// Encodes a list as a compact JSON array
///
/// # Errors
///
/// Only fails if serialization itself fails, which does not happen for
/// well-formed task lists.
pub fn encode(tasks: &TaskList) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(tasks)
}

/// Decodes a JSON array of tasks
///
/// # Errors
///
/// Fails on malformed JSON, on objects with missing, mistyped or unknown
/// fields, and on documents that repeat an id.
pub fn decode(bytes: &[u8]) -> Result<TaskList, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use crate::editor;
    use crate::types::TaskId;

    #[test]
    fn encodes_field_names_and_order() {
        let list = editor::add(&TaskList::new(), TaskId::new(1), "Buy milk", "2 litres").unwrap();
        let list = editor::toggle_complete(&list, TaskId::new(1)).unwrap();

        let json = String::from_utf8(encode(&list).unwrap()).unwrap();

        assert_eq!(
            json,
            r#"[{"id":1,"title":"Buy milk","description":"2 litres","isCompleted":true}]"#
        );
    }

    #[test]
    fn empty_list_is_empty_array() {
        assert_eq!(encode(&TaskList::new()).unwrap(), b"[]");
        assert!(decode(b"[]").unwrap().is_empty());
    }

    #[test]
    fn decode_keeps_document_order() {
        let list = decode(
            br#"[
                {"id":5,"title":"b","description":"b","isCompleted":false},
                {"id":2,"title":"a","description":"a","isCompleted":true}
            ]"#,
        )
        .unwrap();

        let ids: Vec<TaskId> = list.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![TaskId::new(5), TaskId::new(2)]);
        assert_eq!(list.completed_count(), 1);
    }

    #[test]
    fn decode_rejects_bad_documents() {
        assert!(decode(b"not json").is_err());
        assert!(decode(br#"{"id":1}"#).is_err());
        assert!(decode(br#"[{"id":1,"title":"a","description":"a"}]"#).is_err());
        assert!(decode(br#"[{"id":"1","title":"a","description":"a","isCompleted":false}]"#).is_err());
        assert!(
            decode(br#"[{"id":1,"title":"a","description":"a","isCompleted":false,"extra":1}]"#)
                .is_err()
        );
    }

    #[test]
    fn decode_rejects_repeated_ids() {
        let error = decode(
            br#"[
                {"id":1,"title":"a","description":"a","isCompleted":false},
                {"id":1,"title":"b","description":"b","isCompleted":false}
            ]"#,
        )
        .unwrap_err();

        assert!(error.to_string().contains("already in use"));
    }
}
