//! # Todolist Testing
//!
//! Testing utilities and helpers for the todolist reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - An in-memory [`DocumentStore`](todolist_core::document::DocumentStore)
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use todolist_testing::{test_clock, InMemoryDocumentStore, ReducerTest};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::AddTask { title: "Buy milk".into(), description: "2 litres".into() })
//!     .then_state(|state| assert_eq!(state.tasks.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todolist_core::environment::Clock;

/// In-memory document store
pub mod document_mocks;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_testing::mocks::FixedClock;
    /// use todolist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use document_mocks::InMemoryDocumentStore;
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};
