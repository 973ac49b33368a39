//! # Unistate Testing
//!
//! Testing utilities and helpers for the unistate architecture.
//!
//! This crate provides:
//! - [`ReducerTest`]: a fluent Given/When/Then harness for reducers
//! - Recording mocks: [`RecordingHandler`], [`RecordingRenderer`], and the
//!   underlying [`Recorder`], for observing effect and notification
//!   sequences in Store tests
//!
//! ## Example
//!
//! ```ignore
//! use unistate_testing::{ReducerTest, RecordingHandler};
//!
//! ReducerTest::new(CounterReducer)
//!     .given_state(CounterState { count: 0 })
//!     .when_intent(CounterIntent::Increment)
//!     .then_state(|state| assert_eq!(state.count, 1))
//!     .then_effects(|effects| assert!(effects.is_empty()))
//!     .run();
//! ```

/// Recording mocks for Store tests
pub mod recorders;

/// Fluent Given/When/Then harness for reducers
pub mod reducer_test;

// Re-export commonly used items
pub use recorders::{Recorder, RecordingHandler, RecordingRenderer};
pub use reducer_test::ReducerTest;
