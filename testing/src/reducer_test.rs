//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use unistate_core::reducer::Reducer;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<E> = Box<dyn FnOnce(&[E])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Reducers are pure, so the harness needs no runtime: it folds the given
/// intents over the given state and hands the results to the assertions.
/// With several intents, state assertions see the final state and effect
/// assertions see the effects of the final reduction.
///
/// # Example
///
/// ```ignore
/// use unistate_testing::ReducerTest;
///
/// ReducerTest::new(CounterReducer)
///     .given_state(CounterState { count: 0 })
///     .when_intent(CounterIntent::Increment)
///     .then_state(|state| {
///         assert_eq!(state.count, 1);
///     })
///     .then_effects(|effects| {
///         assert_eq!(effects.len(), 1);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, I, E>
where
    R: Reducer<State = S, Intent = I, Effect = E>,
{
    reducer: R,
    initial_state: Option<S>,
    intents: Vec<I>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<E>>,
}

impl<R, S, I, E> ReducerTest<R, S, I, E>
where
    R: Reducer<State = S, Intent = I, Effect = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            intents: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an intent to dispatch (When); may be called repeatedly
    #[must_use]
    pub fn when_intent(mut self, intent: I) -> Self {
        self.intents.push(intent);
        self
    }

    /// Add a sequence of intents to dispatch in order (When)
    #[must_use]
    pub fn when_intents(mut self, intents: impl IntoIterator<Item = I>) -> Self {
        self.intents.extend(intents);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the final reduction's effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[E]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the initial state or at least one intent is not set,
    /// or if any assertion fails.
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.intents.is_empty(),
            "At least one intent must be set with when_intent()"
        );

        let mut last_effects = Vec::new();
        for intent in self.intents {
            let (next, effects) = self.reducer.reduce(&state, intent);
            state = next;
            last_effects = effects.into_vec();
        }

        // Run state assertions
        for assertion in self.state_assertions {
            assertion(&state);
        }

        // Run effect assertions
        for assertion in self.effect_assertions {
            assertion(&last_effects);
        }
    }
}

/// Helper assertions for effect lists
pub mod assertions {
    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    pub fn assert_no_effects<E: std::fmt::Debug>(effects: &[E]) {
        assert!(
            effects.is_empty(),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    pub fn assert_effects_count<E>(effects: &[E], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistate_core::effect::{Effects, none};
    use unistate_core::smallvec;

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum TestIntent {
        Increment,
        Decrement,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestEffect {
        Ping,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Intent = TestIntent;
        type Effect = TestEffect;

        fn reduce(
            &self,
            state: &Self::State,
            intent: Self::Intent,
        ) -> (Self::State, Effects<Self::Effect>) {
            match intent {
                TestIntent::Increment => (
                    TestState {
                        count: state.count + 1,
                    },
                    smallvec![TestEffect::Ping],
                ),
                TestIntent::Decrement => (
                    TestState {
                        count: state.count - 1,
                    },
                    none(),
                ),
            }
        }
    }

    #[test]
    fn test_reducer_test_increment() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_intent(TestIntent::Increment)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_fold() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 5 })
            .when_intents([
                TestIntent::Increment,
                TestIntent::Increment,
                TestIntent::Decrement,
            ])
            .then_state(|state| {
                assert_eq!(state.count, 6);
            })
            .then_effects(|effects| {
                // Effects of the final (Decrement) reduction only.
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects::<TestEffect>(&[]);
    }

    #[test]
    fn test_assertions_effects_count() {
        assertions::assert_effects_count(&[TestEffect::Ping], 1);
        assertions::assert_effects_count::<TestEffect>(&[], 0);
    }
}
