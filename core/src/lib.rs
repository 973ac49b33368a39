//! # Unistate Core
//!
//! Core contracts for the unistate architecture: a single mutable state
//! container mutated only through serialized pure transitions.
//!
//! ## Core Concepts
//!
//! - **State**: caller-defined value type; replaced wholesale per reduction
//! - **Intent**: caller-defined value describing a requested state transition
//! - **Reducer**: pure function `(State, Intent) → (State, Effects)`
//! - **Effect**: caller-defined value describing a requested side effect
//! - **Effect handler**: external component that performs effects and may
//!   dispatch further intents
//!
//! The Store runtime that drives these contracts lives in `unistate-runtime`.
//! This crate knows nothing about execution contexts or subscriptions; it only
//! fixes the shapes that reducers and handlers agree on.
//!
//! ## Example
//!
//! ```
//! use unistate_core::effect::Effects;
//! use unistate_core::reducer::Reducer;
//! use unistate_core::smallvec;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterIntent {
//!     Increment,
//!     Noop,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterEffect {
//!     Log(i64),
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Intent = CounterIntent;
//!     type Effect = CounterEffect;
//!
//!     fn reduce(
//!         &self,
//!         state: &Self::State,
//!         intent: Self::Intent,
//!     ) -> (Self::State, Effects<Self::Effect>) {
//!         match intent {
//!             CounterIntent::Increment => {
//!                 let next = CounterState { count: state.count + 1 };
//!                 let effects = smallvec![CounterEffect::Log(next.count)];
//!                 (next, effects)
//!             }
//!             CounterIntent::Noop => (state.clone(), Effects::new()),
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{SmallVec, smallvec};

/// Effect module - the effect list type returned from reductions
///
/// Effects are pure data: descriptions of side effects, never their
/// execution. A reduction returns the replacement state together with the
/// effects it requests; the Store routes them to registered handlers in
/// order. Most reductions produce at most a handful of effects, so the list
/// keeps four inline before spilling to the heap.
pub mod effect {
    use smallvec::SmallVec;

    /// Ordered list of effects produced by a single reduction.
    pub type Effects<E> = SmallVec<[E; 4]>;

    /// An empty effect list, for reductions with no side effects.
    #[must_use]
    pub fn none<E>() -> Effects<E> {
        SmallVec::new()
    }
}

/// Reducer module - the core trait for state transitions
///
/// Reducers are pure functions: `(State, Intent) → (State, Effects)`.
/// They contain all transition logic, are deterministic, and push every side
/// effect into the returned effect list instead of performing it.
pub mod reducer {
    use super::effect::Effects;

    /// The Reducer trait - pure transition function for a Store.
    ///
    /// # Contract
    ///
    /// - Must be pure: no observable side effects of its own; requested side
    ///   effects go into the returned [`Effects`] list.
    /// - Must terminate.
    /// - Returns the replacement state wholesale; the Store never mutates
    ///   state in place and never exposes a partially applied transition.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CounterReducer {
    ///     type State = CounterState;
    ///     type Intent = CounterIntent;
    ///     type Effect = CounterEffect;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &CounterState,
    ///         intent: CounterIntent,
    ///     ) -> (CounterState, Effects<CounterEffect>) {
    ///         match intent {
    ///             CounterIntent::Increment => {
    ///                 (CounterState { count: state.count + 1 }, Effects::new())
    ///             }
    ///             CounterIntent::Noop => (state.clone(), Effects::new()),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer transitions
        type State;

        /// The intent type this reducer processes
        type Intent;

        /// The effect type this reducer requests
        type Effect;

        /// Compute the replacement state and requested effects for an intent.
        fn reduce(
            &self,
            state: &Self::State,
            intent: Self::Intent,
        ) -> (Self::State, Effects<Self::Effect>);
    }
}

/// Handler module - effect-handler contract and the dispatch callback
///
/// Effect handlers are the imperative shell around the pure core: they
/// consume effect values and may feed further intents back into the Store
/// that produced them. The feedback path is the [`Dispatcher`], a cheap
/// clonable callback that enqueues asynchronous dispatches; handlers never
/// hold the Store itself.
pub mod handler {
    use std::fmt;
    use std::sync::Arc;

    /// Callback that enqueues an intent as an asynchronous dispatch against
    /// the originating Store.
    ///
    /// A `Dispatcher` holds only a weak path back to its Store: dispatching
    /// after the Store is gone is a silent no-op. Dispatches enqueue and
    /// return immediately, so calling one from inside a reduction pipeline
    /// (an effect handler) merely schedules further work and cannot recurse
    /// or deadlock.
    pub struct Dispatcher<I> {
        enqueue: Arc<dyn Fn(I) + Send + Sync>,
    }

    impl<I> Dispatcher<I> {
        /// Wrap an enqueue function into a dispatcher.
        ///
        /// The runtime constructs these; handlers only consume them.
        pub fn new(enqueue: impl Fn(I) + Send + Sync + 'static) -> Self {
            Self {
                enqueue: Arc::new(enqueue),
            }
        }

        /// A dispatcher that discards every intent.
        ///
        /// Useful for exercising a handler in isolation, outside a Store.
        #[must_use]
        pub fn noop() -> Self {
            Self {
                enqueue: Arc::new(|_| ()),
            }
        }

        /// Enqueue an intent for asynchronous dispatch.
        pub fn dispatch(&self, intent: I) {
            (self.enqueue)(intent);
        }
    }

    impl<I> Clone for Dispatcher<I> {
        fn clone(&self) -> Self {
            Self {
                enqueue: Arc::clone(&self.enqueue),
            }
        }
    }

    impl<I> fmt::Debug for Dispatcher<I> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Dispatcher")
        }
    }

    /// The effect-handler contract.
    ///
    /// Handlers are registered on a Store and invoked synchronously, in
    /// registration order, for every effect a reduction produces. They may
    /// perform arbitrary work and call `dispatch` zero or more times, but
    /// they run inside the Store's serialized pipeline and must not block
    /// indefinitely.
    pub trait EffectHandler: Send + Sync {
        /// The effect type this handler consumes
        type Effect;

        /// The intent type this handler may dispatch
        type Intent;

        /// Handle one effect, optionally dispatching follow-up intents.
        fn handle(&self, effect: &Self::Effect, dispatch: &Dispatcher<Self::Intent>);
    }
}
