//! # Counter Demo
//!
//! A small counter walking through the unistate architecture end to end:
//!
//! - A pure reducer folding intents into state
//! - An effect (`Milestone`) emitted by the reducer and routed to handlers
//! - Subscriptions with change detection
//! - A view-model emitter projecting state for a renderer
//!
//! ## Example
//!
//! ```no_run
//! use counter::{CounterIntent, CounterReducer, CounterState};
//! use unistate_runtime::Store;
//!
//! # async fn example() -> Result<(), unistate_runtime::StoreError> {
//! let store = Store::new(CounterState::default(), CounterReducer);
//!
//! store.dispatch_sync(CounterIntent::Increment).await?;
//! assert_eq!(store.state(|s| s.count), 1);
//! # Ok(())
//! # }
//! ```

use unistate_core::effect::{Effects, none};
use unistate_core::handler::{Dispatcher, EffectHandler};
use unistate_core::reducer::Reducer;
use unistate_core::smallvec;
use unistate_runtime::Renderer;

/// Counter state
///
/// Just a count. A real application would carry richer domain data here;
/// the Store treats it as an opaque value either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
}

/// Counter intents
#[derive(Debug, Clone)]
pub enum CounterIntent {
    /// Increment the counter by 1
    Increment,
    /// Decrement the counter by 1
    Decrement,
    /// Reset the counter to 0
    Reset,
}

/// Counter effects
///
/// Emitted by the reducer as descriptions of work for the outside world.
/// The reducer never performs the work itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterEffect {
    /// The count reached a multiple of five
    Milestone(i64),
}

/// Counter reducer
///
/// Pure: folds one intent into the current state and describes any effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Intent = CounterIntent;
    type Effect = CounterEffect;

    fn reduce(
        &self,
        state: &Self::State,
        intent: Self::Intent,
    ) -> (Self::State, Effects<Self::Effect>) {
        let count = match intent {
            CounterIntent::Increment => state.count + 1,
            CounterIntent::Decrement => state.count - 1,
            CounterIntent::Reset => 0,
        };

        let effects = if count != 0 && count % 5 == 0 {
            smallvec![CounterEffect::Milestone(count)]
        } else {
            none()
        };

        (CounterState { count }, effects)
    }
}

/// Effect handler that logs milestones as they are routed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilestoneLogger;

impl EffectHandler for MilestoneLogger {
    type Effect = CounterEffect;
    type Intent = CounterIntent;

    fn handle(&self, effect: &CounterEffect, _dispatch: &Dispatcher<CounterIntent>) {
        let CounterEffect::Milestone(count) = effect;
        tracing::info!(count, "milestone reached");
    }
}

/// Effect handler that resets the counter once it reaches a ceiling.
///
/// Demonstrates feedback: the handler dispatches a follow-up intent, which
/// lands at the back of the Store's queue like any external dispatch.
#[derive(Debug, Clone, Copy)]
pub struct CeilingGuard {
    /// Reset once the count reaches this value
    pub ceiling: i64,
}

impl EffectHandler for CeilingGuard {
    type Effect = CounterEffect;
    type Intent = CounterIntent;

    fn handle(&self, effect: &CounterEffect, dispatch: &Dispatcher<CounterIntent>) {
        let CounterEffect::Milestone(count) = effect;
        if *count >= self.ceiling {
            tracing::info!(count, ceiling = self.ceiling, "ceiling hit, resetting");
            dispatch.dispatch(CounterIntent::Reset);
        }
    }
}

/// View model projected from [`CounterState`] for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterViewModel {
    /// Display line for the current count
    pub headline: String,
}

impl CounterViewModel {
    /// Project the view model from state.
    #[must_use]
    pub fn project(state: &CounterState) -> Self {
        Self {
            headline: format!("count: {}", state.count),
        }
    }
}

/// Renderer that prints each frame to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer;

impl Renderer<CounterViewModel> for ConsoleRenderer {
    fn render(&self, view_model: CounterViewModel) {
        println!("[render] {}", view_model.headline);
    }
}
