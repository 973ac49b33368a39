//! Recording mocks for observing Store behavior in tests.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use unistate_core::handler::{Dispatcher, EffectHandler};
use unistate_runtime::Renderer;

/// Shared append-only log of observed values.
///
/// Clones share the same log, so a test can hand one clone to a Store (via
/// a handler, subscription, or renderer) and keep another to assert on.
#[derive(Debug)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Recorder<T> {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append one value.
    pub fn push(&self, value: T) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }

    /// Number of recorded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Recorder<T> {
    /// Snapshot of everything recorded so far, in arrival order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: Send + 'static> Recorder<T> {
    /// A subscription handler that records every notification it receives.
    ///
    /// ```ignore
    /// let counts = Recorder::new();
    /// let _sub = store.subscribe_distinct(|s| s.count, counts.sink());
    /// ```
    #[must_use]
    pub fn sink(&self) -> impl FnMut(T) + Send + 'static {
        let recorder = self.clone();
        move |value| recorder.push(value)
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Effect handler that records every effect it observes, in arrival order.
///
/// Never dispatches. Clones share the same log; register one clone on the
/// Store and assert through another.
#[derive(Debug)]
pub struct RecordingHandler<E, I> {
    effects: Recorder<E>,
    _intent: PhantomData<fn(I)>,
}

impl<E, I> RecordingHandler<E, I> {
    /// Create an empty recording handler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            effects: Recorder::new(),
            _intent: PhantomData,
        }
    }

    /// Number of effects observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether no effect has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl<E: Clone, I> RecordingHandler<E, I> {
    /// Snapshot of observed effects, in arrival order.
    #[must_use]
    pub fn effects(&self) -> Vec<E> {
        self.effects.values()
    }
}

impl<E, I> Clone for RecordingHandler<E, I> {
    fn clone(&self) -> Self {
        Self {
            effects: self.effects.clone(),
            _intent: PhantomData,
        }
    }
}

impl<E, I> Default for RecordingHandler<E, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, I> EffectHandler for RecordingHandler<E, I>
where
    E: Clone + Send + Sync + 'static,
    I: Send + 'static,
{
    type Effect = E;
    type Intent = I;

    fn handle(&self, effect: &E, _dispatch: &Dispatcher<I>) {
        self.effects.push(effect.clone());
    }
}

/// Renderer that records every view model it is asked to render.
#[derive(Debug)]
pub struct RecordingRenderer<VM> {
    frames: Recorder<VM>,
}

impl<VM> RecordingRenderer<VM> {
    /// Create an empty recording renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Recorder::new(),
        }
    }

    /// Number of frames rendered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing has been rendered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<VM: Clone> RecordingRenderer<VM> {
    /// Snapshot of rendered frames, in arrival order.
    #[must_use]
    pub fn frames(&self) -> Vec<VM> {
        self.frames.values()
    }
}

impl<VM> Clone for RecordingRenderer<VM> {
    fn clone(&self) -> Self {
        Self {
            frames: self.frames.clone(),
        }
    }
}

impl<VM> Default for RecordingRenderer<VM> {
    fn default() -> Self {
        Self::new()
    }
}

impl<VM> Renderer<VM> for RecordingRenderer<VM>
where
    VM: Send + Sync + 'static,
{
    fn render(&self, view_model: VM) {
        self.frames.push(view_model);
    }
}
