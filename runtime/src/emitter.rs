//! View-projection emitter: single-renderer boundary over a Store.
//!
//! A [`ViewModelEmitter`] lets exactly one renderer receive projected-state
//! callbacks on a fixed execution context (typically whatever stands in for
//! the UI-main context). It is a thin layer: `register` is a subscription on
//! the underlying Store, `unregister` drops the handle.
//!
//! Double-registration policy: registering a renderer while another is
//! active **replaces** it. The previous subscription handle is dropped and
//! the previous renderer receives no further callbacks.

use crate::context::SerialContext;
use crate::store::Store;
use crate::subscription::SubscriptionHandle;
use std::sync::{Arc, Mutex, PoisonError};

/// Capability to render one view model.
///
/// Consumed by the emitter, implemented by the caller's rendering adapter.
/// `render` is invoked on the emitter's fixed render context, plus once
/// inline at registration with the current view model.
pub trait Renderer<VM>: Send + Sync {
    /// Render one view model.
    fn render(&self, view_model: VM);
}

/// Single-renderer emitter over a Store.
///
/// Holds the projection from state to view model and the fixed render
/// context. View models are not required to be comparable, so every
/// reduction re-renders (the permissive always-changed predicate).
///
/// # Example
///
/// ```ignore
/// let emitter = ViewModelEmitter::new(
///     store,
///     SerialContext::new("ui-main"),
///     |state: &CounterState| CounterViewModel { label: state.count.to_string() },
/// );
/// emitter.register(Arc::new(ConsoleRenderer));
/// // ...
/// emitter.unregister();
/// ```
pub struct ViewModelEmitter<S, I, E, VM> {
    store: Store<S, I, E>,
    project: Arc<dyn Fn(&S) -> VM + Send + Sync>,
    render_context: SerialContext,
    active: Mutex<Option<SubscriptionHandle>>,
}

impl<S, I, E, VM> ViewModelEmitter<S, I, E, VM>
where
    S: Clone + Send + Sync + 'static,
    I: Send + 'static,
    E: Send + Sync + 'static,
    VM: Send + 'static,
{
    /// Create an emitter over `store`, rendering on `render_context`.
    pub fn new(
        store: Store<S, I, E>,
        render_context: SerialContext,
        project: impl Fn(&S) -> VM + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            project: Arc::new(project),
            render_context,
            active: Mutex::new(None),
        }
    }

    /// Register a renderer, replacing any active one.
    ///
    /// The renderer receives the current view model immediately (inline, via
    /// the subscription's initial fire), then once per subsequent reduction
    /// on the render context. A previously registered renderer is silently
    /// replaced and receives no further callbacks.
    pub fn register(&self, renderer: Arc<dyn Renderer<VM>>) {
        let project = Arc::clone(&self.project);
        let handle = self.store.subscribe_on(
            &self.render_context,
            move |state: &S| project(state),
            move |view_model| renderer.render(view_model),
        );

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.replace(handle).is_some() {
            tracing::debug!("replaced active renderer registration");
        }
    }

    /// Tear down the active registration, if any.
    pub fn unregister(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.take().is_some() {
            tracing::debug!("renderer unregistered");
        }
    }

    /// Whether a renderer is currently registered.
    pub fn is_registered(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The underlying Store.
    #[must_use]
    pub fn store(&self) -> &Store<S, I, E> {
        &self.store
    }

    /// The fixed render context.
    #[must_use]
    pub fn render_context(&self) -> &SerialContext {
        &self.render_context
    }
}
