//! The Store: serialized reduction pipeline, subscription fan-out, and
//! effect routing.
//!
//! A Store owns exactly one canonical state value, mutated only by replacing
//! it wholesale with the result of a reduction. All reductions for one Store
//! run strictly one-at-a-time, in dispatch order, on a dedicated
//! single-worker command queue (the **state context**), giving linearizable
//! state transitions. The subscription list and the effect-handler list are
//! touched only by that context; public methods that need them hop on via
//! the command queue.
//!
//! Committed snapshots publish through a watch channel, so `state` reads
//! from any context observe a fully-formed value, never a mid-reduction one.
//!
//! # Failure policy
//!
//! A panicking reducer is caught per dispatch: that one dispatch is
//! abandoned (state unchanged, no notification, no effects), logged at error
//! level, and subsequent dispatches are serviced normally. A panicking
//! effect handler forfeits only its own invocation. There is no retry logic
//! anywhere: dispatch, reduction, notification, and effect routing are all
//! best-effort single attempts.

use crate::context::SerialContext;
use crate::error::StoreError;
use crate::subscription::{self, SubscriptionEntry, SubscriptionHandle};
use std::any::type_name;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};
use unistate_core::handler::{Dispatcher, EffectHandler};
use unistate_core::reducer::Reducer;

type Handler<E, I> = Arc<dyn EffectHandler<Effect = E, Intent = I>>;

enum Command<S, I, E> {
    Dispatch {
        intent: I,
        ack: Option<oneshot::Sender<()>>,
    },
    Subscribe(SubscriptionEntry<S>),
    AddHandler(Handler<E, I>),
}

/// The Store - serialized runtime for a reducer
///
/// # Type Parameters
///
/// - `S`: State type (opaque to the Store; replaced wholesale per reduction)
/// - `I`: Intent type
/// - `E`: Effect type
///
/// The reducer itself is erased at construction: it lives on the state
/// context as a trait object and never appears in the Store's type.
///
/// Clones are handles onto the same state context; dropping every clone
/// shuts the context down once its queue drains.
///
/// # Example
///
/// ```ignore
/// let store = Store::new(CounterState::default(), CounterReducer);
///
/// let _sub = store.subscribe_distinct(|s: &CounterState| s.count, |count| {
///     println!("count is now {count}");
/// });
///
/// store.dispatch_sync(CounterIntent::Increment).await?;
/// assert_eq!(store.state(|s| s.count), 1);
/// ```
pub struct Store<S, I, E> {
    commands: mpsc::UnboundedSender<Command<S, I, E>>,
    state_rx: watch::Receiver<S>,
    notify_context: SerialContext,
}

impl<S, I, E> Store<S, I, E>
where
    S: Clone + Send + Sync + 'static,
    I: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Create a Store and spawn its state context.
    ///
    /// The context's diagnostic label derives from the state type's name, so
    /// two Stores over distinct state types are told apart in trace output.
    /// The label carries no correctness weight.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new<R>(initial_state: S, reducer: R) -> Self
    where
        R: Reducer<State = S, Intent = I, Effect = E> + Send + 'static,
    {
        let label = type_name::<S>();
        let (commands, queue) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(initial_state.clone());

        // Handlers get a weak path back into the queue: dispatching into a
        // dropped Store is a logged no-op, and a retained Dispatcher does
        // not keep the state context alive.
        let weak_commands = commands.downgrade();
        let dispatcher = Dispatcher::new(move |intent| {
            if let Some(commands) = weak_commands.upgrade() {
                let _ = commands.send(Command::Dispatch { intent, ack: None });
            } else {
                tracing::debug!("dispatch dropped: store is gone");
            }
        });

        let context = StateContext {
            state: initial_state,
            reducer: Box::new(reducer),
            state_tx,
            subscriptions: Vec::new(),
            handlers: Vec::new(),
            dispatcher,
        };
        tokio::spawn(context.run(queue, label));

        Self {
            commands,
            state_rx,
            notify_context: SerialContext::new(format!("{label}/notify")),
        }
    }

    /// Dispatch an intent asynchronously.
    ///
    /// Non-blocking: enqueues the reduction and returns immediately. FIFO
    /// order is preserved relative to other asynchronous dispatches on this
    /// Store. Safe to call re-entrantly from effect handlers. If the state
    /// context is gone the intent is dropped with a warning.
    pub fn dispatch(&self, intent: I) {
        if self
            .commands
            .send(Command::Dispatch { intent, ack: None })
            .is_err()
        {
            tracing::warn!("intent dropped: store state context is gone");
        }
    }

    /// Dispatch an intent and wait for its reduction to complete.
    ///
    /// Completion covers the reduction itself, subscription notification
    /// scheduling, and effect routing — not the delivery of notifications on
    /// their own contexts, and not any follow-up intents handlers enqueued.
    ///
    /// Must not be awaited from inside this Store's own state context; the
    /// synchronous [`EffectHandler::handle`] signature keeps that deadlock
    /// unrepresentable from handlers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ChannelClosed`] if the state context is gone.
    pub async fn dispatch_sync(&self, intent: I) -> Result<(), StoreError> {
        let (ack, acked) = oneshot::channel();
        self.commands
            .send(Command::Dispatch {
                intent,
                ack: Some(ack),
            })
            .map_err(|_| StoreError::ChannelClosed)?;
        acked.await.map_err(|_| StoreError::ChannelClosed)
    }

    /// Register an effect handler.
    ///
    /// Handlers are invoked synchronously on the state context, in
    /// registration order, for every effect of every subsequent dispatch
    /// (not retroactively). The Store holds the handler for its own
    /// lifetime; there is no removal.
    pub fn add_effect_handler<H>(&self, handler: H)
    where
        H: EffectHandler<Effect = E, Intent = I> + 'static,
    {
        if self
            .commands
            .send(Command::AddHandler(Arc::new(handler)))
            .is_err()
        {
            tracing::warn!("effect handler dropped: store state context is gone");
        }
    }

    /// Read the current committed state through a closure.
    ///
    /// Callable from any context; observes the latest value as of the most
    /// recent completed reduction, never a partial update.
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.state_rx.borrow())
    }

    /// Clone the current committed state.
    #[must_use]
    pub fn snapshot(&self) -> S {
        self.state_rx.borrow().clone()
    }

    /// The Store's default notification delivery context.
    ///
    /// Subscriptions made without an explicit context deliver here. Exposed
    /// so callers can sequence against deliveries (`drain`) or co-locate
    /// their own jobs with them.
    #[must_use]
    pub fn notify_context(&self) -> &SerialContext {
        &self.notify_context
    }

    /// Subscribe to a projection of state, notified on every reduction.
    ///
    /// Uses the permissive always-changed predicate: the projection need not
    /// be comparable, at the cost of possibly spurious notifications.
    /// Delivery happens on the Store's default notification context.
    ///
    /// The handler is invoked once immediately, inline on the calling
    /// thread, with the current projection — before this method returns and
    /// before any further dispatch is observed.
    pub fn subscribe<T, Sel, H>(&self, selector: Sel, handler: H) -> SubscriptionHandle
    where
        T: Send + 'static,
        Sel: Fn(&S) -> T + Send + Sync + 'static,
        H: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(
            self.notify_context.clone(),
            selector,
            subscription::always_changed,
            handler,
        )
    }

    /// Subscribe to a comparable projection, notified only when it changes.
    ///
    /// Uses structural inequality against the previous state's projection:
    /// consecutive duplicate values collapse to one notification. Delivery
    /// happens on the Store's default notification context.
    pub fn subscribe_distinct<T, Sel, H>(&self, selector: Sel, handler: H) -> SubscriptionHandle
    where
        T: PartialEq + Send + 'static,
        Sel: Fn(&S) -> T + Send + Sync + 'static,
        H: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(
            self.notify_context.clone(),
            selector,
            subscription::distinct,
            handler,
        )
    }

    /// Subscribe with delivery on an explicit context, notified on every
    /// reduction.
    pub fn subscribe_on<T, Sel, H>(
        &self,
        context: &SerialContext,
        selector: Sel,
        handler: H,
    ) -> SubscriptionHandle
    where
        T: Send + 'static,
        Sel: Fn(&S) -> T + Send + Sync + 'static,
        H: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(
            context.clone(),
            selector,
            subscription::always_changed,
            handler,
        )
    }

    /// Subscribe with an explicit delivery context and change predicate.
    ///
    /// The general form behind every other `subscribe_*` convenience. The
    /// predicate sees `(old state's projection, new state's projection)`;
    /// the old projection is absent only for the inline initial
    /// notification, which bypasses both the predicate's suppression
    /// opportunity in practice (`None` should accept) and the delivery
    /// context: it runs on the calling thread before this method returns.
    pub fn subscribe_with<T, Sel, P, H>(
        &self,
        context: SerialContext,
        selector: Sel,
        predicate: P,
        mut handler: H,
    ) -> SubscriptionHandle
    where
        T: Send + 'static,
        Sel: Fn(&S) -> T + Send + Sync + 'static,
        P: Fn(Option<&T>, &T) -> bool + Send + 'static,
        H: FnMut(T) + Send + 'static,
    {
        metrics::counter!("store.subscriptions.registered").increment(1);

        // Initial fire: inline, on the calling thread.
        let initial = {
            let state = self.state_rx.borrow();
            selector(&state)
        };
        handler(initial);

        let (handle, entry) = subscription::record(
            context,
            Arc::new(selector),
            Box::new(predicate),
            Arc::new(Mutex::new(handler)),
        );
        if self.commands.send(Command::Subscribe(entry)).is_err() {
            tracing::warn!(
                "subscription filed against a stopped store; only the initial notification was delivered"
            );
        }
        handle
    }
}

impl<S, I, E> Clone for Store<S, I, E> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            state_rx: self.state_rx.clone(),
            notify_context: self.notify_context.clone(),
        }
    }
}

impl<S, I, E> std::fmt::Debug for Store<S, I, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &type_name::<S>())
            .finish_non_exhaustive()
    }
}

/// Worker state owned by the state context task.
struct StateContext<S, I, E> {
    state: S,
    reducer: Box<dyn Reducer<State = S, Intent = I, Effect = E> + Send>,
    state_tx: watch::Sender<S>,
    subscriptions: Vec<SubscriptionEntry<S>>,
    handlers: Vec<Handler<E, I>>,
    dispatcher: Dispatcher<I>,
}

impl<S, I, E> StateContext<S, I, E>
where
    S: Clone + Send + Sync + 'static,
    I: Send + 'static,
    E: Send + Sync + 'static,
{
    async fn run(mut self, mut queue: mpsc::UnboundedReceiver<Command<S, I, E>>, label: &'static str) {
        let span = tracing::debug_span!("state_context", state = label);
        while let Some(command) = queue.recv().await {
            span.in_scope(|| self.process(command));
        }
        tracing::debug!(state = label, "state context drained, shutting down");
    }

    fn process(&mut self, command: Command<S, I, E>) {
        match command {
            Command::Dispatch { intent, ack } => {
                self.reduce_one(intent);
                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
            }
            Command::Subscribe(entry) => self.subscriptions.push(entry),
            Command::AddHandler(handler) => self.handlers.push(handler),
        }
    }

    fn reduce_one(&mut self, intent: I) {
        metrics::counter!("store.dispatches.total").increment(1);
        tracing::trace!("processing dispatch");

        let start = Instant::now();
        let reduced = catch_unwind(AssertUnwindSafe(|| self.reducer.reduce(&self.state, intent)));
        metrics::histogram!("store.reducer.duration_seconds").record(start.elapsed().as_secs_f64());

        let Ok((new_state, effects)) = reduced else {
            metrics::counter!("store.reducer.panics").increment(1);
            tracing::error!("reducer panicked; dispatch abandoned, state unchanged");
            return;
        };

        // Commit: the replace-and-notify step runs even when the returned
        // value is unchanged.
        let old_state = std::mem::replace(&mut self.state, new_state);
        self.state_tx.send_replace(self.state.clone());

        self.notify(&old_state);
        self.route_effects(&effects);
    }

    /// Re-evaluate every live subscription against `(old, new)`, in
    /// registration order, pruning dead entries in the same pass.
    fn notify(&mut self, old_state: &S) {
        let before = self.subscriptions.len();
        let state = &self.state;
        self.subscriptions.retain(|entry| {
            entry.upgrade().is_some_and(|record| {
                let mut fire = record.lock().unwrap_or_else(PoisonError::into_inner);
                fire(Some(old_state), state);
                true
            })
        });

        let pruned = before - self.subscriptions.len();
        if pruned > 0 {
            metrics::counter!("store.subscriptions.pruned").increment(pruned as u64);
            tracing::trace!(pruned, "pruned dead subscription entries");
        }
    }

    /// Route each effect, in order, to every handler in registration order.
    ///
    /// Handlers run synchronously here, inside the state context; any intent
    /// they dispatch lands at the back of the command queue.
    fn route_effects(&self, effects: &[E]) {
        for effect in effects {
            metrics::counter!("store.effects.routed").increment(1);
            for handler in &self.handlers {
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| handler.handle(effect, &self.dispatcher)));
                if outcome.is_err() {
                    metrics::counter!("store.handlers.panics").increment(1);
                    tracing::error!("effect handler panicked; invocation forfeited");
                }
            }
        }
    }
}
