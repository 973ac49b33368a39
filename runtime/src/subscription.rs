//! Subscription records, handles, and change detection.
//!
//! A subscription is one observer's interest in a projection of state:
//! `(selector, change predicate, handler, delivery context)`. The Store keeps
//! only a weak entry per subscription; the caller keeps the returned
//! [`SubscriptionHandle`]. There is no explicit unsubscribe: dropping every
//! handle retires the subscription, and the Store's next notification pass
//! prunes the dead entry.
//!
//! Change detection runs on the state context for every committed
//! replacement: project the old and new state, ask the predicate, and when it
//! accepts, post the handler with the new substate onto the subscription's
//! [`SerialContext`]. Because that context is a FIFO queue, one subscription
//! sees its notifications in reduction order; ordering across subscriptions
//! on different contexts is unspecified.

use crate::context::SerialContext;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Re-evaluates one subscription against an `(old, new)` state pair.
///
/// `old` is `None` only for the inline initial notification at registration.
pub(crate) type FireFn<S> = dyn FnMut(Option<&S>, &S) + Send;

/// Weak entry the Store holds for a live subscription.
pub(crate) type SubscriptionEntry<S> = Weak<Mutex<FireFn<S>>>;

/// Strong handle to a registered subscription.
///
/// The Store holds only a weak reference to the subscription record; this
/// handle is what keeps it alive. Dropping the last clone of the handle
/// silently stops all further notifications — the Store prunes its dangling
/// entry on the next notification pass.
#[must_use = "dropping the handle retires the subscription"]
pub struct SubscriptionHandle {
    _record: Arc<dyn Any + Send + Sync>,
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubscriptionHandle")
    }
}

/// The change predicate that never suppresses a notification.
///
/// This is the permissive default for projections that are not comparable:
/// every committed replacement notifies, whether or not the projected value
/// actually changed.
pub(crate) fn always_changed<T>(_old: Option<&T>, _new: &T) -> bool {
    true
}

/// Structural-inequality predicate for comparable projections.
///
/// Suppresses a notification when the old state's projection equals the new
/// one; the initial notification (no old state) always passes.
pub(crate) fn distinct<T: PartialEq>(old: Option<&T>, new: &T) -> bool {
    old.is_none_or(|old| old != new)
}

/// Assemble a subscription record.
///
/// Returns the caller-facing strong handle and the weak entry the Store
/// files on its state context. The record is a single erased closure so the
/// Store never learns the substate type.
pub(crate) fn record<S, T>(
    context: SerialContext,
    selector: Arc<dyn Fn(&S) -> T + Send + Sync>,
    predicate: Box<dyn Fn(Option<&T>, &T) -> bool + Send>,
    handler: Arc<Mutex<dyn FnMut(T) + Send>>,
) -> (SubscriptionHandle, SubscriptionEntry<S>)
where
    S: 'static,
    T: Send + 'static,
{
    let fire = move |old: Option<&S>, new: &S| {
        let new_substate = selector(new);
        let old_substate = old.map(|old| selector(old));
        if predicate(old_substate.as_ref(), &new_substate) {
            let handler = Arc::clone(&handler);
            context.post(move || {
                let mut handler = handler.lock().unwrap_or_else(PoisonError::into_inner);
                handler(new_substate);
            });
        }
    };

    let record = Arc::new(Mutex::new(fire));
    let weak = Arc::downgrade(&record);
    let entry: SubscriptionEntry<S> = weak;
    (SubscriptionHandle { _record: record }, entry)
}
