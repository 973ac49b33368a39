//! # Unistate Runtime
//!
//! Runtime implementation for the unistate architecture.
//!
//! This crate provides the Store runtime: a serialized reduction pipeline,
//! subscription fan-out with change detection, and effect-handler routing.
//!
//! ## Core Components
//!
//! - **Store**: owns the canonical state and a dedicated single-worker
//!   command queue (the state context); orchestrates
//!   dispatch → reduce → notify → route-effects
//! - **`SerialContext`**: a labeled FIFO single-worker job queue, used as the
//!   delivery context for subscriptions and renderers
//! - **Subscription**: an observer of a substate projection with a
//!   change-suppression predicate; lifetime is handle-based
//! - **`ViewModelEmitter`**: thin single-renderer boundary over a Store
//!
//! ## Example
//!
//! ```ignore
//! use unistate_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer);
//!
//! // Fire-and-forget dispatch; the reduction runs later, in FIFO order.
//! store.dispatch(Intent::Increment);
//!
//! // Await the reduction (and its notification scheduling and effect
//! // routing) before continuing.
//! store.dispatch_sync(Intent::Increment).await?;
//!
//! // Read a committed snapshot from any context.
//! let count = store.state(|s| s.count);
//! ```

/// Serialized execution contexts (FIFO single-worker job queues)
pub mod context;

/// View-projection emitter: single-renderer boundary over a Store
pub mod emitter;

/// The Store: serialized reduction pipeline, fan-out, and effect routing
pub mod store;

/// Subscription records, handles, and change detection
pub mod subscription;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// The Store deliberately has no error hierarchy of its own: reducers and
    /// effect handlers are expected not to fail, and there is no retry logic
    /// anywhere in the pipeline. The only failure a caller can observe is the
    /// state context being gone.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The Store's state context has shut down and the command queue is
        /// closed
        ///
        /// Returned by `dispatch_sync` when the acknowledgement can no longer
        /// arrive. Fire-and-forget `dispatch` logs and drops instead.
        #[error("Store state context is gone, command channel closed")]
        ChannelClosed,
    }
}

pub use context::SerialContext;
pub use emitter::{Renderer, ViewModelEmitter};
pub use error::StoreError;
pub use store::Store;
pub use subscription::SubscriptionHandle;
