//! Counter demo binary
//!
//! Walks through the unistate architecture with a simple counter.

use counter::{
    CeilingGuard, ConsoleRenderer, CounterIntent, CounterReducer, CounterState, CounterViewModel,
    MilestoneLogger,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unistate_runtime::{SerialContext, Store, StoreError, ViewModelEmitter};

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter=debug,unistate_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Counter Demo: Unistate Architecture ===\n");

    let store = Store::new(CounterState::default(), CounterReducer);

    // Effect handlers: log every milestone, reset at 10.
    store.add_effect_handler(MilestoneLogger);
    store.add_effect_handler(CeilingGuard { ceiling: 10 });

    // A distinct subscription on the count; fires inline once with 0.
    let _sub = store.subscribe_distinct(
        |s: &CounterState| s.count,
        |count| println!("[subscription] count changed to {count}"),
    );

    // An emitter driving a console renderer on its own context.
    let emitter = ViewModelEmitter::new(
        store.clone(),
        SerialContext::new("ui-main"),
        CounterViewModel::project,
    );
    emitter.register(Arc::new(ConsoleRenderer));

    println!("\n>>> Dispatching 6 increments");
    for _ in 0..6 {
        store.dispatch_sync(CounterIntent::Increment).await?;
    }
    println!("Count is now {}", store.state(|s| s.count));

    println!("\n>>> Dispatching Decrement, then Increment back to the milestone");
    store.dispatch_sync(CounterIntent::Decrement).await?;
    store.dispatch_sync(CounterIntent::Increment).await?;

    println!("\n>>> Driving the count to the ceiling (10)");
    for _ in 0..4 {
        store.dispatch_sync(CounterIntent::Increment).await?;
    }
    // The CeilingGuard's Reset is queued behind the last increment; a final
    // acknowledged no-op sequences behind it.
    store.dispatch_sync(CounterIntent::Decrement).await?;
    store.dispatch_sync(CounterIntent::Increment).await?;
    println!("Count after ceiling reset: {}", store.state(|s| s.count));

    // Let queued notifications and renders land before tearing down.
    store.notify_context().drain().await;
    emitter.render_context().drain().await;
    emitter.unregister();

    println!("\n=== Demo complete ===");
    println!("\nKey concepts demonstrated:");
    println!("  - State: CounterState, replaced wholesale per reduction");
    println!("  - Intent: CounterIntent, folded by a pure reducer");
    println!("  - Effects: Milestone descriptions routed to handlers");
    println!("  - Feedback: CeilingGuard dispatches Reset through the queue");
    println!("  - Subscriptions: distinct change detection on a projection");
    println!("  - Emitter: view models rendered on a fixed context");
    Ok(())
}
