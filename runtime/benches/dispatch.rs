//! Dispatch pipeline benchmarks
//!
//! Measures the serialized reduction pipeline end to end:
//! - Pure reducer execution (no Store)
//! - Acknowledged dispatch round-trips through the state context
//! - Fan-out cost per registered subscription
//!
//! Run with: `cargo bench`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::expect_used)] // Benchmarks can use expect for setup

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use unistate_core::effect::{Effects, none};
use unistate_core::reducer::Reducer;
use unistate_runtime::Store;

#[derive(Clone, Debug, Default)]
struct BenchState {
    counter: i64,
}

#[derive(Clone, Debug)]
enum BenchIntent {
    Increment,
    Reset,
}

#[derive(Clone)]
struct BenchReducer;

impl Reducer for BenchReducer {
    type State = BenchState;
    type Intent = BenchIntent;
    type Effect = ();

    fn reduce(&self, state: &BenchState, intent: BenchIntent) -> (BenchState, Effects<()>) {
        let next = match intent {
            BenchIntent::Increment => BenchState {
                counter: state.counter + 1,
            },
            BenchIntent::Reset => BenchState::default(),
        };
        (next, none())
    }
}

fn bench_pure_reducer(c: &mut Criterion) {
    let reducer = BenchReducer;
    let state = BenchState::default();

    c.bench_function("reducer/increment", |b| {
        b.iter(|| black_box(reducer.reduce(black_box(&state), BenchIntent::Increment)));
    });
}

fn bench_dispatch_sync(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("runtime");

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("dispatch_sync", |b| {
        let store = runtime.block_on(async { Store::new(BenchState::default(), BenchReducer) });
        b.iter(|| {
            runtime
                .block_on(store.dispatch_sync(BenchIntent::Increment))
                .expect("store alive");
        });
    });

    group.finish();
}

fn bench_subscription_fanout(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("runtime");

    let mut group = c.benchmark_group("fanout");
    group.throughput(Throughput::Elements(1));

    for subscribers in [1_usize, 16, 64] {
        group.bench_function(format!("{subscribers}_subscribers"), |b| {
            let (store, _handles) = runtime.block_on(async {
                let store = Store::new(BenchState::default(), BenchReducer);
                let handles: Vec<_> = (0..subscribers)
                    .map(|_| {
                        store.subscribe_distinct(|s: &BenchState| s.counter, |count| {
                            black_box(count);
                        })
                    })
                    .collect();
                (store, handles)
            });
            b.iter(|| {
                runtime
                    .block_on(store.dispatch_sync(BenchIntent::Increment))
                    .expect("store alive");
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pure_reducer,
    bench_dispatch_sync,
    bench_subscription_fanout
);
criterion_main!(benches);
