//! Serialized execution contexts.
//!
//! A [`SerialContext`] is a labeled FIFO job queue serviced by exactly one
//! worker task: jobs posted to it run strictly one-at-a-time, in post order.
//! Subscriptions use one as their delivery context, which is what turns
//! "notifications are scheduled asynchronously" into "notifications for one
//! subscription arrive in reduction order". The emitter uses a dedicated one
//! as its fixed render context.
//!
//! The label is diagnostics only; it names the context in trace output and
//! carries no correctness weight.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() + Send>;

/// A labeled FIFO single-worker job queue.
///
/// Clones share the same queue and worker. The worker exits once every
/// handle has been dropped and the queue has drained.
///
/// Must be created from within a Tokio runtime.
#[derive(Clone)]
pub struct SerialContext {
    jobs: mpsc::UnboundedSender<Job>,
    label: Arc<str>,
}

impl SerialContext {
    /// Create a new context and spawn its worker task.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        let label: Arc<str> = label.into().into();
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();

        let worker_label = Arc::clone(&label);
        tokio::spawn(async move {
            let span = tracing::debug_span!("serial_context", label = %worker_label);
            while let Some(job) = queue.recv().await {
                // A panicking job forfeits only its own slot; the queue keeps
                // draining.
                let outcome = span.in_scope(|| catch_unwind(AssertUnwindSafe(job)));
                if outcome.is_err() {
                    metrics::counter!("context.jobs.panicked").increment(1);
                    tracing::error!(label = %worker_label, "job panicked on serial context");
                }
            }
            tracing::trace!(label = %worker_label, "serial context drained, worker exiting");
        });

        Self { jobs, label }
    }

    /// Post a job for in-order execution on this context's worker.
    ///
    /// Returns immediately. If the worker is gone the job is dropped with a
    /// warning.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        if self.jobs.send(Box::new(job)).is_err() {
            tracing::warn!(label = %self.label, "job dropped: serial context worker is gone");
        }
    }

    /// Wait until every job posted before this call has executed.
    ///
    /// Acts as a barrier: posts a marker job and awaits it. Returns
    /// immediately if the worker is gone.
    pub async fn drain(&self) {
        let (done, observed) = oneshot::channel();
        if self.jobs.send(Box::new(move || drop(done.send(())))).is_err() {
            return;
        }
        let _ = observed.await;
    }

    /// The diagnostic label this context was created with.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for SerialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialContext")
            .field("label", &self.label)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn record(values: &Arc<Mutex<Vec<u32>>>, value: u32) {
        if let Ok(mut values) = values.lock() {
            values.push(value);
        }
    }

    fn snapshot(values: &Arc<Mutex<Vec<u32>>>) -> Vec<u32> {
        values.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[tokio::test]
    async fn jobs_run_in_post_order() {
        let context = SerialContext::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for value in 0..10 {
            let seen = Arc::clone(&seen);
            context.post(move || record(&seen, value));
        }
        context.drain().await;

        assert_eq!(snapshot(&seen), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn clones_share_one_queue() {
        let context = SerialContext::new("shared");
        let twin = context.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = Arc::clone(&seen);
        context.post(move || record(&a, 1));
        let b = Arc::clone(&seen);
        twin.post(move || record(&b, 2));
        context.drain().await;

        assert_eq!(snapshot(&seen), vec![1, 2]);
    }

    #[tokio::test]
    #[allow(clippy::panic)] // Intentional panic to exercise job isolation
    async fn panicking_job_does_not_kill_the_worker() {
        let context = SerialContext::new("isolation");
        let seen = Arc::new(Mutex::new(Vec::new()));

        context.post(|| panic!("job failure"));
        let a = Arc::clone(&seen);
        context.post(move || record(&a, 3));
        context.drain().await;

        assert_eq!(snapshot(&seen), vec![3]);
    }

    #[tokio::test]
    async fn drain_on_empty_queue_returns() {
        let context = SerialContext::new("empty");
        context.drain().await;
    }
}
