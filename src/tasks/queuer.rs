//! Single-flight FIFO task runner.
//!
//! Every mutation of a document goes through one [`TaskQueuer`]. Tasks run
//! one at a time in submission order; a task submitted while the queue is
//! draining is appended and runs before the queuer goes idle again.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinError;

/// Why a queued task did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task returned an error.
    #[error("task failed: {0}")]
    Failed(String),

    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task ran past the configured deadline and was aborted.
    #[error("task timed out after {0:?}")]
    TimedOut(Duration),

    /// The runtime dropped the task before it finished.
    #[error("task was cancelled")]
    Cancelled,
}

impl TaskError {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed(error.to_string())
    }
}

/// What happens to task failures after they are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFailurePolicy {
    /// Log and discard.
    #[default]
    Log,
    /// Log and keep until [`TaskQueuer::take_failures`].
    Record,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueuerOptions {
    pub failure_policy: TaskFailurePolicy,
    /// Per-task deadline. `None` waits for as long as the task runs.
    pub timeout: Option<Duration>,
}

/// Sequence number of a submitted task.
pub type TaskId = u64;

/// A recorded task failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: TaskId,
    pub error: TaskError,
}

type BoxedTask = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

struct QueuedTask {
    id: TaskId,
    future: BoxedTask,
}

#[derive(Default)]
struct State {
    queue: VecDeque<QueuedTask>,
    draining: bool,
    next_id: TaskId,
    failures: Vec<TaskFailure>,
}

struct Inner {
    state: Mutex<State>,
    idle: watch::Sender<bool>,
    options: QueuerOptions,
    runtime: Handle,
}

/// Mutual-exclusion FIFO runner for asynchronous tasks.
///
/// Cloning shares the queue.
#[derive(Clone)]
pub struct TaskQueuer {
    inner: Arc<Inner>,
}

impl TaskQueuer {
    /// A queuer spawning its drain onto `runtime`.
    pub fn new(runtime: Handle, options: QueuerOptions) -> Self {
        let (idle, _) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                idle,
                options,
                runtime,
            }),
        }
    }

    /// A queuer on the runtime of the calling context, if there is one.
    pub fn current(options: QueuerOptions) -> Option<Self> {
        Handle::try_current().ok().map(|runtime| Self::new(runtime, options))
    }

    pub fn options(&self) -> QueuerOptions {
        self.inner.options
    }

    /// Enqueue `task`. Never blocks; starts a drain if the queuer is idle.
    pub fn submit<F>(&self, task: F) -> TaskId
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.queue.push_back(QueuedTask {
            id,
            future: Box::pin(task),
        });
        tracing::trace!(task = id, queued = state.queue.len(), "task submitted");

        if !state.draining {
            state.draining = true;
            self.inner.idle.send_replace(false);
            let inner = Arc::clone(&self.inner);
            self.inner.runtime.spawn(drain(inner));
        }
        id
    }

    pub fn is_idle(&self) -> bool {
        !self.inner.state.lock().draining
    }

    /// Number of tasks waiting to start.
    pub fn pending(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Resolves once the queue has fully drained.
    pub async fn wait_idle(&self) {
        let mut idle = self.inner.idle.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = idle.wait_for(|idle| *idle).await;
    }

    /// Failures kept under [`TaskFailurePolicy::Record`], oldest first.
    pub fn take_failures(&self) -> Vec<TaskFailure> {
        std::mem::take(&mut self.inner.state.lock().failures)
    }
}

impl std::fmt::Debug for TaskQueuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("TaskQueuer")
            .field("draining", &state.draining)
            .field("pending", &state.queue.len())
            .field("options", &self.inner.options)
            .finish()
    }
}

async fn drain(inner: Arc<Inner>) {
    loop {
        let next = {
            let mut state = inner.state.lock();
            match state.queue.pop_front() {
                Some(task) => task,
                None => {
                    state.draining = false;
                    inner.idle.send_replace(true);
                    tracing::trace!("task queue drained");
                    return;
                }
            }
        };

        let id = next.id;
        if let Err(error) = run(&inner, next.future).await {
            report(&inner, id, error);
        }
    }
}

/// Run one task on its own tokio task so a panic surfaces as a `JoinError`
/// instead of unwinding through the drain.
async fn run(inner: &Inner, task: BoxedTask) -> Result<(), TaskError> {
    let mut handle = inner.runtime.spawn(task);
    let joined = match inner.options.timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                // Abort and wait for the task to stop before the next one starts
                handle.abort();
                let _ = handle.await;
                return Err(TaskError::TimedOut(limit));
            }
        },
        None => handle.await,
    };
    joined.unwrap_or_else(|error| Err(join_error(error)))
}

fn join_error(error: JoinError) -> TaskError {
    if !error.is_panic() {
        return TaskError::Cancelled;
    }
    let payload = error.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<unknown panic>".to_string());
    TaskError::Panicked(message)
}

fn report(inner: &Inner, task: TaskId, error: TaskError) {
    tracing::warn!(task, %error, "queued task failed");
    if inner.options.failure_policy == TaskFailurePolicy::Record {
        inner.state.lock().failures.push(TaskFailure { task, error });
    }
}
