//! Polls a task's status until it reaches a terminal state.
//!
//! Each observation runs as one spawned tokio task. Only one fetch is in
//! flight at a time; the next one is armed after the previous settles.
//! State is published through a `watch` channel and every write is guarded
//! by the observation's generation and cancellation token, checked under the
//! channel lock, so a cancelled or superseded observation never mutates state.

use std::future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::source::TaskSource;
use super::types::{PollState, TaskStatus};
use crate::config::PollPolicy;
use crate::error::PollError;

#[derive(Clone, Debug)]
struct Published {
    generation: u64,
    state: PollState,
}

/// Factory for task observers sharing one status source and policy.
#[derive(Clone)]
pub struct TaskPoller {
    source: Arc<dyn TaskSource>,
    policy: PollPolicy,
}

impl TaskPoller {
    pub fn new(source: Arc<dyn TaskSource>, policy: PollPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Start observing `task_id`. `None` yields an idle observer that never
    /// fetches. Must be called from within a tokio runtime.
    pub fn observe(&self, task_id: Option<String>) -> TaskObserver {
        let mut observer = TaskObserver::new(self.source.clone(), self.policy.clone());
        observer.set_task(task_id);
        observer
    }
}

/// Live view of one task's status. Dropping it cancels polling.
pub struct TaskObserver {
    source: Arc<dyn TaskSource>,
    policy: PollPolicy,
    tx: Arc<watch::Sender<Published>>,
    rx: watch::Receiver<Published>,
    generation: u64,
    cancel: CancellationToken,
}

impl TaskObserver {
    fn new(source: Arc<dyn TaskSource>, policy: PollPolicy) -> Self {
        let (tx, rx) = watch::channel(Published {
            generation: 0,
            state: PollState::initial(None),
        });
        Self {
            source,
            policy,
            tx: Arc::new(tx),
            rx,
            generation: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Latest published state.
    pub fn state(&self) -> PollState {
        self.rx.borrow().state.clone()
    }

    pub fn task_id(&self) -> Option<String> {
        self.rx.borrow().state.task_id.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Switch to a different task. The previous observation is cancelled
    /// before the state resets, so none of its late responses are applied.
    pub fn set_task(&mut self, task_id: Option<String>) {
        self.cancel.cancel();
        self.generation += 1;
        self.cancel = CancellationToken::new();
        self.tx.send_replace(Published {
            generation: self.generation,
            state: PollState::initial(task_id.clone()),
        });

        let Some(task_id) = task_id else {
            return;
        };
        debug!(task_id = %task_id, generation = self.generation, "observing task");
        tokio::spawn(run_poll(
            self.source.clone(),
            task_id,
            self.policy.clone(),
            self.generation,
            self.cancel.clone(),
            self.tx.clone(),
        ));
    }

    /// Stop polling. The current state is frozen.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the next state change. Returns `None` once the observation
    /// has been cancelled.
    pub async fn changed(&mut self) -> Option<PollState> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            changed = self.rx.changed() => {
                changed.ok()?;
                Some(self.rx.borrow_and_update().state.clone())
            }
        }
    }

    /// Wait until the task reaches `completed` or `failed`. Returns the
    /// current state right away when no task is set or polling was cancelled.
    pub async fn wait_for_terminal(&mut self) -> PollState {
        loop {
            let current = self.rx.borrow_and_update().state.clone();
            if current.is_terminal() || current.task_id.is_none() {
                return current;
            }
            if self.changed().await.is_none() {
                return self.state();
            }
        }
    }
}

impl Drop for TaskObserver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Apply `update` only if this poll still owns the channel. Returns whether
/// the state changed.
fn publish<F>(
    tx: &watch::Sender<Published>,
    generation: u64,
    cancel: &CancellationToken,
    update: F,
) -> bool
where
    F: FnOnce(&mut PollState) -> bool,
{
    tx.send_if_modified(|published| {
        if published.generation != generation
            || cancel.is_cancelled()
            || published.state.is_terminal()
        {
            return false;
        }
        update(&mut published.state)
    })
}

fn fail(
    tx: &watch::Sender<Published>,
    generation: u64,
    cancel: &CancellationToken,
    err: PollError,
) -> bool {
    let message = err.to_string();
    publish(tx, generation, cancel, |state| {
        state.status = TaskStatus::Failed;
        state.result = None;
        state.error = Some(message);
        state.is_polling = false;
        true
    })
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn run_poll(
    source: Arc<dyn TaskSource>,
    task_id: String,
    policy: PollPolicy,
    generation: u64,
    cancel: CancellationToken,
    tx: Arc<watch::Sender<Published>>,
) {
    let started = Instant::now();
    // a limit past the clock's range is treated as unbounded
    let deadline = policy.max_duration().and_then(|limit| started.checked_add(limit));
    let timed_out = || PollError::TimedOut(started.elapsed().as_millis());
    let mut delay = policy.interval();
    let mut attempt: u32 = 0;

    loop {
        publish(&tx, generation, &cancel, |state| {
            let changed = !state.is_polling;
            state.is_polling = true;
            changed
        });
        if cancel.is_cancelled() {
            return;
        }

        attempt = attempt.saturating_add(1);
        debug!(task_id = %task_id, attempt, "checking task status");
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = until(deadline) => {
                warn!(task_id = %task_id, attempt, "task polling timed out");
                fail(&tx, generation, &cancel, timed_out());
                return;
            }
            fetched = source.fetch_task(&task_id) => fetched,
        };

        let task = match fetched {
            Ok(task) => task,
            Err(err) => {
                warn!(task_id = %task_id, attempt, error = %err, "task status check failed");
                fail(&tx, generation, &cancel, err);
                return;
            }
        };

        match task.status {
            TaskStatus::Completed => {
                let applied = publish(&tx, generation, &cancel, |state| {
                    state.status = TaskStatus::Completed;
                    state.result = task.result;
                    state.error = None;
                    state.is_polling = false;
                    true
                });
                if applied {
                    info!(task_id = %task_id, attempt, "task completed");
                }
                return;
            }
            TaskStatus::Failed => {
                let message = task.failure_message();
                info!(task_id = %task_id, attempt, error = %message, "task failed");
                fail(&tx, generation, &cancel, PollError::RemoteFailure(message));
                return;
            }
            status => {
                publish(&tx, generation, &cancel, |state| {
                    if status > state.status {
                        state.status = status;
                        true
                    } else {
                        if status < state.status {
                            debug!(task_id = %task_id, from = %state.status, to = %status, "ignoring status regression");
                        }
                        false
                    }
                });
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = until(deadline) => {
                warn!(task_id = %task_id, attempt, "task polling timed out");
                fail(&tx, generation, &cancel, timed_out());
                return;
            }
            _ = sleep(delay) => {}
        }
        delay = policy.next_delay(delay);
    }
}
