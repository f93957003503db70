//! Job identity, staleness and cooperative cancellation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use kagami_types::JobId;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    InFlight,
    /// Waiting out a backoff before attempt `attempt`
    Retrying { attempt: u32 },
    Succeeded,
    Canceled,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Canceled | JobState::Failed)
    }
}

struct Inner {
    counter: AtomicU64,
    /// Cancellation flag of the current job generation
    generation: Mutex<CancellationToken>,
}

/// Issues job ids and owns the shared cancellation flag
///
/// Starting a job supersedes every earlier one: older tickets become stale
/// but their workers are left to run to completion.
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Inner>,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                counter: AtomicU64::new(0),
                generation: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Open a new job: bump the counter and install a fresh cancellation flag
    pub fn start(&self) -> JobTicket {
        let token = CancellationToken::new();
        let id = {
            let mut generation = self
                .inner
                .generation
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            *generation = token.clone();
            JobId(self.inner.counter.fetch_add(1, Ordering::SeqCst) + 1)
        };
        let (state, _) = watch::channel(JobState::Pending);
        tracing::info!("[JOB] {} started", id);
        JobTicket {
            id,
            token,
            scheduler: self.clone(),
            state: Arc::new(state),
        }
    }

    /// Set the current generation's cancellation flag
    pub fn cancel(&self) -> JobId {
        let generation = self
            .inner
            .generation
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        generation.cancel();
        let id = self.active_id();
        tracing::info!("[JOB] {} cancel requested", id);
        id
    }

    pub fn active_id(&self) -> JobId {
        JobId(self.inner.counter.load(Ordering::SeqCst))
    }

    pub fn is_canceled(&self) -> bool {
        self.inner
            .generation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_cancelled()
    }

    /// True if results of `id` may still be applied
    pub fn is_live(&self, id: JobId) -> bool {
        id == self.active_id() && !self.is_canceled()
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle carried by a worker for one job
#[derive(Clone)]
pub struct JobTicket {
    id: JobId,
    token: CancellationToken,
    scheduler: JobScheduler,
    state: Arc<watch::Sender<JobState>>,
}

impl JobTicket {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Not canceled and not superseded by a newer job
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled() && self.scheduler.active_id() == self.id
    }

    pub fn is_stale(&self) -> bool {
        self.scheduler.active_id() != self.id
    }

    /// Resolves once this job's generation is canceled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    pub fn set_state(&self, next: JobState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            tracing::debug!("[JOB] {} {:?} -> {:?}", self.id, prev, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_newer_job_supersedes() {
        let scheduler = JobScheduler::new();
        let first = scheduler.start();
        let second = scheduler.start();
        assert_eq!(first.id(), JobId(1));
        assert_eq!(second.id(), JobId(2));
        assert!(first.is_stale());
        assert!(!first.is_live());
        assert!(second.is_live());
        assert_eq!(scheduler.active_id(), JobId(2));
    }

    #[test]
    fn test_cancel_is_per_generation() {
        let scheduler = JobScheduler::new();
        let first = scheduler.start();
        scheduler.cancel();
        assert!(first.is_canceled());
        assert!(!scheduler.is_live(first.id()));

        // New job clears the flag without reviving the old one
        let second = scheduler.start();
        assert!(!second.is_canceled());
        assert!(second.is_live());
        assert!(first.is_canceled());
        assert!(!scheduler.is_live(first.id()));
    }

    #[test]
    fn test_state_transitions_are_observable() {
        let scheduler = JobScheduler::new();
        let ticket = scheduler.start();
        let rx = ticket.subscribe();
        assert_eq!(*rx.borrow(), JobState::Pending);
        ticket.set_state(JobState::InFlight);
        ticket.set_state(JobState::Retrying { attempt: 2 });
        ticket.set_state(JobState::Succeeded);
        assert_eq!(*rx.borrow(), JobState::Succeeded);
        assert!(ticket.state().is_terminal());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let scheduler = JobScheduler::new();
        let ticket = scheduler.start();
        let waiter = {
            let ticket = ticket.clone();
            tokio::spawn(async move { ticket.cancelled().await })
        };
        scheduler.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
