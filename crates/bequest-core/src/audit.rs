//! The audit queue: detached recording of events after answer mutations.
//!
//! Mutations hand a snapshot to [`AuditQueue::submit`], which never waits.
//! A fixed pool of tokio workers drains a bounded channel and writes each
//! event through [`EventService::create_event`] under its own timeout, so a
//! cancelled or timed-out request never cancels the write it triggered.
//!
//! Delivery is best-effort. A full queue, a failed write or a timeout loses
//! the event; each case is logged and reported as an [`AuditOutcome`].

use std::{sync::Arc, time::Duration};

use tokio::{
  sync::{Mutex, broadcast, mpsc, mpsc::error::TrySendError},
  task::JoinHandle,
};

use crate::{
  answer::Answer,
  event::{Event, EventType},
  service::EventService,
  store::{AnswerStore, EventStore},
};

const OUTCOME_CAPACITY: usize = 1024;

/// Sizing for the audit worker pool.
#[derive(Debug, Clone)]
pub struct AuditConfig {
  pub workers:        usize,
  pub queue_capacity: usize,
  /// Deadline for each event write, independent of any request deadline.
  pub timeout:        Duration,
}

impl Default for AuditConfig {
  fn default() -> Self {
    Self {
      workers:        4,
      queue_capacity: 1024,
      timeout:        Duration::from_secs(5),
    }
  }
}

/// What became of one submitted snapshot.
#[derive(Debug, Clone)]
pub enum AuditOutcome {
  Recorded(Event),
  Failed {
    key:        String,
    event_type: EventType,
    reason:     String,
  },
  /// The queue was full or shut down; nothing was written.
  Dropped { key: String, event_type: EventType },
}

impl AuditOutcome {
  pub fn key(&self) -> &str {
    match self {
      Self::Recorded(event) => &event.data.key,
      Self::Failed { key, .. } | Self::Dropped { key, .. } => key,
    }
  }
}

struct AuditJob {
  snapshot:   Answer,
  event_type: EventType,
}

/// Submit handle for the audit workers. Cloning is cheap.
///
/// The workers exit once every clone has been dropped and the queue is
/// drained.
#[derive(Clone)]
pub struct AuditQueue {
  sender:   mpsc::Sender<AuditJob>,
  outcomes: broadcast::Sender<AuditOutcome>,
}

impl AuditQueue {
  /// Spawn the worker pool onto the current tokio runtime.
  pub fn start<S>(
    events: EventService<S>,
    config: &AuditConfig,
  ) -> (Self, AuditWorkers)
  where
    S: AnswerStore + EventStore + 'static,
  {
    let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
    let (outcomes, _) = broadcast::channel(OUTCOME_CAPACITY);
    let receiver = Arc::new(Mutex::new(receiver));

    let handles = (0..config.workers.max(1))
      .map(|worker| {
        tokio::spawn(run_worker(
          worker,
          Arc::clone(&receiver),
          events.clone(),
          outcomes.clone(),
          config.timeout,
        ))
      })
      .collect();

    (Self { sender, outcomes }, AuditWorkers { handles })
  }

  /// Queue the event for `event_type` applied to `snapshot`. Never waits.
  pub fn submit(&self, snapshot: Answer, event_type: EventType) {
    let job = AuditJob { snapshot, event_type };
    if let Err(err) = self.sender.try_send(job) {
      let (job, reason) = match err {
        TrySendError::Full(job) => (job, "audit queue is full"),
        TrySendError::Closed(job) => (job, "audit queue is closed"),
      };
      tracing::warn!(
        key = %job.snapshot.key,
        event_type = %job.event_type,
        "{reason}; dropping event",
      );
      let _ = self.outcomes.send(AuditOutcome::Dropped {
        key:        job.snapshot.key,
        event_type: job.event_type,
      });
    }
  }

  /// Receive the outcome of every job submitted after this call.
  ///
  /// Outcomes are broadcast whether or not anyone listens; this exists so
  /// callers (chiefly tests) can wait for a detached write to settle.
  pub fn subscribe(&self) -> broadcast::Receiver<AuditOutcome> {
    self.outcomes.subscribe()
  }
}

/// Join handles for the audit worker pool.
pub struct AuditWorkers {
  handles: Vec<JoinHandle<()>>,
}

impl AuditWorkers {
  /// Wait up to `grace` for the workers to finish the queued jobs.
  ///
  /// Only returns early once every [`AuditQueue`] clone has been dropped.
  /// Returns `false` if the deadline passed first; unfinished jobs are lost.
  pub async fn shutdown(self, grace: Duration) -> bool {
    let join_all = async {
      for handle in self.handles {
        if let Err(err) = handle.await {
          tracing::error!(error = %err, "audit worker panicked");
        }
      }
    };
    tokio::time::timeout(grace, join_all).await.is_ok()
  }
}

async fn run_worker<S>(
  worker: usize,
  receiver: Arc<Mutex<mpsc::Receiver<AuditJob>>>,
  events: EventService<S>,
  outcomes: broadcast::Sender<AuditOutcome>,
  timeout: Duration,
) where
  S: AnswerStore + EventStore + 'static,
{
  loop {
    let job = receiver.lock().await.recv().await;
    let Some(job) = job else { break };
    let outcome = record(&events, job, timeout).await;
    let _ = outcomes.send(outcome);
  }
  tracing::debug!(worker, "audit worker stopped");
}

async fn record<S>(
  events: &EventService<S>,
  job: AuditJob,
  timeout: Duration,
) -> AuditOutcome
where
  S: AnswerStore + EventStore,
{
  let AuditJob { snapshot, event_type } = job;
  let write = events.create_event(&snapshot, event_type);

  let reason = match tokio::time::timeout(timeout, write).await {
    Ok(Ok(event)) => {
      tracing::debug!(key = %snapshot.key, %event_type, uid = %event.uid, "event recorded");
      return AuditOutcome::Recorded(event);
    }
    Ok(Err(err)) => err.to_string(),
    Err(_) => format!("timed out after {timeout:?}"),
  };

  tracing::error!(key = %snapshot.key, %event_type, error = %reason, "failed to create event");
  AuditOutcome::Failed { key: snapshot.key, event_type, reason }
}
