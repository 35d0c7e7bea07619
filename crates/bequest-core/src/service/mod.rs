//! The answer and event services, and [`Services`] to wire them together.

mod answer;
mod event;

pub use answer::AnswerService;
pub use event::{EventService, History};

use std::sync::Arc;

use crate::{
  audit::{AuditConfig, AuditQueue, AuditWorkers},
  store::{AnswerStore, EventStore},
};

/// Both services over one backend, plus the audit workers feeding it.
pub struct Services<S> {
  pub answers: AnswerService<S>,
  pub events:  EventService<S>,
  pub workers: AuditWorkers,
}

impl<S> Services<S>
where
  S: AnswerStore + EventStore + 'static,
{
  /// Start the audit workers and build both services around `store`.
  /// Must be called from within a tokio runtime.
  pub fn start(store: Arc<S>, audit: &AuditConfig) -> Self {
    let events = EventService::new(Arc::clone(&store));
    let (queue, workers) = AuditQueue::start(events.clone(), audit);
    Self {
      answers: AnswerService::new(store, queue),
      events,
      workers,
    }
  }
}
