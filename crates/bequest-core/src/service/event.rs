//! [`EventService`] — writes audit events and serves key history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  answer::Answer,
  event::{Event, EventType},
  page::{Pageable, PaginationData},
  store::{AnswerStore, EventStore},
};

/// One page of a key's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
  pub content:    Vec<Event>,
  pub pagination: PaginationData,
}

pub struct EventService<S> {
  store: Arc<S>,
}

impl<S> Clone for EventService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> EventService<S>
where
  S: AnswerStore + EventStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Persist the event describing `event_type` applied to `snapshot`.
  ///
  /// Called from the audit workers; a failure here is theirs to log and never
  /// reaches whoever triggered the mutation.
  pub async fn create_event(
    &self,
    snapshot: &Answer,
    event_type: EventType,
  ) -> Result<Event> {
    let event = Event::from_snapshot(snapshot, event_type)?;
    self
      .store
      .create_event(&event)
      .await
      .map_err(Error::internal)?;
    Ok(event)
  }

  /// A page of events for `key`.
  ///
  /// The key must currently resolve to an active answer; history of a
  /// deleted key is kept but not served.
  pub async fn find_history_by_key(
    &self,
    key: &str,
    pageable: &Pageable,
  ) -> Result<History> {
    let answer = self
      .store
      .find_by_key(key)
      .await
      .map_err(Error::internal)?
      .ok_or_else(|| Error::AnswerNotFound(key.to_owned()))?;

    let (content, pagination) = self
      .store
      .find_many_by_key(&answer.key, pageable)
      .await
      .map_err(Error::internal)?;

    Ok(History { content, pagination })
  }
}
