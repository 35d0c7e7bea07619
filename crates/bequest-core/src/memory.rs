//! [`MemoryStore`] — an in-process implementation of both store traits.
//!
//! Backs the service and HTTP tests, and is handy for local development
//! without a database file. Nothing is persisted.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
  answer::{Answer, DocumentStatus},
  event::Event,
  page::{Pageable, PaginationData, SortOrder},
  store::{AnswerStore, EventStore, StoreError},
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  #[error("an active answer with key {0:?} already exists")]
  DuplicateKey(String),
}

impl StoreError for MemoryStoreError {
  fn is_duplicate_key(&self) -> bool { matches!(self, Self::DuplicateKey(_)) }
}

#[derive(Default)]
struct Inner {
  /// Every answer ever created, deleted ones included.
  answers: Vec<Answer>,
  /// Events in insertion order; ties on `created_at` keep this order.
  events:  Vec<Event>,
}

/// Cloning is cheap; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    // A panic while holding the lock leaves plain data behind; keep serving.
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Every answer stored under `key`, deleted ones included, oldest first.
  pub fn all_answers(&self, key: &str) -> Vec<Answer> {
    self.lock().answers.iter().filter(|a| a.key == key).cloned().collect()
  }
}

fn active_mut<'a>(inner: &'a mut Inner, key: &str) -> Option<&'a mut Answer> {
  inner.answers.iter_mut().find(|a| a.key == key && a.is_active())
}

impl AnswerStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn create_answer(&self, answer: &Answer) -> Result<(), Self::Error> {
    let mut inner = self.lock();
    if answer.is_active() && active_mut(&mut inner, &answer.key).is_some() {
      return Err(MemoryStoreError::DuplicateKey(answer.key.clone()));
    }
    inner.answers.push(answer.clone());
    Ok(())
  }

  async fn find_by_key(&self, key: &str) -> Result<Option<Answer>, Self::Error> {
    Ok(active_mut(&mut self.lock(), key).map(|a| a.clone()))
  }

  async fn append_value(
    &self,
    key: &str,
    value: &str,
    at: DateTime<Utc>,
  ) -> Result<Option<Answer>, Self::Error> {
    let mut inner = self.lock();
    Ok(active_mut(&mut inner, key).map(|answer| {
      answer.values.push(value.to_owned());
      answer.updated_at = at;
      answer.clone()
    }))
  }

  async fn mark_deleted(
    &self,
    key: &str,
    at: DateTime<Utc>,
  ) -> Result<Option<Answer>, Self::Error> {
    let mut inner = self.lock();
    Ok(active_mut(&mut inner, key).map(|answer| {
      answer.document_status = DocumentStatus::Deleted;
      answer.updated_at = at;
      answer.deleted_at = Some(at);
      answer.clone()
    }))
  }
}

impl EventStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn create_event(&self, event: &Event) -> Result<(), Self::Error> {
    self.lock().events.push(event.clone());
    Ok(())
  }

  async fn find_many_by_key(
    &self,
    key: &str,
    pageable: &Pageable,
  ) -> Result<(Vec<Event>, PaginationData), Self::Error> {
    let mut matching: Vec<Event> = self
      .lock()
      .events
      .iter()
      .filter(|e| {
        e.data.key == key && e.document_status == DocumentStatus::Active
      })
      .cloned()
      .collect();

    // Stable sorts keep insertion order among equal timestamps.
    match pageable.sort {
      SortOrder::Ascending => matching.sort_by_key(|e| e.created_at),
      SortOrder::Descending => {
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
      }
    }

    let total = matching.len() as u64;
    let page = matching
      .into_iter()
      .skip(usize::try_from(pageable.offset()).unwrap_or(usize::MAX))
      .take(usize::try_from(pageable.per_page).unwrap_or(usize::MAX))
      .collect();

    Ok((page, PaginationData::new(total, pageable)))
  }
}
