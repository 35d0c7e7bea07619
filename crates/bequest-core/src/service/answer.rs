//! [`AnswerService`] — key uniqueness, versioning and soft deletion.
//!
//! Every successful mutation submits a snapshot to the [`AuditQueue`] and
//! returns without waiting for the event to be written.
//!
//! Update and delete look the answer up before writing and the two steps are
//! not atomic: concurrent updates to one key land in whatever order the store
//! applies them, with no compare-and-swap. Each individual append is applied
//! as a single store step, so no value is ever lost or overwritten.

use std::sync::Arc;

use chrono::Utc;

use crate::{
  Error, Result,
  answer::Answer,
  audit::AuditQueue,
  event::EventType,
  store::{AnswerStore, EventStore, StoreError},
};

pub struct AnswerService<S> {
  store: Arc<S>,
  audit: AuditQueue,
}

impl<S> Clone for AnswerService<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      audit: self.audit.clone(),
    }
  }
}

fn require(field: &str, value: &str) -> Result<()> {
  if value.is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  Ok(())
}

impl<S> AnswerService<S>
where
  S: AnswerStore + EventStore,
{
  pub fn new(store: Arc<S>, audit: AuditQueue) -> Self { Self { store, audit } }

  /// The submit handle this service records events through.
  pub fn audit(&self) -> &AuditQueue { &self.audit }

  /// Store `value` under a key that has no active answer.
  pub async fn create_answer(&self, key: &str, value: &str) -> Result<Answer> {
    require("key", key)?;
    require("value", value)?;

    let answer = Answer::new(key, value);
    self.store.create_answer(&answer).await.map_err(|e| {
      if e.is_duplicate_key() {
        Error::DuplicateKey(key.to_owned())
      } else {
        Error::internal(e)
      }
    })?;

    tracing::debug!(key, uid = %answer.uid, "answer created");
    self.audit.submit(answer.clone(), EventType::Create);
    Ok(answer)
  }

  /// The active answer for `key`. Its current value is the last element of
  /// `values`.
  pub async fn find_answer_by_key(&self, key: &str) -> Result<Answer> {
    require("key", key)?;
    self
      .store
      .find_by_key(key)
      .await
      .map_err(Error::internal)?
      .ok_or_else(|| Error::AnswerNotFound(key.to_owned()))
  }

  /// Append `value` to the active answer's history.
  pub async fn update_answer(&self, key: &str, value: &str) -> Result<Answer> {
    require("value", value)?;
    let current = self.find_answer_by_key(key).await?;

    // A delete may have slipped in since the lookup.
    let updated = self
      .store
      .append_value(&current.key, value, Utc::now())
      .await
      .map_err(Error::internal)?
      .ok_or_else(|| Error::AnswerNotFound(key.to_owned()))?;

    tracing::debug!(key, versions = updated.values.len(), "answer updated");
    self.audit.submit(updated.clone(), EventType::Update);
    Ok(updated)
  }

  /// Soft-delete the active answer. The key becomes free for a new answer;
  /// the old answer's values stay stored.
  ///
  /// The delete event carries the value in place when the status flipped,
  /// even if an update landed after the lookup.
  pub async fn delete_answer(&self, key: &str) -> Result<()> {
    let current = self.find_answer_by_key(key).await?;

    // A concurrent delete may have slipped in since the lookup.
    let deleted = self
      .store
      .mark_deleted(&current.key, Utc::now())
      .await
      .map_err(Error::internal)?
      .ok_or_else(|| Error::AnswerNotFound(key.to_owned()))?;

    tracing::debug!(key, uid = %deleted.uid, "answer deleted");
    self.audit.submit(deleted, EventType::Delete);
    Ok(())
  }
}
