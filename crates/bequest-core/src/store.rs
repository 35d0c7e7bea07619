//! The `AnswerStore` and `EventStore` traits.
//!
//! Storage backends (e.g. `bequest-store-sqlite`, [`crate::memory`])
//! implement both. The services depend on these abstractions only, never on a
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  answer::Answer,
  event::Event,
  page::{Pageable, PaginationData},
};

/// Errors returned by a store backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// Whether the failure was the active-key uniqueness constraint rejecting
  /// an insert.
  fn is_duplicate_key(&self) -> bool;
}

// ─── Answers ─────────────────────────────────────────────────────────────────

/// Persistence for answers.
///
/// Implementations must guarantee that at most one answer per key has
/// `Active` status, and reject inserts that would break that with an error
/// whose [`StoreError::is_duplicate_key`] is `true`. Deleted answers do not
/// participate in the constraint.
pub trait AnswerStore: Send + Sync {
  type Error: StoreError;

  /// Insert a new answer.
  fn create_answer<'a>(
    &'a self,
    answer: &'a Answer,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The active answer for `key`, if any.
  fn find_by_key<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Answer>, Self::Error>> + Send + 'a;

  /// Push `value` onto the active answer's history and set `updated_at`.
  ///
  /// The push and the read of the result happen as one step, so the returned
  /// answer ends with `value`. Returns `None` if no active answer exists.
  fn append_value<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Answer>, Self::Error>> + Send + 'a;

  /// Flip the active answer for `key` to `Deleted`. Its values are kept.
  ///
  /// The flip and the read of the result happen as one step, so the returned
  /// answer holds the values in place at the moment of deletion. Returns
  /// `None` if there was no active answer to delete.
  fn mark_deleted<'a>(
    &'a self,
    key: &'a str,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Answer>, Self::Error>> + Send + 'a;
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Append-only persistence for audit events.
pub trait EventStore: Send + Sync {
  type Error: StoreError;

  /// Insert an event. Events are never updated afterwards.
  fn create_event<'a>(
    &'a self,
    event: &'a Event,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Active events whose `data.key` is `key`, ordered by `created_at` in
  /// `pageable.sort` direction, sliced to the requested page.
  fn find_many_by_key<'a>(
    &'a self,
    key: &'a str,
    pageable: &'a Pageable,
  ) -> impl Future<Output = Result<(Vec<Event>, PaginationData), Self::Error>>
  + Send
  + 'a;
}
