//! [`SqliteStore`] — the SQLite implementation of [`AnswerStore`] and
//! [`EventStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use bequest_core::{
  answer::{Answer, DocumentStatus},
  event::Event,
  page::{Pageable, PaginationData, SortOrder},
  store::{AnswerStore, EventStore},
};

use crate::{
  encode::{
    ANSWER_COLUMNS, EVENT_COLUMNS, RawAnswer, RawEvent, encode_dt, encode_uuid,
    encode_values,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A bequest store backed by a single SQLite file.
///
/// Clones share one background connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory database. Nothing survives the process.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Whether `err` is SQLite rejecting a row for a UNIQUE index.
fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn find_active(
  conn: &rusqlite::Connection,
  key: &str,
) -> rusqlite::Result<Option<RawAnswer>> {
  conn
    .query_row(
      &format!(
        "SELECT {ANSWER_COLUMNS} FROM answers
         WHERE answer_key = ?1 AND status = 'Active'"
      ),
      rusqlite::params![key],
      RawAnswer::from_row,
    )
    .optional()
}

fn sql_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── AnswerStore impl ────────────────────────────────────────────────────────

impl AnswerStore for SqliteStore {
  type Error = Error;

  async fn create_answer(&self, answer: &Answer) -> Result<()> {
    let id_str      = encode_uuid(answer.id);
    let uid_str     = encode_uuid(answer.uid);
    let key         = answer.key.clone();
    let values_str  = encode_values(&answer.values)?;
    let status      = answer.document_status.as_str();
    let created_str = encode_dt(answer.created_at);
    let updated_str = encode_dt(answer.updated_at);
    let deleted_str = answer.deleted_at.map(encode_dt);

    let result = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO answers (
             id, uid, answer_key, values_json, status,
             created_at, updated_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            uid_str,
            key,
            values_str,
            status,
            created_str,
            updated_str,
            deleted_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match result {
      Ok(()) => Ok(()),
      Err(e) if is_unique_violation(&e) => {
        Err(Error::DuplicateKey(answer.key.clone()))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn find_by_key(&self, key: &str) -> Result<Option<Answer>> {
    let key = key.to_owned();

    let raw: Option<RawAnswer> = self
      .conn
      .call(move |conn| Ok(find_active(conn, &key)?))
      .await?;

    raw.map(RawAnswer::into_answer).transpose()
  }

  async fn append_value(
    &self,
    key:   &str,
    value: &str,
    at:    DateTime<Utc>,
  ) -> Result<Option<Answer>> {
    let key    = key.to_owned();
    let value  = value.to_owned();
    let at_str = encode_dt(at);

    let raw: Option<RawAnswer> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE answers
           SET values_json = json_insert(values_json, '$[#]', ?2),
               updated_at  = ?3
           WHERE answer_key = ?1 AND status = 'Active'",
          rusqlite::params![key, value, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = find_active(&tx, &key)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawAnswer::into_answer).transpose()
  }

  async fn mark_deleted(
    &self,
    key: &str,
    at:  DateTime<Utc>,
  ) -> Result<Option<Answer>> {
    let key     = key.to_owned();
    let at_str  = encode_dt(at);
    let deleted = DocumentStatus::Deleted.as_str();

    let raw: Option<RawAnswer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE answers
               SET status = ?2, updated_at = ?3, deleted_at = ?3
               WHERE answer_key = ?1 AND status = 'Active'
               RETURNING {ANSWER_COLUMNS}"
            ),
            rusqlite::params![key, deleted, at_str],
            RawAnswer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAnswer::into_answer).transpose()
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn create_event(&self, event: &Event) -> Result<()> {
    let id_str      = encode_uuid(event.id);
    let uid_str     = encode_uuid(event.uid);
    let event_type  = event.event_type.as_str();
    let data_key    = event.data.key.clone();
    let data_value  = event.data.value.clone();
    let status      = event.document_status.as_str();
    let created_str = encode_dt(event.created_at);
    let updated_str = encode_dt(event.updated_at);
    let deleted_str = event.deleted_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             id, uid, event_type, data_key, data_value, status,
             created_at, updated_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            uid_str,
            event_type,
            data_key,
            data_value,
            status,
            created_str,
            updated_str,
            deleted_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_many_by_key(
    &self,
    key:      &str,
    pageable: &Pageable,
  ) -> Result<(Vec<Event>, PaginationData)> {
    let key = key.to_owned();
    let dir = match pageable.sort {
      SortOrder::Ascending => "ASC",
      SortOrder::Descending => "DESC",
    };
    let limit  = sql_count(pageable.per_page);
    let offset = sql_count(pageable.offset());

    let (total, raws): (i64, Vec<RawEvent>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM events
           WHERE data_key = ?1 AND status = 'Active'",
          rusqlite::params![key],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE data_key = ?1 AND status = 'Active'
           ORDER BY created_at {dir}, seq {dir}
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![key, limit, offset], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let events = raws
      .into_iter()
      .map(RawEvent::into_event)
      .collect::<Result<Vec<_>>>()?;
    let pagination = PaginationData::new(total.unsigned_abs(), pageable);
    Ok((events, pagination))
  }
}
