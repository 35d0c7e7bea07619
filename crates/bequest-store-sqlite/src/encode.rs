//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanosecond
//! precision, `Z` suffix) so that lexical order in SQL matches time order.
//! UUIDs are stored as hyphenated lowercase strings. An answer's values are a
//! compact JSON array.

use bequest_core::{
  answer::{Answer, DocumentStatus},
  event::{Event, EventData, EventType},
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<DocumentStatus> {
  DocumentStatus::parse(s).ok_or_else(|| Error::Decode {
    column: "status",
    value:  s.to_owned(),
  })
}

pub fn decode_event_type(s: &str) -> Result<EventType> {
  EventType::parse(s).ok_or_else(|| Error::Decode {
    column: "event_type",
    value:  s.to_owned(),
  })
}

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn encode_values(values: &[String]) -> Result<String> {
  Ok(serde_json::to_string(values)?)
}

pub fn decode_values(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAnswer::from_row`].
pub const ANSWER_COLUMNS: &str =
  "id, uid, answer_key, values_json, status, created_at, updated_at, deleted_at";

/// Raw strings read directly from an `answers` row.
pub struct RawAnswer {
  pub id:          String,
  pub uid:         String,
  pub key:         String,
  pub values_json: String,
  pub status:      String,
  pub created_at:  String,
  pub updated_at:  String,
  pub deleted_at:  Option<String>,
}

impl RawAnswer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      uid:         row.get(1)?,
      key:         row.get(2)?,
      values_json: row.get(3)?,
      status:      row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
      deleted_at:  row.get(7)?,
    })
  }

  pub fn into_answer(self) -> Result<Answer> {
    Ok(Answer {
      id:              decode_uuid(&self.id)?,
      uid:             decode_uuid(&self.uid)?,
      key:             self.key,
      values:          decode_values(&self.values_json)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
      deleted_at:      self.deleted_at.as_deref().map(decode_dt).transpose()?,
      document_status: decode_status(&self.status)?,
    })
  }
}

/// Column list matching [`RawEvent::from_row`].
pub const EVENT_COLUMNS: &str = "id, uid, event_type, data_key, data_value, \
                                 status, created_at, updated_at, deleted_at";

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub id:         String,
  pub uid:        String,
  pub event_type: String,
  pub data_key:   String,
  pub data_value: String,
  pub status:     String,
  pub created_at: String,
  pub updated_at: String,
  pub deleted_at: Option<String>,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      uid:        row.get(1)?,
      event_type: row.get(2)?,
      data_key:   row.get(3)?,
      data_value: row.get(4)?,
      status:     row.get(5)?,
      created_at: row.get(6)?,
      updated_at: row.get(7)?,
      deleted_at: row.get(8)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:              decode_uuid(&self.id)?,
      uid:             decode_uuid(&self.uid)?,
      event_type:      decode_event_type(&self.event_type)?,
      data:            EventData { key: self.data_key, value: self.data_value },
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
      deleted_at:      self.deleted_at.as_deref().map(decode_dt).transpose()?,
      document_status: decode_status(&self.status)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let later = whole + chrono::Duration::nanoseconds(1_500);
    let (a, b) = (encode_dt(whole), encode_dt(later));
    assert_eq!(a.len(), b.len());
    assert!(a < b, "{a} !< {b}");
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn unknown_status_is_a_decode_error() {
    assert!(matches!(
      decode_status("Archived"),
      Err(Error::Decode { column: "status", .. })
    ));
  }
}
