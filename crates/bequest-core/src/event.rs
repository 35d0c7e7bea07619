//! Event — the immutable audit record written for every answer mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, answer::Answer, answer::DocumentStatus};

/// Which mutation an [`Event`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
  Create,
  Update,
  Delete,
}

impl EventType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Update => "update",
      Self::Delete => "delete",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "create" => Some(Self::Create),
      "update" => Some(Self::Update),
      "delete" => Some(Self::Delete),
      _ => None,
    }
  }
}

impl std::fmt::Display for EventType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The `{key, value}` pair captured at the moment of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
  pub key:   String,
  pub value: String,
}

/// One audit record. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  #[serde(skip)]
  pub id:              Uuid,
  pub uid:             Uuid,
  #[serde(rename = "event")]
  pub event_type:      EventType,
  pub data:            EventData,
  /// When the recorded mutation happened.
  pub created_at:      DateTime<Utc>,
  /// When this record was written.
  pub updated_at:      DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at:      Option<DateTime<Utc>>,
  pub document_status: DocumentStatus,
}

impl Event {
  /// Build the record for `event_type` applied to `snapshot`.
  ///
  /// The data value is the last element of `snapshot.values`, and
  /// `created_at` is the timestamp the snapshot carries for that transition,
  /// so history ordering follows mutation order rather than write order.
  pub fn from_snapshot(snapshot: &Answer, event_type: EventType) -> Result<Self> {
    let value = snapshot
      .current_value()
      .ok_or_else(|| Error::EmptyAnswer(snapshot.key.clone()))?
      .to_owned();

    let occurred_at = match event_type {
      EventType::Create => snapshot.created_at,
      EventType::Update => snapshot.updated_at,
      EventType::Delete => snapshot.deleted_at.unwrap_or(snapshot.updated_at),
    };

    Ok(Self {
      id:              Uuid::new_v4(),
      uid:             Uuid::new_v4(),
      event_type,
      data:            EventData { key: snapshot.key.clone(), value },
      created_at:      occurred_at,
      updated_at:      Utc::now(),
      deleted_at:      None,
      document_status: DocumentStatus::Active,
    })
  }
}
