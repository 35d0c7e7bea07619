//! Answer — the current state of a key.
//!
//! An answer owns an append-only list of every value it has held. Updates
//! push onto that list; deletion only flips the status, so the history of a
//! deleted answer survives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status shared by answers and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentStatus {
  #[default]
  Active,
  Deleted,
}

impl DocumentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "Active",
      Self::Deleted => "Deleted",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "Active" => Some(Self::Active),
      "Deleted" => Some(Self::Deleted),
      _ => None,
    }
  }
}

/// A keyed value together with every value it previously held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
  /// Storage identifier; never exposed to clients.
  #[serde(skip)]
  pub id:              Uuid,
  /// Client-facing identifier, fixed at creation.
  pub uid:             Uuid,
  pub key:             String,
  /// Every value in the order it was written. Never shrinks.
  pub values:          Vec<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at:      Option<DateTime<Utc>>,
  pub document_status: DocumentStatus,
}

impl Answer {
  /// A fresh, active answer whose history starts with `value`.
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      id:              Uuid::new_v4(),
      uid:             Uuid::new_v4(),
      key:             key.into(),
      values:          vec![value.into()],
      created_at:      now,
      updated_at:      now,
      deleted_at:      None,
      document_status: DocumentStatus::Active,
    }
  }

  /// The value currently in effect.
  pub fn current_value(&self) -> Option<&str> {
    self.values.last().map(String::as_str)
  }

  pub fn is_active(&self) -> bool {
    self.document_status == DocumentStatus::Active
  }
}
