//! Error type for `bequest-store-sqlite`.

use bequest_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value no domain type decodes from.
  #[error("unexpected {column} value: {value:?}")]
  Decode { column: &'static str, value: String },

  /// The partial unique index on active keys rejected an insert.
  #[error("an active answer with key {0:?} already exists")]
  DuplicateKey(String),
}

impl StoreError for Error {
  fn is_duplicate_key(&self) -> bool { matches!(self, Self::DuplicateKey(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
