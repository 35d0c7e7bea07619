//! Error types for `bequest-core`.

use thiserror::Error;

/// The category of an [`Error`]. Transports map these to status codes; the
/// core never deals in status codes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  DuplicateKey,
  Validation,
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("answer not found")]
  AnswerNotFound(String),

  #[error("an answer with this key already exists")]
  DuplicateKey(String),

  #[error("{0}")]
  Validation(String),

  #[error("answer {0:?} has no values to record")]
  EmptyAnswer(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::AnswerNotFound(_) => ErrorKind::NotFound,
      Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
      Self::Validation(_) => ErrorKind::Validation,
      Self::EmptyAnswer(_) | Self::Internal(_) => ErrorKind::Internal,
    }
  }

  /// Wrap a store failure that has no domain meaning.
  pub(crate) fn internal<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Internal(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
