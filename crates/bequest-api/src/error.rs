//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use bequest_core::ErrorKind;
use thiserror::Error;

use crate::response::Envelope;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Service(#[from] bequest_core::Error),

  /// The request body was missing, not JSON, or the wrong shape.
  #[error("{0}")]
  BadRequest(String),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

/// The HTTP status for each core error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::DuplicateKey => StatusCode::FORBIDDEN,
    ErrorKind::Validation => StatusCode::BAD_REQUEST,
    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Service(e) if e.kind() == ErrorKind::Internal => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
      ApiError::Service(e) => (status_for(e.kind()), e.to_string()),
    };
    (status, Json(Envelope::<()>::failure(message))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicate_key_is_forbidden() {
    assert_eq!(status_for(ErrorKind::DuplicateKey), StatusCode::FORBIDDEN);
    assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
    assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
    assert_eq!(
      status_for(ErrorKind::Internal),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn internal_errors_do_not_leak_details() {
    let source = std::io::Error::other("disk on fire");
    let err = ApiError::Service(bequest_core::Error::Internal(Box::new(source)));
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
