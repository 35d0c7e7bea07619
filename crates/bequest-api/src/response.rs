//! The `{success, message, data}` envelope every response is wrapped in.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
}

impl<T> Envelope<T> {
  pub fn ok(message: impl Into<String>, data: T) -> Self {
    Self { success: true, message: message.into(), data: Some(data) }
  }

  /// A success with nothing to return, e.g. a delete.
  pub fn done(message: impl Into<String>) -> Self {
    Self { success: true, message: message.into(), data: None }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self { success: false, message: message.into(), data: None }
  }
}
