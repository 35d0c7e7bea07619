//! JSON REST API for bequest.
//!
//! Exposes an axum [`Router`] over the answer and event services for any
//! backend implementing both store traits. Every response, success or
//! failure, is wrapped in a [`response::Envelope`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", bequest_api::api_router(state))
//! ```

pub mod answers;
pub mod error;
pub mod response;

use axum::{
  Router,
  routing::{get, post},
};
use bequest_core::{
  service::{AnswerService, EventService, Services},
  store::{AnswerStore, EventStore},
};

pub use error::{ApiError, status_for};

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub answers: AnswerService<S>,
  pub events:  EventService<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      answers: self.answers.clone(),
      events:  self.events.clone(),
    }
  }
}

impl<S> From<&Services<S>> for AppState<S> {
  fn from(services: &Services<S>) -> Self {
    Self {
      answers: services.answers.clone(),
      events:  services.events.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: AnswerStore + EventStore + 'static,
{
  Router::new()
    .route("/answers", post(answers::create::<S>))
    .route(
      "/answers/{key}",
      get(answers::get_one::<S>)
        .put(answers::update::<S>)
        .delete(answers::delete::<S>),
    )
    .route("/answers/{key}/history", get(answers::history::<S>))
    .with_state(state)
}
