//! Handlers for `/answers` endpoints.
//!
//! | Method   | Path                     | Notes |
//! |----------|--------------------------|-------|
//! | `POST`   | `/answers`               | Body: `{"key":"..","value":".."}`; 201 |
//! | `GET`    | `/answers/{key}`         | Current value; 404 if no active answer |
//! | `PUT`    | `/answers/{key}`         | Body: `{"value":".."}` |
//! | `DELETE` | `/answers/{key}`         | Soft delete |
//! | `GET`    | `/answers/{key}/history` | `?page=&perPage=&sort=` |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use bequest_core::{
  answer::Answer,
  page::Pageable,
  service::History,
  store::{AnswerStore, EventStore},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, response::Envelope};

// ─── Projection ──────────────────────────────────────────────────────────────

/// What clients see of an answer: only its current value.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
  pub uid:        Uuid,
  pub key:        String,
  pub value:      String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<Answer> for AnswerResponse {
  fn from(answer: Answer) -> Self {
    let value = answer.current_value().unwrap_or_default().to_owned();
    Self {
      uid: answer.uid,
      key: answer.key,
      value,
      created_at: answer.created_at,
      updated_at: answer.updated_at,
    }
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub key:   String,
  pub value: String,
}

/// `POST /answers`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnswerStore + EventStore + 'static,
{
  let Json(body) = body?;
  let answer = state.answers.create_answer(&body.key, &body.value).await?;
  Ok((
    StatusCode::CREATED,
    Json(Envelope::ok(
      "answer created successfully",
      AnswerResponse::from(answer),
    )),
  ))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /answers/{key}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Envelope<AnswerResponse>>, ApiError>
where
  S: AnswerStore + EventStore + 'static,
{
  let answer = state.answers.find_answer_by_key(&key).await?;
  Ok(Json(Envelope::ok(
    "answer retrieved successfully",
    AnswerResponse::from(answer),
  )))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub value: String,
}

/// `PUT /answers/{key}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
  body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Json<Envelope<AnswerResponse>>, ApiError>
where
  S: AnswerStore + EventStore + 'static,
{
  let Json(body) = body?;
  let answer = state.answers.update_answer(&key, &body.value).await?;
  Ok(Json(Envelope::ok(
    "answer updated successfully",
    AnswerResponse::from(answer),
  )))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /answers/{key}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError>
where
  S: AnswerStore + EventStore + 'static,
{
  state.answers.delete_answer(&key).await?;
  Ok(Json(Envelope::done("answer deleted successfully")))
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Raw query strings. Anything that doesn't parse as an integer falls back
/// to the default for that parameter instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
  pub page:     Option<String>,
  #[serde(rename = "perPage")]
  pub per_page: Option<String>,
  pub sort:     Option<String>,
}

impl HistoryParams {
  pub fn pageable(&self) -> Pageable {
    let int = |raw: &Option<String>| -> Option<i64> {
      raw.as_deref().and_then(|s| s.trim().parse().ok())
    };
    Pageable::new(int(&self.page), int(&self.per_page), int(&self.sort))
  }
}

/// `GET /answers/{key}/history[?page=<n>][&perPage=<n>][&sort=1|-1]`
pub async fn history<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Envelope<History>>, ApiError>
where
  S: AnswerStore + EventStore + 'static,
{
  let history = state
    .events
    .find_history_by_key(&key, &params.pageable())
    .await?;
  Ok(Json(Envelope::ok("retrieved history", history)))
}
