//! HTTP server assembly for bequest.
//!
//! Holds the runtime configuration and mounts the API router under
//! `/api/v1` with request tracing and a per-request timeout. The `server`
//! binary in `main.rs` wires this to a SQLite store.

use std::{path::PathBuf, time::Duration};

use axum::Router;
use bequest_api::{AppState, api_router};
use bequest_core::{
  audit::AuditConfig,
  store::{AnswerStore, EventStore},
};
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BEQUEST_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub request_timeout_secs: u64,
  pub shutdown_grace_secs:  u64,
  pub audit:                AuditSettings,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "0.0.0.0".to_string(),
      port:                 8080,
      store_path:           PathBuf::from("bequest.db"),
      request_timeout_secs: 5,
      shutdown_grace_secs:  3,
      audit:                AuditSettings::default(),
    }
  }
}

/// The `[audit]` table: sizing for the background event writers.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuditSettings {
  pub workers:        usize,
  pub queue_capacity: usize,
  pub timeout_secs:   u64,
}

impl Default for AuditSettings {
  fn default() -> Self {
    let defaults = AuditConfig::default();
    Self {
      workers:        defaults.workers,
      queue_capacity: defaults.queue_capacity,
      timeout_secs:   defaults.timeout.as_secs(),
    }
  }
}

impl ServerConfig {
  pub fn audit_config(&self) -> AuditConfig {
    AuditConfig {
      workers:        self.audit.workers.max(1),
      queue_capacity: self.audit.queue_capacity.max(1),
      timeout:        Duration::from_secs(self.audit.timeout_secs),
    }
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn shutdown_grace(&self) -> Duration {
    Duration::from_secs(self.shutdown_grace_secs)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>, config: &ServerConfig) -> Router
where
  S: AnswerStore + EventStore + 'static,
{
  Router::new()
    .nest("/api/v1", api_router(state))
    .layer(TraceLayer::new_for_http())
    .layer(TimeoutLayer::new(config.request_timeout()))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use bequest_core::{audit::AuditOutcome, service::Services};
  use bequest_store_sqlite::SqliteStore;
  use config::{Config, File, FileFormat};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("bequest.db"));
    assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.audit_config().workers, 4);
    assert_eq!(cfg.audit_config().queue_capacity, 1024);
  }

  #[test]
  fn partial_config_overrides_only_given_fields() {
    let cfg = parse(
      r#"
      port = 9000
      store_path = "/var/lib/bequest/answers.db"

      [audit]
      workers = 1
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/bequest/answers.db"));
    let audit = cfg.audit_config();
    assert_eq!(audit.workers, 1);
    assert_eq!(audit.queue_capacity, 1024);
    assert_eq!(audit.timeout, Duration::from_secs(5));
  }

  #[test]
  fn zero_workers_is_clamped() {
    let cfg = parse("[audit]\nworkers = 0\nqueue_capacity = 0");
    assert_eq!(cfg.audit_config().workers, 1);
    assert_eq!(cfg.audit_config().queue_capacity, 1);
  }

  async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn sqlite_backed_lifecycle() {
    let cfg = ServerConfig::default();
    let store = SqliteStore::open_in_memory().await.unwrap();
    let services = Services::start(Arc::new(store), &cfg.audit_config());
    let mut outcomes = services.answers.audit().subscribe();
    let app = router(AppState::from(&services), &cfg);

    let (status, body) = call(
      &app,
      "POST",
      "/api/v1/answers",
      Some(json!({"key": "k1", "value": "a"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["value"], "a");

    let (status, body) =
      call(&app, "PUT", "/api/v1/answers/k1", Some(json!({"value": "b"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], "b");

    for _ in 0..2 {
      let outcome = tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .unwrap()
        .unwrap();
      assert!(matches!(outcome, AuditOutcome::Recorded(_)), "{outcome:?}");
    }

    let (status, body) = call(&app, "GET", "/api/v1/answers/k1/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let content = body["data"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["event"], "update");
    assert_eq!(content[0]["data"]["value"], "b");
    assert_eq!(content[1]["event"], "create");
    assert_eq!(content[1]["data"]["value"], "a");

    let (status, _) = call(&app, "DELETE", "/api/v1/answers/k1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "GET", "/api/v1/answers/k1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "answer not found");

    // Workers only stop once every submit handle is gone.
    let Services { answers, workers, .. } = services;
    drop((app, answers));
    assert!(workers.shutdown(Duration::from_secs(3)).await);
  }
}
