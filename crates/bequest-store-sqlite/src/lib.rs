//! SQLite backend for the bequest answer store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] implements both
//! [`AnswerStore`](bequest_core::store::AnswerStore) and
//! [`EventStore`](bequest_core::store::EventStore) over two tables in the
//! same file.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
