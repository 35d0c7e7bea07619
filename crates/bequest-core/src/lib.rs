//! Domain types, store traits and services for the bequest answer store.
//!
//! This crate has no HTTP or database dependencies. The
//! transport (`bequest-api`) and the backends (`bequest-store-sqlite`,
//! [`memory`]) depend on it; it depends on nothing of theirs.

// Store impls use native `async fn`; the traits spell out `Send` on the
// returned futures themselves.
#![allow(async_fn_in_trait)]

pub mod answer;
pub mod audit;
pub mod error;
pub mod event;
pub mod memory;
pub mod page;
pub mod service;
pub mod store;

pub use error::{Error, ErrorKind, Result};
