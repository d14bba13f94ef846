//! todosync-core - Core library for todosync
//!
//! This crate contains the task models, the local `SQLite` store, the remote
//! sync client, and the reconciliation engine that keeps the two in step.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod sync;
pub mod util;

pub use error::{Error, ErrorKind, Result};
pub use models::{CategorySnapshot, SyncConflict, TaskId, TaskRecord, TaskStatus};
pub use services::TaskStore;
