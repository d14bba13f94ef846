use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] todosync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No task content provided")]
    EmptyContent,
    #[error("Task ID cannot be empty")]
    EmptyTaskId,
    #[error("Category name cannot be empty")]
    EmptyCategoryName,
    #[error("Task not found for id/prefix: {0}")]
    TaskNotFound(String),
    #[error("{0}")]
    AmbiguousTaskId(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Run `todosync config init --api-url <URL>` or set TODOSYNC_API_URL."
    )]
    SyncNotConfigured,
}
