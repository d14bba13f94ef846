//! Database layer for todosync

mod category_repository;
mod connection;
mod migrations;
mod settings_repository;
mod task_repository;

pub use category_repository::{CategoryRepository, SqliteCategoryRepository};
pub use connection::Database;
pub use settings_repository::{SettingsRepository, SqliteSettingsRepository};
pub use task_repository::{DayQuery, LocalEdit, SqliteTaskRepository, TaskRepository, UpsertOutcome};
