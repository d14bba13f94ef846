//! Database migrations

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};

/// Current schema version
const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.unwrap_or(0))
}

/// Apply a migration's statements atomically
fn apply(conn: &Connection, statements: &[&str]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for stmt in statements {
        tx.execute_batch(stmt)?;
    }
    tx.commit()?;
    Ok(())
}

/// Migration to version 1: Initial schema
fn migrate_v1(conn: &Connection) -> Result<()> {
    apply(
        conn,
        &[
            // Schema version tracking
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            // Tasks, keyed by the client-generated task id
            "CREATE TABLE IF NOT EXISTS tasks (
                user_id TEXT NOT NULL,
                task_id TEXT NOT NULL,
                server_id INTEGER,
                content TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                complete INTEGER NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                todo_time INTEGER,
                create_time INTEGER NOT NULL,
                reminder_time INTEGER,
                task_sort REAL NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 0,
                sync_time INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'added',
                category_id INTEGER NOT NULL DEFAULT 0,
                category_name TEXT NOT NULL DEFAULT '',
                category_color TEXT NOT NULL DEFAULT '',
                subtasks TEXT NOT NULL DEFAULT '[]',
                attachments TEXT NOT NULL DEFAULT '[]',
                PRIMARY KEY (user_id, task_id)
            )",
            "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(user_id, status)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_todo_time ON tasks(user_id, todo_time)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_complete ON tasks(complete)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_deleted ON tasks(is_deleted)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_sort ON tasks(task_sort)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(create_time)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_sync_time ON tasks(sync_time DESC)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_version ON tasks(version)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category_id)",
            // Category display data, owned by the category store
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL
            )",
            // Settings table (local only)
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            // Per-user sync bookkeeping
            "CREATE TABLE IF NOT EXISTS sync_state (
                user_id TEXT PRIMARY KEY,
                first_sync_completed INTEGER NOT NULL DEFAULT 0,
                completed_at INTEGER
            )",
            "INSERT INTO schema_version (version) VALUES (1)",
        ],
    )?;

    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: LWW conflict logging support
fn migrate_v2(conn: &Connection) -> Result<()> {
    apply(
        conn,
        &[
            "CREATE TABLE IF NOT EXISTS sync_conflicts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id TEXT NOT NULL,
                local_sync_time INTEGER NOT NULL,
                incoming_sync_time INTEGER NOT NULL,
                resolved_at INTEGER NOT NULL,
                strategy TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_sync_conflicts_task_id ON sync_conflicts(task_id)",
            "CREATE INDEX IF NOT EXISTS idx_sync_conflicts_resolved_at ON sync_conflicts(resolved_at DESC)",
            "INSERT INTO schema_version (version) VALUES (2)",
        ],
    )?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
