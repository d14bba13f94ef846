use std::env;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Local, NaiveDate, Offset};
use serde::Serialize;
use todosync_core::db::DayQuery;
use todosync_core::{SyncConflict, TaskId, TaskRecord, TaskStore};

use crate::error::CliError;

const SHORT_ID_LEN: usize = 24;

#[derive(Debug, Serialize)]
pub struct TaskListItem {
    pub task_id: String,
    pub content: String,
    pub description: String,
    pub complete: bool,
    pub deleted: bool,
    pub status: String,
    pub due_date: Option<String>,
    pub category: String,
    pub subtasks_done: usize,
    pub subtasks_total: usize,
    pub sync_time: i64,
    pub version: i64,
}

#[derive(Debug, Serialize)]
pub struct SyncConflictItem {
    pub id: i64,
    pub task_id: String,
    pub local_sync_time: i64,
    pub incoming_sync_time: i64,
    pub resolved_at: i64,
    pub resolved_at_iso: String,
    pub strategy: String,
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os("TODOSYNC_DB_PATH").map(PathBuf::from))
    {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("todosync").join("todosync.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn open_store(path: &Path) -> Result<TaskStore, CliError> {
    Ok(TaskStore::open_path(path)?)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_task_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyTaskId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidDate(value.trim().to_string()))
}

pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Local-midnight timestamp used as a task's due date
pub fn due_timestamp(date: NaiveDate, offset: FixedOffset) -> i64 {
    DayQuery::for_date(date, offset).start
}

pub fn format_due_date(timestamp_ms: i64, offset: FixedOffset) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|date_time| date_time.with_timezone(&offset).format("%Y-%m-%d").to_string())
}

/// Resolve an exact task id, or a prefix matching exactly one of the user's tasks
pub async fn resolve_task(
    query: &str,
    user_id: &str,
    store: &TaskStore,
) -> Result<TaskRecord, CliError> {
    let query = normalize_task_identifier(query)?;
    if let Some(task) = store.get_task(user_id, &TaskId::from(query.as_str())).await? {
        return Ok(task);
    }

    let mut matches = store
        .list_all(user_id)
        .await?
        .into_iter()
        .filter(|task| task.task_id.as_str().starts_with(&query))
        .collect::<Vec<_>>();

    match matches.len() {
        0 => Err(CliError::TaskNotFound(query)),
        1 => Ok(matches.remove(0)),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|task| task.task_id.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousTaskId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn task_to_list_item(task: &TaskRecord, offset: FixedOffset) -> TaskListItem {
    let subtasks = task.effective_subtasks();
    TaskListItem {
        task_id: task.task_id.to_string(),
        content: task.content.clone(),
        description: task.description.clone(),
        complete: task.complete,
        deleted: task.deleted,
        status: task.status.to_string(),
        due_date: task
            .todo_time
            .and_then(|timestamp| format_due_date(timestamp, offset)),
        category: task.category_name.clone(),
        subtasks_done: subtasks.iter().filter(|subtask| subtask.complete).count(),
        subtasks_total: subtasks.len(),
        sync_time: task.sync_time,
        version: task.version,
    }
}

pub fn format_task_lines(tasks: &[TaskRecord], offset: FixedOffset) -> Vec<String> {
    tasks
        .iter()
        .map(|task| {
            let item = task_to_list_item(task, offset);
            let short_id = item.task_id.chars().take(SHORT_ID_LEN).collect::<String>();
            let marker = if item.complete { "[x]" } else { "[ ]" };
            let preview = task_preview(&item.content, 40);

            let mut line = format!("{short_id:<24}  {marker} {preview:<40}  {}", item.category);
            if let Some(date) = item.due_date {
                line.push_str(&format!("  due {date}"));
            }
            if item.subtasks_total > 0 {
                line.push_str(&format!("  ({}/{})", item.subtasks_done, item.subtasks_total));
            }
            if task.is_dirty() {
                line.push_str(&format!("  *{}", item.status));
            }
            line
        })
        .collect()
}

pub fn task_preview(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn print_tasks(tasks: &[TaskRecord], as_json: bool, empty_message: &str) -> Result<(), CliError> {
    let offset = local_offset();
    if as_json {
        let items = tasks
            .iter()
            .map(|task| task_to_list_item(task, offset))
            .collect::<Vec<TaskListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }

    for line in format_task_lines(tasks, offset) {
        println!("{line}");
    }
    Ok(())
}

pub fn sync_conflict_to_item(conflict: &SyncConflict) -> SyncConflictItem {
    SyncConflictItem {
        id: conflict.id,
        task_id: conflict.task_id.clone(),
        local_sync_time: conflict.local_sync_time,
        incoming_sync_time: conflict.incoming_sync_time,
        resolved_at: conflict.resolved_at,
        resolved_at_iso: format_sync_timestamp(conflict.resolved_at),
        strategy: conflict.strategy.clone(),
    }
}

pub fn format_sync_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{}  {:<4}  task={}  local={} incoming={}",
                format_sync_timestamp(conflict.resolved_at),
                conflict.strategy,
                conflict.task_id,
                conflict.local_sync_time,
                conflict.incoming_sync_time
            )
        })
        .collect()
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}
