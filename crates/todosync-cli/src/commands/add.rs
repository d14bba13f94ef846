use std::path::Path;

use todosync_core::util::now_millis;
use todosync_core::TaskRecord;

use crate::commands::common::{due_timestamp, local_offset, normalize_content, open_store, parse_date};
use crate::error::CliError;

pub async fn run_add(
    content_parts: &[String],
    date: Option<&str>,
    category: Option<i64>,
    user_id: &str,
    db_path: &Path,
) -> Result<TaskRecord, CliError> {
    let content = normalize_content(&content_parts.join(" ")).ok_or(CliError::EmptyContent)?;
    let todo_time = date
        .map(parse_date)
        .transpose()?
        .map(|date| due_timestamp(date, local_offset()));

    let store = open_store(db_path)?;
    let mut task = TaskRecord::new_local(user_id, content, now_millis());
    task.todo_time = todo_time;
    if let Some(category_id) = category {
        task.category_id = category_id;
    }

    let task = store.create_task(task).await?;
    println!("{}", task.task_id);
    Ok(task)
}
