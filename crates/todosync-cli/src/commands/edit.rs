use std::path::Path;

use todosync_core::db::LocalEdit;
use todosync_core::models::{sort_after, sort_between};
use todosync_core::util::now_millis;
use todosync_core::TaskRecord;

use crate::commands::common::{open_store, resolve_task};
use crate::error::CliError;

/// Apply a single local edit to the task matching `id`, printing its id
pub async fn run_edit(
    id: &str,
    edit: LocalEdit,
    user_id: &str,
    db_path: &Path,
) -> Result<TaskRecord, CliError> {
    let store = open_store(db_path)?;
    let task = resolve_task(id, user_id, &store).await?;

    let updated = store
        .edit_task(user_id, &task.task_id, edit, now_millis())
        .await?;
    println!("{}", updated.task_id);
    Ok(updated)
}

/// Give the task a sort key between `after` and `before`.
///
/// A missing side is filled with the nearest key among the user's other live
/// tasks; with neither given the task moves to the end.
pub async fn run_move(
    id: &str,
    after: Option<&str>,
    before: Option<&str>,
    user_id: &str,
    db_path: &Path,
) -> Result<TaskRecord, CliError> {
    let store = open_store(db_path)?;
    let task = resolve_task(id, user_id, &store).await?;
    let after = match after {
        Some(query) => Some(resolve_task(query, user_id, &store).await?.task_sort),
        None => None,
    };
    let before = match before {
        Some(query) => Some(resolve_task(query, user_id, &store).await?.task_sort),
        None => None,
    };

    let others = store
        .list_all(user_id)
        .await?
        .into_iter()
        .filter(|other| !other.deleted && other.task_id != task.task_id)
        .map(|other| other.task_sort)
        .collect::<Vec<_>>();
    let task_sort = target_sort(after, before, &others);

    let updated = store
        .edit_task(user_id, &task.task_id, LocalEdit::Sort(task_sort), now_millis())
        .await?;
    println!("{}", updated.task_id);
    Ok(updated)
}

pub fn target_sort(after: Option<f64>, before: Option<f64>, others: &[f64]) -> f64 {
    match (after, before) {
        (Some(after), None) => {
            let next = others.iter().copied().filter(|key| *key > after).reduce(f64::min);
            sort_between(Some(after), next)
        }
        (None, Some(before)) => {
            let previous = others.iter().copied().filter(|key| *key < before).reduce(f64::max);
            sort_between(previous, Some(before))
        }
        (None, None) => sort_after(others.iter().copied().reduce(f64::max)),
        (after, before) => sort_between(after, before),
    }
}
