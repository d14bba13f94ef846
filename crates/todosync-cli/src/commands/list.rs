use std::path::Path;

use todosync_core::db::DayQuery;

use crate::commands::common::{local_offset, open_store, parse_date, print_tasks};
use crate::error::CliError;

pub async fn run_list(
    date: Option<&str>,
    hide_completed: bool,
    as_json: bool,
    user_id: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let settings = store.load_settings().await?;
    let include_completed = settings.show_completed && !hide_completed;

    let tasks = if let Some(date) = date {
        let query = DayQuery::for_date(parse_date(date)?, local_offset())
            .include_completed(include_completed)
            .pin_top(settings.pin_top);
        store.list_day(user_id, query).await?
    } else {
        store
            .list_undated(user_id, include_completed, settings.pin_top)
            .await?
    };

    print_tasks(&tasks, as_json, "No tasks.")
}
