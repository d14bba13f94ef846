use std::path::Path;

use crate::commands::common::{open_store, print_tasks};
use crate::error::CliError;

pub async fn run_dirty(as_json: bool, user_id: &str, db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let tasks = store.dirty_tasks(user_id).await?;
    print_tasks(&tasks, as_json, "Nothing waiting to sync.")
}
