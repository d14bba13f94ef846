use std::path::Path;

use todosync_core::util::now_millis;

use crate::commands::common::{open_store, print_tasks};
use crate::error::CliError;

pub async fn run_bin(
    as_json: bool,
    retention_days: u32,
    user_id: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let tasks = store
        .recycle_bin(user_id, now_millis(), retention_days)
        .await?;
    print_tasks(&tasks, as_json, "Recycle bin is empty.")
}

pub async fn run_bin_purge(
    retention_days: u32,
    user_id: &str,
    db_path: &Path,
) -> Result<usize, CliError> {
    let store = open_store(db_path)?;
    let purged = store
        .purge_recycle_bin(user_id, now_millis(), retention_days)
        .await?;
    println!("Purged {purged} task(s)");
    Ok(purged)
}
