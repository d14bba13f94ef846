use std::path::Path;

use todosync_core::models::Settings;

use crate::commands::common::open_store;
use crate::error::CliError;

pub async fn run_settings_show(as_json: bool, db_path: &Path) -> Result<Settings, CliError> {
    let store = open_store(db_path)?;
    let settings = store.load_settings().await?;
    print_settings(&settings, as_json)?;
    Ok(settings)
}

/// Update the given settings, leaving the rest as stored
pub async fn run_settings_set(
    pin_top: Option<bool>,
    show_completed: Option<bool>,
    as_json: bool,
    db_path: &Path,
) -> Result<Settings, CliError> {
    let store = open_store(db_path)?;
    let mut settings = store.load_settings().await?;
    if let Some(pin_top) = pin_top {
        settings.pin_top = pin_top;
    }
    if let Some(show_completed) = show_completed {
        settings.show_completed = show_completed;
    }
    store.save_settings(&settings).await?;
    print_settings(&settings, as_json)?;
    Ok(settings)
}

fn print_settings(settings: &Settings, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(settings)?);
    } else {
        println!("pin_top: {}", settings.pin_top);
        println!("show_completed: {}", settings.show_completed);
    }
    Ok(())
}
