//! todosync CLI - offline-first task list with server reconciliation
//!
//! Edits land in the local store immediately; `todosync sync` reconciles
//! them with the server.

mod cli;
mod commands;
mod config_file;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use todosync_core::db::LocalEdit;

use crate::cli::{BinCommands, CategoryCommands, Cli, Commands, SettingsCommands, SyncCommands};
use crate::commands::add::run_add;
use crate::commands::bin::{run_bin, run_bin_purge};
use crate::commands::category::{run_category_add, run_category_list};
use crate::commands::common::resolve_db_path;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::dirty::run_dirty;
use crate::commands::edit::{run_edit, run_move};
use crate::commands::list::run_list;
use crate::commands::settings::{run_settings_set, run_settings_show};
use crate::commands::sync::{run_sync, run_sync_conflicts};
use crate::config_file::{default_config_path, CliConfig};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "todosync=info"
        .parse::<tracing_subscriber::filter::Directive>()
        .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = default_config_path().map_err(CliError::Config)?;

    let command = match cli.command {
        Commands::Config { command } => return run_config(command, &config_path),
        Commands::Completions { shell, output } => {
            return run_completions(shell, output.as_deref());
        }
        command => command,
    };

    let config = CliConfig::load_from_path(&config_path).map_err(CliError::Config)?;
    let user_id = config.resolve_user_id(cli.user.as_deref());
    let db_path = resolve_db_path(cli.db_path)?;
    tracing::debug!("Using database {} for user {user_id}", db_path.display());

    match command {
        Commands::Add {
            content,
            date,
            category,
        } => {
            run_add(&content, date.as_deref(), category, &user_id, &db_path).await?;
        }
        Commands::List {
            date,
            hide_completed,
            json,
        } => run_list(date.as_deref(), hide_completed, json, &user_id, &db_path).await?,
        Commands::Done { id } => {
            run_edit(&id, LocalEdit::Complete(true), &user_id, &db_path).await?;
        }
        Commands::Undo { id } => {
            run_edit(&id, LocalEdit::Complete(false), &user_id, &db_path).await?;
        }
        Commands::Delete { id } => {
            run_edit(&id, LocalEdit::Delete, &user_id, &db_path).await?;
        }
        Commands::Restore { id } => {
            run_edit(&id, LocalEdit::Restore, &user_id, &db_path).await?;
        }
        Commands::Move { id, after, before } => {
            run_move(&id, after.as_deref(), before.as_deref(), &user_id, &db_path).await?;
        }
        Commands::Bin { command, json } => {
            let days = config.policy.recycle_bin_days;
            match command {
                Some(BinCommands::Purge) => {
                    run_bin_purge(days, &user_id, &db_path).await?;
                }
                None => run_bin(json, days, &user_id, &db_path).await?,
            }
        }
        Commands::Dirty { json } => run_dirty(json, &user_id, &db_path).await?,
        Commands::Category { command } => match command {
            CategoryCommands::Add { id, name, color } => {
                run_category_add(id, &name, &color, &db_path).await?;
            }
            CategoryCommands::List { json } => {
                run_category_list(json, &db_path).await?;
            }
        },
        Commands::Settings { command, json } => match command {
            Some(SettingsCommands::Set {
                pin_top,
                show_completed,
            }) => {
                run_settings_set(pin_top, show_completed, json, &db_path).await?;
            }
            None => {
                run_settings_show(json, &db_path).await?;
            }
        },
        Commands::Sync { command, json } => match command {
            Some(SyncCommands::Conflicts { limit, json }) => {
                run_sync_conflicts(limit, json, &db_path).await?;
            }
            None => {
                run_sync(&config, &user_id, json, &db_path).await?;
            }
        },
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}
