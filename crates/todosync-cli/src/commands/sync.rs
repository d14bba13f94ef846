use std::path::Path;

use todosync_core::sync::{HttpSyncClient, SyncEngine, SyncReport, TracingReminderScheduler};

use crate::commands::common::{
    format_sync_conflict_lines, open_store, sync_conflict_to_item, SyncConflictItem,
};
use crate::config_file::CliConfig;
use crate::error::CliError;

pub async fn run_sync(
    config: &CliConfig,
    user_id: &str,
    as_json: bool,
    db_path: &Path,
) -> Result<SyncReport, CliError> {
    let client_config = config.client_config(Some(user_id));
    if client_config.base_url().is_err() {
        return Err(CliError::SyncNotConfigured);
    }

    let store = open_store(db_path)?;
    let client = HttpSyncClient::new(&client_config)?;
    let engine = SyncEngine::new(store, client, TracingReminderScheduler, user_id)
        .with_policy(config.policy);

    let report = engine.sync().await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_sync_report(&report) {
            println!("{line}");
        }
    }
    Ok(report)
}

pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.skipped_pull {
        lines.push(format!(
            "Pull skipped (local v{}, server v{})",
            report.local_version, report.remote_version
        ));
    } else {
        lines.push(format!(
            "Pulled {} task(s) (v{} -> v{}): {} new, {} updated, {} unchanged, {} kept local",
            report.pulled,
            report.local_version,
            report.remote_version,
            report.merge.inserted,
            report.merge.updated,
            report.merge.unchanged,
            report.merge.rejected
        ));
    }
    lines.push(format!(
        "Pushed {} task(s), {} confirmed",
        report.pushed, report.push_applied
    ));
    let malformed = report.merge.skipped + report.push_skipped;
    if malformed > 0 {
        lines.push(format!("Ignored {malformed} server record(s) without a task id"));
    }
    lines.push("Sync completed".to_string());
    lines
}

pub async fn run_sync_conflicts(
    limit: usize,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let conflicts = store.list_conflicts(limit).await?;

    if as_json {
        let json_items = conflicts
            .iter()
            .map(sync_conflict_to_item)
            .collect::<Vec<SyncConflictItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No sync conflicts recorded.");
        return Ok(());
    }

    for line in format_sync_conflict_lines(&conflicts) {
        println!("{line}");
    }
    Ok(())
}
