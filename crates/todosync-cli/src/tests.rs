use chrono::{FixedOffset, NaiveDate};
use pretty_assertions::assert_eq;
use todosync_core::db::LocalEdit;
use todosync_core::sync::{MergeSummary, SyncReport};
use todosync_core::{SyncConflict, TaskRecord, TaskStatus, TaskStore};

use crate::cli::CompletionShell;
use crate::commands::add::run_add;
use crate::commands::bin::run_bin_purge;
use crate::commands::category::{format_category_lines, run_category_add, run_category_list};
use crate::commands::common::{
    due_timestamp, format_due_date, format_sync_conflict_lines, format_sync_timestamp,
    format_task_lines, normalize_content, normalize_task_identifier, parse_date, resolve_task,
    task_preview,
};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config_init;
use crate::commands::edit::{run_edit, run_move, target_sort};
use crate::commands::settings::{run_settings_set, run_settings_show};
use crate::commands::sync::{format_sync_report, run_sync};
use crate::config_file::CliConfig;
use crate::error::CliError;

const USER: &str = "u1";

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  buy milk  "), Some("buy milk".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_task_identifier_rejects_empty() {
    assert!(matches!(
        normalize_task_identifier(" \n "),
        Err(CliError::EmptyTaskId)
    ));
    assert_eq!(normalize_task_identifier("  u1-1-abc  ").unwrap(), "u1-1-abc");
}

#[test]
fn parse_date_requires_iso_format() {
    assert_eq!(
        parse_date(" 2024-03-09 ").unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    );
    assert!(matches!(parse_date("03/09/2024"), Err(CliError::InvalidDate(_))));
}

#[test]
fn due_date_formats_in_local_offset() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let offset = FixedOffset::east_opt(8 * 3600).unwrap();

    let due = due_timestamp(date, offset);
    assert_eq!(format_due_date(due, offset).as_deref(), Some("2024-03-09"));
    assert_eq!(format_due_date(due, utc()).as_deref(), Some("2024-03-08"));
}

#[test]
fn task_preview_truncates_with_ellipsis() {
    let preview = task_preview("This is a very long sentence that should be shortened", 20);
    assert_eq!(preview, "This is a very lo...");
}

#[test]
fn format_task_lines_show_state() {
    let mut done = TaskRecord::new_local(USER, "File taxes", 1_000);
    done.complete = true;
    done.status = TaskStatus::Synced;
    let pending = TaskRecord::new_local(USER, "Water plants", 2_000);

    let lines = format_task_lines(&[done, pending], utc());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("[x] File taxes"));
    assert!(!lines[0].contains('*'));
    assert!(lines[1].contains("[ ] Water plants"));
    assert!(lines[1].contains("Uncategorized"));
    assert!(lines[1].ends_with("*added"));
}

#[test]
fn format_sync_timestamp_returns_utc_label() {
    assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn format_sync_conflict_lines_include_key_fields() {
    let conflicts = vec![SyncConflict {
        id: 1,
        task_id: "u1-1700000000000-a1b2c3".to_string(),
        local_sync_time: 200,
        incoming_sync_time: 100,
        resolved_at: 300,
        strategy: "lww".to_string(),
    }];

    let rendered = format_sync_conflict_lines(&conflicts);
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("lww"));
    assert!(rendered[0].contains("task=u1-1700000000000-a1b2c3"));
    assert!(rendered[0].contains("local=200"));
    assert!(rendered[0].contains("incoming=100"));
}

#[test]
fn format_sync_report_mentions_skipped_pull() {
    let report = SyncReport {
        remote_version: 4,
        local_version: 4,
        skipped_pull: true,
        pushed: 2,
        push_applied: 2,
        ..SyncReport::default()
    };
    let lines = format_sync_report(&report);
    assert_eq!(lines[0], "Pull skipped (local v4, server v4)");
    assert_eq!(lines[1], "Pushed 2 task(s), 2 confirmed");

    let pulled = SyncReport {
        remote_version: 6,
        local_version: 4,
        pulled: 3,
        merge: MergeSummary {
            inserted: 1,
            updated: 1,
            unchanged: 0,
            rejected: 1,
            skipped: 1,
        },
        push_skipped: 1,
        ..SyncReport::default()
    };
    let lines = format_sync_report(&pulled);
    assert!(lines[0].contains("1 new, 1 updated, 0 unchanged, 1 kept local"));
    assert_eq!(lines[2], "Ignored 2 server record(s) without a task id");
}

#[tokio::test(flavor = "current_thread")]
async fn run_add_creates_dirty_task() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("todosync.db");

    let created = run_add(
        &["Pay".to_string(), "rent".to_string()],
        Some("2024-03-09"),
        Some(4),
        USER,
        &db_path,
    )
    .await
    .unwrap();

    let store = TaskStore::open_path(&db_path).unwrap();
    let stored = store.get_task(USER, &created.task_id).await.unwrap().unwrap();
    assert_eq!(stored.content, "Pay rent");
    assert_eq!(stored.status, TaskStatus::Added);
    assert_eq!(stored.category_id, 4);
    assert!(stored.todo_time.is_some());
    assert_eq!(store.dirty_tasks(USER).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn run_add_rejects_empty_content() {
    let tmp = tempfile::tempdir().unwrap();
    let error = run_add(&["  ".to_string()], None, None, USER, &tmp.path().join("t.db"))
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::EmptyContent));
}

#[tokio::test(flavor = "current_thread")]
async fn resolve_task_supports_exact_and_prefix_id() {
    let store = TaskStore::open_in_memory().unwrap();
    let mut first = TaskRecord::new_local(USER, "First", 1_000);
    first.task_id = "u1-1000-aaaaaa".into();
    let mut second = TaskRecord::new_local(USER, "Second", 2_000);
    second.task_id = "u1-2000-bbbbbb".into();
    store.create_task(first).await.unwrap();
    store.create_task(second).await.unwrap();

    let exact = resolve_task("u1-1000-aaaaaa", USER, &store).await.unwrap();
    assert_eq!(exact.content, "First");

    let by_prefix = resolve_task("u1-2", USER, &store).await.unwrap();
    assert_eq!(by_prefix.content, "Second");

    let ambiguous = resolve_task("u1-", USER, &store).await.unwrap_err();
    assert!(matches!(ambiguous, CliError::AmbiguousTaskId(_)));

    let missing = resolve_task("nope", USER, &store).await.unwrap_err();
    assert!(matches!(missing, CliError::TaskNotFound(_)));
}

#[tokio::test(flavor = "current_thread")]
async fn run_edit_completes_deletes_and_restores() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("todosync.db");
    let store = TaskStore::open_path(&db_path).unwrap();
    let mut synced = TaskRecord::new_local(USER, "Synced already", 1_000);
    synced.task_id = "u1-1000-cccccc".into();
    synced.status = TaskStatus::Synced;
    synced.version = 3;
    store.upsert_task(&synced).await.unwrap();
    drop(store);

    let done = run_edit("u1-1000", LocalEdit::Complete(true), USER, &db_path)
        .await
        .unwrap();
    assert!(done.complete);
    assert_eq!(done.status, TaskStatus::Updated);

    let deleted = run_edit("u1-1000-cccccc", LocalEdit::Delete, USER, &db_path)
        .await
        .unwrap();
    assert!(deleted.deleted);
    assert_eq!(deleted.status, TaskStatus::Deleted);

    // not synced yet, so the purge must keep it
    assert_eq!(run_bin_purge(0, USER, &db_path).await.unwrap(), 0);

    let restored = run_edit("u1-1000-cccccc", LocalEdit::Restore, USER, &db_path)
        .await
        .unwrap();
    assert!(!restored.deleted);
    assert_eq!(restored.status, TaskStatus::Updated);
}

#[tokio::test(flavor = "current_thread")]
async fn run_sync_requires_sync_configuration() {
    let tmp = tempfile::tempdir().unwrap();
    if std::env::var_os(todosync_core::config::ENV_API_URL).is_some() {
        return;
    }

    let error = run_sync(&CliConfig::default(), USER, false, &tmp.path().join("t.db"))
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::SyncNotConfigured));
}

#[test]
fn run_config_init_validates_and_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("cli-config.json");

    let error = run_config_init(&path, Some("api.example.com".to_string()), None, None, None)
        .unwrap_err();
    assert!(matches!(error, CliError::Config(_)));
    assert!(!path.exists());

    run_config_init(
        &path,
        Some("https://api.example.com/todo/".to_string()),
        Some("secret".to_string()),
        Some("42".to_string()),
        Some(30),
    )
    .unwrap();

    // later updates keep fields that were not passed
    let updated = run_config_init(&path, None, None, Some("43".to_string()), None).unwrap();
    assert_eq!(
        updated.sync.api_base_url.as_deref(),
        Some("https://api.example.com/todo")
    );
    assert_eq!(updated.sync.api_token.as_deref(), Some("secret"));
    assert_eq!(updated.sync.user_id.as_deref(), Some("43"));
    assert_eq!(updated.sync.timeout_secs, Some(30));
}

#[test]
fn run_completions_writes_bash_script_file() {
    let tmp = tempfile::tempdir().unwrap();
    let output_path = tmp.path().join("todosync.bash");

    run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_todosync()"));
    assert!(script.contains("complete -F _todosync"));
}

#[test]
fn target_sort_fills_missing_neighbours() {
    let others = [1.0, 2.0, 4.0];
    assert!((target_sort(Some(2.0), Some(4.0), &others) - 3.0).abs() < f64::EPSILON);
    assert!((target_sort(Some(1.0), None, &others) - 1.5).abs() < f64::EPSILON);
    assert!((target_sort(None, Some(1.0), &others) - 0.0).abs() < f64::EPSILON);
    assert!((target_sort(None, None, &others) - 5.0).abs() < f64::EPSILON);
    assert!(target_sort(None, None, &[]).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "current_thread")]
async fn run_move_reorders_undated_list() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("todosync.db");
    let store = TaskStore::open_path(&db_path).unwrap();
    for (suffix, sort) in [("aaaaaa", 1.0), ("bbbbbb", 2.0), ("cccccc", 3.0)] {
        let mut task = TaskRecord::new_local(USER, format!("task {suffix}"), 1_000);
        task.task_id = format!("u1-1000-{suffix}").as_str().into();
        task.task_sort = sort;
        store.create_task(task).await.unwrap();
    }
    drop(store);

    let moved = run_move("u1-1000-c", Some("u1-1000-a"), None, USER, &db_path)
        .await
        .unwrap();
    assert!((moved.task_sort - 1.5).abs() < f64::EPSILON);

    let store = TaskStore::open_path(&db_path).unwrap();
    let order = store
        .list_undated(USER, true, false)
        .await
        .unwrap()
        .into_iter()
        .map(|task| task.task_id.to_string())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["u1-1000-aaaaaa", "u1-1000-cccccc", "u1-1000-bbbbbb"]);

    let to_end = run_move("u1-1000-a", None, None, USER, &db_path)
        .await
        .unwrap();
    assert!((to_end.task_sort - 3.0).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "current_thread")]
async fn run_category_add_feeds_task_display_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("todosync.db");

    let error = run_category_add(3, "   ", "#FF9500", &db_path)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::EmptyCategoryName));

    run_category_add(3, " Work ", "#FF9500", &db_path)
        .await
        .unwrap();
    let categories = run_category_list(false, &db_path).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Work");
    assert!(format_category_lines(&categories)[0].ends_with("Work"));

    let created = run_add(&["Standup".to_string()], None, Some(3), USER, &db_path)
        .await
        .unwrap();
    assert_eq!(created.category_name, "Work");
    assert_eq!(created.category_color, "#FF9500");
}

#[tokio::test(flavor = "current_thread")]
async fn run_settings_set_keeps_unspecified_values() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("todosync.db");

    let defaults = run_settings_show(false, &db_path).await.unwrap();
    assert!(!defaults.pin_top);
    assert!(defaults.show_completed);

    let updated = run_settings_set(Some(true), None, false, &db_path)
        .await
        .unwrap();
    assert!(updated.pin_top);
    assert!(updated.show_completed);

    let store = TaskStore::open_path(&db_path).unwrap();
    assert_eq!(store.load_settings().await.unwrap(), updated);
}
