//! Task repository implementation

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::category_repository::{CategoryRepository, SqliteCategoryRepository};
use crate::error::{Error, Result};
use crate::models::{Attachment, SubTask, SyncConflict, TaskId, TaskRecord, TaskStatus};
use crate::util::DAY_MILLIS;

const TASK_COLUMNS: &str = "task_id, server_id, user_id, content, description, complete, \
     is_deleted, todo_time, create_time, reminder_time, task_sort, version, sync_time, status, \
     category_id, category_name, category_color, subtasks, attachments";

/// Whether an upsert created or replaced a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// A day view: tasks due within `[start, end)` (Unix ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayQuery {
    pub start: i64,
    pub end: i64,
    pub include_completed: bool,
    pub pin_top: bool,
}

impl DayQuery {
    /// Tasks due on `date` as seen from a clock at `offset`
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        let start = local_midnight - i64::from(offset.local_minus_utc()) * 1000;
        Self::between(start, start + DAY_MILLIS)
    }

    /// Tasks due within explicit bounds
    pub const fn between(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            include_completed: true,
            pin_top: false,
        }
    }

    #[must_use]
    pub const fn include_completed(mut self, include: bool) -> Self {
        self.include_completed = include;
        self
    }

    #[must_use]
    pub const fn pin_top(mut self, pin_top: bool) -> Self {
        self.pin_top = pin_top;
        self
    }
}

/// A local user edit; every edit bumps `sync_time` and marks the task dirty
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEdit {
    Content {
        content: String,
        description: String,
    },
    Complete(bool),
    TodoTime(Option<i64>),
    ReminderTime(Option<i64>),
    Sort(f64),
    Category(i64),
    Subtasks(Vec<SubTask>),
    Attachments(Vec<Attachment>),
    Delete,
    Restore,
}

/// Trait for task storage operations
pub trait TaskRepository {
    /// Highest `version` among synced records, or 0
    fn fetch_max_synced_version(&self, user_id: &str) -> Result<i64>;

    /// Point lookup by task id, including soft-deleted records
    fn fetch_by_task_id(&self, user_id: &str, task_id: &TaskId) -> Result<Option<TaskRecord>>;

    /// All records with pending local changes
    fn fetch_dirty(&self, user_id: &str) -> Result<Vec<TaskRecord>>;

    /// Insert, or overwrite every non-identity field of the existing record
    fn upsert(&self, task: &TaskRecord) -> Result<UpsertOutcome>;

    /// Insert a brand new record
    fn create(&self, task: &TaskRecord) -> Result<()>;

    /// Apply a local edit to an existing task
    fn edit(&self, user_id: &str, task_id: &TaskId, edit: LocalEdit, now: i64)
        -> Result<TaskRecord>;

    /// Non-deleted tasks due within the day window, incomplete first
    fn list_for_day(&self, user_id: &str, query: DayQuery) -> Result<Vec<TaskRecord>>;

    /// Non-deleted tasks without a due date
    fn list_undated(
        &self,
        user_id: &str,
        include_completed: bool,
        pin_top: bool,
    ) -> Result<Vec<TaskRecord>>;

    /// Every record for the user, deleted ones included
    fn list_all(&self, user_id: &str) -> Result<Vec<TaskRecord>>;

    /// Deleted records still inside the recycle-bin window, newest first
    fn list_recycle_bin(&self, user_id: &str, now: i64, days: u32) -> Result<Vec<TaskRecord>>;

    /// Hard-delete synced records that aged out of the recycle bin
    fn purge_recycle_bin(&self, user_id: &str, now: i64, days: u32) -> Result<usize>;

    /// Log an incoming record rejected by last-write-wins.
    ///
    /// Returns `false` when the same rejection was already logged.
    fn record_conflict(
        &self,
        task_id: &TaskId,
        local_sync_time: i64,
        incoming_sync_time: i64,
        resolved_at: i64,
    ) -> Result<bool>;

    /// Most recent conflicts first
    fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>>;
}

/// `SQLite` implementation of `TaskRepository`
pub struct SqliteTaskRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteTaskRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a task from a row selected with `TASK_COLUMNS`
    fn parse_task(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
        let task_id: String = row.get(0)?;
        let status: String = row.get(13)?;
        let status = status.parse::<TaskStatus>().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(13, Type::Text, Box::new(error))
        })?;
        let subtasks: String = row.get(17)?;
        let attachments: String = row.get(18)?;

        Ok(TaskRecord {
            id: row.get(1)?,
            task_id: TaskId::from(task_id.as_str()),
            user_id: row.get(2)?,
            content: row.get(3)?,
            description: row.get(4)?,
            complete: row.get(5)?,
            deleted: row.get(6)?,
            todo_time: row.get(7)?,
            create_time: row.get(8)?,
            reminder_time: row.get(9)?,
            task_sort: row.get(10)?,
            version: row.get(11)?,
            sync_time: row.get(12)?,
            status,
            category_id: row.get(14)?,
            category_name: row.get(15)?,
            category_color: row.get(16)?,
            subtasks: decode_json_list(&task_id, "subtasks", &subtasks),
            attachments: decode_json_list(&task_id, "attachments", &attachments),
        })
    }

    fn query_tasks(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let tasks = stmt
            .query_map(params, Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn insert(&self, task: &TaskRecord) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
            ),
            params![
                task.task_id.as_str(),
                task.id,
                task.user_id,
                task.content,
                task.description,
                task.complete,
                task.deleted,
                task.todo_time,
                task.create_time,
                task.reminder_time,
                task.task_sort,
                task.version,
                task.sync_time,
                task.status.as_str(),
                task.category_id,
                task.category_name,
                task.category_color,
                serde_json::to_string(&task.subtasks)?,
                serde_json::to_string(&task.attachments)?,
            ],
        )?;
        Ok(())
    }

    fn overwrite(&self, task: &TaskRecord) -> Result<usize> {
        let rows = self.conn.execute(
            "UPDATE tasks SET
                server_id = ?3, content = ?4, description = ?5, complete = ?6,
                is_deleted = ?7, todo_time = ?8, create_time = ?9, reminder_time = ?10,
                task_sort = ?11, version = ?12, sync_time = ?13, status = ?14,
                category_id = ?15, category_name = ?16, category_color = ?17,
                subtasks = ?18, attachments = ?19
             WHERE user_id = ?1 AND task_id = ?2",
            params![
                task.user_id,
                task.task_id.as_str(),
                task.id,
                task.content,
                task.description,
                task.complete,
                task.deleted,
                task.todo_time,
                task.create_time,
                task.reminder_time,
                task.task_sort,
                task.version,
                task.sync_time,
                task.status.as_str(),
                task.category_id,
                task.category_name,
                task.category_color,
                serde_json::to_string(&task.subtasks)?,
                serde_json::to_string(&task.attachments)?,
            ],
        )?;
        Ok(rows)
    }

    fn list_dated_or_undated(
        &self,
        filter: &str,
        include_completed: bool,
        pin_top: bool,
        params: impl rusqlite::Params,
    ) -> Result<Vec<TaskRecord>> {
        let completed = if include_completed {
            ""
        } else {
            " AND complete = 0"
        };
        let direction = if pin_top { "DESC" } else { "ASC" };
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE user_id = ?1 AND is_deleted = 0 AND {filter}{completed}
                 ORDER BY complete ASC, task_sort {direction}, create_time ASC, task_id ASC"
            ),
            params,
        )
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn fetch_max_synced_version(&self, user_id: &str) -> Result<i64> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM tasks WHERE user_id = ? AND status = 'synced'",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn fetch_by_task_id(&self, user_id: &str, task_id: &TaskId) -> Result<Option<TaskRecord>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ? AND task_id = ?"),
                params![user_id, task_id.as_str()],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }

    fn fetch_dirty(&self, user_id: &str) -> Result<Vec<TaskRecord>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE user_id = ? AND status != 'synced'
                 ORDER BY sync_time ASC, task_id ASC"
            ),
            params![user_id],
        )
    }

    fn upsert(&self, task: &TaskRecord) -> Result<UpsertOutcome> {
        if self.overwrite(task)? > 0 {
            Ok(UpsertOutcome::Updated)
        } else {
            self.insert(task)?;
            Ok(UpsertOutcome::Inserted)
        }
    }

    fn create(&self, task: &TaskRecord) -> Result<()> {
        if task.content.trim().is_empty() {
            return Err(Error::InvalidInput("Task content cannot be empty".into()));
        }
        self.insert(task)
    }

    fn edit(
        &self,
        user_id: &str,
        task_id: &TaskId,
        edit: LocalEdit,
        now: i64,
    ) -> Result<TaskRecord> {
        let mut task = self
            .fetch_by_task_id(user_id, task_id)?
            .ok_or_else(|| Error::NotFound(task_id.to_string()))?;

        match edit {
            LocalEdit::Content {
                content,
                description,
            } => {
                if content.trim().is_empty() {
                    return Err(Error::InvalidInput("Task content cannot be empty".into()));
                }
                task.content = content;
                task.description = description;
            }
            LocalEdit::Complete(complete) => task.complete = complete,
            LocalEdit::TodoTime(todo_time) => task.todo_time = todo_time,
            LocalEdit::ReminderTime(reminder_time) => task.reminder_time = reminder_time,
            LocalEdit::Sort(task_sort) => task.task_sort = task_sort,
            LocalEdit::Category(category_id) => {
                let category = SqliteCategoryRepository::new(self.conn).get_category(category_id)?;
                task.category_id = category_id;
                task.apply_category(category.as_ref());
            }
            LocalEdit::Subtasks(subtasks) => task.subtasks = subtasks,
            LocalEdit::Attachments(attachments) => task.attachments = attachments,
            LocalEdit::Delete => {
                task.deleted = true;
                task.sync_time = now;
                task.status = task.status.after_local_delete();
                self.overwrite(&task)?;
                return Ok(task);
            }
            LocalEdit::Restore => task.deleted = false,
        }

        task.touch(now);
        self.overwrite(&task)?;
        Ok(task)
    }

    fn list_for_day(&self, user_id: &str, query: DayQuery) -> Result<Vec<TaskRecord>> {
        self.list_dated_or_undated(
            "todo_time >= ?2 AND todo_time < ?3",
            query.include_completed,
            query.pin_top,
            params![user_id, query.start, query.end],
        )
    }

    fn list_undated(
        &self,
        user_id: &str,
        include_completed: bool,
        pin_top: bool,
    ) -> Result<Vec<TaskRecord>> {
        self.list_dated_or_undated(
            "(todo_time IS NULL OR todo_time = 0)",
            include_completed,
            pin_top,
            params![user_id],
        )
    }

    fn list_all(&self, user_id: &str) -> Result<Vec<TaskRecord>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?
                 ORDER BY create_time ASC, task_id ASC"
            ),
            params![user_id],
        )
    }

    fn list_recycle_bin(&self, user_id: &str, now: i64, days: u32) -> Result<Vec<TaskRecord>> {
        let cutoff = now - i64::from(days) * DAY_MILLIS;
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE user_id = ? AND is_deleted = 1 AND sync_time >= ?
                 ORDER BY sync_time DESC, task_id ASC"
            ),
            params![user_id, cutoff],
        )
    }

    fn purge_recycle_bin(&self, user_id: &str, now: i64, days: u32) -> Result<usize> {
        let cutoff = now - i64::from(days) * DAY_MILLIS;
        let purged = self.conn.execute(
            "DELETE FROM tasks
             WHERE user_id = ? AND is_deleted = 1 AND status = 'synced' AND sync_time < ?",
            params![user_id, cutoff],
        )?;
        if purged > 0 {
            tracing::info!("Purged {purged} expired tasks from the recycle bin");
        }
        Ok(purged)
    }

    fn record_conflict(
        &self,
        task_id: &TaskId,
        local_sync_time: i64,
        incoming_sync_time: i64,
        resolved_at: i64,
    ) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO sync_conflicts
                (task_id, local_sync_time, incoming_sync_time, resolved_at, strategy)
             SELECT ?1, ?2, ?3, ?4, 'lww'
             WHERE NOT EXISTS (
                SELECT 1 FROM sync_conflicts
                WHERE task_id = ?1 AND local_sync_time = ?2 AND incoming_sync_time = ?3
             )",
            params![
                task_id.as_str(),
                local_sync_time,
                incoming_sync_time,
                resolved_at
            ],
        )?;
        Ok(inserted > 0)
    }

    fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, local_sync_time, incoming_sync_time, resolved_at, strategy
             FROM sync_conflicts
             ORDER BY resolved_at DESC, id DESC
             LIMIT ?",
        )?;

        let conflicts = stmt
            .query_map(params![limit], |row| {
                Ok(SyncConflict {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    local_sync_time: row.get(2)?,
                    incoming_sync_time: row.get(3)?,
                    resolved_at: row.get(4)?,
                    strategy: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(conflicts)
    }
}

fn decode_json_list<T: serde::de::DeserializeOwned>(task_id: &str, column: &str, raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_else(|error| {
        tracing::debug!("Ignoring malformed {column} for task {task_id}: {error}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::CategorySnapshot;
    use pretty_assertions::assert_eq;

    const USER: &str = "u1";
    const DAY_START: i64 = 1_700_000_000_000;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn task(task_id: &str, todo_time: Option<i64>, sort: f64, complete: bool) -> TaskRecord {
        let mut task = TaskRecord::new_local(USER, format!("task {task_id}"), DAY_START);
        task.task_id = TaskId::from(task_id);
        task.todo_time = todo_time;
        task.task_sort = sort;
        task.complete = complete;
        task
    }

    fn synced(task_id: &str, version: i64, sync_time: i64) -> TaskRecord {
        let mut record = task(task_id, None, 0.0, false);
        record.status = TaskStatus::Synced;
        record.version = version;
        record.sync_time = sync_time;
        record
    }

    fn ids(tasks: &[TaskRecord]) -> Vec<&str> {
        tasks.iter().map(|task| task.task_id.as_str()).collect()
    }

    #[test]
    fn test_max_synced_version_ignores_dirty_records() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        assert_eq!(repo.fetch_max_synced_version(USER).unwrap(), 0);

        repo.upsert(&synced("a", 3, 10)).unwrap();
        repo.upsert(&synced("b", 7, 10)).unwrap();
        let mut dirty = synced("c", 99, 10);
        dirty.status = TaskStatus::Updated;
        repo.upsert(&dirty).unwrap();

        assert_eq!(repo.fetch_max_synced_version(USER).unwrap(), 7);
        assert_eq!(repo.fetch_max_synced_version("someone-else").unwrap(), 0);
    }

    #[test]
    fn test_fetch_by_task_id_miss_is_none() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        assert!(repo
            .fetch_by_task_id(USER, &TaskId::from("missing"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_upsert_inserts_then_overwrites() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());

        let mut record = synced("T1", 1, 100);
        record.subtasks = vec![SubTask::new("step", false)];
        assert_eq!(repo.upsert(&record).unwrap(), UpsertOutcome::Inserted);

        record.content = "changed".into();
        record.version = 2;
        record.subtasks.clear();
        assert_eq!(repo.upsert(&record).unwrap(), UpsertOutcome::Updated);

        let stored = repo.fetch_by_task_id(USER, &record.task_id).unwrap().unwrap();
        assert_eq!(stored, record);
        assert_eq!(repo.list_all(USER).unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_dirty_includes_deleted() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());

        repo.upsert(&synced("clean", 1, 1)).unwrap();
        repo.create(&task("new", None, 1.0, false)).unwrap();
        repo.upsert(&synced("gone", 2, 1)).unwrap();
        repo.edit(USER, &TaskId::from("gone"), LocalEdit::Delete, 50)
            .unwrap();

        let dirty = repo.fetch_dirty(USER).unwrap();
        let mut dirty_ids = ids(&dirty);
        dirty_ids.sort_unstable();
        assert_eq!(dirty_ids, vec!["gone", "new"]);
    }

    #[test]
    fn test_day_ordering_incomplete_first() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());

        let at = Some(DAY_START + 1_000);
        repo.create(&task("done-low", at, 1.0, true)).unwrap();
        repo.create(&task("open-high", at, 3.0, false)).unwrap();
        repo.create(&task("open-low", at, 1.0, false)).unwrap();
        repo.create(&task("done-high", at, 5.0, true)).unwrap();
        repo.create(&task("other-day", Some(DAY_START + DAY_MILLIS), 0.0, false))
            .unwrap();

        let query = DayQuery::between(DAY_START, DAY_START + DAY_MILLIS);
        let ascending = repo.list_for_day(USER, query).unwrap();
        assert_eq!(
            ids(&ascending),
            vec!["open-low", "open-high", "done-low", "done-high"]
        );

        let pinned = repo.list_for_day(USER, query.pin_top(true)).unwrap();
        assert_eq!(
            ids(&pinned),
            vec!["open-high", "open-low", "done-high", "done-low"]
        );

        let open_only = repo
            .list_for_day(USER, query.include_completed(false))
            .unwrap();
        assert_eq!(ids(&open_only), vec!["open-low", "open-high"]);
    }

    #[test]
    fn test_day_ordering_invariant_holds_for_mixed_input() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());

        let at = Some(DAY_START);
        for index in 0..20_u32 {
            let sort = f64::from((index * 7) % 11);
            let id = format!("t{index:02}");
            repo.create(&task(&id, at, sort, index % 3 == 0)).unwrap();
        }

        for pin_top in [false, true] {
            let query = DayQuery::between(DAY_START, DAY_START + DAY_MILLIS).pin_top(pin_top);
            let tasks = repo.list_for_day(USER, query).unwrap();
            assert_eq!(tasks.len(), 20);
            for pair in tasks.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(!a.complete || b.complete, "complete task sorted before open one");
                if a.complete == b.complete {
                    if pin_top {
                        assert!(a.task_sort >= b.task_sort);
                    } else {
                        assert!(a.task_sort <= b.task_sort);
                    }
                }
            }
        }
    }

    #[test]
    fn test_normal_queries_exclude_deleted() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());

        repo.create(&task("kept", Some(DAY_START), 1.0, false)).unwrap();
        repo.create(&task("binned", Some(DAY_START), 2.0, false)).unwrap();
        repo.create(&task("undated-binned", None, 2.0, false)).unwrap();
        repo.edit(USER, &TaskId::from("binned"), LocalEdit::Delete, DAY_START)
            .unwrap();
        repo.edit(USER, &TaskId::from("undated-binned"), LocalEdit::Delete, DAY_START)
            .unwrap();

        let day = repo
            .list_for_day(USER, DayQuery::between(DAY_START, DAY_START + DAY_MILLIS))
            .unwrap();
        assert!(day.iter().all(|task| !task.deleted));
        assert_eq!(ids(&day), vec!["kept"]);
        assert!(repo.list_undated(USER, true, false).unwrap().is_empty());
    }

    #[test]
    fn test_recycle_bin_window_and_purge() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        let now = DAY_START + 40 * DAY_MILLIS;

        let mut recent = synced("recent", 1, now - DAY_MILLIS);
        recent.deleted = true;
        let mut expired = synced("expired", 2, now - 31 * DAY_MILLIS);
        expired.deleted = true;
        let mut expired_dirty = expired.clone();
        expired_dirty.task_id = TaskId::from("expired-dirty");
        expired_dirty.status = TaskStatus::Deleted;
        for record in [&recent, &expired, &expired_dirty] {
            repo.upsert(record).unwrap();
        }

        let bin = repo.list_recycle_bin(USER, now, 30).unwrap();
        assert_eq!(ids(&bin), vec!["recent"]);

        assert_eq!(repo.purge_recycle_bin(USER, now, 30).unwrap(), 1);
        assert!(repo
            .fetch_by_task_id(USER, &TaskId::from("expired"))
            .unwrap()
            .is_none());
        // Unpushed deletions survive until the server has seen them
        assert!(repo
            .fetch_by_task_id(USER, &TaskId::from("expired-dirty"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_edit_marks_dirty_and_bumps_sync_time() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        repo.upsert(&synced("T1", 4, 100)).unwrap();

        let edited = repo
            .edit(USER, &TaskId::from("T1"), LocalEdit::Complete(true), 200)
            .unwrap();
        assert!(edited.complete);
        assert_eq!(edited.status, TaskStatus::Updated);
        assert_eq!(edited.sync_time, 200);

        let deleted = repo
            .edit(USER, &TaskId::from("T1"), LocalEdit::Delete, 300)
            .unwrap();
        assert_eq!(deleted.status, TaskStatus::Deleted);

        let restored = repo
            .edit(USER, &TaskId::from("T1"), LocalEdit::Restore, 400)
            .unwrap();
        assert!(!restored.deleted);
        assert_eq!(restored.status, TaskStatus::Updated);
    }

    #[test]
    fn test_edit_category_denormalizes() {
        let db = setup();
        SqliteCategoryRepository::new(db.connection())
            .upsert_category(&CategorySnapshot::new(5, "Errands", "#FF2D55"))
            .unwrap();
        let repo = SqliteTaskRepository::new(db.connection());
        repo.create(&task("T1", None, 0.0, false)).unwrap();

        let edited = repo
            .edit(USER, &TaskId::from("T1"), LocalEdit::Category(5), 10)
            .unwrap();
        assert_eq!(edited.category_name, "Errands");
        assert_eq!(edited.status, TaskStatus::Added);
    }

    #[test]
    fn test_edit_unknown_task_is_not_found() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        let error = repo
            .edit(USER, &TaskId::from("nope"), LocalEdit::Complete(true), 1)
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[test]
    fn test_malformed_checklist_json_falls_back_to_empty() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        repo.create(&task("T1", None, 0.0, false)).unwrap();
        db.connection()
            .execute("UPDATE tasks SET subtasks = 'not json'", [])
            .unwrap();

        let stored = repo.fetch_by_task_id(USER, &TaskId::from("T1")).unwrap().unwrap();
        assert!(stored.subtasks.is_empty());
    }

    #[test]
    fn test_conflict_log() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        repo.record_conflict(&TaskId::from("T2"), 200, 150, 1_000)
            .unwrap();
        repo.record_conflict(&TaskId::from("T3"), 20, 10, 2_000)
            .unwrap();

        let conflicts = repo.list_conflicts(10).unwrap();
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].task_id, "T3");
        assert_eq!(conflicts[1].local_sync_time, 200);
        assert_eq!(conflicts[1].strategy, "lww");
        assert_eq!(repo.list_conflicts(1).unwrap().len(), 1);
    }

    #[test]
    fn test_conflict_log_skips_repeated_rejection() {
        let db = setup();
        let repo = SqliteTaskRepository::new(db.connection());
        assert!(repo
            .record_conflict(&TaskId::from("T2"), 200, 150, 1_000)
            .unwrap());
        assert!(!repo
            .record_conflict(&TaskId::from("T2"), 200, 150, 5_000)
            .unwrap());
        // a different incoming copy is a new rejection
        assert!(repo
            .record_conflict(&TaskId::from("T2"), 200, 160, 6_000)
            .unwrap());

        let conflicts = repo.list_conflicts(10).unwrap();
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[1].resolved_at, 1_000);
    }

    #[test]
    fn test_day_query_for_date_respects_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let utc = DayQuery::for_date(date, FixedOffset::east_opt(0).unwrap());
        let shanghai = DayQuery::for_date(date, FixedOffset::east_opt(8 * 3600).unwrap());
        assert_eq!(utc.end - utc.start, DAY_MILLIS);
        assert_eq!(utc.start - shanghai.start, 8 * 3600 * 1000);
    }
}
