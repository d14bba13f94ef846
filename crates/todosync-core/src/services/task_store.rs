//! Shared task store handle used by the CLI and the sync engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::db::{
    CategoryRepository, Database, DayQuery, LocalEdit, SettingsRepository,
    SqliteCategoryRepository, SqliteSettingsRepository, SqliteTaskRepository, TaskRepository,
    UpsertOutcome,
};
use crate::models::{CategorySnapshot, Settings, SyncConflict, TaskId, TaskRecord};
use crate::Result;

/// Thread-safe handle to the local store.
///
/// Constructed once at startup and cloned into whoever needs it. All storage
/// calls are synchronous once the lock is held; the lock is never held across
/// a network round-trip.
#[derive(Clone)]
pub struct TaskStore {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl TaskStore {
    /// Open a store at the given filesystem path.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::debug!("Opening task store at {}", db_path.display());
        let db = Database::open(&db_path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory store (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem location, if the store is on disk.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run several writes in one transaction; nothing is kept if `apply` fails.
    pub async fn write_batch<T>(&self, apply: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        let output = apply(&tx)?;
        tx.commit()?;
        Ok(output)
    }

    /// Highest synced version for the user.
    pub async fn max_synced_version(&self, user_id: &str) -> Result<i64> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).fetch_max_synced_version(user_id)
    }

    /// Fetch a task by id.
    pub async fn get_task(&self, user_id: &str, task_id: &TaskId) -> Result<Option<TaskRecord>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).fetch_by_task_id(user_id, task_id)
    }

    /// Tasks with local changes pending upload.
    pub async fn dirty_tasks(&self, user_id: &str) -> Result<Vec<TaskRecord>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).fetch_dirty(user_id)
    }

    /// Insert or overwrite a task.
    pub async fn upsert_task(&self, task: &TaskRecord) -> Result<UpsertOutcome> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).upsert(task)
    }

    /// Create a locally authored task, resolving its category display fields.
    pub async fn create_task(&self, mut task: TaskRecord) -> Result<TaskRecord> {
        let db = self.db.lock().await;
        let category =
            SqliteCategoryRepository::new(db.connection()).get_category(task.category_id)?;
        task.apply_category(category.as_ref());
        SqliteTaskRepository::new(db.connection()).create(&task)?;
        Ok(task)
    }

    /// Apply a local edit.
    pub async fn edit_task(
        &self,
        user_id: &str,
        task_id: &TaskId,
        edit: LocalEdit,
        now: i64,
    ) -> Result<TaskRecord> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).edit(user_id, task_id, edit, now)
    }

    /// Tasks due within a day window.
    pub async fn list_day(&self, user_id: &str, query: DayQuery) -> Result<Vec<TaskRecord>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).list_for_day(user_id, query)
    }

    /// Tasks without a due date.
    pub async fn list_undated(
        &self,
        user_id: &str,
        include_completed: bool,
        pin_top: bool,
    ) -> Result<Vec<TaskRecord>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).list_undated(user_id, include_completed, pin_top)
    }

    /// Every task for the user, deleted ones included.
    pub async fn list_all(&self, user_id: &str) -> Result<Vec<TaskRecord>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).list_all(user_id)
    }

    /// Recycle-bin contents.
    pub async fn recycle_bin(&self, user_id: &str, now: i64, days: u32) -> Result<Vec<TaskRecord>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).list_recycle_bin(user_id, now, days)
    }

    /// Drop synced deletions older than the recycle-bin window.
    pub async fn purge_recycle_bin(&self, user_id: &str, now: i64, days: u32) -> Result<usize> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).purge_recycle_bin(user_id, now, days)
    }

    /// Recently logged sync conflicts.
    pub async fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        let db = self.db.lock().await;
        SqliteTaskRepository::new(db.connection()).list_conflicts(limit)
    }

    /// Look up a category.
    pub async fn get_category(&self, id: i64) -> Result<Option<CategorySnapshot>> {
        let db = self.db.lock().await;
        SqliteCategoryRepository::new(db.connection()).get_category(id)
    }

    /// Create or replace a category.
    pub async fn upsert_category(&self, category: &CategorySnapshot) -> Result<()> {
        let db = self.db.lock().await;
        SqliteCategoryRepository::new(db.connection()).upsert_category(category)
    }

    /// All known categories.
    pub async fn list_categories(&self) -> Result<Vec<CategorySnapshot>> {
        let db = self.db.lock().await;
        SqliteCategoryRepository::new(db.connection()).list_categories()
    }

    /// Load display settings.
    pub async fn load_settings(&self) -> Result<Settings> {
        let db = self.db.lock().await;
        SqliteSettingsRepository::new(db.connection()).load()
    }

    /// Save display settings.
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSettingsRepository::new(db.connection()).save(settings)
    }

    /// Whether this device has never finished a sync for the user.
    pub async fn is_first_sync(&self, user_id: &str) -> Result<bool> {
        let db = self.db.lock().await;
        SqliteSettingsRepository::new(db.connection()).is_first_sync(user_id)
    }

    /// Record a completed first sync.
    pub async fn mark_sync_completed(&self, user_id: &str, now: i64) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSettingsRepository::new(db.connection()).mark_sync_completed(user_id, now)
    }
}
