//! Task model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::category::CategorySnapshot;
use super::checklist::{Attachment, SubTask};
use crate::error::Error;

/// Client-generated task identifier, stable across sync cycles.
///
/// Composed of the owning user id, the creation time in milliseconds and a
/// short random suffix, e.g. `42-1718000000000-a1b2c3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh identifier for `user_id` created at `now` (Unix ms)
    #[must_use]
    pub fn generate(user_id: &str, now: i64) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{user_id}-{now}-{}", &suffix[..6]))
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidInput("Task ID cannot be empty".into()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Local sync state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Matches the server copy at `version`
    #[default]
    Synced,
    /// Created locally, never uploaded
    Added,
    /// Edited locally since the last sync
    Updated,
    /// Soft-deleted locally since the last sync
    Deleted,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }

    /// Whether the record has local changes pending upload
    #[must_use]
    pub const fn is_dirty(self) -> bool {
        !matches!(self, Self::Synced)
    }

    /// Status after a local field edit. Unsent creations stay creations.
    #[must_use]
    pub const fn after_local_edit(self) -> Self {
        match self {
            Self::Added => Self::Added,
            _ => Self::Updated,
        }
    }

    /// Status after a local soft delete. Unsent creations stay creations.
    #[must_use]
    pub const fn after_local_delete(self) -> Self {
        match self {
            Self::Added => Self::Added,
            _ => Self::Deleted,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synced" => Ok(Self::Synced),
            "added" => Ok(Self::Added),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            other => Err(Error::InvalidInput(format!("Unknown task status: {other}"))),
        }
    }
}

/// A versioned task exchanged between the client and the sync backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Server-assigned numeric id (absent until first upload)
    pub id: Option<i64>,
    /// Client-generated identifier, unique per user
    pub task_id: TaskId,
    /// Owning user
    pub user_id: String,
    /// Title text
    pub content: String,
    /// Free-form notes
    pub description: String,
    /// Completion flag
    pub complete: bool,
    /// Soft delete flag
    pub deleted: bool,
    /// Due timestamp (Unix ms), `None` means no date
    pub todo_time: Option<i64>,
    /// Creation timestamp (Unix ms)
    pub create_time: i64,
    /// Reminder timestamp (Unix ms)
    pub reminder_time: Option<i64>,
    /// Manual ordering key within a day
    pub task_sort: f64,
    /// Server version, meaningful only when `status` is `Synced`
    pub version: i64,
    /// Last-write-wins tie breaker (Unix ms)
    pub sync_time: i64,
    /// Local sync state
    pub status: TaskStatus,
    /// Category reference
    pub category_id: i64,
    /// Denormalized category display name
    pub category_name: String,
    /// Denormalized category display color
    pub category_color: String,
    /// Checklist items
    pub subtasks: Vec<SubTask>,
    /// Attached files and links
    pub attachments: Vec<Attachment>,
}

impl TaskRecord {
    /// Create a task locally. It stays `Added` until the first push.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new_local(user_id: impl Into<String>, content: impl Into<String>, now: i64) -> Self {
        let user_id = user_id.into();
        let fallback = CategorySnapshot::uncategorized();
        Self {
            id: None,
            task_id: TaskId::generate(&user_id, now),
            user_id,
            content: content.into(),
            description: String::new(),
            complete: false,
            deleted: false,
            todo_time: None,
            create_time: now,
            reminder_time: None,
            task_sort: now as f64,
            version: 0,
            sync_time: now,
            status: TaskStatus::Added,
            category_id: fallback.id,
            category_name: fallback.name,
            category_color: fallback.color,
            subtasks: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Whether the record has local changes pending upload
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.status.is_dirty()
    }

    /// Sub-tasks as displayed: a completed task completes all of them.
    #[must_use]
    pub fn effective_subtasks(&self) -> Vec<SubTask> {
        self.subtasks
            .iter()
            .map(|item| SubTask {
                title: item.title.clone(),
                complete: self.complete || item.complete,
            })
            .collect()
    }

    /// Copy category display fields onto the task.
    ///
    /// Unknown categories fall back to the "uncategorized" name and color but
    /// keep their id, so a later sync can resolve them.
    pub fn apply_category(&mut self, category: Option<&CategorySnapshot>) {
        match category {
            Some(category) => {
                self.category_name.clone_from(&category.name);
                self.category_color.clone_from(&category.color);
            }
            None => {
                let fallback = CategorySnapshot::uncategorized();
                self.category_name = fallback.name;
                self.category_color = fallback.color;
            }
        }
    }

    /// Record a local edit at `now`
    pub fn touch(&mut self, now: i64) {
        self.sync_time = now;
        self.status = self.status.after_local_edit();
    }
}

/// Sort key placing a task between two neighbours.
///
/// Missing neighbours extend the list by one unit in that direction.
#[must_use]
pub fn sort_between(before: Option<f64>, after: Option<f64>) -> f64 {
    match (before, after) {
        (Some(before), Some(after)) => before + (after - before) / 2.0,
        (Some(before), None) => before + 1.0,
        (None, Some(after)) => after - 1.0,
        (None, None) => 0.0,
    }
}

/// Sort key appending after `last`
#[must_use]
pub fn sort_after(last: Option<f64>) -> f64 {
    sort_between(last, None)
}
