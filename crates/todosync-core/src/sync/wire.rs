//! JSON shapes exchanged with the sync backend

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    decode_attachments, decode_subtasks, encode_attachments, encode_subtasks, CategorySnapshot,
    TaskId, TaskRecord, TaskStatus,
};

/// Envelope codes the backend uses for success
const SUCCESS_CODES: [i64; 2] = [0, 200];

/// Response envelope wrapping every endpoint's payload
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub code: i64,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        SUCCESS_CODES.contains(&self.code)
    }
}

/// A task as the backend serializes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPayload {
    #[serde(deserialize_with = "lenient_opt_i64")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub task_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub complete: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub delete: bool,
    #[serde(deserialize_with = "lenient_i64")]
    pub todo_time: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub create_time: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub reminder_time: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub task_sort: f64,
    #[serde(deserialize_with = "lenient_i64")]
    pub version: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub sync_time: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    /// Category id
    #[serde(deserialize_with = "lenient_i64")]
    pub standby_int1: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub sub_tasks: String,
    #[serde(deserialize_with = "lenient_string")]
    pub attachments: String,
}

impl TaskPayload {
    /// Encode a local record for upload
    pub fn from_record(task: &TaskRecord) -> Self {
        Self {
            id: task.id,
            user_id: task.user_id.clone(),
            task_id: task.task_id.to_string(),
            content: task.content.clone(),
            description: task.description.clone(),
            complete: task.complete,
            delete: task.deleted,
            todo_time: task.todo_time.unwrap_or(0),
            create_time: task.create_time,
            reminder_time: task.reminder_time.unwrap_or(0),
            task_sort: task.task_sort,
            version: task.version,
            sync_time: task.sync_time,
            status: task.status.as_str().to_string(),
            standby_int1: task.category_id,
            sub_tasks: encode_subtasks(&task.subtasks),
            attachments: encode_attachments(&task.attachments),
        }
    }

    /// Decode a server copy.
    ///
    /// Anything the server hands back is its canonical state, so the result
    /// is always `Synced` whatever `status` says. Category display fields are
    /// placeholders until the engine resolves them.
    pub fn into_record(self) -> TaskRecord {
        let fallback = CategorySnapshot::uncategorized();
        TaskRecord {
            id: self.id,
            task_id: TaskId::from(self.task_id.trim()),
            user_id: self.user_id,
            content: self.content,
            description: self.description,
            complete: self.complete,
            deleted: self.delete,
            todo_time: non_zero(self.todo_time),
            create_time: self.create_time,
            reminder_time: non_zero(self.reminder_time),
            task_sort: self.task_sort,
            version: self.version,
            sync_time: self.sync_time,
            status: TaskStatus::Synced,
            category_id: self.standby_int1,
            category_name: fallback.name,
            category_color: fallback.color,
            subtasks: decode_subtasks(&self.sub_tasks),
            attachments: decode_attachments(&self.attachments),
        }
    }
}

/// Body of `syncGetData`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub is_first: bool,
    pub sync_num: i64,
}

/// Body of `syncPushData`; `tasks_json` is itself a JSON array string
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub tasks_json: String,
}

impl PushRequest {
    pub fn from_records(tasks: &[TaskRecord]) -> serde_json::Result<Self> {
        let payloads = tasks.iter().map(TaskPayload::from_record).collect::<Vec<_>>();
        Ok(Self {
            tasks_json: serde_json::to_string(&payloads)?,
        })
    }
}

const fn non_zero(value: i64) -> Option<i64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => value,
        Value::Null => String::new(),
        Value::Number(value) => value.to_string(),
        Value::Bool(value) => value.to_string(),
        other => other.to_string(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(value) => value,
        Value::Number(value) => value.as_f64().is_some_and(|value| value != 0.0),
        Value::String(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        ),
        _ => false,
    })
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(value_to_i64(&Value::deserialize(deserializer)?))
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(value_to_i64(&Value::deserialize(deserializer)?).unwrap_or(0))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(value) => value.as_f64().unwrap_or(0.0),
        Value::String(value) => value.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Integers arrive as numbers, floats, or numeric strings depending on the endpoint
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|value| value as i64))
        }
        _ => None,
    }
}
