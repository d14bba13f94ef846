//! Data models for todosync

mod category;
mod checklist;
mod settings;
mod sync_conflict;
mod task;

pub use category::CategorySnapshot;
pub use checklist::{
    decode_attachments, decode_subtasks, encode_attachments, encode_subtasks, Attachment, SubTask,
};
pub use settings::Settings;
pub use sync_conflict::SyncConflict;
pub use task::{sort_after, sort_between, TaskId, TaskRecord, TaskStatus};
