//! Record-level last-write-wins merge policy

use crate::models::TaskRecord;

/// Outcome of offering an incoming server record to an existing local one
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    /// Incoming is strictly newer; store this record in place of the local one
    Apply(TaskRecord),
    /// Same `sync_time`; nothing to do (a replayed batch lands here)
    Unchanged,
    /// Incoming is older than local; local wins
    Stale {
        local_sync_time: i64,
        incoming_sync_time: i64,
    },
}

/// Decide whether `incoming` replaces `existing`.
///
/// The whole record is replaced, never individual fields, so a local edit
/// with an older `sync_time` than an unrelated remote edit is lost. Identity
/// (`user_id`, `task_id`) always stays the local one, and a missing server id
/// keeps the id already known locally.
pub fn apply_incoming(existing: &TaskRecord, incoming: &TaskRecord) -> MergeDecision {
    if incoming.sync_time > existing.sync_time {
        let mut merged = incoming.clone();
        merged.user_id.clone_from(&existing.user_id);
        merged.task_id = existing.task_id.clone();
        if merged.id.is_none() {
            merged.id = existing.id;
        }
        MergeDecision::Apply(merged)
    } else if incoming.sync_time == existing.sync_time {
        MergeDecision::Unchanged
    } else {
        MergeDecision::Stale {
            local_sync_time: existing.sync_time,
            incoming_sync_time: incoming.sync_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubTask, TaskId, TaskStatus};
    use pretty_assertions::assert_eq;

    fn record(task_id: &str, sync_time: i64) -> TaskRecord {
        let mut task = TaskRecord::new_local("u1", "original", 1);
        task.task_id = TaskId::from(task_id);
        task.sync_time = sync_time;
        task.status = TaskStatus::Synced;
        task.id = Some(11);
        task
    }

    #[test]
    fn test_older_incoming_is_stale() {
        let local = record("T2", 200);
        let incoming = record("T2", 150);
        assert_eq!(
            apply_incoming(&local, &incoming),
            MergeDecision::Stale {
                local_sync_time: 200,
                incoming_sync_time: 150
            }
        );
    }

    #[test]
    fn test_newer_incoming_overwrites_every_field() {
        let mut local = record("T2", 200);
        local.status = TaskStatus::Updated;
        local.description = "local notes".into();

        let mut incoming = record("T2", 250);
        incoming.complete = true;
        incoming.content = "from server".into();
        incoming.version = 8;
        incoming.subtasks = vec![SubTask::new("x", false)];

        let MergeDecision::Apply(merged) = apply_incoming(&local, &incoming) else {
            panic!("expected newer record to apply");
        };
        assert_eq!(merged, incoming);
        assert!(merged.complete);
        assert_eq!(merged.description, "");
        assert_eq!(merged.status, TaskStatus::Synced);
    }

    #[test]
    fn test_apply_keeps_known_server_id() {
        let local = record("T2", 1);
        let mut incoming = record("T2", 2);
        incoming.id = None;
        let MergeDecision::Apply(merged) = apply_incoming(&local, &incoming) else {
            panic!("expected newer record to apply");
        };
        assert_eq!(merged.id, Some(11));
    }

    #[test]
    fn test_reapplying_merged_record_is_a_no_op() {
        let local = record("T9", 10);
        for step in 1..50 {
            let mut incoming = record("T9", 10 + step);
            incoming.task_sort = f64::from(u32::try_from(step).unwrap());
            let MergeDecision::Apply(merged) = apply_incoming(&local, &incoming) else {
                panic!("expected newer record to apply");
            };
            assert_eq!(apply_incoming(&merged, &incoming), MergeDecision::Unchanged);
        }
    }
}
