//! Reminder scheduling seam

use crate::models::TaskRecord;
use crate::util::now_millis;

/// What the platform calendar should hold for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    /// Create or move the reminder to `at` (Unix ms)
    Upsert { at: i64 },
    /// Drop any existing reminder
    Remove,
    /// Reminder time already passed; leave the calendar alone
    Expired,
}

impl ReminderAction {
    /// Decide the calendar action for `task` at `now`
    pub fn for_task(task: &TaskRecord, now: i64) -> Self {
        if task.deleted || task.complete {
            return Self::Remove;
        }
        match task.reminder_time {
            None => Self::Remove,
            Some(at) if at > now => Self::Upsert { at },
            Some(_) => Self::Expired,
        }
    }
}

/// Receives every task the sync engine touches.
///
/// Implementations bridge to a system calendar; they must not fail the sync.
pub trait ReminderScheduler {
    fn handle_reminder_event(&self, task: &TaskRecord);
}

/// Scheduler that only logs its decisions
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReminderScheduler;

impl ReminderScheduler for TracingReminderScheduler {
    fn handle_reminder_event(&self, task: &TaskRecord) {
        match ReminderAction::for_task(task, now_millis()) {
            ReminderAction::Upsert { at } => {
                tracing::debug!("Reminder for {} scheduled at {at}", task.task_id);
            }
            ReminderAction::Remove => {
                tracing::trace!("Reminder for {} removed", task.task_id);
            }
            ReminderAction::Expired => {
                tracing::trace!("Reminder for {} already passed", task.task_id);
            }
        }
    }
}
