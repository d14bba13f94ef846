//! Reconciliation engine: one pull-then-push pass at a time.

use serde::Serialize;
use tokio::sync::{watch, Mutex};

use super::merge::{apply_incoming, MergeDecision};
use super::reminder::ReminderScheduler;
use super::remote::RemoteSync;
use crate::config::{SyncPolicy, VersionSkewPolicy};
use crate::db::{
    CategoryRepository, SqliteCategoryRepository, SqliteTaskRepository, TaskRepository,
    UpsertOutcome,
};
use crate::error::{Error, Result};
use crate::models::TaskRecord;
use crate::services::TaskStore;
use crate::util::now_millis;

/// Where the current pass is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    FetchingVersions,
    Pulling,
    Merging,
    PushingDirty,
    ReconcilingPushResponse,
}

/// Result of applying one incoming batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub rejected: usize,
    /// Records dropped because they carried no task id
    pub skipped: usize,
}

/// What a completed pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub remote_version: i64,
    pub local_version: i64,
    pub first_sync: bool,
    pub skipped_pull: bool,
    pub pulled: usize,
    pub merge: MergeSummary,
    pub pushed: usize,
    pub push_applied: usize,
    /// Canonical copies dropped because they carried no task id
    pub push_skipped: usize,
    pub reminders_scheduled: usize,
}

/// Reconciles the local store with the backend for one user.
///
/// Passes are serialized: `sync` waits for a running pass to finish, while
/// `try_sync` fails fast with [`Error::SyncInProgress`].
pub struct SyncEngine<R, M> {
    store: TaskStore,
    remote: R,
    reminders: M,
    policy: SyncPolicy,
    user_id: String,
    pass_lock: Mutex<()>,
    phase: watch::Sender<SyncPhase>,
}

impl<R: RemoteSync, M: ReminderScheduler> SyncEngine<R, M> {
    pub fn new(store: TaskStore, remote: R, reminders: M, user_id: impl Into<String>) -> Self {
        let (phase, _) = watch::channel(SyncPhase::Idle);
        Self {
            store,
            remote,
            reminders,
            policy: SyncPolicy::default(),
            user_id: user_id.into(),
            pass_lock: Mutex::new(()),
            phase,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn reminders(&self) -> &M {
        &self.reminders
    }

    /// Current phase of the running pass, `Idle` between passes
    pub fn phase(&self) -> SyncPhase {
        *self.phase.borrow()
    }

    /// Watch phase transitions
    pub fn subscribe(&self) -> watch::Receiver<SyncPhase> {
        self.phase.subscribe()
    }

    /// Run one full pass, waiting behind any pass already running
    pub async fn sync(&self) -> Result<SyncReport> {
        let _pass = self.pass_lock.lock().await;
        self.run_pass().await
    }

    /// Run one full pass unless another is already running
    pub async fn try_sync(&self) -> Result<SyncReport> {
        let _pass = self
            .pass_lock
            .try_lock()
            .map_err(|_| Error::SyncInProgress)?;
        self.run_pass().await
    }

    async fn run_pass(&self) -> Result<SyncReport> {
        tracing::info!("Sync pass started for user {}", self.user_id);
        let result = self.run_steps().await;
        self.set_phase(SyncPhase::Idle);

        match &result {
            Ok(report) => tracing::info!(
                "Sync pass finished: pulled={} inserted={} updated={} rejected={} pushed={}",
                report.pulled,
                report.merge.inserted,
                report.merge.updated,
                report.merge.rejected,
                report.pushed
            ),
            Err(error) => tracing::warn!("Sync pass failed: {error}"),
        }
        result
    }

    async fn run_steps(&self) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        self.set_phase(SyncPhase::FetchingVersions);
        let is_first = self.store.is_first_sync(&self.user_id).await?;
        report.first_sync = is_first;
        report.remote_version = self.remote.get_current_version().await?;
        report.local_version = self.store.max_synced_version(&self.user_id).await?;

        if report.remote_version > report.local_version {
            self.set_phase(SyncPhase::Pulling);
            let sync_num = report.remote_version - report.local_version;
            let incoming = self.remote.pull(sync_num, is_first).await?;
            report.pulled = incoming.len();

            self.set_phase(SyncPhase::Merging);
            let (summary, touched) = self.merge_batch(incoming).await?;
            report.merge = summary;
            report.reminders_scheduled += self.schedule_reminders(&touched);
        } else {
            report.skipped_pull = true;
            if report.remote_version < report.local_version {
                self.handle_version_skew(report.local_version, report.remote_version)?;
            } else {
                tracing::debug!("Local version {} is current", report.local_version);
            }
        }

        if is_first {
            self.store
                .mark_sync_completed(&self.user_id, now_millis())
                .await?;
        }

        let dirty = self.store.dirty_tasks(&self.user_id).await?;
        if !dirty.is_empty() {
            self.set_phase(SyncPhase::PushingDirty);
            report.pushed = dirty.len();
            let canonical = self.remote.push(&dirty).await?;

            self.set_phase(SyncPhase::ReconcilingPushResponse);
            let (applied, skipped) = self.apply_push_response(canonical).await?;
            report.push_applied = applied.len();
            report.push_skipped = skipped;
            report.reminders_scheduled += self.schedule_reminders(&applied);
        }

        if self.policy.resync_all_reminders {
            let all = self.store.list_all(&self.user_id).await?;
            report.reminders_scheduled += self.schedule_reminders(&all);
        }

        Ok(report)
    }

    fn handle_version_skew(&self, local: i64, remote: i64) -> Result<()> {
        match self.policy.version_skew {
            VersionSkewPolicy::Ignore => {
                tracing::warn!(
                    "Server version {remote} is behind local version {local}; skipping pull"
                );
                Ok(())
            }
            VersionSkewPolicy::Fail => Err(Error::VersionSkew { local, remote }),
        }
    }

    /// Merge an incoming server batch into the local store.
    ///
    /// The batch is written in one transaction. Reminder scheduling is left
    /// to the caller; the touched records are returned for that.
    pub async fn merge_incoming(&self, incoming: Vec<TaskRecord>) -> Result<MergeSummary> {
        let (summary, _) = self.merge_batch(incoming).await?;
        Ok(summary)
    }

    async fn merge_batch(
        &self,
        incoming: Vec<TaskRecord>,
    ) -> Result<(MergeSummary, Vec<TaskRecord>)> {
        let user_id = self.user_id.as_str();
        let now = now_millis();

        self.store
            .write_batch(|conn| {
                let tasks = SqliteTaskRepository::new(conn);
                let categories = SqliteCategoryRepository::new(conn);
                let mut summary = MergeSummary::default();
                let mut touched = Vec::new();

                for mut record in incoming {
                    if lacks_task_id(&record) {
                        tracing::debug!(
                            "Skipping pulled record without a task id (version {})",
                            record.version
                        );
                        summary.skipped += 1;
                        continue;
                    }
                    record.user_id = user_id.to_string();

                    let Some(existing) = tasks.fetch_by_task_id(user_id, &record.task_id)? else {
                        record.apply_category(categories.get_category(record.category_id)?.as_ref());
                        tasks.upsert(&record)?;
                        tracing::debug!("Inserted pulled task {}", record.task_id);
                        summary.inserted += 1;
                        touched.push(record);
                        continue;
                    };

                    match apply_incoming(&existing, &record) {
                        MergeDecision::Apply(mut merged) => {
                            merged.apply_category(
                                categories.get_category(merged.category_id)?.as_ref(),
                            );
                            tasks.upsert(&merged)?;
                            tracing::debug!("Updated task {} from server", merged.task_id);
                            summary.updated += 1;
                            touched.push(merged);
                        }
                        MergeDecision::Unchanged => summary.unchanged += 1,
                        MergeDecision::Stale {
                            local_sync_time,
                            incoming_sync_time,
                        } => {
                            tracing::debug!(
                                "Kept local task {} ({local_sync_time} > {incoming_sync_time})",
                                existing.task_id
                            );
                            let logged = tasks.record_conflict(
                                &existing.task_id,
                                local_sync_time,
                                incoming_sync_time,
                                now,
                            )?;
                            if !logged {
                                tracing::debug!(
                                    "Conflict for {} already logged",
                                    existing.task_id
                                );
                            }
                            summary.rejected += 1;
                        }
                    }
                }

                Ok((summary, touched))
            })
            .await
    }

    /// Adopt the server's canonical copies of pushed records, unconditionally.
    ///
    /// Returns the applied copies and the number dropped for lacking a task id.
    async fn apply_push_response(
        &self,
        canonical: Vec<TaskRecord>,
    ) -> Result<(Vec<TaskRecord>, usize)> {
        let user_id = self.user_id.as_str();

        self.store
            .write_batch(|conn| {
                let tasks = SqliteTaskRepository::new(conn);
                let categories = SqliteCategoryRepository::new(conn);
                let mut applied = Vec::with_capacity(canonical.len());
                let mut skipped = 0;

                for mut record in canonical {
                    if lacks_task_id(&record) {
                        tracing::debug!(
                            "Skipping canonical copy without a task id (version {})",
                            record.version
                        );
                        skipped += 1;
                        continue;
                    }
                    record.user_id = user_id.to_string();
                    if let Some(existing) = tasks.fetch_by_task_id(user_id, &record.task_id)? {
                        if record.sync_time < existing.sync_time {
                            tracing::debug!(
                                "Server copy of {} is older than local ({} < {}); applying anyway",
                                record.task_id,
                                record.sync_time,
                                existing.sync_time
                            );
                        }
                    }
                    record.apply_category(categories.get_category(record.category_id)?.as_ref());
                    if tasks.upsert(&record)? == UpsertOutcome::Inserted {
                        tracing::debug!("Server returned unknown task {}", record.task_id);
                    }
                    applied.push(record);
                }

                Ok((applied, skipped))
            })
            .await
    }

    fn schedule_reminders(&self, tasks: &[TaskRecord]) -> usize {
        for task in tasks {
            self.reminders.handle_reminder_event(task);
        }
        tasks.len()
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.phase.send_replace(phase);
    }
}

fn lacks_task_id(record: &TaskRecord) -> bool {
    record.task_id.as_str().trim().is_empty()
}
