//! Task version synchronization
//!
//! [`SyncEngine`] reconciles the local [`TaskStore`](crate::TaskStore) with the
//! backend through a [`RemoteSync`] client: pull what the server has that we
//! don't, merge it last-write-wins, then push local changes and adopt the
//! server's canonical copies.

mod engine;
pub mod merge;
mod reminder;
mod remote;
pub mod wire;

pub use engine::{MergeSummary, SyncEngine, SyncPhase, SyncReport};
pub use merge::{apply_incoming, MergeDecision};
pub use reminder::{ReminderAction, ReminderScheduler, TracingReminderScheduler};
pub use remote::{HttpSyncClient, RemoteSync};
