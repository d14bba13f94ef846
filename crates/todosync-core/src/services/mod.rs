//! Shared services used across clients

mod task_store;

pub use task_store::TaskStore;
