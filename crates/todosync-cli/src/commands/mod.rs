pub mod add;
pub mod bin;
pub mod category;
pub mod common;
pub mod completions;
pub mod config;
pub mod dirty;
pub mod edit;
pub mod list;
pub mod settings;
pub mod sync;
