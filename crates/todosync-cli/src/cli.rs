use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "todosync")]
#[command(about = "Offline-first task list with server sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// User whose tasks to operate on
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new task
    #[command(alias = "new")]
    Add {
        /// Task content
        content: Vec<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
        /// Category id
        #[arg(long, value_name = "ID")]
        category: Option<i64>,
    },
    /// List tasks for a day, or undated tasks when no date is given
    #[command(alias = "ls")]
    List {
        /// Day to show (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
        /// Leave completed tasks out
        #[arg(long)]
        hide_completed: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task complete
    Done {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Mark a task incomplete
    Undo {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Move a task to the recycle bin
    Delete {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Bring a task back from the recycle bin
    Restore {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Reposition a task within its list
    Move {
        /// Task ID or unique ID prefix
        id: String,
        /// Place directly after this task
        #[arg(long, value_name = "ID")]
        after: Option<String>,
        /// Place directly before this task
        #[arg(long, value_name = "ID")]
        before: Option<String>,
    },
    /// Show recently deleted tasks
    Bin {
        #[command(subcommand)]
        command: Option<BinCommands>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show tasks waiting to be uploaded
    Dirty {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile local tasks with the sync server
    Sync {
        #[command(subcommand)]
        command: Option<SyncCommands>,
        /// Output the sync report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage task categories
    #[command(alias = "cat")]
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Show or change list display settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure the sync server connection
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum BinCommands {
    /// Permanently drop synced deletions older than the retention window
    Purge,
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create or rename a category
    Add {
        /// Category id, as the server knows it
        id: i64,
        /// Display name
        name: String,
        /// Display color
        #[arg(long, default_value = "#8E8E93")]
        color: String,
    },
    /// List known categories
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Change one or more settings
    Set {
        /// Highest manual position first
        #[arg(long, value_name = "BOOL")]
        pin_top: Option<bool>,
        /// Include completed tasks in lists
        #[arg(long, value_name = "BOOL")]
        show_completed: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// List incoming changes rejected by last-write-wins
    Conflicts {
        /// Number of conflicts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update the sync configuration
    Init {
        /// Sync API base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Bearer token sent to the sync API
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
        /// Default user id
        #[arg(long, value_name = "ID")]
        user: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// Print the current configuration with secrets redacted
    Show,
}
