//! Settings and per-user sync state repository

use crate::error::{Error, Result};
use crate::models::Settings;
use rusqlite::{params, Connection, OptionalExtension};

/// Trait for settings and first-sync bookkeeping
pub trait SettingsRepository {
    /// Load settings from the database
    fn load(&self) -> Result<Settings>;

    /// Save settings to the database
    fn save(&self, settings: &Settings) -> Result<()>;

    /// Whether the user has never completed a sync pass on this device
    fn is_first_sync(&self, user_id: &str) -> Result<bool>;

    /// Record that the user's first sync completed
    fn mark_sync_completed(&self, user_id: &str, now: i64) -> Result<()>;
}

/// `SQLite` implementation of `SettingsRepository`
pub struct SqliteSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_setting(&self, key: &str) -> Result<String> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// A stored value, or `None` when the key was never written
    fn find_setting(&self, key: &str) -> Result<Option<String>> {
        match self.get_setting(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn load(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(value) = self.find_setting("pin_top")? {
            settings.pin_top = parse_flag(&value);
        }

        if let Some(value) = self.find_setting("show_completed")? {
            settings.show_completed = parse_flag(&value);
        }

        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.set_setting("pin_top", if settings.pin_top { "true" } else { "false" })?;
        self.set_setting(
            "show_completed",
            if settings.show_completed {
                "true"
            } else {
                "false"
            },
        )?;
        Ok(())
    }

    fn is_first_sync(&self, user_id: &str) -> Result<bool> {
        let completed: Option<bool> = self
            .conn
            .query_row(
                "SELECT first_sync_completed FROM sync_state WHERE user_id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(!completed.unwrap_or(false))
    }

    fn mark_sync_completed(&self, user_id: &str, now: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_state (user_id, first_sync_completed, completed_at)
             VALUES (?1, 1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET first_sync_completed = 1, completed_at = ?2",
            params![user_id, now],
        )?;
        Ok(())
    }
}
