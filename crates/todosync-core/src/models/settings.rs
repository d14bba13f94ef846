//! Local display settings

use serde::{Deserialize, Serialize};

/// Per-device settings that shape task list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Newest manual position first within a day (descending `task_sort`)
    pub pin_top: bool,
    /// Whether day views include completed tasks
    pub show_completed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pin_top: false,
            show_completed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(!settings.pin_top);
        assert!(settings.show_completed);
    }
}
