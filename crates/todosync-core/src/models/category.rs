//! Category snapshot model

use serde::{Deserialize, Serialize};

/// Display name used when a task's category cannot be resolved
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
/// Display color used when a task's category cannot be resolved
pub const UNCATEGORIZED_COLOR: &str = "#8E8E93";

/// Read-only view of a category, copied onto tasks at sync time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    /// Category identifier referenced by `TaskRecord::category_id`
    pub id: i64,
    /// Display name
    pub name: String,
    /// Display color (e.g. `#FF9500`)
    pub color: String,
}

impl CategorySnapshot {
    /// Create a new category snapshot
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }

    /// Fallback for tasks whose category id is unknown
    #[must_use]
    pub fn uncategorized() -> Self {
        Self::new(0, UNCATEGORIZED_NAME, UNCATEGORIZED_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncategorized_uses_fallback_display_values() {
        let fallback = CategorySnapshot::uncategorized();
        assert_eq!(fallback.id, 0);
        assert_eq!(fallback.name, UNCATEGORIZED_NAME);
        assert_eq!(fallback.color, UNCATEGORIZED_COLOR);
    }
}
