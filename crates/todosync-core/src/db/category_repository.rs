//! Category repository implementation

use crate::error::Result;
use crate::models::CategorySnapshot;
use rusqlite::{params, Connection, OptionalExtension};

/// Trait for category lookups used to denormalize task display fields
pub trait CategoryRepository {
    /// Get a category by id
    fn get_category(&self, id: i64) -> Result<Option<CategorySnapshot>>;

    /// Create or replace a category
    fn upsert_category(&self, category: &CategorySnapshot) -> Result<()>;

    /// List categories ordered by id
    fn list_categories(&self) -> Result<Vec<CategorySnapshot>>;
}

/// `SQLite` implementation of `CategoryRepository`
pub struct SqliteCategoryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCategoryRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<CategorySnapshot> {
        Ok(CategorySnapshot {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
        })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn get_category(&self, id: i64) -> Result<Option<CategorySnapshot>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, color FROM categories WHERE id = ?",
                params![id],
                Self::parse_category,
            )
            .optional()?;
        Ok(category)
    }

    fn upsert_category(&self, category: &CategorySnapshot) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO categories (id, name, color) VALUES (?, ?, ?)",
            params![category.id, category.name, category.color],
        )?;
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<CategorySnapshot>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM categories ORDER BY id ASC")?;
        let categories = stmt
            .query_map([], Self::parse_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_missing_category() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteCategoryRepository::new(db.connection());
        assert!(repo.get_category(42).unwrap().is_none());
    }

    #[test]
    fn test_upsert_and_list() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteCategoryRepository::new(db.connection());

        repo.upsert_category(&CategorySnapshot::new(2, "Home", "#34C759"))
            .unwrap();
        repo.upsert_category(&CategorySnapshot::new(1, "Work", "#FF9500"))
            .unwrap();
        repo.upsert_category(&CategorySnapshot::new(2, "House", "#30B0C7"))
            .unwrap();

        let categories = repo.list_categories().unwrap();
        assert_eq!(
            categories,
            vec![
                CategorySnapshot::new(1, "Work", "#FF9500"),
                CategorySnapshot::new(2, "House", "#30B0C7"),
            ]
        );
    }
}
