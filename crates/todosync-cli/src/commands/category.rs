use std::path::Path;

use todosync_core::CategorySnapshot;

use crate::commands::common::{normalize_content, open_store};
use crate::error::CliError;

pub async fn run_category_add(
    id: i64,
    name: &str,
    color: &str,
    db_path: &Path,
) -> Result<CategorySnapshot, CliError> {
    let name = normalize_content(name).ok_or(CliError::EmptyCategoryName)?;
    let category = CategorySnapshot::new(id, name, color.trim());

    let store = open_store(db_path)?;
    store.upsert_category(&category).await?;
    println!("Saved category {} ({})", category.id, category.name);
    Ok(category)
}

pub async fn run_category_list(
    as_json: bool,
    db_path: &Path,
) -> Result<Vec<CategorySnapshot>, CliError> {
    let store = open_store(db_path)?;
    let categories = store.list_categories().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else if categories.is_empty() {
        println!("No categories.");
    } else {
        for line in format_category_lines(&categories) {
            println!("{line}");
        }
    }
    Ok(categories)
}

pub fn format_category_lines(categories: &[CategorySnapshot]) -> Vec<String> {
    categories
        .iter()
        .map(|category| format!("{:>4}  {:<8}  {}", category.id, category.color, category.name))
        .collect()
}
