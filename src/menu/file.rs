//! TOML menu file loading
//!
//! ```toml
//! [[categories]]
//! name = "brasa"
//! triggers = ["brasa", "asado"]
//!
//! [[categories.items]]
//! name = "1 POLLO A LA BRASA"
//! price = 53.90
//! aliases = ["pollo entero a la brasa"]
//! ```

use std::path::Path;

use serde::Deserialize;

use super::{Catalog, Category, MenuItem, Price};
use crate::{Error, Result};

#[derive(Debug, Default, Deserialize)]
struct MenuFile {
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    name: String,
    #[serde(default)]
    triggers: Vec<String>,
    #[serde(default)]
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    name: String,
    price: Price,
    #[serde(default)]
    aliases: Vec<String>,
}

/// Parse a menu from TOML text
///
/// # Errors
///
/// Returns error if the TOML is malformed, or a category or item name is empty
pub fn parse(content: &str) -> Result<Catalog> {
    let file: MenuFile = toml::from_str(content)?;

    let mut categories = Vec::with_capacity(file.categories.len());
    for entry in file.categories {
        let name = entry.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::Menu("category with empty name".to_string()));
        }

        let mut items = Vec::with_capacity(entry.items.len());
        for item in entry.items {
            let item_name = item.name.trim();
            if item_name.is_empty() {
                return Err(Error::Menu(format!("empty item name in category {name}")));
            }
            if items.iter().any(|i: &MenuItem| i.name == item_name) {
                tracing::warn!(category = %name, item = item_name, "duplicate menu item skipped");
                continue;
            }
            items.push(MenuItem {
                name: item_name.to_string(),
                category: name.clone(),
                unit_price: item.price,
                aliases: item.aliases,
            });
        }

        categories.push(Category::new(name, entry.triggers, items));
    }

    Ok(Catalog::from_categories(categories))
}

/// Load a menu from a TOML file
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn load(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)?;
    let catalog = parse(&content)?;
    tracing::info!(path = %path.display(), "loaded menu file");
    Ok(catalog)
}
