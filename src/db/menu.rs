//! Menu repository
//!
//! Items are stored flat with their category name; category order is the order
//! of first appearance.

use rusqlite::params;

use super::DbPool;
use crate::menu::{Catalog, Category, MenuItem, Price};
use crate::{Error, Result};

/// Menu repository
#[derive(Clone)]
pub struct MenuRepo {
    pool: DbPool,
}

impl MenuRepo {
    /// Create a new menu repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of stored menu items
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn count(&self) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM menu_items", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Build a catalog from the stored menu
    ///
    /// Trigger words come from [`crate::menu::default_triggers`].
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails or a row is malformed
    pub fn load_catalog(&self) -> Result<Catalog> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT category, name, price_cents, aliases FROM menu_items ORDER BY position")
            .map_err(|e| Error::Database(e.to_string()))?;

        let rows: Vec<(String, String, i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        let mut categories: Vec<Category> = Vec::new();
        for (category, name, price_cents, aliases) in rows {
            let cents = u64::try_from(price_cents)
                .map_err(|_| Error::Database(format!("negative price for {name}")))?;
            let item = MenuItem {
                name,
                category: category.clone(),
                unit_price: Price::from_cents(cents),
                aliases: serde_json::from_str(&aliases)?,
            };

            match categories.iter_mut().find(|c| c.name == category) {
                Some(existing) => existing.items.push(item),
                None => categories.push(Category::new(category, Vec::new(), vec![item])),
            }
        }

        Ok(Catalog::from_categories(categories))
    }

    /// Replace the stored menu with a catalog
    ///
    /// Returns the number of items written.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn replace(&self, catalog: &Catalog) -> Result<usize> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        tx.execute("DELETE FROM menu_items", [])
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut written = 0;
        for (position, item) in catalog.items().enumerate() {
            let cents = i64::try_from(item.unit_price.cents())
                .map_err(|_| Error::Menu(format!("price too large for {}", item.name)))?;
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            tx.execute(
                "INSERT INTO menu_items (category, name, price_cents, aliases, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.category,
                    item.name,
                    cents,
                    serde_json::to_string(&item.aliases)?,
                    position,
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
            written += 1;
        }

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        tracing::info!(items = written, "menu stored");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;
    use crate::menu::default_catalog;

    #[test]
    fn test_empty_menu() {
        let repo = MenuRepo::new(init_memory().unwrap());
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.load_catalog().unwrap().is_empty());
    }

    #[test]
    fn test_replace_and_load() {
        let repo = MenuRepo::new(init_memory().unwrap());
        let catalog = default_catalog();

        let written = repo.replace(&catalog).unwrap();
        assert_eq!(written, catalog.items().count());
        assert_eq!(repo.count().unwrap(), written);

        let loaded = repo.load_catalog().unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_replace_overwrites() {
        let repo = MenuRepo::new(init_memory().unwrap());
        repo.replace(&default_catalog()).unwrap();

        let small = Catalog::from_categories(vec![Category::new(
            "postres",
            Vec::new(),
            vec![MenuItem {
                name: "SUSPIRO LIMENO".to_string(),
                category: "postres".to_string(),
                unit_price: Price::from_cents(1200),
                aliases: Vec::new(),
            }],
        )]);
        repo.replace(&small).unwrap();

        let loaded = repo.load_catalog().unwrap();
        assert_eq!(loaded.categories().len(), 1);
        assert_eq!(loaded.categories()[0].triggers, vec!["postres"]);
    }
}
