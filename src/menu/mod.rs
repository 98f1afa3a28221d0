//! Menu catalog
//!
//! The catalog maps each category to an ordered list of items. It is loaded once
//! at startup (embedded menu, TOML file, rendered markup, or the database) and is
//! read-only afterwards. An empty catalog is valid: every lookup returns `None`.

pub mod file;
pub mod markup;
mod price;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::db::MenuRepo;
use crate::{Error, Result};

pub use price::Price;

/// Embedded Brasa Roja menu
const DEFAULT_MENU: &str = include_str!("brasa_roja.toml");

/// Trigger words for the categories the restaurant has always offered
const DEFAULT_TRIGGERS: &[(&str, &[&str])] = &[
    ("brasa", &["brasa", "asado"]),
    ("broaster", &["broaster", "frito", "crujiente"]),
    ("parrillas", &["parrillas", "parrilla", "parrillada", "churrasco"]),
    (
        "carnes y piqueos",
        &["carnes", "piqueos", "anticuchos", "mollejitas", "entradas"],
    ),
    (
        "guarniciones",
        &["guarniciones", "papas", "ensalada", "arroz", "acompanamientos"],
    ),
];

/// A single orderable dish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Display name, unique within its category
    pub name: String,
    /// Owning category name
    pub category: String,
    /// Unit price
    pub unit_price: Price,
    /// Spoken synonyms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// A named group of items with the words that select it by voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl Category {
    /// Create a category, filling in known trigger words when none are given
    #[must_use]
    pub fn new(name: impl Into<String>, triggers: Vec<String>, items: Vec<MenuItem>) -> Self {
        let name = name.into();
        let triggers = if triggers.is_empty() {
            default_triggers(&name)
        } else {
            triggers
        };
        Self {
            name,
            triggers,
            items,
        }
    }
}

/// Read-only menu, categories kept in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog from loaded categories
    #[must_use]
    pub fn from_categories(categories: Vec<Category>) -> Self {
        let item_count: usize = categories.iter().map(|c| c.items.len()).sum();
        tracing::debug!(
            categories = categories.len(),
            items = item_count,
            "menu catalog loaded"
        );
        Self { categories }
    }

    /// All categories in declaration order
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Find a category by exact name
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Iterate every item across all categories, in catalog order
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Find an item by exact name
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&MenuItem> {
        self.items().find(|i| i.name == name)
    }

    /// True when no category was loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Map free-form recognized text to a menu item
    ///
    /// Uses longest-substring matching, see [`crate::matcher`].
    #[must_use]
    pub fn lookup_by_free_text(&self, text: &str) -> Option<&MenuItem> {
        crate::matcher::find_item(self, &crate::matcher::normalize(text)).map(|m| m.item)
    }
}

/// The embedded Brasa Roja menu
///
/// # Panics
///
/// Never in practice: the embedded menu is covered by tests.
#[must_use]
#[allow(clippy::expect_used)]
pub fn default_catalog() -> Catalog {
    file::parse(DEFAULT_MENU).expect("embedded menu is valid TOML")
}

/// Known trigger words for a category name
///
/// Unknown categories trigger on their own name only.
#[must_use]
pub fn default_triggers(category: &str) -> Vec<String> {
    DEFAULT_TRIGGERS
        .iter()
        .find(|(name, _)| *name == category)
        .map_or_else(
            || vec![category.to_string()],
            |(_, words)| words.iter().map(ToString::to_string).collect(),
        )
}

/// Where the catalog is loaded from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuSource {
    /// The menu compiled into the binary
    #[default]
    Embedded,
    /// A saved menu page, scraped once
    #[serde(alias = "html")]
    Markup,
    /// A TOML menu file
    #[serde(alias = "toml")]
    File,
    /// The `menu_items` table
    #[serde(alias = "db")]
    Database,
}

impl MenuSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Markup => "markup",
            Self::File => "file",
            Self::Database => "database",
        }
    }

    /// Guess the source from a menu path: `.html`/`.htm` is markup, anything else TOML
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                Self::Markup
            }
            _ => Self::File,
        }
    }
}

impl fmt::Display for MenuSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "embedded" => Ok(Self::Embedded),
            "markup" | "html" => Ok(Self::Markup),
            "file" | "toml" => Ok(Self::File),
            "database" | "db" => Ok(Self::Database),
            other => Err(Error::Config(format!("unknown menu source: {other}"))),
        }
    }
}

/// Load the catalog from the configured source
///
/// # Errors
///
/// Returns error if the source needs a path or repository that was not given, or
/// if loading fails
pub fn load_catalog(
    source: MenuSource,
    path: Option<&Path>,
    repo: Option<&MenuRepo>,
) -> Result<Catalog> {
    let catalog = match source {
        MenuSource::Embedded => default_catalog(),
        MenuSource::Markup => markup::load(required_path(source, path)?)?,
        MenuSource::File => file::load(required_path(source, path)?)?,
        MenuSource::Database => repo
            .ok_or_else(|| Error::Config("menu source database needs a database".to_string()))?
            .load_catalog()?,
    };

    if catalog.is_empty() {
        tracing::warn!(source = %source, "menu catalog is empty");
    } else {
        tracing::info!(source = %source, categories = catalog.categories().len(), "menu loaded");
    }
    Ok(catalog)
}

fn required_path(source: MenuSource, path: Option<&Path>) -> Result<&Path> {
    path.ok_or_else(|| Error::Config(format!("menu source {source} needs a menu path")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let catalog = default_catalog();
        assert_eq!(catalog.categories().len(), 5);
        assert_eq!(catalog.categories()[0].name, "brasa");

        let pollo = catalog.item("1 POLLO A LA BRASA").unwrap();
        assert_eq!(pollo.unit_price, Price::from_cents(5390));
        assert_eq!(pollo.category, "brasa");
    }

    #[test]
    fn test_default_triggers() {
        assert_eq!(default_triggers("brasa"), vec!["brasa", "asado"]);
        assert_eq!(default_triggers("postres"), vec!["postres"]);
    }

    #[test]
    fn test_empty_catalog_lookup() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.lookup_by_free_text("quiero papas fritas").is_none());
    }

    #[test]
    fn test_lookup_by_free_text() {
        let catalog = default_catalog();
        let item = catalog.lookup_by_free_text("dame unas papas fritas").unwrap();
        assert_eq!(item.name, "PAPAS FRITAS");
    }

    #[test]
    fn test_menu_source() {
        assert_eq!("TOML".parse::<MenuSource>().unwrap(), MenuSource::File);
        assert_eq!("database".parse::<MenuSource>().unwrap(), MenuSource::Database);
        assert!("sheet".parse::<MenuSource>().is_err());
        assert_eq!(MenuSource::for_path(Path::new("carta.HTML")), MenuSource::Markup);
        assert_eq!(MenuSource::for_path(Path::new("menu.toml")), MenuSource::File);
    }

    #[test]
    fn test_load_catalog_needs_path() {
        assert!(matches!(
            load_catalog(MenuSource::File, None, None),
            Err(Error::Config(_))
        ));
        assert!(load_catalog(MenuSource::Database, None, None).is_err());
        assert!(!load_catalog(MenuSource::Embedded, None, None).unwrap().is_empty());
    }
}
