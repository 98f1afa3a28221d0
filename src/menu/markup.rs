//! Menu extraction from the restaurant's rendered page
//!
//! Each `.menu-section.<slug>` block becomes a category. Items are `<li>` rows
//! (`<div class="item-info"><strong>NAME</strong></div><span>S/53.90</span>`)
//! and, for the grill section, `<h4>` headings such as `PARRILLA CHICA S/59.90`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{Catalog, Category, MenuItem, Price};
use crate::{Error, Result};

/// Section CSS slug -> category name
const SECTIONS: &[(&str, &str)] = &[
    ("brasa", "brasa"),
    ("broaster", "broaster"),
    ("parrillas", "parrillas"),
    ("carnes-piqueos", "carnes y piqueos"),
    ("guarniciones", "guarniciones"),
];

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"S/\s*(\d+(?:[.,]\d{1,2})?)").expect("valid regex"));

static NAME_AND_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.*?)\s*S/\s*(\d+(?:[.,]\d{1,2})?)").expect("valid regex")
});

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Menu(format!("bad selector {css}: {e}")))
}

/// Parse the menu out of page markup
///
/// Sections missing from the page yield empty categories rather than an error.
///
/// # Errors
///
/// Returns error only if an internal selector fails to compile
pub fn parse(html: &str) -> Result<Catalog> {
    let document = Html::parse_document(html);
    let li = selector("li")?;
    let heading = selector(".parrillas-grid h4, .parrilla-familiar h4")?;
    let strong = selector(".item-info strong")?;
    let span = selector("span")?;

    let mut categories = Vec::with_capacity(SECTIONS.len());
    for (slug, name) in SECTIONS {
        let section_sel = selector(&format!(".menu-section.{slug}"))?;
        let mut items: Vec<MenuItem> = Vec::new();

        if let Some(section) = document.select(&section_sel).next() {
            for row in section.select(&li) {
                if let Some((item_name, price)) = extract_row(row, &strong, &span) {
                    push_unique(&mut items, name, item_name, price);
                }
            }
            for h4 in section.select(&heading) {
                let text = element_text(h4);
                if let Some((item_name, price)) = split_name_and_price(&text) {
                    push_unique(&mut items, name, item_name, price);
                }
            }
        } else {
            tracing::debug!(section = slug, "menu section not found in markup");
        }

        categories.push(Category::new(*name, Vec::new(), items));
    }

    Ok(Catalog::from_categories(categories))
}

/// Load and parse a saved menu page
///
/// # Errors
///
/// Returns error if the file cannot be read
pub fn load(path: &Path) -> Result<Catalog> {
    let html = std::fs::read_to_string(path)?;
    let catalog = parse(&html)?;
    tracing::info!(path = %path.display(), "loaded menu from markup");
    Ok(catalog)
}

fn extract_row(row: ElementRef<'_>, strong: &Selector, span: &Selector) -> Option<(String, Price)> {
    if let Some(name_el) = row.select(strong).next() {
        let name = element_text(name_el);
        let price = row
            .select(span)
            .find_map(|s| PRICE_RE.captures(&element_text(s)).and_then(|c| c[1].parse().ok()))?;
        if name.is_empty() {
            return None;
        }
        return Some((name, price));
    }

    split_name_and_price(&element_text(row))
}

fn split_name_and_price(text: &str) -> Option<(String, Price)> {
    let caps = NAME_AND_PRICE_RE.captures(text)?;
    let name = caps[1].trim().to_string();
    if name.is_empty() {
        return None;
    }
    let price = caps[2].parse().ok()?;
    Some((name, price))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_unique(items: &mut Vec<MenuItem>, category: &str, name: String, unit_price: Price) {
    if items.iter().any(|i| i.name == name) {
        return;
    }
    items.push(MenuItem {
        name,
        category: category.to_string(),
        unit_price,
        aliases: Vec::new(),
    });
}
