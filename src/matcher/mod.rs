//! Utterance interpretation
//!
//! Maps recognized speech to a control command, a category, a menu item with a
//! quantity, a yes/no answer or a customer name. Matching is plain substring
//! search over folded text; the longest item name wins.

mod normalize;

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::menu::{Catalog, Category, MenuItem};

pub use normalize::{Normalized, fold, normalize};

/// Item names and aliases shorter than this never match
const MIN_MATCH_LEN: usize = 4;

/// Control phrases, checked in declaration order
const COMMANDS: &[(Command, &[&str])] = &[
    (
        Command::Confirm,
        &[
            "finalizar pedido",
            "confirmar pedido",
            "terminar pedido",
            "eso es todo",
        ],
    ),
    (
        Command::ListItems,
        &["ver pedido", "que tengo pedido", "que llevo"],
    ),
    (
        Command::Total,
        &["cuanto es", "total del pedido", "cuanto sale"],
    ),
    (Command::Remove, &["quitar", "eliminar", "sacar"]),
    (
        Command::Cancel,
        &["cancelar pedido", "vaciar pedido", "borrar pedido"],
    ),
    (Command::Help, &["que opciones hay", "ayuda"]),
    (
        Command::SwitchCategory,
        &["otra seccion", "menu principal", "ver el menu"],
    ),
];

const YES_WORDS: &[&str] = &[
    "si",
    "claro",
    "confirmo",
    "dale",
    "correcto",
    "ok",
    "okay",
    "afirmativo",
    "exacto",
];

const NO_WORDS: &[&str] = &["no", "nop", "negativo", "cancela"];

/// Phrases that ask to remove a single unit instead of the whole line
const PARTIAL_REMOVAL: &[&str] = &["solo uno", "solo una", "solo un ", "uno menos", "una menos"];

const GREETINGS: &[&str] = &[
    "hola",
    "buenas",
    "buenos dias",
    "buenas tardes",
    "buenas noches",
    "hey",
    "alo",
];

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:mi nombre es|me llamo|soy)\s+(.+)").expect("valid regex")
});

/// A control command recognized in an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Confirm,
    ListItems,
    Total,
    Remove,
    Cancel,
    Help,
    SwitchCategory,
}

/// Answer to a yes/no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unclear,
}

/// A menu item found in an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMatch<'a> {
    pub item: &'a MenuItem,
    /// Units requested (leading count, default 1)
    pub quantity: u32,
}

/// What an utterance asks for while an order is being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<'a> {
    Command(Command),
    Item(ItemMatch<'a>),
    NotFound,
}

/// Matches utterances against a shared catalog
#[derive(Debug, Clone)]
pub struct Matcher {
    catalog: Arc<Catalog>,
}

impl Matcher {
    #[must_use]
    pub const fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Interpret an utterance heard while the customer is ordering
    ///
    /// Commands take precedence over item names.
    #[must_use]
    pub fn interpret(&self, normalized: &Normalized) -> Intent<'_> {
        if let Some(command) = find_command(normalized) {
            return Intent::Command(command);
        }
        find_item(&self.catalog, normalized).map_or(Intent::NotFound, Intent::Item)
    }

    /// First category whose trigger word appears in the utterance
    #[must_use]
    pub fn category(&self, normalized: &Normalized) -> Option<&Category> {
        find_category(&self.catalog, normalized)
    }

    /// Item referenced by the utterance, if any
    #[must_use]
    pub fn item(&self, normalized: &Normalized) -> Option<ItemMatch<'_>> {
        find_item(&self.catalog, normalized)
    }
}

/// Find the control command in an utterance
#[must_use]
pub fn find_command(normalized: &Normalized) -> Option<Command> {
    COMMANDS
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| normalized.folded.contains(p)))
        .map(|(command, _)| *command)
}

/// Find the item an utterance refers to
///
/// The phrase without verbs and leading count is tried first, then the whole
/// utterance. Among candidates the longest matched name or alias wins; ties keep
/// catalog order.
#[must_use]
pub fn find_item<'a>(catalog: &'a Catalog, normalized: &Normalized) -> Option<ItemMatch<'a>> {
    [normalized.phrase.as_str(), normalized.text.as_str()]
        .into_iter()
        .filter(|text| !text.is_empty())
        .find_map(|text| longest_match(catalog, text))
        .map(|item| ItemMatch {
            item,
            quantity: normalized.quantity,
        })
}

fn longest_match<'a>(catalog: &'a Catalog, text: &str) -> Option<&'a MenuItem> {
    let mut best: Option<(&MenuItem, usize)> = None;

    for item in catalog.items() {
        let len = std::iter::once(&item.name)
            .chain(&item.aliases)
            .map(|name| fold(name))
            .filter(|name| name.len() >= MIN_MATCH_LEN && text.contains(name.as_str()))
            .map(|name| name.len())
            .max();

        if let Some(len) = len
            && best.is_none_or(|(_, best_len)| len > best_len)
        {
            best = Some((item, len));
        }
    }

    best.map(|(item, _)| item)
}

/// Find the category selected by an utterance
#[must_use]
pub fn find_category<'a>(catalog: &'a Catalog, normalized: &Normalized) -> Option<&'a Category> {
    catalog.categories().iter().find(|category| {
        std::iter::once(&category.name)
            .chain(&category.triggers)
            .map(|word| fold(word))
            .any(|word| !word.is_empty() && normalized.folded.contains(word.as_str()))
    })
}

/// True when the utterance asks to remove a single unit
#[must_use]
pub fn is_partial_removal(normalized: &Normalized) -> bool {
    let padded = format!("{} ", normalized.folded);
    PARTIAL_REMOVAL.iter().any(|p| padded.contains(p))
}

/// Classify a yes/no answer on whole words
#[must_use]
pub fn classify_answer(utterance: &str) -> Answer {
    let folded = fold(utterance);
    let words: Vec<&str> = folded.split(' ').collect();
    let yes = words.iter().any(|w| YES_WORDS.contains(w));
    let no = words.iter().any(|w| NO_WORDS.contains(w));

    match (yes, no) {
        (true, false) => Answer::Yes,
        (false, true) => Answer::No,
        _ => Answer::Unclear,
    }
}

/// Extract the customer's name from an introduction
///
/// "me llamo ana maría" -> "Ana María". A bare utterance is taken as the name,
/// but greetings alone are not.
#[must_use]
pub fn extract_name(utterance: &str) -> Option<String> {
    let raw = NAME_RE
        .captures(utterance)
        .and_then(|c| c.get(1))
        .map_or(utterance, |m| m.as_str());

    let trimmed = raw
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || matches!(c, '¡' | '¿'));
    let folded = fold(trimmed);
    if folded.is_empty() || GREETINGS.contains(&folded.as_str()) {
        return None;
    }

    let name = trimmed
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    Some(name)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}
