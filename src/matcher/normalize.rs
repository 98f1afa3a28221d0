//! Utterance normalization
//!
//! Folding (case, diacritics, punctuation), spoken quantity words, leading action
//! verbs and an optional leading count ("dos papas fritas").

use std::sync::LazyLock;

use regex::Regex;

/// Spoken quantity words rewritten to the tokens used in menu names
static QUANTITY_WORDS: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (Regex::new(r"\b(?:un|una|uno)\b").expect("valid regex"), "1"),
        (Regex::new(r"\b(?:medio|media)\b").expect("valid regex"), "1/2"),
        (Regex::new(r"\bcuarto\b").expect("valid regex"), "1/4"),
    ]
});

/// Leading phrases that only express the wish to order
const ACTION_VERBS: &[&str] = &[
    "por favor",
    "quiero",
    "quisiera",
    "deseo",
    "dame",
    "me das",
    "me da",
    "ponme",
    "agregame",
    "agregar",
    "agrega",
    "anadir",
    "anade",
    "tambien",
];

const COUNT_WORDS: &[(&str, u32)] = &[
    ("dos", 2),
    ("tres", 3),
    ("cuatro", 4),
    ("cinco", 5),
    ("seis", 6),
    ("siete", 7),
    ("ocho", 8),
    ("nueve", 9),
    ("diez", 10),
];

/// An utterance prepared for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Text as recognized, for logging
    pub original: String,
    /// Lowercase, diacritics and punctuation removed
    pub folded: String,
    /// `folded` with quantity words rewritten ("medio" -> "1/2")
    pub text: String,
    /// `text` without leading verbs or leading count
    pub phrase: String,
    /// Units requested, 1 unless a leading count was spoken
    pub quantity: u32,
}

/// Normalize a recognized utterance
#[must_use]
pub fn normalize(utterance: &str) -> Normalized {
    let folded = fold(utterance);
    let text = substitute_quantities(&folded);
    let without_verbs = strip_action_verbs(&text);
    let (quantity, phrase) = take_count(without_verbs);
    let phrase = phrase.to_string();

    Normalized {
        original: utterance.to_string(),
        folded,
        text,
        phrase,
        quantity,
    }
}

/// Lowercase, strip diacritics and punctuation, collapse whitespace
///
/// Digits and `/` survive so "1/2" tokens stay intact.
#[must_use]
pub fn fold(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            c if c.is_alphanumeric() || c == '/' => c,
            _ => ' ',
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn substitute_quantities(folded: &str) -> String {
    QUANTITY_WORDS
        .iter()
        .fold(folded.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

fn strip_action_verbs(text: &str) -> &str {
    let mut rest = text.trim();
    loop {
        let stripped = ACTION_VERBS.iter().find_map(|verb| {
            rest.strip_prefix(verb)
                .filter(|after| after.is_empty() || after.starts_with(' '))
        });
        match stripped {
            Some(after) => rest = after.trim_start(),
            None => return rest,
        }
    }
}

fn take_count(phrase: &str) -> (u32, &str) {
    let Some((first, rest)) = phrase.split_once(' ') else {
        return (1, phrase);
    };

    let count = COUNT_WORDS
        .iter()
        .find(|(word, _)| *word == first)
        .map(|(_, n)| *n)
        .or_else(|| first.parse::<u32>().ok().filter(|n| (2..=50).contains(n)));

    match count {
        Some(n) if !rest.trim().is_empty() => (n, rest.trim()),
        _ => (1, phrase),
    }
}
