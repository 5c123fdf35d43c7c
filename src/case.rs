//! Identifier case conventions
//!
//! Snake case is the pivot: every detected convention converts to snake case,
//! and every other convention is derived from snake case by direct rules.

use once_cell::sync::Lazy;
use regex::Regex;

static REPEATED_UNDERSCORES: Lazy<Regex> = Lazy::new(|| {
    Regex::new("_{2,}").expect("Invalid underscore regex")
});

/// Casing convention of an identifier-like token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// `hello_world`
    Snake,
    /// `helloWorld`
    Camel,
    /// `HelloWorld`
    Pascal,
    /// `hello-world`
    Kebab,
    /// `hello.world`
    Dot,
    /// A single lowercase word, valid in every convention but pascal
    NoCase,
}

fn lowercase_with(text: &str, separator: char) -> bool {
    text.chars().any(|c| c.is_ascii_lowercase())
        && text.chars().all(|c| c.is_ascii_lowercase() || c == separator)
}

/// Detect the casing convention of `text`
///
/// Returns `None` when the token mixes conventions or contains characters
/// outside of them (digits, spaces, symbols).
pub fn detect(text: &str) -> Option<Case> {
    let first = text.chars().next()?;

    if text.chars().all(|c| c.is_ascii_lowercase()) {
        return Some(Case::NoCase);
    }
    if lowercase_with(text, '_') {
        return Some(Case::Snake);
    }
    if lowercase_with(text, '-') {
        return Some(Case::Kebab);
    }
    if lowercase_with(text, '.') {
        return Some(Case::Dot);
    }
    if text.chars().all(|c| c.is_ascii_alphabetic()) {
        if first.is_ascii_lowercase() {
            return Some(Case::Camel);
        }
        return Some(Case::Pascal);
    }
    None
}

fn camel_to_snake(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('_').to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Convert any convention to snake case, collapsing repeated underscores
pub fn snake_case(text: &str) -> String {
    let snaked = match detect(text) {
        Some(Case::NoCase) | Some(Case::Snake) => text.to_string(),
        Some(Case::Kebab) => text.replace('-', "_"),
        Some(Case::Dot) => text.replace('.', "_"),
        Some(Case::Camel) | Some(Case::Pascal) => camel_to_snake(text),
        None => camel_to_snake(&text.replace(['-', '.'], "_")),
    };
    REPEATED_UNDERSCORES.replace_all(&snaked, "_").into_owned()
}

pub fn camel_case(text: &str) -> String {
    snake_case(text)
        .split('_')
        .enumerate()
        .map(|(i, word)| if i == 0 { word.to_lowercase() } else { capitalize(word) })
        .collect()
}

pub fn pascal_case(text: &str) -> String {
    snake_case(text).split('_').map(capitalize).collect()
}

pub fn kebab_case(text: &str) -> String {
    snake_case(text).replace('_', "-").to_lowercase()
}

pub fn dot_case(text: &str) -> String {
    snake_case(text).replace('_', ".").to_lowercase()
}

/// Convert `text` into the given convention
pub fn convert(text: &str, case: Case) -> String {
    match case {
        Case::Snake | Case::NoCase => snake_case(text),
        Case::Camel => camel_case(text),
        Case::Pascal => pascal_case(text),
        Case::Kebab => kebab_case(text),
        Case::Dot => dot_case(text),
    }
}
