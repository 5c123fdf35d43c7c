//! Python literal rendering

use serde_json::Value;

use crate::request::{FileField, StringMap};

const INDENT: &str = "    ";

/// Double-quoted Python string literal
pub fn string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c == '\u{2028}' || c == '\u{2029}' || c == '\u{feff}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a JSON value as a Python expression
///
/// Containers span several lines with four-space indentation, starting at
/// `level`.
pub fn value(v: &Value, level: usize) -> String {
    match v {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => string(s),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(|item| value(item, level + 1)).collect();
            block('[', ']', rendered, level)
        }
        Value::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(k, item)| format!("{}: {}", string(k), value(item, level + 1)))
                .collect();
            block('{', '}', rendered, level)
        }
    }
}

/// Render a string map as a Python dict
pub fn dict(map: &StringMap, level: usize) -> String {
    let rendered: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", string(k), string(v)))
        .collect();
    block('{', '}', rendered, level)
}

/// Render multipart file fields as `requests`/`httpx` file tuples
pub fn files(files: &indexmap::IndexMap<String, FileField>, level: usize) -> String {
    let rendered: Vec<String> = files
        .iter()
        .map(|(name, file)| format!("{}: {}", string(name), file_tuple(file)))
        .collect();
    block('{', '}', rendered, level)
}

/// Python bytes literal for a placeholder such as `(binary)`
pub fn bytes(s: &str) -> String {
    let escaped: String = s
        .bytes()
        .map(|b| match b {
            b'\\' => "\\\\".to_string(),
            b'"' => "\\\"".to_string(),
            0x20..=0x7e => (b as char).to_string(),
            _ => format!("\\x{:02x}", b),
        })
        .collect();
    format!("b\"{}\"", escaped)
}

fn file_tuple(file: &FileField) -> String {
    match &file.content_type {
        Some(content_type) => format!(
            "({}, {}, {})",
            string(&file.filename),
            bytes(&file.content),
            string(content_type)
        ),
        None => format!("({}, {})", string(&file.filename), bytes(&file.content)),
    }
}

fn block(open: char, close: char, items: Vec<String>, level: usize) -> String {
    if items.is_empty() {
        return format!("{}{}", open, close);
    }

    let inner = INDENT.repeat(level + 1);
    let mut out = String::new();
    out.push(open);
    out.push('\n');
    for item in items {
        out.push_str(&inner);
        out.push_str(&item);
        out.push_str(",\n");
    }
    out.push_str(&INDENT.repeat(level));
    out.push(close);
    out
}
