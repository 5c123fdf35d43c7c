//! String utilities
//!
//! Escape-sequence decoding, English written numbers and the naming helpers
//! used when turning URLs into Python identifiers.

use crate::errors::{ReqforgeError, Result};

const ONES: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

const TEENS: [&str; 10] = [
    "ten", "eleven", "twelve", "thirteen", "fourteen",
    "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Largest number `written_form` can spell out
pub const MAX_WRITTEN: u32 = 999;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally", "for",
    "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or",
    "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Truncate a string to a maximum length, adding "..." if truncated
///
/// Handles UTF-8 character boundaries correctly.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    if max_len <= 3 {
        return "...".to_string();
    }

    let mut truncate_at = max_len - 3;
    while truncate_at > 0 && !s.is_char_boundary(truncate_at) {
        truncate_at -= 1;
    }

    format!("{}...", &s[..truncate_at])
}

/// Decode backslash escape sequences the way Python's `unicode_escape` codec does
///
/// Supports `\\ \' \" \a \b \f \n \r \t \v`, octal `\ooo`, `\xHH`, `\uHHHH` and
/// `\UHHHHHHHH`. Unknown or truncated escapes are kept verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };

        let simple = match next {
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0B}'),
            _ => None,
        };
        if let Some(decoded) = simple {
            chars.next();
            out.push(decoded);
            continue;
        }

        match next {
            '0'..='7' => {
                let mut digits = String::new();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = chars.clone().skip(1).take(width).collect();
                let decoded = if hex.len() == width && hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(decoded) => {
                        for _ in 0..=width {
                            chars.next();
                        }
                        out.push(decoded);
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }

    out
}

/// Spell out a number between 0 and 999 as a snake_case identifier
///
/// `written_form(101)` is `"one_hundred_and_one"`.
pub fn written_form(num: u32) -> Option<String> {
    if num > MAX_WRITTEN {
        return None;
    }
    if num == 0 {
        return Some(ONES[0].to_string());
    }

    let hundreds = (num / 100) as usize;
    let rest = num % 100;
    let mut parts: Vec<String> = Vec::new();

    if hundreds > 0 {
        parts.push(format!("{}_hundred", ONES[hundreds]));
    }

    let tail = match rest {
        0 => None,
        1..=9 => Some(ONES[rest as usize].to_string()),
        10..=19 => Some(TEENS[(rest - 10) as usize].to_string()),
        _ => {
            let tens = TENS[(rest / 10) as usize];
            match rest % 10 {
                0 => Some(tens.to_string()),
                ones => Some(format!("{}_{}", tens, ONES[ones as usize])),
            }
        }
    };
    if let Some(tail) = tail {
        parts.push(tail);
    }

    Some(parts.join("_and_"))
}

/// Rewrite a leading run of digits into words: `4chan` becomes `four_chan`
///
/// Numbers too large to spell are written digit by digit.
pub fn written_leading_number(text: &str) -> String {
    let digits_end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    if digits_end == 0 {
        return text.to_string();
    }

    let (digits, rest) = text.split_at(digits_end);
    let written = digits
        .parse::<u32>()
        .ok()
        .and_then(written_form)
        .unwrap_or_else(|| {
            digits
                .chars()
                .filter_map(|d| d.to_digit(10))
                .map(|d| ONES[d as usize])
                .collect::<Vec<_>>()
                .join("_")
        });

    if rest.is_empty() {
        written
    } else {
        format!("{}_{}", written, rest.trim_start_matches(['_', '-', '.']))
    }
}

/// Pick a name not already taken, appending a written-number suffix
///
/// Names equal to `name` or starting with `name_` count as taken variants.
pub fn unique_name(name: &str, taken: &[&str]) -> Result<String> {
    let prefix = format!("{}_", name);
    let matches = taken
        .iter()
        .filter(|t| **t == name || t.starts_with(&prefix))
        .count();
    if matches == 0 {
        return Ok(name.to_string());
    }

    let mut n = matches as u32 + 1;
    loop {
        let suffix = written_form(n).ok_or_else(|| ReqforgeError::NameExhaustion {
            name: name.to_string(),
        })?;
        let candidate = format!("{}_{}", name, suffix);
        if !taken.contains(&candidate.as_str()) {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Whether `name` can be used as a Python identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !PYTHON_KEYWORDS.contains(&name)
}

/// Indent every non-empty line by `spaces`
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// English plural for docstring counts: `1 header`, `2 headers`
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
