//! Loading of the practice-problem catalog.
//!
//! Two input shapes are accepted. `problems.json` is strict JSON. Catalog
//! sources such as `problems.js` hold a single array literal written in
//! relaxed object-literal syntax: unquoted keys, single-quoted or backtick
//! strings, trailing commas, and comments. The relaxed text is sliced from the
//! first `[` to the last `]`, rewritten into strict JSON, and then decoded the
//! same way as `problems.json`.
//!
//! Limits: records whose field values are objects fail to decode, and a
//! source whose first `[` or last `]` is not part of the array (for example a
//! bracket inside a string before the array starts) produces a parse error.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TrackerError};
use crate::models::{Difficulty, ProblemRecord};

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

// A catalog entry as written in the source, before defaults are applied.
#[derive(Debug, Deserialize)]
struct RawProblem {
    #[serde(default)]
    id: Option<Value>,
    title: String,
    #[serde(default, alias = "url")]
    link: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<Value>,
}

/// Parse relaxed array-literal text into problem records.
pub fn parse(raw: &str) -> Result<Vec<ProblemRecord>> {
    let slice = extract_array(raw)?;
    let normalized = normalize(slice);
    let entries: Vec<RawProblem> = serde_json::from_str(&normalized).map_err(|e| {
        TrackerError::parse(
            format!("catalog source did not decode after normalization: {}", e),
            normalized.clone(),
        )
    })?;
    build_records(entries, &normalized)
}

/// Parse strict JSON (the `problems.json` format).
pub fn parse_strict(text: &str) -> Result<Vec<ProblemRecord>> {
    let entries: Vec<RawProblem> = serde_json::from_str(text)
        .map_err(|e| TrackerError::parse(format!("invalid problems file: {}", e), text))?;
    build_records(entries, text)
}

fn extract_array(raw: &str) -> Result<&str> {
    let start = raw
        .find('[')
        .ok_or_else(|| TrackerError::Format("no opening '[' in catalog source".into()))?;
    let end = raw
        .rfind(']')
        .ok_or_else(|| TrackerError::Format("no closing ']' in catalog source".into()))?;
    if end < start {
        return Err(TrackerError::Format(
            "closing ']' appears before the opening '['".into(),
        ));
    }
    Ok(&raw[start..=end])
}

fn bare_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([{,]\s*)([A-Za-z_$][A-Za-z0-9_$]*)(\s*:)").expect("valid bare key regex")
    })
}

fn trailing_comma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",(\s*[\]}])").expect("valid trailing comma regex"))
}

/// Rewrite relaxed object-literal text into strict JSON.
///
/// String literals are decoded and re-emitted as JSON strings; the key and
/// trailing-comma rewrites only touch the text between literals.
fn normalize(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + src.len() / 4);
    let mut code = String::new();
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                out.push_str(&normalize_code(&code));
                code.clear();
                let literal = read_string(&mut chars, c);
                out.push_str(&Value::String(literal).to_string());
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        code.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                code.push(' ');
            }
            _ => code.push(c),
        }
    }
    out.push_str(&normalize_code(&code));
    out
}

fn normalize_code(code: &str) -> String {
    let quoted = bare_key_regex().replace_all(code, "${1}\"${2}\"${3}");
    trailing_comma_regex()
        .replace_all(&quoted, "${1}")
        .into_owned()
}

// Consume a string literal up to its closing delimiter and return the decoded
// contents. An unterminated literal runs to the end of the input.
fn read_string<I: Iterator<Item = char>>(
    chars: &mut std::iter::Peekable<I>,
    delimiter: char,
) -> String {
    let mut literal = String::new();
    // High half of a UTF-16 surrogate pair waiting for its low half.
    let mut high: Option<u32> = None;

    while let Some(c) = chars.next() {
        if c == delimiter {
            break;
        }
        if c != '\\' {
            flush_surrogate(&mut literal, &mut high);
            literal.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            flush_surrogate(&mut literal, &mut high);
            literal.push('\\');
            break;
        };
        if escaped == 'u' {
            let hex = take_hex(chars, 4);
            match u32::from_str_radix(&hex, 16) {
                Ok(unit) if hex.len() == 4 => push_code_unit(&mut literal, &mut high, unit),
                _ => {
                    flush_surrogate(&mut literal, &mut high);
                    literal.push_str("\\u");
                    literal.push_str(&hex);
                }
            }
            continue;
        }

        flush_surrogate(&mut literal, &mut high);
        match escaped {
            'n' => literal.push('\n'),
            't' => literal.push('\t'),
            'r' => literal.push('\r'),
            'b' => literal.push('\u{8}'),
            'f' => literal.push('\u{c}'),
            'v' => literal.push('\u{b}'),
            '0' => literal.push('\0'),
            '\n' => {}
            'x' => {
                let hex = take_hex(chars, 2);
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) if hex.len() == 2 => literal.push(ch),
                    _ => {
                        literal.push_str("\\x");
                        literal.push_str(&hex);
                    }
                }
            }
            other => literal.push(other),
        }
    }
    flush_surrogate(&mut literal, &mut high);
    literal
}

// Take up to `count` hex digits, stopping at the first non-hex character.
fn take_hex<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>, count: usize) -> String {
    let mut hex = String::with_capacity(count);
    while hex.len() < count {
        match chars.next_if(|c| c.is_ascii_hexdigit()) {
            Some(c) => hex.push(c),
            None => break,
        }
    }
    hex
}

fn push_code_unit(literal: &mut String, high: &mut Option<u32>, unit: u32) {
    match unit {
        0xD800..=0xDBFF => {
            flush_surrogate(literal, high);
            *high = Some(unit);
        }
        0xDC00..=0xDFFF => match high.take() {
            Some(h) => {
                let combined = 0x10000 + ((h - 0xD800) << 10) + (unit - 0xDC00);
                literal.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            None => literal.push(char::REPLACEMENT_CHARACTER),
        },
        _ => {
            flush_surrogate(literal, high);
            literal.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
    }
}

// A lone surrogate has no char of its own.
fn flush_surrogate(literal: &mut String, high: &mut Option<u32>) {
    if high.take().is_some() {
        literal.push(char::REPLACEMENT_CHARACTER);
    }
}

fn build_records(entries: Vec<RawProblem>, source: &str) -> Result<Vec<ProblemRecord>> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut records = Vec::with_capacity(entries.len());

    for (position, raw) in entries.into_iter().enumerate() {
        let id = match raw.id {
            None | Some(Value::Null) => position as i64 + 1,
            Some(value) => coerce_id(&value).ok_or_else(|| {
                TrackerError::parse(
                    format!(
                        "problem at position {} has a non-integer id: {}",
                        position + 1,
                        value
                    ),
                    source,
                )
            })?,
        };

        if !seen.insert(id) {
            return Err(TrackerError::parse(
                format!("duplicate problem id {}", id),
                source,
            ));
        }

        let category = raw
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let difficulty =
            Difficulty::from_str_or_default(raw.difficulty.as_ref().and_then(Value::as_str));

        records.push(ProblemRecord {
            id,
            title: raw.title.trim().to_string(),
            link: raw.link.unwrap_or_default().trim().to_string(),
            category,
            difficulty,
        });
    }

    Ok(records)
}

fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Distinct category names, sorted.
pub fn categories(problems: &[ProblemRecord]) -> Vec<String> {
    let mut names: Vec<String> = problems.iter().map(|p| p.category.clone()).collect();
    names.sort();
    names.dedup();
    names
}
