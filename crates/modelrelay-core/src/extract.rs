//! Response Extractor — recover a JSON object from loosely-structured
//! model output.
//!
//! Models wrap JSON in code fences, prose, and stray punctuation, and leave
//! trailing commas behind. Recovery is an ordered list of pure candidate
//! producers, each taking the raw text and yielding a cleaned substring;
//! the first candidate that parses as a JSON **object** wins. Arrays and
//! primitives are rejected — every caller here declares object schemas.

use serde_json::{Map, Value};

use crate::error::{RelayError, RelayResult};

/// Recover a JSON object from raw model output.
///
/// Strategies, escalating:
/// 1. strip Markdown fences / surrounding quotes, trim, drop trailing commas;
/// 2. extract the first balanced `{...}` span and clean that;
/// 3. aggressive: slice from the first `{` to the last `}` and clean that.
pub fn parse_json(text: &str) -> RelayResult<Map<String, Value>> {
    let strategies: &[fn(&str) -> Option<String>] = &[
        |t| Some(clean(t)),
        |t| first_balanced_object(t).map(|span| clean(&span)),
        |t| outermost_brace_slice(t).map(|span| clean(&span)),
    ];

    for (i, strategy) in strategies.iter().enumerate() {
        let Some(candidate) = strategy(text) else {
            continue;
        };
        match serde_json::from_str::<Value>(&candidate) {
            Ok(Value::Object(map)) => {
                if i > 0 {
                    tracing::debug!(strategy = i + 1, "Recovered JSON with escalated strategy");
                }
                return Ok(map);
            }
            // Parsed, but not an object — keep escalating.
            Ok(_) | Err(_) => continue,
        }
    }

    Err(RelayError::Unparsable {
        raw: text.to_string(),
    })
}

/// Check that every required field exists and is neither null nor an empty
/// string. Callers use this to choose between the parsed object and their
/// deterministic default.
pub fn validate_required_fields(obj: &Map<String, Value>, fields: &[&str]) -> bool {
    fields.iter().all(|field| match obj.get(*field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    })
}

/// Strategy 1 cleanup: fences, quotes, trailing commas.
fn clean(text: &str) -> String {
    let mut t = text.trim();

    // ```json ... ``` or bare ``` fences.
    if let Some(rest) = t.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        t = rest.strip_suffix("```").unwrap_or(rest);
        t = t.trim();
    }

    // Some models quote the whole payload.
    if t.len() >= 2 && ((t.starts_with('"') && t.ends_with('"')) || (t.starts_with('\'') && t.ends_with('\''))) {
        let inner = &t[1..t.len() - 1];
        if inner.trim_start().starts_with('{') {
            t = inner.trim();
        }
    }

    strip_trailing_commas(t)
}

/// Remove `,` immediately preceding a closing brace/bracket, outside strings.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_comma_ws = String::new();

    for ch in text.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                out.push_str(&pending_comma_ws);
                pending_comma_ws.clear();
                in_string = true;
                out.push(ch);
            }
            ',' => {
                out.push_str(&pending_comma_ws);
                pending_comma_ws.clear();
                pending_comma_ws.push(ch);
            }
            c if c.is_whitespace() && !pending_comma_ws.is_empty() => {
                pending_comma_ws.push(c);
            }
            '}' | ']' if !pending_comma_ws.is_empty() => {
                // Drop the held comma, keep its trailing whitespace.
                out.extend(pending_comma_ws.chars().skip(1));
                pending_comma_ws.clear();
                out.push(ch);
            }
            c => {
                out.push_str(&pending_comma_ws);
                pending_comma_ws.clear();
                out.push(c);
            }
        }
    }
    out.push_str(&pending_comma_ws);
    out
}

/// Strategy 2: the first balanced, string-aware `{...}` span.
fn first_balanced_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return Some(text[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Strategy 3: everything between the first `{` and the last `}`, inclusive.
fn outermost_brace_slice(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| text[start..=end].to_string())
}
