//! Query-string filter translation.
//!
//! Turns raw query pairs such as `price[gt]=100&careers[in]=Business` into a
//! store predicate `{"price": {"$gt": "100"}, "careers": {"$in": "Business"}}`.
//!
//! Translation runs in two steps:
//!
//! 1. [`nest_pairs`] expands bracket syntax into a nested JSON object
//!    (`a[b]=c` becomes `{a: {b: c}}`, `a[]=x` and repeated keys become arrays).
//! 2. [`translate_filter`] serializes that object, prefixes every whole-token
//!    operator key (`gt gte lt lte in eq nin`) with `$`, and parses it back.
//!
//! Only object keys are rewritten. Values that happen to read `in` or `gt`
//! and keys that merely contain an operator (`login`, `gtx`) pass through.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::types::Document;

/// Comparison keywords that callers may write inside brackets.
pub const OPERATOR_TOKENS: [&str; 7] = ["gt", "gte", "lt", "lte", "in", "eq", "nin"];

/// Sigil the store expects in front of every operator key.
pub const OPERATOR_SIGIL: char = '$';

/// Errors raised while turning inbound query data into a store predicate.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid query key `{key}`")]
    InvalidKey { key: String },
    #[error("query key `{key}` conflicts with an earlier parameter")]
    ConflictingKey { key: String },
    #[error("query did not survive translation: {0}")]
    RoundTrip(#[from] serde_json::Error),
    #[error("query must be an object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("unknown query operator `{op}`")]
    UnknownOperator { op: String },
    #[error("invalid operand for `{op}`: {reason}")]
    InvalidOperand { op: String, reason: String },
}

fn operator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Compact serde_json output puts every object key directly after `{` or `,`.
    // A quote inside a string value is always escaped, so it cannot start a match.
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?P<lead>[{,])"(?P<op>gte|gt|lte|lt|nin|in|eq)":"#)
            .unwrap_or_else(|e| unreachable!("operator pattern is a valid literal: {e}"))
    })
}

/// Translates raw query pairs into a store predicate.
///
/// # Errors
///
/// Returns a [`QueryError`] when the bracket structure is inconsistent or the
/// rewritten text no longer parses.
pub fn translate_query<K, V>(pairs: &[(K, V)]) -> Result<Document, QueryError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let nested = nest_pairs(pairs)?;
    let predicate = translate_filter(&Value::Object(nested))?;
    tracing::trace!(params = pairs.len(), fields = predicate.len(), "translated query filter");
    Ok(predicate)
}

/// Prefixes every operator key in `raw` with [`OPERATOR_SIGIL`].
///
/// Inputs that contain none of the operator tokens come back unchanged, and
/// already-prefixed keys are left alone, so the transform is idempotent.
///
/// # Errors
///
/// Returns [`QueryError::NotAnObject`] if `raw` is not a JSON object and
/// [`QueryError::RoundTrip`] if the rewritten text fails to parse.
pub fn translate_filter(raw: &Value) -> Result<Document, QueryError> {
    let text = serde_json::to_string(raw)?;
    let rewritten = operator_pattern().replace_all(&text, |caps: &Captures<'_>| {
        format!(r#"{}"{OPERATOR_SIGIL}{}":"#, &caps["lead"], &caps["op"])
    });
    match serde_json::from_str::<Value>(&rewritten)? {
        Value::Object(map) => Ok(map),
        other => Err(QueryError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

/// Expands bracketed query keys into a nested object of string leaves.
///
/// # Errors
///
/// Returns [`QueryError::InvalidKey`] for keys with an empty base, unbalanced
/// brackets, or an `[]` segment that is not last, and
/// [`QueryError::ConflictingKey`] when a key is used both as a scalar and as a
/// nested object (`a=1&a[b]=2`).
pub fn nest_pairs<K, V>(pairs: &[(K, V)]) -> Result<Document, QueryError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut root = Document::new();
    for (key, value) in pairs {
        let key = key.as_ref();
        let segments = split_key(key)?;
        insert_path(&mut root, &segments, key, value.as_ref().to_string())?;
    }
    Ok(root)
}

/// Splits `base[a][b]` into `["base", "a", "b"]`. An empty trailing segment
/// (`base[]`) marks an array append.
fn split_key(key: &str) -> Result<Vec<String>, QueryError> {
    let invalid = || QueryError::InvalidKey {
        key: key.to_string(),
    };

    let (base, mut rest) = match key.find('[') {
        Some(idx) => (&key[..idx], &key[idx..]),
        None => (key, ""),
    };
    if base.is_empty() {
        return Err(invalid());
    }

    let mut segments = vec![base.to_string()];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or_else(invalid)?;
        let close = inner.find(']').ok_or_else(invalid)?;
        let segment = &inner[..close];
        if segment.contains('[') {
            return Err(invalid());
        }
        segments.push(segment.to_string());
        rest = &inner[close + 1..];
    }

    let last = segments.len() - 1;
    if segments[..last].iter().any(String::is_empty) {
        return Err(invalid());
    }
    Ok(segments)
}

fn insert_path(
    map: &mut Document,
    segments: &[String],
    raw_key: &str,
    value: String,
) -> Result<(), QueryError> {
    let conflict = || QueryError::ConflictingKey {
        key: raw_key.to_string(),
    };

    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };

    match rest {
        [] => merge_leaf(map, head, value).then_some(()).ok_or_else(conflict),
        [append] if append.is_empty() => {
            append_leaf(map, head, value).then_some(()).ok_or_else(conflict)
        }
        _ => {
            let slot = map
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Document::new()));
            match slot {
                Value::Object(inner) => insert_path(inner, rest, raw_key, value),
                _ => Err(conflict()),
            }
        }
    }
}

/// Stores `value` under `key`, turning a repeated key into an array.
/// Returns `false` if `key` already holds a nested object.
fn merge_leaf(map: &mut Document, key: &str, value: String) -> bool {
    match map.get_mut(key) {
        None => {
            map.insert(key.to_string(), Value::String(value));
            true
        }
        Some(Value::Array(items)) => {
            items.push(Value::String(value));
            true
        }
        Some(slot @ Value::String(_)) => {
            let previous = slot.take();
            *slot = Value::Array(vec![previous, Value::String(value)]);
            true
        }
        Some(_) => false,
    }
}

/// Like [`merge_leaf`], but a first `key[]=value` already yields an array.
fn append_leaf(map: &mut Document, key: &str, value: String) -> bool {
    if map.contains_key(key) {
        merge_leaf(map, key, value)
    } else {
        map.insert(key.to_string(), Value::Array(vec![Value::String(value)]));
        true
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
