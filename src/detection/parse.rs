//! Recovery of structured detections from free-form model output.
//!
//! Models asked for JSON still wrap it in code fences, surround it with
//! prose or emit near-JSON. [`RECOVERY_CHAIN`] lists pure parse attempts
//! in order; the first that yields an object wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::Detections;
use crate::domain::{mask, DetectionCategory};
use crate::error::{RedactorError, RedactorResult};

/// Why a single parse attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON object found")]
    NotFound,
    #[error("top-level JSON value is not an object")]
    NotAnObject,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

type JsonObject = Map<String, Value>;
type Attempt = fn(&str) -> Result<JsonObject, ParseError>;

/// Parse attempts in the order they are tried.
pub const RECOVERY_CHAIN: [(&str, Attempt); 4] = [
    ("direct", parse_direct),
    ("fenced", parse_fenced),
    ("outermost", parse_outermost),
    ("repaired", parse_repaired),
];

fn fenced_object() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)```[A-Za-z]*\s*(\{.*?\})\s*```").expect("Valid fenced block regex")
    });
    &PATTERN
}

fn fenced_any() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").expect("Valid fenced block regex")
    });
    &PATTERN
}

fn outermost_object() -> &'static Regex {
    static PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("Valid object span regex"));
    &PATTERN
}

fn as_object(text: &str) -> Result<JsonObject, ParseError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

/// The whole response is the object.
pub fn parse_direct(raw: &str) -> Result<JsonObject, ParseError> {
    as_object(raw.trim())
}

/// The object sits inside a fenced code block.
pub fn parse_fenced(raw: &str) -> Result<JsonObject, ParseError> {
    let caps = fenced_object().captures(raw).ok_or(ParseError::NotFound)?;
    as_object(&caps[1])
}

/// The object is the outermost `{...}` span, surrounded by prose.
pub fn parse_outermost(raw: &str) -> Result<JsonObject, ParseError> {
    let span = outermost_object().find(raw).ok_or(ParseError::NotFound)?;
    as_object(span.as_str())
}

/// Repairs common near-JSON mistakes, then parses.
pub fn parse_repaired(raw: &str) -> Result<JsonObject, ParseError> {
    let candidate = fenced_any()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);
    let candidate = outermost_object()
        .find(candidate)
        .map(|m| m.as_str())
        .ok_or(ParseError::NotFound)?;
    as_object(&repair(candidate))
}

/// Rewrites near-JSON into JSON.
///
/// - single-quoted strings become double-quoted
/// - raw newlines, carriage returns and tabs inside strings are escaped
/// - commas directly before `}` or `]` are dropped
pub fn repair(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(delim) => match c {
                '\\' => match chars.get(i + 1) {
                    // \' is not a JSON escape
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => out.push_str("\\\\"),
                },
                c if c == delim => {
                    out.push('"');
                    quote = None;
                }
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            },
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    out.push('"');
                }
                ',' => {
                    let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                    if !matches!(next, Some('}') | Some(']')) {
                        out.push(',');
                    }
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }
    out
}

/// Runs the recovery chain over a raw response.
pub fn recover_object(raw: &str) -> RedactorResult<JsonObject> {
    for (name, attempt) in RECOVERY_CHAIN {
        match attempt(raw) {
            Ok(map) => {
                debug!(strategy = name, "parsed model response");
                return Ok(map);
            }
            Err(e) => debug!(strategy = name, error = %e, "parse attempt failed"),
        }
    }
    warn!(
        chars = raw.chars().count(),
        "model response unparseable after all recovery attempts"
    );
    Err(RedactorError::MalformedResponse {
        attempts: RECOVERY_CHAIN.len(),
        raw: raw.to_string(),
    })
}

/// Parses and validates a raw model response.
pub fn parse_detections(raw: &str) -> RedactorResult<Detections> {
    recover_object(raw).map(validate)
}

/// Validates a parsed object against the category set.
///
/// Unknown keys are dropped with a warning, missing categories stay
/// empty, scalar values are coerced to strings and everything else is
/// discarded.
pub fn validate(object: JsonObject) -> Detections {
    let mut detections = Detections::empty();

    for (key, value) in object {
        let Some(category) = DetectionCategory::from_key(&key) else {
            warn!(key = %mask(&key), "dropping unknown category from model response");
            continue;
        };
        let values: Vec<String> = match value {
            Value::Array(items) => items.into_iter().filter_map(coerce).collect(),
            Value::Null => Vec::new(),
            Value::Object(_) => {
                warn!(category = %category, "category value is an object; ignoring");
                Vec::new()
            }
            scalar => coerce(scalar).into_iter().collect(),
        };
        for value in values {
            detections.push(category, value);
        }
    }
    detections
}

fn coerce(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
