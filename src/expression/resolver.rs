//! Placeholder scanning and evaluation

use serde_json::Value;

use crate::error::ParseError;
use crate::format::{format_value, stringify};

use super::ast::{ConditionalLookup, Lookup, Placeholder};
use super::grammar::parse_placeholder;
use super::lexer::Span;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A piece of scanned content
#[derive(Debug, Clone, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder {
        /// Full `{{...}}` text
        raw: &'a str,
        body: &'a str,
        /// Byte offset of `body` in the scanned text
        body_start: usize,
    },
    Unterminated {
        raw: &'a str,
        span: Span,
    },
}

fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(OPEN) {
        let start = pos + found;
        if start > pos {
            segments.push(Segment::Text(&text[pos..start]));
        }
        let body_start = start + OPEN.len();
        match text[body_start..].find(CLOSE) {
            Some(len) => {
                let end = body_start + len + CLOSE.len();
                segments.push(Segment::Placeholder {
                    raw: &text[start..end],
                    body: &text[body_start..body_start + len],
                    body_start,
                });
                pos = end;
            }
            None => {
                segments.push(Segment::Unterminated {
                    raw: &text[start..],
                    span: start..body_start,
                });
                pos = text.len();
            }
        }
    }

    if pos < text.len() {
        segments.push(Segment::Text(&text[pos..]));
    }
    segments
}

/// Replace every `{{ ... }}` placeholder in `text` with its resolved value.
///
/// Missing data resolves to an empty string. Placeholders that do not parse
/// are left in the output verbatim so authors can see them.
pub fn resolve_expression(text: &str, data: &Value) -> String {
    if !text.contains(OPEN) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for segment in scan(text) {
        match segment {
            Segment::Text(t) | Segment::Unterminated { raw: t, .. } => out.push_str(t),
            Segment::Placeholder { raw, body, .. } => match parse_placeholder(body) {
                Ok(placeholder) => out.push_str(&placeholder.resolve(data)),
                Err(_) => {
                    tracing::debug!(placeholder = raw, "leaving malformed placeholder verbatim");
                    out.push_str(raw);
                }
            },
        }
    }
    out
}

/// Report every malformed or unterminated placeholder in `text`.
///
/// Spans are byte offsets into `text`.
pub fn lint_placeholders(text: &str) -> Vec<ParseError> {
    let mut errors = Vec::new();
    for segment in scan(text) {
        match segment {
            Segment::Text(_) => {}
            Segment::Unterminated { span, .. } => {
                errors.push(ParseError::Unterminated { span });
            }
            Segment::Placeholder {
                body, body_start, ..
            } => {
                if let Err(errs) = parse_placeholder(body) {
                    errors.extend(errs.into_iter().map(|e| e.offset(body_start)));
                }
            }
        }
    }
    errors
}

impl Lookup {
    /// Find the raw value this lookup points at
    pub fn evaluate<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        match self {
            Lookup::Path(path) => path.resolve(data),
            Lookup::Conditional(conditional) => conditional.evaluate(data),
        }
    }
}

impl ConditionalLookup {
    /// First array element whose condition property matches, projected
    pub fn evaluate<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        let items = self.array.resolve(data)?.as_array()?;
        let matched = items.iter().find(|item| {
            self.condition
                .property
                .resolve(item)
                .map(|v| stringify(v) == self.condition.literal)
                .unwrap_or(false)
        })?;
        self.result.resolve(matched)
    }
}

impl Placeholder {
    /// Resolve to display text; misses and empty values are never formatted
    pub fn resolve(&self, data: &Value) -> String {
        let value = match self.lookup.evaluate(data) {
            Some(v) if !v.is_null() => v,
            _ => return String::new(),
        };

        let raw = stringify(value);
        if raw.is_empty() {
            return raw;
        }

        match &self.formatter {
            Some(spec) => format_value(value, spec),
            None => raw,
        }
    }
}
