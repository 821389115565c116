//! Comment parser: raw comment text → ordered notations.
//!
//! ```text
//! /**
//!  * Summary line.
//!  * More text.
//!  * Even more text.
//!  *
//!  * @param string $name first
//!  *   part two
//!  * @return void
//!  */
//! ```
//!
//! yields `summary`, `description`, `param` (`string $name first part
//! two`) and `return` notations, in that order.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::NotationError;

/// One `@tag value` occurrence (or a summary/description pseudo-notation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotation {
    pub tag: String,
    pub value: String,
}

impl RawNotation {
    fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// `@name` followed by whitespace or the end of the line.
static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(?P<tag>[A-Za-z_][\w\-\\:]*)(?:\s+(?P<value>.*?))?\s*$").expect("valid regex")
});

/// Strip comment decoration from one line: the opening `/**`, a leading
/// `*` (plus the single space conventionally following it) and the
/// closing `*/`.
fn strip_decoration(line: &str) -> &str {
    let mut line = line.trim_start();
    if let Some(rest) = line.strip_prefix("/**") {
        line = rest;
    } else if let Some(rest) = line.strip_prefix("/*") {
        line = rest;
    } else if let Some(rest) = line.strip_prefix('*')
        && !rest.starts_with('/')
    {
        line = rest;
    }
    let line = line.trim_end();
    let line = line.strip_suffix("*/").unwrap_or(line).trim_end();
    line.strip_prefix(' ').unwrap_or(line)
}

/// Lines indented by exactly two spaces continue the previous notation.
fn continuation(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("  ")?;
    if !rest.starts_with(|c: char| !c.is_whitespace()) || rest.starts_with('@') {
        return None;
    }
    Some(rest.trim_end())
}

/// Parse one tag line.  Lines that start with `@` but do not follow the
/// notation grammar are reported as [`NotationError`].
fn parse_tag_line(line: &str) -> Result<RawNotation, NotationError> {
    let caps = TAG_LINE.captures(line).ok_or_else(|| NotationError {
        line: line.to_string(),
        reason: "expected `@name` followed by whitespace",
    })?;
    let value = caps.name("value").map_or("", |m| m.as_str());
    Ok(RawNotation::new(&caps["tag"], value.trim()))
}

/// Parse a raw documentation comment into notations in source order.
///
/// Text before the first tag becomes pseudo-notations: with more than two
/// non-empty lines the first is the `summary` and the rest form the
/// `description`, otherwise all of it is the `description`.  Both are
/// space-joined.  Malformed tag lines are dropped.
pub fn parse(comment: &str) -> Vec<RawNotation> {
    let mut leading: Vec<&str> = Vec::new();
    let mut notations: Vec<RawNotation> = Vec::new();

    for raw_line in comment.lines() {
        let line = strip_decoration(raw_line);
        let trimmed = line.trim_start();

        if trimmed.starts_with('@') {
            match parse_tag_line(trimmed) {
                Ok(notation) => notations.push(notation),
                Err(err) => tracing::warn!(%err, "notation dropped"),
            }
            continue;
        }

        if notations.is_empty() {
            if !trimmed.is_empty() {
                leading.push(trimmed.trim_end());
            }
            continue;
        }

        if let Some(text) = continuation(line) {
            if let Some(last) = notations.last_mut() {
                if last.value.is_empty() {
                    last.value = text.to_string();
                } else {
                    last.value = format!("{} {}", last.value.trim_end(), text);
                }
            }
        } else if !trimmed.is_empty() {
            tracing::trace!(line = trimmed, "text outside a notation ignored");
        }
    }

    let mut result = Vec::with_capacity(notations.len() + 2);
    if leading.len() > 2 {
        result.push(RawNotation::new("summary", leading[0]));
        result.push(RawNotation::new("description", leading[1..].join(" ")));
    } else if !leading.is_empty() {
        result.push(RawNotation::new("description", leading.join(" ")));
    }
    result.extend(notations);
    result
}
