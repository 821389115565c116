//! Tag model: raw notations → typed tags.
//!
//! | Tag | Value grammar | Built as |
//! |---|---|---|
//! | `var`, `param`, `return`, `property`, `property-read`, `property-write` | `[type] [$name] [description]` | [`StandardTag`] |
//! | `method` | `[static] [returnType] name(params) [description]` | [`MethodTag`] |
//! | `throws` | `type [description]` | [`ThrowsTag`] |
//! | `summary`, `description` | free text | [`SummaryTag`] |
//! | anything else | free text | [`StandardTag`] with only a description |
//!
//! Type strings are resolved while the tag is built and the result is
//! stored on the tag.  A type that fails to resolve leaves the field unset
//! and keeps the tag; only [`TypeError::EnumType`] escapes.

use indexmap::IndexMap;
use serde::Serialize;

use super::DocContext;
use crate::error::TypeError;
use crate::types::split::{find_top_level, split_top_level, split_type_token};
use crate::types::{Slot, Type};
use crate::util::is_identifier;

/// Tags whose value follows the `[type] [$name] [description]` grammar.
const TYPED_TAGS: &[&str] = &[
    "var",
    "param",
    "return",
    "property",
    "property-read",
    "property-write",
];

// ─── Tag variants ───────────────────────────────────────────────────────────

/// `@var`, `@param`, `@return`, `@property*` and every tag without a
/// dedicated model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardTag {
    tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_type: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// One parameter of a `@method` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_type: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    variadic: bool,
    by_ref: bool,
}

impl ParamSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_type(&self) -> Option<&str> {
        self.raw_type.as_deref()
    }

    pub fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some() || self.variadic
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn is_by_ref(&self) -> bool {
        self.by_ref
    }
}

/// `@method [static] [returnType] name(params) [description]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTag {
    is_static: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_type: Option<Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    params: IndexMap<String, ParamSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl MethodTag {
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn raw_return_type(&self) -> Option<&str> {
        self.raw_return_type.as_deref()
    }

    pub fn return_type(&self) -> Option<&Type> {
        self.return_type.as_ref()
    }

    pub fn params(&self) -> &IndexMap<String, ParamSpec> {
        &self.params
    }

    /// Look up a parameter by name, with or without the leading `$`.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.get(name.strip_prefix('$').unwrap_or(name))
    }
}

/// `@throws type [description]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThrowsTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_type: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// The comment's summary or description text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTag {
    tag: String,
    text: String,
}

impl SummaryTag {
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A documentation tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tag {
    Standard(StandardTag),
    Method(MethodTag),
    Throws(ThrowsTag),
    Summary(SummaryTag),
}

impl Tag {
    /// Build a tag from a raw notation.
    ///
    /// Never fails because of malformed content; only a fatal type error
    /// (an inconsistent enumeration) is returned.
    pub fn build(tag_name: &str, raw_value: &str, cx: &DocContext<'_>) -> Result<Tag, TypeError> {
        let value = raw_value.trim();
        let lower = tag_name.to_ascii_lowercase();
        let tag = match lower.as_str() {
            "summary" | "description" => Tag::Summary(SummaryTag {
                tag: lower.clone(),
                text: value.to_string(),
            }),
            "method" => Tag::Method(build_method(value, cx)?),
            "throws" => Tag::Throws(build_throws(value, cx)?),
            name if TYPED_TAGS.contains(&name) => Tag::Standard(build_standard(tag_name, value, cx)?),
            _ => Tag::Standard(StandardTag {
                tag: tag_name.to_string(),
                raw_type: None,
                ty: None,
                name: None,
                description: non_empty(value),
            }),
        };
        Ok(tag)
    }

    /// The tag name as written (`param`, `property-read`, …).
    pub fn tag(&self) -> &str {
        match self {
            Tag::Standard(t) => &t.tag,
            Tag::Method(_) => "method",
            Tag::Throws(_) => "throws",
            Tag::Summary(t) => &t.tag,
        }
    }

    /// The variable name of a `@param`/`@var`/`@property*` tag, or the
    /// method name of a `@method` tag.  Without the leading `$`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Tag::Standard(t) => t.name.as_deref(),
            Tag::Method(t) => t.name.as_deref(),
            Tag::Throws(_) | Tag::Summary(_) => None,
        }
    }

    /// The resolved type: the declared type, the thrown type, or the
    /// return type of a `@method`.
    pub fn resolved_type(&self) -> Option<&Type> {
        match self {
            Tag::Standard(t) => t.ty.as_ref(),
            Tag::Method(t) => t.return_type.as_ref(),
            Tag::Throws(t) => t.ty.as_ref(),
            Tag::Summary(_) => None,
        }
    }

    /// The type string as written in the comment.
    pub fn raw_type(&self) -> Option<&str> {
        match self {
            Tag::Standard(t) => t.raw_type.as_deref(),
            Tag::Method(t) => t.raw_return_type.as_deref(),
            Tag::Throws(t) => t.raw_type.as_deref(),
            Tag::Summary(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Tag::Standard(t) => t.description.as_deref(),
            Tag::Method(t) => t.description.as_deref(),
            Tag::Throws(t) => t.description.as_deref(),
            Tag::Summary(t) => Some(&t.text),
        }
    }

    pub fn as_method(&self) -> Option<&MethodTag> {
        match self {
            Tag::Method(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_summary(&self) -> Option<&SummaryTag> {
        match self {
            Tag::Summary(t) => Some(t),
            _ => None,
        }
    }

    /// Whether the tag could not be parsed into its structured form
    /// (a `@method` without a recognisable signature).
    pub fn is_degraded(&self) -> bool {
        matches!(self, Tag::Method(t) if t.name.is_none())
    }
}

// ─── Builders ───────────────────────────────────────────────────────────────

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Resolve a tag's type string, degrading non-fatal failures to `None`.
fn resolve_field(raw: &str, slot: Slot, cx: &DocContext<'_>) -> Result<Option<Type>, TypeError> {
    match cx.resolver.resolve_in(raw, cx.names, slot) {
        Ok(ty) => Ok(Some(ty)),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            tracing::warn!(%err, raw, "tag type left unresolved");
            Ok(None)
        }
    }
}

/// Split a leading `$name` (optionally `&$name` / `...$name`) off `s`.
/// Returns the bare name and the remainder.
fn split_variable(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let rest = s.trim_start_matches('&');
    let rest = rest.strip_prefix("...").unwrap_or(rest);
    let rest = rest.strip_prefix('$')?;
    let end = rest
        .find(|c: char| !(c == '_' || c.is_alphanumeric()))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    is_identifier(name).then(|| (name, &rest[end..]))
}

fn build_standard(tag: &str, value: &str, cx: &DocContext<'_>) -> Result<StandardTag, TypeError> {
    let (raw_type, rest) = match split_variable(value) {
        Some(_) => (None, value),
        None if value.is_empty() => (None, ""),
        None => {
            let (ty, rest) = split_type_token(value);
            (Some(ty), rest)
        }
    };
    let (name, rest) = match split_variable(rest) {
        Some((name, rest)) => (Some(name.to_string()), rest),
        None => (None, rest),
    };
    let ty = match raw_type {
        Some(raw) => resolve_field(raw, Slot::Plain, cx)?,
        None => None,
    };
    Ok(StandardTag {
        tag: tag.to_string(),
        raw_type: raw_type.map(str::to_string),
        ty,
        name,
        description: non_empty(rest),
    })
}

fn build_throws(value: &str, cx: &DocContext<'_>) -> Result<ThrowsTag, TypeError> {
    if value.is_empty() {
        return Ok(ThrowsTag {
            raw_type: None,
            ty: None,
            description: None,
        });
    }
    let (raw_type, rest) = split_type_token(value);
    Ok(ThrowsTag {
        raw_type: Some(raw_type.to_string()),
        ty: resolve_field(raw_type, Slot::Plain, cx)?,
        description: non_empty(rest),
    })
}

/// Locate the `name(params)` part of a `@method` value.
///
/// Returns `(name_start, open_paren, close_paren)` byte offsets.  The
/// name must be an identifier preceded by whitespace or the start of the
/// value, and the closing parenthesis must be followed by whitespace or
/// the end of the value (a `:` there means a callable type, not the
/// method signature).
fn locate_signature(s: &str) -> Option<(usize, usize, usize)> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            b'"' | b'\'' => quote = Some(c),
            b'<' | b'{' | b'[' => depth += 1,
            b'>' | b'}' | b']' => depth -= 1,
            b'(' if depth == 0 => {
                let name_start = s[..i]
                    .rfind(|ch: char| !(ch == '_' || ch.is_alphanumeric()))
                    .map_or(0, |p| p + 1);
                let name = &s[name_start..i];
                let preceded_ok = name_start == 0
                    || s[..name_start].ends_with(|ch: char| ch.is_whitespace());
                let close = matching_paren(s, i);
                if let Some(close) = close {
                    let followed_ok = s[close + 1..]
                        .chars()
                        .next()
                        .is_none_or(char::is_whitespace);
                    if is_identifier(name) && preceded_ok && followed_ok {
                        return Some((name_start, i, close));
                    }
                    i = close + 1;
                    continue;
                }
                return None;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, c) in s[open..].char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn build_method(value: &str, cx: &DocContext<'_>) -> Result<MethodTag, TypeError> {
    let (is_static, rest) = match value.strip_prefix("static") {
        Some(after) if after.starts_with(char::is_whitespace) => {
            // `@method static foo()` is a static method without a return
            // type, `@method static static foo()` returns `static`.
            match locate_signature(after.trim_start()) {
                Some(_) => (true, after.trim_start()),
                None => (false, value),
            }
        }
        _ => (false, value),
    };

    let Some((name_start, open, close)) = locate_signature(rest) else {
        tracing::warn!(value, "@method without a recognisable signature");
        return Ok(MethodTag {
            is_static: false,
            raw_return_type: None,
            return_type: None,
            name: None,
            params: IndexMap::new(),
            description: non_empty(value),
        });
    };

    let raw_return = non_empty(&rest[..name_start]);
    let return_type = match &raw_return {
        Some(raw) => resolve_field(raw, Slot::Plain, cx)?,
        None => None,
    };

    let mut params = IndexMap::new();
    let params_str = rest[open + 1..close].trim();
    if !params_str.is_empty() {
        for part in split_top_level(params_str, ',') {
            if let Some(spec) = build_param(part, cx)? {
                params.insert(spec.name.clone(), spec);
            }
        }
    }

    Ok(MethodTag {
        is_static,
        raw_return_type: raw_return,
        return_type,
        name: Some(rest[name_start..open].to_string()),
        params,
        description: non_empty(&rest[close + 1..]),
    })
}

/// Parse `[type] [&][...]$name [= default]`.
fn build_param(part: &str, cx: &DocContext<'_>) -> Result<Option<ParamSpec>, TypeError> {
    let part = part.trim();
    if part.is_empty() {
        return Ok(None);
    }
    let (decl, default) = match find_top_level(part, '=') {
        Some(eq) => (part[..eq].trim(), non_empty(&part[eq + 1..])),
        None => (part, None),
    };

    let Some(dollar) = decl.rfind('$') else {
        tracing::debug!(param = part, "@method parameter without a variable name");
        return Ok(None);
    };
    let Some((name, _)) = split_variable(&decl[dollar..]) else {
        return Ok(None);
    };
    let prefix = decl[..dollar].trim_end();
    let variadic = prefix.ends_with("...");
    let prefix = prefix.trim_end_matches("...").trim_end();
    let by_ref = prefix.ends_with('&');
    let prefix = prefix.trim_end_matches('&').trim_end();

    let raw_type = non_empty(prefix);
    let slot = match &default {
        Some(d) if cx.nullable_defaults && d.eq_ignore_ascii_case("null") => Slot::Nullable,
        _ => Slot::Plain,
    };
    let ty = match &raw_type {
        Some(raw) => resolve_field(raw, slot, cx)?,
        None => None,
    };

    Ok(Some(ParamSpec {
        name: name.to_string(),
        raw_type,
        ty,
        default,
        variadic,
        by_ref,
    }))
}
