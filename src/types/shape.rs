//! Shape grammars.
//!
//! Each grammar recognises one parameterised spelling of a builtin and
//! builds the corresponding [`ShapeDefinition`].  Grammars are registered
//! per base builtin and tried in registration order:
//!
//! | Base | Grammars |
//! |---|---|
//! | `array` | Map (`array{a: int}`), KeyValue (`array<K, V>`) |
//! | `string` | OneOf (`string<"a", "b">`), EnumKey (`key-of<E>`), EnumValue (`value-of<E>`) |
//! | `int` | MinMax (`int<1, 5>`) |
//! | `object` | Map (`object{a: int}`) |
//!
//! A grammar returns `Ok(None)` when the string is not written in its
//! syntax, so the next grammar (or matcher) gets a chance.  Once the
//! syntax matches, invalid content is an error.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::split::{find_top_level, split_bracketed, split_literals, split_top_level};
use super::{Builtin, MapEntry, ShapeDefinition, Slot, Type, TypeResolver};
use crate::error::TypeError;
use crate::names::NameResolutionContext;

/// Parse function shared by every grammar.
pub(crate) type ParseFn =
    fn(&str, &TypeResolver, &NameResolutionContext) -> Result<Option<Type>, TypeError>;

/// A named shape grammar.
pub(crate) struct Grammar {
    pub name: &'static str,
    pub parse: ParseFn,
}

const MAP: Grammar = Grammar {
    name: "map",
    parse: parse_map,
};
const KEY_VALUE: Grammar = Grammar {
    name: "key-value",
    parse: parse_key_value,
};
const ONE_OF: Grammar = Grammar {
    name: "one-of",
    parse: parse_one_of,
};
const ENUM_KEY: Grammar = Grammar {
    name: "enum-key",
    parse: parse_enum_key,
};
const ENUM_VALUE: Grammar = Grammar {
    name: "enum-value",
    parse: parse_enum_value,
};
const MIN_MAX: Grammar = Grammar {
    name: "min-max",
    parse: parse_min_max,
};

/// Grammars per base builtin, in the order they are tried.
pub(crate) const REGISTRY: &[(Builtin, &[Grammar])] = &[
    (Builtin::Array, &[MAP, KEY_VALUE]),
    (Builtin::String, &[ONE_OF, ENUM_KEY, ENUM_VALUE]),
    (Builtin::Int, &[MIN_MAX]),
    (Builtin::Object, &[MAP]),
];

static MIN_MAX_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*,\s*(\d+)\s*$").expect("valid regex"));

static MAP_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:[\w\-]+|'[^']*'|"[^"]*")$"#).expect("valid regex")
});

/// `key` without its one pair of enclosing quotes.
fn unquote(key: &str) -> &str {
    ['\'', '"']
        .into_iter()
        .find_map(|q| key.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(key)
}

fn shape_error(raw: &str, shape: &'static str, reason: impl Into<String>) -> TypeError {
    TypeError::Shape {
        raw: raw.to_string(),
        shape,
        reason: reason.into(),
    }
}

/// Split `s` into `base<inner>` / `base{inner}` when the base matches.
fn bracketed<'a>(s: &'a str, base: &str, open: char, close: char) -> Option<&'a str> {
    let (prefix, inner) = split_bracketed(s, open, close)?;
    prefix.eq_ignore_ascii_case(base).then_some(inner)
}

// ─── Map ────────────────────────────────────────────────────────────────────

fn parse_map(
    s: &str,
    resolver: &TypeResolver,
    ctx: &NameResolutionContext,
) -> Result<Option<Type>, TypeError> {
    let base = if s.get(..6).is_some_and(|p| p.eq_ignore_ascii_case("object")) {
        Builtin::Object
    } else {
        Builtin::Array
    };
    let Some(inner) = bracketed(s, base.as_str(), '{', '}') else {
        return Ok(None);
    };

    let mut entries: Vec<MapEntry> = Vec::new();
    let mut keys: HashSet<String> = HashSet::new();
    let mut next_index = 0usize;

    if !inner.trim().is_empty() {
        let mut parts = split_top_level(inner, ',');
        // Allow a trailing comma.
        if parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        for part in parts {
            if part.is_empty() {
                return Err(shape_error(s, MAP.name, "empty entry"));
            }
            let (key, optional, type_str) = match find_top_level(part, ':') {
                Some(colon) => {
                    let key = part[..colon].trim();
                    let (key, optional) = match key.strip_suffix('?') {
                        Some(k) => (k.trim_end(), true),
                        None => (key, false),
                    };
                    if !MAP_KEY.is_match(key) {
                        return Err(shape_error(s, MAP.name, format!("invalid key `{}`", key)));
                    }
                    let key = unquote(key).to_string();
                    (key, optional, part[colon + 1..].trim())
                }
                None => {
                    let key = next_index.to_string();
                    next_index += 1;
                    (key, false, part)
                }
            };
            if let Ok(index) = key.parse::<usize>() {
                next_index = next_index.max(index + 1);
            }
            if !keys.insert(key.clone()) {
                return Err(shape_error(s, MAP.name, format!("duplicate key `{}`", key)));
            }
            let ty = resolver.resolve_in(type_str, ctx, Slot::Plain)?;
            let ty = if optional { Type::nullable(ty) } else { ty };
            entries.push(MapEntry { key, ty, optional });
        }
    }

    Ok(Some(Type::shaped(base, ShapeDefinition::Map(entries))))
}

// ─── KeyValue ───────────────────────────────────────────────────────────────

fn parse_key_value(
    s: &str,
    resolver: &TypeResolver,
    ctx: &NameResolutionContext,
) -> Result<Option<Type>, TypeError> {
    let Some(inner) = bracketed(s, "array", '<', '>') else {
        return Ok(None);
    };
    let parts = split_top_level(inner, ',');
    if parts.iter().any(|p| p.is_empty()) {
        return Err(shape_error(s, KEY_VALUE.name, "empty type parameter"));
    }
    let shape = match parts.as_slice() {
        [value] => ShapeDefinition::KeyValue {
            key: None,
            value: resolver.resolve_in(value, ctx, Slot::Plain)?,
        },
        [key, value] => ShapeDefinition::KeyValue {
            key: Some(resolver.resolve_in(key, ctx, Slot::Plain)?),
            value: resolver.resolve_in(value, ctx, Slot::Plain)?,
        },
        _ => {
            return Err(shape_error(
                s,
                KEY_VALUE.name,
                "expected one or two type parameters",
            ));
        }
    };
    Ok(Some(Type::shaped(Builtin::Array, shape)))
}

// ─── MinMax ─────────────────────────────────────────────────────────────────

fn parse_min_max(
    s: &str,
    _resolver: &TypeResolver,
    _ctx: &NameResolutionContext,
) -> Result<Option<Type>, TypeError> {
    let Some(inner) = bracketed(s, "int", '<', '>') else {
        return Ok(None);
    };
    let Some(caps) = MIN_MAX_ARGS.captures(inner) else {
        return Ok(None);
    };
    let bound = |idx: usize| -> Result<u64, TypeError> {
        caps[idx]
            .parse::<u64>()
            .map_err(|e| shape_error(s, MIN_MAX.name, e.to_string()))
    };
    let (min, max) = (bound(1)?, bound(2)?);
    if min > max {
        return Err(shape_error(
            s,
            MIN_MAX.name,
            format!("minimum {} is greater than maximum {}", min, max),
        ));
    }
    Ok(Some(Type::shaped(
        Builtin::Int,
        ShapeDefinition::MinMax { min, max },
    )))
}

// ─── OneOf ──────────────────────────────────────────────────────────────────

fn parse_one_of(
    s: &str,
    _resolver: &TypeResolver,
    _ctx: &NameResolutionContext,
) -> Result<Option<Type>, TypeError> {
    let Some(inner) = bracketed(s, "string", '<', '>') else {
        return Ok(None);
    };
    if inner.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Type::shaped(
        Builtin::String,
        ShapeDefinition::OneOf(split_literals(inner)),
    )))
}

// ─── EnumKey / EnumValue ────────────────────────────────────────────────────

fn parse_enum_key(
    s: &str,
    _resolver: &TypeResolver,
    ctx: &NameResolutionContext,
) -> Result<Option<Type>, TypeError> {
    let Some(inner) = bracketed(s, "key-of", '<', '>') else {
        return Ok(None);
    };
    enum_shape(inner, ctx, |enumeration, case_type| {
        ShapeDefinition::EnumKey {
            enumeration,
            case_type,
        }
    })
    .map(Some)
}

fn parse_enum_value(
    s: &str,
    _resolver: &TypeResolver,
    ctx: &NameResolutionContext,
) -> Result<Option<Type>, TypeError> {
    let Some(inner) = bracketed(s, "value-of", '<', '>') else {
        return Ok(None);
    };
    enum_shape(inner, ctx, |enumeration, case_type| {
        ShapeDefinition::EnumValue {
            enumeration,
            case_type,
        }
    })
    .map(Some)
}

/// Resolve the enumeration named in `key-of<…>` / `value-of<…>` and
/// derive its case type.
///
/// The case type is the declared backing type, else the single scalar
/// type shared by all case values.  An enumeration without any case
/// values (a pure enum) resolves to a reference to the enum itself.
/// Case values of differing types are a fatal [`TypeError::EnumType`].
fn enum_shape(
    name: &str,
    ctx: &NameResolutionContext,
    build: impl FnOnce(String, Builtin) -> ShapeDefinition,
) -> Result<Type, TypeError> {
    let name = name.trim();
    let symbols = ctx.symbols();
    let enumeration = match symbols.canonical(name) {
        Some(canonical) => canonical.to_string(),
        None => ctx.resolve(name)?,
    };

    let Some(info) = symbols.enum_info(&enumeration) else {
        return Ok(Type::Class(enumeration));
    };

    let case_type = match info.backing {
        Some(backing) => backing,
        None => {
            let mut types = info
                .cases
                .iter()
                .filter_map(|case| case.value.as_ref().map(|v| v.builtin()));
            let Some(first) = types.next() else {
                return Ok(Type::Class(enumeration));
            };
            if types.any(|t| t != first) {
                return Err(TypeError::EnumType { name: enumeration });
            }
            first
        }
    };

    Ok(Type::shaped(Builtin::String, build(enumeration, case_type)))
}
