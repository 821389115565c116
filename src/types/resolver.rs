//! The type resolver.
//!
//! [`TypeResolver::resolve`] turns a raw PHPDoc type string into a
//! [`Type`] in two steps.
//!
//! **Normalize.**  The string is trimmed and, unless it is a union, a
//! leading `\` is dropped.  `self`, `static` and `$this` become the
//! declaring type.  A plain name that is an existing class (directly or
//! relative to the namespace) or a qualified name the context can resolve
//! becomes that class.  Anything else has its base token run through the
//! [`AliasTable`].
//!
//! **Dispatch.**  The normalized string is offered to a fixed list of
//! matchers; the first one that accepts it wins:
//!
//! 1. union: more than one top-level `|` segment (and not a nullable or
//!    array-of spelling), members resolved recursively and flattened
//! 2. nullable: `T|null`, `null|T`, `?T`, or any type in a nullable slot
//! 3. array-of: `T[]`, optionally unioned with `array`
//! 4. class reference: a class known to the symbol table or the context
//! 5. shaped builtin: a registered [shape grammar](super::shape)
//! 6. builtin: an exact builtin name
//!
//! If nothing matches, resolution fails with [`TypeError::Unresolvable`]
//! carrying the raw string as given.

use std::sync::Arc;

use super::shape::REGISTRY;
use super::split::split_top_level;
use super::{AliasTable, Builtin, Slot, Type, TypeCache};
use crate::error::TypeError;
use crate::names::NameResolutionContext;
use crate::util::{is_class_name, qualify, strip_leading_backslash};

/// Outcome of the normalize step.
enum Normalized {
    /// Already resolved to a class (or the declaring type).
    Resolved(Type),
    /// Text to dispatch.
    Text(String),
}

type MatchFn =
    fn(&TypeResolver, &str, &NameResolutionContext, Slot) -> Result<Option<Type>, TypeError>;

struct Matcher {
    name: &'static str,
    apply: MatchFn,
}

/// Variant matchers in priority order.
const MATCHERS: &[Matcher] = &[
    Matcher {
        name: "union",
        apply: match_union,
    },
    Matcher {
        name: "nullable",
        apply: match_nullable,
    },
    Matcher {
        name: "array-of",
        apply: match_array_of,
    },
    Matcher {
        name: "class",
        apply: match_class,
    },
    Matcher {
        name: "shaped",
        apply: match_shaped,
    },
    Matcher {
        name: "builtin",
        apply: match_builtin,
    },
];

/// Resolves raw type strings against a [`NameResolutionContext`].
///
/// Successful resolutions are memoised in a shared [`TypeCache`].
#[derive(Debug, Default)]
pub struct TypeResolver {
    aliases: AliasTable,
    cache: Arc<TypeCache>,
}

impl TypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Use an externally owned cache (e.g. one shared between resolvers).
    pub fn with_cache(mut self, cache: Arc<TypeCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolve `raw` in a plain (non-nullable) slot.
    pub fn resolve(&self, raw: &str, ctx: &NameResolutionContext) -> Result<Type, TypeError> {
        self.resolve_in(raw, ctx, Slot::Plain)
    }

    /// Resolve `raw`, returning `None` on any failure.
    pub fn try_resolve(&self, raw: &str, ctx: &NameResolutionContext) -> Option<Type> {
        self.resolve(raw, ctx).ok()
    }

    /// Resolve `raw` in the given slot.  In a [`Slot::Nullable`] the
    /// result admits `null` (`int` resolves to `?int`).
    pub fn resolve_in(
        &self,
        raw: &str,
        ctx: &NameResolutionContext,
        slot: Slot,
    ) -> Result<Type, TypeError> {
        if let Some(hit) = self.cache.get(ctx.scope_id(), raw, slot) {
            return Ok(hit);
        }
        match self.dispatch(raw, ctx, slot) {
            Ok(ty) => {
                self.cache.insert(ctx.scope_id(), raw, slot, &ty);
                Ok(ty)
            }
            // Nested failures are reported against the outermost string.
            Err(TypeError::Unresolvable { .. }) => {
                Err(TypeError::unresolvable(raw, ctx.construct()))
            }
            Err(err) => Err(err),
        }
    }

    fn dispatch(
        &self,
        raw: &str,
        ctx: &NameResolutionContext,
        slot: Slot,
    ) -> Result<Type, TypeError> {
        let text = match self.normalize(raw, ctx)? {
            Normalized::Resolved(ty) => return Ok(apply_slot(ty, slot)),
            Normalized::Text(text) => text,
        };
        for matcher in MATCHERS {
            if let Some(ty) = (matcher.apply)(self, &text, ctx, slot)? {
                tracing::trace!(raw, matcher = matcher.name, resolved = %ty, "type matched");
                return Ok(ty);
            }
        }
        Err(TypeError::unresolvable(raw, ctx.construct()))
    }

    fn normalize(&self, raw: &str, ctx: &NameResolutionContext) -> Result<Normalized, TypeError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(TypeError::unresolvable(raw, ctx.construct()));
        }
        let is_union = split_top_level(s, '|').len() > 1;
        let s = if is_union {
            s
        } else {
            strip_leading_backslash(s)
        };

        if s.eq_ignore_ascii_case("self") || s.eq_ignore_ascii_case("static") || s == "$this" {
            return match ctx.own_type() {
                Some(own) => Ok(Normalized::Resolved(Type::class(own))),
                None => Err(TypeError::unresolvable(raw, ctx.construct())),
            };
        }

        if is_union || s.ends_with("[]") || s.starts_with('?') {
            return Ok(Normalized::Text(s.to_string()));
        }

        if is_class_name(s) && Builtin::from_name(s).is_none() {
            let symbols = ctx.symbols();
            if let Some(canonical) = symbols.canonical(s) {
                return Ok(Normalized::Resolved(Type::class(canonical)));
            }
            if !ctx.namespace().is_empty()
                && let Some(canonical) = symbols.canonical(&qualify(ctx.namespace(), s))
            {
                return Ok(Normalized::Resolved(Type::class(canonical)));
            }
            if s.contains('\\')
                && let Some(fq) = ctx.try_resolve(s)
            {
                return Ok(Normalized::Resolved(Type::Class(fq)));
            }
        }

        Ok(Normalized::Text(self.aliases.apply(s)))
    }
}

fn apply_slot(ty: Type, slot: Slot) -> Type {
    match slot {
        Slot::Plain => ty,
        Slot::Nullable => Type::nullable(ty),
    }
}

fn is_null(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("null")
}

/// The non-null side of `T|null` / `null|T`, or `T` of `?T`.
fn nullable_inner<'a>(s: &'a str, segments: &[&'a str]) -> Option<&'a str> {
    if is_null(s) {
        return None;
    }
    match *segments {
        [a, b] if is_null(a) => Some(b),
        [a, b] if is_null(b) => Some(a),
        [single] => single.strip_prefix('?'),
        _ => None,
    }
}

/// The element type of `T[]`, `array|T[]` or `T[]|array`.
fn array_of_inner<'a>(segments: &[&'a str]) -> Option<&'a str> {
    let is_array = |seg: &str| seg.eq_ignore_ascii_case("array");
    let element = match *segments {
        [single] => single,
        [a, b] if is_array(a) => b,
        [a, b] if is_array(b) => a,
        [a, b, c] if is_array(a) && is_array(c) => b,
        _ => return None,
    };
    let inner = element.strip_suffix("[]")?.trim();
    (!inner.is_empty() && split_top_level(inner, '|').len() == 1).then_some(inner)
}

// ─── Matchers ───────────────────────────────────────────────────────────────

fn match_union(
    resolver: &TypeResolver,
    s: &str,
    ctx: &NameResolutionContext,
    slot: Slot,
) -> Result<Option<Type>, TypeError> {
    let segments = split_top_level(s, '|');
    if segments.len() < 2
        || nullable_inner(s, &segments).is_some()
        || array_of_inner(&segments).is_some()
    {
        return Ok(None);
    }
    if segments.iter().any(|seg| seg.is_empty()) {
        return Err(TypeError::unresolvable(s, ctx.construct()));
    }
    let members = segments
        .iter()
        .map(|seg| resolver.resolve_in(seg, ctx, Slot::Plain))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(apply_slot(Type::union(members), slot)))
}

fn match_nullable(
    resolver: &TypeResolver,
    s: &str,
    ctx: &NameResolutionContext,
    slot: Slot,
) -> Result<Option<Type>, TypeError> {
    let segments = split_top_level(s, '|');
    let inner = match nullable_inner(s, &segments) {
        Some(inner) => inner.trim(),
        None if slot == Slot::Nullable && !is_null(s) => s,
        None => return Ok(None),
    };
    if inner.is_empty() {
        return Err(TypeError::unresolvable(s, ctx.construct()));
    }
    let ty = resolver.resolve_in(inner, ctx, Slot::Plain)?;
    Ok(Some(Type::nullable(ty)))
}

fn match_array_of(
    resolver: &TypeResolver,
    s: &str,
    ctx: &NameResolutionContext,
    slot: Slot,
) -> Result<Option<Type>, TypeError> {
    let segments = split_top_level(s, '|');
    let Some(inner) = array_of_inner(&segments) else {
        return Ok(None);
    };
    let ty = resolver.resolve_in(inner, ctx, Slot::Plain)?;
    Ok(Some(apply_slot(Type::array_of(ty), slot)))
}

fn match_class(
    _resolver: &TypeResolver,
    s: &str,
    ctx: &NameResolutionContext,
    slot: Slot,
) -> Result<Option<Type>, TypeError> {
    if Builtin::from_name(s).is_some() || !is_class_name(s) {
        return Ok(None);
    }
    let fq = match ctx.symbols().canonical(s) {
        Some(canonical) => canonical.to_string(),
        None => match ctx.resolve(s) {
            Ok(fq) => fq,
            Err(err) => {
                tracing::trace!(%err, "class lookup failed");
                return Ok(None);
            }
        },
    };
    Ok(Some(apply_slot(Type::Class(fq), slot)))
}

fn match_shaped(
    resolver: &TypeResolver,
    s: &str,
    ctx: &NameResolutionContext,
    slot: Slot,
) -> Result<Option<Type>, TypeError> {
    for (base, grammars) in REGISTRY {
        for grammar in grammars.iter() {
            if let Some(ty) = (grammar.parse)(s, resolver, ctx)? {
                tracing::trace!(base = %base, grammar = grammar.name, "shape matched");
                return Ok(Some(apply_slot(ty, slot)));
            }
        }
    }
    Ok(None)
}

fn match_builtin(
    _resolver: &TypeResolver,
    s: &str,
    _ctx: &NameResolutionContext,
    slot: Slot,
) -> Result<Option<Type>, TypeError> {
    Ok(Builtin::from_name(s).map(|b| apply_slot(Type::Builtin(b), slot)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_spellings_are_detected() {
        assert_eq!(nullable_inner("int|null", &["int", "null"]), Some("int"));
        assert_eq!(nullable_inner("NULL|int", &["NULL", "int"]), Some("int"));
        assert_eq!(nullable_inner("?int", &["?int"]), Some("int"));
        assert_eq!(nullable_inner("null", &["null"]), None);
        assert_eq!(nullable_inner("int|string", &["int", "string"]), None);
    }

    #[test]
    fn array_of_spellings_are_detected() {
        assert_eq!(array_of_inner(&["int[]"]), Some("int"));
        assert_eq!(array_of_inner(&["int[]", "array"]), Some("int"));
        assert_eq!(array_of_inner(&["array", "int[]"]), Some("int"));
        assert_eq!(array_of_inner(&["int[]", "string"]), None);
        assert_eq!(array_of_inner(&["[]"]), None);
    }
}
