//! The type model.
//!
//! A resolved PHPDoc type is a closed [`Type`] enum.  Variants compose
//! recursively (`array<string, ?User>` is a shaped builtin whose value
//! type is a nullable class reference) and every value renders back to a
//! PHPDoc string through [`Display`](std::fmt::Display).  Rendering and
//! resolving are inverse operations: resolving the rendered form of a type
//! in the same context yields an equal type.
//!
//! Construction goes through [`Type::nullable`] and [`Type::union`], which
//! keep two structural invariants:
//!
//! - a `Nullable` never wraps another `Nullable` (or `null`/`mixed`, which
//!   already admit null)
//! - a `Union` has at least two members, none of which is a `Union` or a
//!   `Nullable`, and no two members render the same
//!
//! # Submodules
//!
//! - [`aliases`]: pseudo-type alias table (`positive-int` → `int`, …).
//! - [`split`]: bracket- and quote-aware splitting of type strings.
//! - [`shape`]: the shape grammars (`array{…}`, `array<K, V>`, `int<a, b>`,
//!   `string<"a", "b">`, `key-of<E>`, `value-of<E>`).
//! - [`resolver`]: the [`TypeResolver`] dispatcher.
//! - [`cache`]: the resolved-type cache.

pub mod aliases;
pub mod cache;
pub mod resolver;
pub mod shape;
pub mod split;

use std::fmt;

use serde::Serialize;

pub use aliases::AliasTable;
pub use cache::TypeCache;
pub use resolver::TypeResolver;

use crate::util;

// ─── Builtins ───────────────────────────────────────────────────────────────

/// Builtin and pseudo type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
    Null,
    Resource,
    Callable,
    Mixed,
    Scalar,
    Iterable,
    Void,
    Never,
}

impl Builtin {
    pub const ALL: [Builtin; 14] = [
        Builtin::Bool,
        Builtin::Int,
        Builtin::Float,
        Builtin::String,
        Builtin::Array,
        Builtin::Object,
        Builtin::Null,
        Builtin::Resource,
        Builtin::Callable,
        Builtin::Mixed,
        Builtin::Scalar,
        Builtin::Iterable,
        Builtin::Void,
        Builtin::Never,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Builtin::Bool => "bool",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::String => "string",
            Builtin::Array => "array",
            Builtin::Object => "object",
            Builtin::Null => "null",
            Builtin::Resource => "resource",
            Builtin::Callable => "callable",
            Builtin::Mixed => "mixed",
            Builtin::Scalar => "scalar",
            Builtin::Iterable => "iterable",
            Builtin::Void => "void",
            Builtin::Never => "never",
        }
    }

    /// Look up a builtin by its exact name (case-insensitive).  Aliases
    /// such as `integer` are not accepted here.
    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(name))
    }

    /// `bool`, `int`, `float` and `string`.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Builtin::Bool | Builtin::Int | Builtin::Float | Builtin::String
        )
    }

    /// `mixed`, `scalar`, `iterable`, `void` and `never`.
    pub fn is_pseudo(self) -> bool {
        matches!(
            self,
            Builtin::Mixed | Builtin::Scalar | Builtin::Iterable | Builtin::Void | Builtin::Never
        )
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Shapes ─────────────────────────────────────────────────────────────────

/// One entry of a `Map` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapEntry {
    pub key: String,
    /// The entry type.  Optional entries (`key?: T`) hold `Nullable(T)`.
    #[serde(rename = "type")]
    pub ty: Type,
    pub optional: bool,
}

/// The parameterisation of a shaped builtin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum ShapeDefinition {
    /// `array{a: int, b?: string}` / `object{a: int}`.
    Map(Vec<MapEntry>),
    /// `array<K, V>` or `array<V>`.
    KeyValue { key: Option<Type>, value: Type },
    /// `int<min, max>`, with `min <= max`.
    MinMax { min: u64, max: u64 },
    /// `string<"a", "b">`.
    OneOf(Vec<String>),
    /// `key-of<E>`.
    EnumKey { enumeration: String, case_type: Builtin },
    /// `value-of<E>`.
    EnumValue { enumeration: String, case_type: Builtin },
}

impl ShapeDefinition {
    /// The grammar name, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeDefinition::Map(_) => "map",
            ShapeDefinition::KeyValue { .. } => "key-value",
            ShapeDefinition::MinMax { .. } => "min-max",
            ShapeDefinition::OneOf(_) => "one-of",
            ShapeDefinition::EnumKey { .. } => "enum-key",
            ShapeDefinition::EnumValue { .. } => "enum-value",
        }
    }

    /// Look up a `Map` entry by key.
    pub fn entry(&self, key: &str) -> Option<&MapEntry> {
        match self {
            ShapeDefinition::Map(entries) => entries.iter().find(|e| e.key == key),
            _ => None,
        }
    }

    fn render(&self, base: Builtin, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeDefinition::Map(entries) => {
                write!(f, "{}{{", base)?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_key(f, &entry.key)?;
                    if entry.optional {
                        // The optional marker already implies the Nullable.
                        let inner = match &entry.ty {
                            Type::Nullable(inner) => inner.as_ref(),
                            other => other,
                        };
                        write!(f, "?: {}", inner)?;
                    } else {
                        write!(f, ": {}", entry.ty)?;
                    }
                }
                f.write_str("}")
            }
            ShapeDefinition::KeyValue { key, value } => match key {
                Some(key) => write!(f, "{}<{}, {}>", base, key, value),
                None => write!(f, "{}<{}>", base, value),
            },
            ShapeDefinition::MinMax { min, max } => write!(f, "{}<{}, {}>", base, min, max),
            ShapeDefinition::OneOf(literals) => {
                write!(f, "{}<", base)?;
                for (i, literal) in literals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\"", literal.replace('"', "\"\""))?;
                }
                f.write_str(">")
            }
            ShapeDefinition::EnumKey { enumeration, .. } => write!(f, "key-of<{}>", enumeration),
            ShapeDefinition::EnumValue { enumeration, .. } => {
                write!(f, "value-of<{}>", enumeration)
            }
        }
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if !key.is_empty() && key.chars().all(|c| c == '_' || c == '-' || c.is_alphanumeric()) {
        f.write_str(key)
    } else if key.contains('\'') {
        write!(f, "\"{}\"", key)
    } else {
        write!(f, "'{}'", key)
    }
}

// ─── Types ──────────────────────────────────────────────────────────────────

/// A resolved PHPDoc type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Type {
    /// A builtin or pseudo type (`int`, `mixed`, `void`, …).
    Builtin(Builtin),
    /// A fully-qualified class, interface, trait or enum name (no leading
    /// `\`).
    Class(String),
    /// `?T`.  The inner type is never `Nullable`, `null` or `mixed`.
    Nullable(Box<Type>),
    /// `A|B|…` with at least two distinct members.
    Union(Vec<Type>),
    /// `T[]`.
    ArrayOf(Box<Type>),
    /// A builtin with a shape parameterisation.
    Shaped {
        base: Builtin,
        shape: Box<ShapeDefinition>,
    },
}

/// The nullability context a type string is resolved in.  `Nullable`
/// applies to parameters whose default value is `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    #[default]
    Plain,
    Nullable,
}

impl Type {
    pub fn builtin(builtin: Builtin) -> Type {
        Type::Builtin(builtin)
    }

    pub fn class(name: impl AsRef<str>) -> Type {
        Type::Class(util::strip_leading_backslash(name.as_ref()).to_string())
    }

    pub fn array_of(inner: Type) -> Type {
        Type::ArrayOf(Box::new(inner))
    }

    pub fn shaped(base: Builtin, shape: ShapeDefinition) -> Type {
        Type::Shaped {
            base,
            shape: Box::new(shape),
        }
    }

    /// Make `inner` nullable.
    ///
    /// - `int` → `?int`
    /// - `?int` → `?int`
    /// - `int|string` → `int|string|null`
    /// - `null`, `mixed` → unchanged
    pub fn nullable(inner: Type) -> Type {
        match inner {
            Type::Nullable(_) | Type::Builtin(Builtin::Null | Builtin::Mixed) => inner,
            Type::Union(members) => {
                let mut members = members;
                members.push(Type::Builtin(Builtin::Null));
                Type::union(members)
            }
            other => Type::Nullable(Box::new(other)),
        }
    }

    /// Build a union from `members`.
    ///
    /// Nested unions are flattened, `Nullable` members are split into
    /// their inner type plus `null`, and members rendering the same are
    /// dropped.  A single remaining member is returned as is, and
    /// `[T, null]` collapses to `Nullable(T)`.  An empty member list
    /// yields `never`.
    pub fn union(members: Vec<Type>) -> Type {
        let mut flat: Vec<Type> = Vec::with_capacity(members.len());
        let mut seen: Vec<String> = Vec::with_capacity(members.len());
        let mut push = |ty: Type, flat: &mut Vec<Type>| {
            let rendered = ty.to_string();
            if !seen.contains(&rendered) {
                seen.push(rendered);
                flat.push(ty);
            }
        };
        for member in members {
            match member {
                Type::Union(inner) => {
                    for ty in inner {
                        push(ty, &mut flat);
                    }
                }
                Type::Nullable(inner) => {
                    push(*inner, &mut flat);
                    push(Type::Builtin(Builtin::Null), &mut flat);
                }
                other => push(other, &mut flat),
            }
        }

        match flat.len() {
            0 => Type::Builtin(Builtin::Never),
            1 => flat.remove(0),
            2 if flat.contains(&Type::Builtin(Builtin::Null)) => {
                let inner = flat
                    .into_iter()
                    .find(|t| *t != Type::Builtin(Builtin::Null))
                    .unwrap_or(Type::Builtin(Builtin::Null));
                Type::nullable(inner)
            }
            _ => Type::Union(flat),
        }
    }

    // ─── Classification ─────────────────────────────────────────────────

    /// Whether a value of this type may be `null`.
    pub fn allows_null(&self) -> bool {
        match self {
            Type::Nullable(_) => true,
            Type::Builtin(b) => matches!(b, Builtin::Null | Builtin::Mixed),
            Type::Union(members) => members.iter().any(Type::allows_null),
            _ => false,
        }
    }

    /// Whether the type is a builtin (plain, shaped or `T[]`), looking
    /// through a nullable wrapper.
    pub fn is_builtin(&self) -> bool {
        match self {
            Type::Builtin(_) | Type::Shaped { .. } | Type::ArrayOf(_) => true,
            Type::Nullable(inner) => inner.is_builtin(),
            _ => false,
        }
    }

    /// Whether the type is a class reference, looking through a nullable
    /// wrapper.
    pub fn is_class(&self) -> bool {
        match self {
            Type::Class(_) => true,
            Type::Nullable(inner) => inner.is_class(),
            _ => false,
        }
    }

    pub fn is_scalar(&self) -> bool {
        match self {
            Type::Builtin(b) => b.is_scalar(),
            Type::Shaped { base, .. } => base.is_scalar(),
            Type::Nullable(inner) => inner.is_scalar(),
            _ => false,
        }
    }

    pub fn is_pseudo(&self) -> bool {
        match self {
            Type::Builtin(b) => b.is_pseudo(),
            Type::Nullable(inner) => inner.is_pseudo(),
            _ => false,
        }
    }

    /// Whether values of this type can be iterated (`array`, `iterable`,
    /// `T[]`, shaped arrays).
    pub fn is_iterable(&self) -> bool {
        match self {
            Type::Builtin(b) => matches!(b, Builtin::Array | Builtin::Iterable),
            Type::ArrayOf(_) => true,
            Type::Shaped { base, .. } => *base == Builtin::Array,
            Type::Nullable(inner) => inner.is_iterable(),
            _ => false,
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Type::Union(_))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    /// The wrapped type of a `Nullable` or `ArrayOf`.
    pub fn inner(&self) -> Option<&Type> {
        match self {
            Type::Nullable(inner) | Type::ArrayOf(inner) => Some(inner),
            _ => None,
        }
    }

    /// The members of a `Union`.
    pub fn members(&self) -> Option<&[Type]> {
        match self {
            Type::Union(members) => Some(members),
            _ => None,
        }
    }

    /// The base and shape of a shaped builtin.
    pub fn shape(&self) -> Option<(Builtin, &ShapeDefinition)> {
        match self {
            Type::Shaped { base, shape } => Some((*base, shape)),
            _ => None,
        }
    }

    /// The fully-qualified class name, looking through a nullable wrapper.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            Type::Nullable(inner) => inner.class_name(),
            _ => None,
        }
    }

    /// The unqualified name of a class reference; other types render as
    /// themselves.
    pub fn short_name(&self) -> String {
        match self.class_name() {
            Some(name) => util::short_name(name).to_string(),
            None => self.to_string(),
        }
    }

    /// The namespace of a class reference, if it has one.
    pub fn namespace(&self) -> Option<&str> {
        self.class_name().and_then(util::namespace_of)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Builtin(b) => f.write_str(b.as_str()),
            Type::Class(name) => f.write_str(name),
            Type::Nullable(inner) => write!(f, "?{}", inner),
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            Type::ArrayOf(inner) => write!(f, "{}[]", inner),
            Type::Shaped { base, shape } => shape.render(*base, f),
        }
    }
}
