//! Error taxonomy.
//!
//! Only type-grammar failures and enum-consistency failures are hard
//! errors.  Everything that goes wrong while reading comment text is
//! recovered locally: a malformed notation is dropped ([`NotationError`]
//! is logged, never returned) and a tag whose type cannot be resolved is
//! kept with its type left unset.
//!
//! | Error | Raised by | Handling |
//! |---|---|---|
//! | [`NotationError`] | comment parser | logged, notation dropped |
//! | [`TypeError::Unresolvable`] | type resolver | tag field degrades to unset |
//! | [`AliasError`] | name resolution context | same as `Unresolvable` |
//! | [`TypeError::Shape`] | shape grammars | same as `Unresolvable` |
//! | [`TypeError::EnumType`] | enum shape grammars | fatal, reaches the caller |
//! | [`TagNotFound`] | tag bags / comment façades | returned to the caller |

use std::path::PathBuf;

use thiserror::Error;

/// Render the ` for "Construct"` suffix used by resolution errors.
fn for_construct(construct: &Option<String>) -> String {
    match construct {
        Some(name) => format!(" for \"{}\"", name),
        None => String::new(),
    }
}

/// Render the ` in Construct` suffix used by lookup errors.
fn in_construct(construct: &Option<String>) -> String {
    match construct {
        Some(name) => format!(" in {}", name),
        None => String::new(),
    }
}

/// A raw type string could not be turned into a [`Type`](crate::types::Type).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// No variant matcher accepted the string.  `raw` is the string exactly
    /// as the caller passed it.
    #[error("the given string \"{raw}\" is not a valid type{}", for_construct(.construct))]
    Unresolvable {
        raw: String,
        construct: Option<String>,
    },

    /// A class name could not be resolved through the declaring scope.
    #[error(transparent)]
    Alias(#[from] AliasError),

    /// A shape grammar matched syntactically but its data is invalid
    /// (e.g. `int<5, 1>`).
    #[error("invalid {shape} shape in \"{raw}\": {reason}")]
    Shape {
        raw: String,
        shape: &'static str,
        reason: String,
    },

    /// The enumeration referenced by `key-of<…>` / `value-of<…>` has case
    /// values of more than one scalar type.
    #[error("the class {name} cannot be used as an enum; case value types do not match")]
    EnumType { name: String },
}

impl TypeError {
    /// Build an [`TypeError::Unresolvable`] for `raw`.
    pub fn unresolvable(raw: impl Into<String>, construct: Option<&str>) -> Self {
        TypeError::Unresolvable {
            raw: raw.into(),
            construct: construct.map(str::to_string),
        }
    }

    /// Whether the error must abort the whole comment instead of degrading
    /// a single tag field.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TypeError::EnumType { .. })
    }

    /// The raw type string this error is about, when there is one.
    pub fn raw(&self) -> Option<&str> {
        match self {
            TypeError::Unresolvable { raw, .. } | TypeError::Shape { raw, .. } => Some(raw),
            TypeError::Alias(alias) => Some(&alias.alias),
            TypeError::EnumType { .. } => None,
        }
    }
}

/// A short or aliased name could not be resolved to a fully-qualified one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "the alias \"{alias}\" could not be resolved into a fully qualified name in the context of \"{scope}\""
)]
pub struct AliasError {
    pub alias: String,
    pub scope: String,
}

/// A tag (or a named parameter/property/method tag) is missing from a
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("@{tag} not found in document comment{}", in_construct(.construct))]
pub struct TagNotFound {
    pub tag: String,
    pub construct: Option<String>,
}

impl TagNotFound {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            construct: None,
        }
    }

    /// Attach the identity of the declaration the lookup was made on
    /// (e.g. `App\User::save()`).
    pub fn in_construct(mut self, construct: impl Into<String>) -> Self {
        self.construct = Some(construct.into());
        self
    }
}

/// A comment line looked like a notation but did not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed notation `{line}`: {reason}")]
pub struct NotationError {
    pub line: String,
    pub reason: &'static str,
}

/// Failure while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid alias pattern `{pattern}`: {source}")]
    InvalidAlias {
        pattern: String,
        source: regex::Error,
    },
}

/// Failure while reading or parsing PHP source text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parser panicked while reading {name}")]
    ParserPanicked { name: String },
}
