//! PHPDoc reflection.
//!
//! Extracts typed metadata from PHP documentation comments and resolves
//! the type expressions found in it into a normalized [`Type`] model:
//! builtins, nullables, unions, `T[]`, class references resolved through
//! namespaces and imports, and shaped builtins (`array{…}`,
//! `array<K, V>`, `int<min, max>`, `string<"a", "b">`, `key-of<E>`,
//! `value-of<E>`).
//!
//! ```text
//! comment text ──parse──▶ notations ──build──▶ tags ──▶ TagCollection
//!                                         │
//!                                         └──▶ TypeResolver ──▶ Type
//!                                                  │
//!                                   NameResolutionContext + SymbolTable
//! ```
//!
//! [`reflect::Reflector`] is the entry point for callers that have whole
//! declarations; [`source::Workspace`] provides declarations, symbols and
//! scope metadata from PHP files.

pub mod config;
pub mod docblock;
pub mod error;
pub mod names;
pub mod reflect;
pub mod source;
pub mod symbols;
pub mod types;
pub mod util;

pub use config::Config;
pub use docblock::{DocContext, Tag, TagCollection, TagEntry, extract_tags};
pub use error::{AliasError, ConfigError, SourceError, TagNotFound, TypeError};
pub use names::{NameResolutionContext, ScopeCache, ScopeMetadata, ScopeProvider};
pub use reflect::{
    ClassComment, Comment, Declaration, DocComment, FunctionComment, PropertyComment, Reflector,
};
pub use symbols::{ClassIndex, ClassKind, ClassSymbol, SymbolTable};
pub use types::{Builtin, ShapeDefinition, Type, TypeResolver};
