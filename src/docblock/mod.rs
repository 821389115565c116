//! PHPDoc comment extraction.
//!
//! This module turns a raw `/** … */` comment into a [`TagCollection`]:
//! the comment is split into ordered notations, each notation is built
//! into a typed [`Tag`] (resolving its type strings through the
//! [`TypeResolver`]), and the tags are grouped per normalized name.
//!
//! # Submodules
//!
//! - [`parser`]: notation extraction, continuation joining and
//!   summary/description separation.
//! - [`tags`]: the tag model (`@var`, `@param`, `@method`, `@throws`, …).
//! - [`collection`]: single / group / bag grouping of built tags.

pub mod collection;
pub mod parser;
pub mod tags;

use crate::error::TypeError;
use crate::names::NameResolutionContext;
use crate::types::TypeResolver;

// ─── Re-exports ─────────────────────────────────────────────────────────────

pub use collection::{NAMED, SINGLE, TagBag, TagCollection, TagEntry, TagGroup};
pub use parser::{RawNotation, parse};
pub use tags::{MethodTag, ParamSpec, StandardTag, SummaryTag, Tag, ThrowsTag};

/// What building tags needs besides the comment text.
#[derive(Debug, Clone, Copy)]
pub struct DocContext<'a> {
    pub resolver: &'a TypeResolver,
    pub names: &'a NameResolutionContext,
    /// Whether a `= null` default makes a `@method` parameter nullable.
    pub nullable_defaults: bool,
}

impl<'a> DocContext<'a> {
    pub fn new(resolver: &'a TypeResolver, names: &'a NameResolutionContext) -> Self {
        Self {
            resolver,
            names,
            nullable_defaults: true,
        }
    }

    pub fn with_nullable_defaults(mut self, enabled: bool) -> Self {
        self.nullable_defaults = enabled;
        self
    }
}

/// Parse `comment` and build its tag collection.
///
/// Malformed notations are dropped and unresolvable types leave the tag's
/// type unset.  The only error returned is a fatal
/// [`TypeError::EnumType`].
pub fn extract_tags(comment: &str, cx: &DocContext<'_>) -> Result<TagCollection, TypeError> {
    let mut collection =
        TagCollection::new().with_construct(cx.names.construct().map(str::to_string));
    for notation in parse(comment) {
        let tag = Tag::build(&notation.tag, &notation.value, cx)?;
        collection.append(tag);
    }
    Ok(collection)
}
