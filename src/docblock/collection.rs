//! Tag collection.
//!
//! Tags are grouped under their normalized name (`property-read` →
//! `propertyRead`).  Each name holds one of three shapes:
//!
//! - single: `var`, `return`, `summary`, `description`, `default`, `api`,
//!   `ignore`, `internal`, `required`; the first occurrence is kept
//! - bag: `method`, `param`, `property`, `property-read`,
//!   `property-write`; keyed by the method or variable name, a later tag
//!   with the same name replaces the earlier one
//! - group: every other tag, in source order
//!
//! The collection is append-only.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::tags::{ParamSpec, Tag};
use crate::error::TagNotFound;
use crate::types::Type;
use crate::util::normalize_tag_name;

/// Tag names that collapse to a single tag.
pub const SINGLE: &[&str] = &[
    "api",
    "default",
    "description",
    "ignore",
    "internal",
    "required",
    "return",
    "summary",
    "var",
];

/// Tag names whose tags are keyed by name.
pub const NAMED: &[&str] = &[
    "method",
    "param",
    "property",
    "property-read",
    "property-write",
];

/// Ordered tags sharing one name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagGroup(Vec<Tag>);

impl TagGroup {
    pub fn first(&self) -> Option<&Tag> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a TagGroup {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Tags keyed by method or variable name.  Tags without a name (degraded
/// tags) are kept separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagBag {
    named: IndexMap<String, Tag>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unnamed: Vec<Tag>,
}

impl TagBag {
    fn insert(&mut self, tag: Tag) {
        match tag.name().map(str::to_string) {
            Some(key) => {
                if self.named.insert(key.clone(), tag).is_some() {
                    tracing::debug!(name = %key, "duplicate named tag replaced");
                }
            }
            None => self.unnamed.push(tag),
        }
    }

    /// Look up a tag by name.  A leading `$` is ignored, so `$id` and `id`
    /// find the same `@param`.
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.named.get(name.strip_prefix('$').unwrap_or(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    /// Tags that carried no name.
    pub fn unnamed(&self) -> &[Tag] {
        &self.unnamed
    }

    /// Named tags in insertion order, followed by unnamed ones.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.named.values().chain(self.unnamed.iter())
    }

    /// Number of named tags.
    pub fn len(&self) -> usize {
        self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.unnamed.is_empty()
    }
}

/// What a tag name maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagEntry {
    Single(Tag),
    Group(TagGroup),
    Bag(TagBag),
}

impl TagEntry {
    pub fn as_single(&self) -> Option<&Tag> {
        match self {
            TagEntry::Single(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&TagGroup> {
        match self {
            TagEntry::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_bag(&self) -> Option<&TagBag> {
        match self {
            TagEntry::Bag(bag) => Some(bag),
            _ => None,
        }
    }

    /// All tags of this entry.
    pub fn tags(&self) -> Vec<&Tag> {
        match self {
            TagEntry::Single(tag) => vec![tag],
            TagEntry::Group(group) => group.iter().collect(),
            TagEntry::Bag(bag) => bag.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TagEntry::Single(_) => 1,
            TagEntry::Group(group) => group.len(),
            TagEntry::Bag(bag) => bag.len() + bag.unnamed.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All tags of one documentation comment, grouped by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagCollection {
    entries: IndexMap<String, TagEntry>,
    #[serde(skip)]
    construct: Option<String>,
}

impl TagCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the declaration identity reported by [`TagNotFound`].
    pub fn with_construct(mut self, construct: Option<String>) -> Self {
        self.construct = construct;
        self
    }

    pub fn construct(&self) -> Option<&str> {
        self.construct.as_deref()
    }

    /// Add a tag under its normalized name.
    pub fn append(&mut self, tag: Tag) {
        let raw_name = tag.tag().to_ascii_lowercase();
        let key = normalize_tag_name(&raw_name);

        if SINGLE.contains(&raw_name.as_str()) {
            if self.entries.contains_key(&key) {
                tracing::debug!(tag = %raw_name, "repeated single tag ignored");
            } else {
                self.entries.insert(key, TagEntry::Single(tag));
            }
            return;
        }

        if NAMED.contains(&raw_name.as_str()) {
            let entry = self
                .entries
                .entry(key)
                .or_insert_with(|| TagEntry::Bag(TagBag::default()));
            if let TagEntry::Bag(bag) = entry {
                bag.insert(tag);
            }
            return;
        }

        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| TagEntry::Group(TagGroup::default()));
        if let TagEntry::Group(group) = entry {
            group.0.push(tag);
        }
    }

    /// Look up the entry for a tag name.  Both the written form
    /// (`property-read`) and the normalized form (`propertyRead`) work.
    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        let name = name.strip_prefix('@').unwrap_or(name);
        self.entries.get(&normalize_tag_name(name))
    }

    /// Like [`get`](Self::get), failing with [`TagNotFound`].
    pub fn require(&self, name: &str) -> Result<&TagEntry, TagNotFound> {
        self.get(name).ok_or_else(|| self.not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The tag stored under a single-tag name, or the first tag of a
    /// group.
    pub fn single(&self, name: &str) -> Option<&Tag> {
        match self.get(name)? {
            TagEntry::Single(tag) => Some(tag),
            TagEntry::Group(group) => group.first(),
            TagEntry::Bag(_) => None,
        }
    }

    pub fn group(&self, name: &str) -> Option<&TagGroup> {
        self.get(name).and_then(TagEntry::as_group)
    }

    pub fn bag(&self, name: &str) -> Option<&TagBag> {
        self.get(name).and_then(TagEntry::as_bag)
    }

    /// Look up a named tag (`@param $id`, `@method find`) in a bag.
    pub fn named(&self, tag: &str, name: &str) -> Result<&Tag, TagNotFound> {
        self.bag(tag)
            .and_then(|bag| bag.get(name))
            .ok_or_else(|| self.not_found(&format!("{} {}", tag, name)))
    }

    pub fn summary(&self) -> Option<&str> {
        self.single("summary").and_then(Tag::description)
    }

    pub fn description(&self) -> Option<&str> {
        self.single("description").and_then(Tag::description)
    }

    /// Normalized names and their entries, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct tag names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn not_found(&self, tag: &str) -> TagNotFound {
        let err = TagNotFound::new(tag);
        match &self.construct {
            Some(construct) => err.in_construct(construct.clone()),
            None => err,
        }
    }
}

/// One line per tag: `@name [type] [name][: description]`, with `@method`
/// tags rendered as their signature.  A type that failed to resolve is
/// shown as written, in parentheses.
impl fmt::Display for TagCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entry) in self.iter() {
            for tag in entry.tags() {
                write!(f, "@{}", name)?;
                if let Some(method) = tag.as_method()
                    && method.is_static()
                {
                    f.write_str(" static")?;
                }
                write_type(f, tag.resolved_type(), tag.raw_type())?;
                match (tag.as_method(), tag.name()) {
                    (Some(method), Some(method_name)) => {
                        write!(f, " {}(", method_name)?;
                        for (i, param) in method.params().values().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write_param(f, param)?;
                        }
                        f.write_str(")")?;
                    }
                    (None, Some(var)) => write!(f, " ${}", var)?,
                    _ => {}
                }
                if let Some(description) = tag.description() {
                    write!(f, ": {}", description)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

fn write_type(f: &mut fmt::Formatter<'_>, ty: Option<&Type>, raw: Option<&str>) -> fmt::Result {
    match (ty, raw) {
        (Some(ty), _) => write!(f, " {}", ty),
        (None, Some(raw)) => write!(f, " ({})", raw),
        (None, None) => Ok(()),
    }
}

fn write_param(f: &mut fmt::Formatter<'_>, param: &ParamSpec) -> fmt::Result {
    match (param.resolved_type(), param.raw_type()) {
        (Some(ty), _) => write!(f, "{} ", ty)?,
        (None, Some(raw)) => write!(f, "({}) ", raw)?,
        (None, None) => {}
    }
    if param.is_by_ref() {
        f.write_str("&")?;
    }
    if param.is_variadic() {
        f.write_str("...")?;
    }
    write!(f, "${}", param.name())?;
    if let Some(default) = param.default() {
        write!(f, " = {}", default)?;
    }
    Ok(())
}
