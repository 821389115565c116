//! Class-like symbol lookup.
//!
//! The resolver never walks source code itself.  Whether a name refers to
//! an existing class, interface, trait or enum (and, for enums, which
//! backing type and case values they have) is answered by a
//! [`SymbolTable`].  [`ClassIndex`] is the in-memory implementation that
//! the [`source`](crate::source) module populates from parsed PHP files
//! and that tests populate by hand.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::types::Builtin;
use crate::util::strip_leading_backslash;

/// The kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
            ClassKind::Enum => "enum",
        })
    }
}

/// A literal case value (or a class constant value for pseudo-enums).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CaseValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl CaseValue {
    /// Parse a PHP literal as written in source (`'H'`, `"x"`, `42`,
    /// `-1.5`, `true`).  Anything else is not a literal case value.
    pub fn from_literal(text: &str) -> Option<CaseValue> {
        let text = text.trim();
        if text.len() >= 2
            && ((text.starts_with('\'') && text.ends_with('\''))
                || (text.starts_with('"') && text.ends_with('"')))
        {
            return Some(CaseValue::String(text[1..text.len() - 1].to_string()));
        }
        if text.eq_ignore_ascii_case("true") {
            return Some(CaseValue::Bool(true));
        }
        if text.eq_ignore_ascii_case("false") {
            return Some(CaseValue::Bool(false));
        }
        if !text.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
            return None;
        }
        let digits = text.replace('_', "");
        if let Ok(int) = digits.parse::<i64>() {
            return Some(CaseValue::Int(int));
        }
        if let Ok(float) = digits.parse::<f64>() {
            return Some(CaseValue::Float(float));
        }
        None
    }

    /// The scalar builtin this value is an instance of.
    pub fn builtin(&self) -> Builtin {
        match self {
            CaseValue::Int(_) => Builtin::Int,
            CaseValue::Float(_) => Builtin::Float,
            CaseValue::String(_) => Builtin::String,
            CaseValue::Bool(_) => Builtin::Bool,
        }
    }
}

/// One case of an enumeration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumCase {
    pub name: String,
    pub value: Option<CaseValue>,
}

/// What the enum shape grammars need to know about an enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumInfo {
    /// Declared backing type (`enum Suit: string`), if any.
    pub backing: Option<Builtin>,
    pub cases: Vec<EnumCase>,
}

/// A class-like symbol known to the symbol table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSymbol {
    /// Fully-qualified name without a leading `\`.
    pub name: String,
    pub kind: ClassKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_info: Option<EnumInfo>,
}

impl ClassSymbol {
    pub fn new(name: impl AsRef<str>, kind: ClassKind) -> Self {
        Self {
            name: strip_leading_backslash(name.as_ref()).to_string(),
            kind,
            enum_info: None,
        }
    }

    /// Attach enumeration metadata.  Also used for classes whose constants
    /// act as a pseudo-enum.
    pub fn with_enum(mut self, info: EnumInfo) -> Self {
        self.enum_info = Some(info);
        self
    }
}

/// Class-like existence and metadata lookup.
///
/// Lookups are case-insensitive (as in PHP) and tolerate a leading `\`.
pub trait SymbolTable {
    /// Look up a class, interface, trait or enum by fully-qualified name.
    fn class_like(&self, name: &str) -> Option<&ClassSymbol>;

    /// Whether a class-like with this fully-qualified name exists.
    fn exists(&self, name: &str) -> bool {
        self.class_like(name).is_some()
    }

    /// The canonical spelling of a class-like name.
    fn canonical(&self, name: &str) -> Option<&str> {
        self.class_like(name).map(|symbol| symbol.name.as_str())
    }

    /// Enumeration metadata for `name`, if it is an enum (or pseudo-enum).
    fn enum_info(&self, name: &str) -> Option<&EnumInfo> {
        self.class_like(name).and_then(|symbol| symbol.enum_info.as_ref())
    }
}

/// In-memory [`SymbolTable`] keyed by lowercased fully-qualified name.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    symbols: HashMap<String, ClassSymbol>,
}

fn index_key(name: &str) -> String {
    strip_leading_backslash(name).to_ascii_lowercase()
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a symbol.
    pub fn insert(&mut self, symbol: ClassSymbol) {
        self.symbols.insert(index_key(&symbol.name), symbol);
    }

    /// Register plain class names that should be treated as existing.
    /// Names already present keep their richer metadata.
    pub fn extend_known<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let key = index_key(name.as_ref());
            if key.is_empty() {
                continue;
            }
            self.symbols
                .entry(key)
                .or_insert_with(|| ClassSymbol::new(name.as_ref(), ClassKind::Class));
        }
    }

    /// Merge another index into this one; entries of `other` win.
    pub fn merge(&mut self, other: ClassIndex) {
        self.symbols.extend(other.symbols);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.symbols.values()
    }
}

impl SymbolTable for ClassIndex {
    fn class_like(&self, name: &str) -> Option<&ClassSymbol> {
        self.symbols.get(&index_key(name))
    }
}

impl<S: SymbolTable + ?Sized> SymbolTable for std::sync::Arc<S> {
    fn class_like(&self, name: &str) -> Option<&ClassSymbol> {
        (**self).class_like(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_leading_backslash() {
        let mut index = ClassIndex::new();
        index.insert(ClassSymbol::new("\\App\\Models\\User", ClassKind::Class));
        assert!(index.exists("app\\models\\user"));
        assert!(index.exists("\\App\\Models\\User"));
        assert_eq!(index.canonical("APP\\MODELS\\USER"), Some("App\\Models\\User"));
        assert!(!index.exists("App\\Models"));
    }

    #[test]
    fn known_names_do_not_override_metadata() {
        let mut index = ClassIndex::new();
        index.insert(
            ClassSymbol::new("Suit", ClassKind::Enum).with_enum(EnumInfo {
                backing: Some(Builtin::String),
                cases: vec![],
            }),
        );
        index.extend_known(["Suit", "Exception", ""]);
        assert_eq!(index.len(), 2);
        assert!(index.enum_info("suit").is_some());
    }

    #[test]
    fn literals_parse_into_case_values() {
        assert_eq!(CaseValue::from_literal("'H'"), Some(CaseValue::String("H".into())));
        assert_eq!(CaseValue::from_literal("1_000"), Some(CaseValue::Int(1000)));
        assert_eq!(CaseValue::from_literal("-2"), Some(CaseValue::Int(-2)));
        assert_eq!(CaseValue::from_literal("1.5"), Some(CaseValue::Float(1.5)));
        assert_eq!(CaseValue::from_literal("TRUE"), Some(CaseValue::Bool(true)));
        assert_eq!(CaseValue::from_literal("self::A"), None);
    }
}
