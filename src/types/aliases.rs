//! Pseudo-type aliases.
//!
//! PHPDoc tooling accepts many refinements of the builtin types
//! (`positive-int`, `non-empty-string`, `list`, …).  Those refinements are
//! collapsed onto the builtin they refine before dispatch, so `list<User>`
//! resolves exactly like `array<User>`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

/// Builtin alias patterns, in the order they are tried.  Patterns match
/// the whole base token, case-insensitively.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    (r"bool(ean)?|true|false", "bool"),
    (r"int(eger)?", "int"),
    (r"(positive|negative|non-positive|non-negative|non-zero)-int", "int"),
    (r"number|numeric|real|double", "float"),
    (r"array-key", "string"),
    (r"list", "array"),
    (r"non-empty-(array|list)", "array"),
    (r"(literal|non-falsy|truthy|non-empty|numeric|lowercase)-string", "string"),
    (r"(closed|open)-resource", "resource"),
    (r"pure-callable|callable-(array|string)", "callable"),
    (r"never-returns?|no-return|noreturn", "never"),
];

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i)^(?:{})$", pattern))
}

static BUILTIN_TABLE: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    BUILTIN_ALIASES
        .iter()
        .filter_map(|(pattern, target)| {
            compile(pattern)
                .ok()
                .map(|regex| (regex, (*target).to_string()))
        })
        .collect()
});

/// Ordered alias table: the builtin patterns followed by any configured
/// extras.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    extras: Vec<(Regex, String)>,
}

impl AliasTable {
    /// A table holding only the builtin aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with configured `pattern → target` aliases appended after
    /// the builtin ones.
    pub fn with_extras(extras: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let extras = extras
            .iter()
            .map(|(pattern, target)| {
                compile(pattern)
                    .map(|regex| (regex, target.clone()))
                    .map_err(|source| ConfigError::InvalidAlias {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { extras })
    }

    /// Look up the builtin a base token is an alias of.
    ///
    /// - `boolean` → `Some("bool")`
    /// - `non-empty-list` → `Some("array")`
    /// - `User` → `None`
    pub fn lookup(&self, base: &str) -> Option<&str> {
        BUILTIN_TABLE
            .iter()
            .chain(self.extras.iter())
            .find(|(regex, _)| regex.is_match(base))
            .map(|(_, target)| target.as_str())
    }

    /// Replace the base token of `s` (the part before a `<` or `{`) with
    /// its alias target.  Returns `s` unchanged when nothing matches.
    ///
    /// - `list<User>` → `array<User>`
    /// - `positive-int` → `int`
    pub fn apply(&self, s: &str) -> String {
        let split_at = s.find(['<', '{']).unwrap_or(s.len());
        let (base, rest) = s.split_at(split_at);
        match self.lookup(base.trim()) {
            Some(target) => {
                tracing::trace!(from = base, to = target, "alias applied");
                format!("{}{}", target, rest)
            }
            None => s.to_string(),
        }
    }
}
