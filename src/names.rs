//! Name resolution.
//!
//! A [`NameResolutionContext`] answers "which class does `User` mean
//! here?" for one declaring scope.  The scope's namespace and import
//! table live in a [`ScopeMetadata`] that is built once per scope and
//! shared through a [`ScopeCache`]; where the metadata comes from is
//! abstracted by [`ScopeProvider`].

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::AliasError;
use crate::symbols::SymbolTable;
use crate::util::{qualify, strip_leading_backslash};

// ─── Scope metadata ─────────────────────────────────────────────────────────

/// Namespace and imports of a declaring scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeMetadata {
    /// Enclosing namespace, empty for the global namespace.
    pub namespace: String,
    /// Imported alias → fully-qualified name, in declaration order.  Keys
    /// are lowercased since PHP class names are case-insensitive.
    imports: IndexMap<String, String>,
}

impl ScopeMetadata {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: strip_leading_backslash(&namespace.into()).to_string(),
            imports: IndexMap::new(),
        }
    }

    /// Build metadata from a namespace and the raw text of the scope's
    /// `use` statements.
    pub fn from_source(namespace: impl Into<String>, imports_text: &str) -> Self {
        let mut scope = Self::new(namespace);
        for (alias, fq) in crate::source::parse_imports(imports_text) {
            scope.add_import(&alias, &fq);
        }
        scope
    }

    pub fn with_import(mut self, alias: &str, fq: &str) -> Self {
        self.add_import(alias, fq);
        self
    }

    /// Register an import.  A later import of the same alias replaces the
    /// earlier one.
    pub fn add_import(&mut self, alias: &str, fq: &str) {
        self.imports.insert(
            alias.to_ascii_lowercase(),
            strip_leading_backslash(fq).to_string(),
        );
    }

    /// Merge imports declared elsewhere (e.g. in a used trait's file).
    /// Imports already present in this scope are kept.
    pub fn merge_imports(&mut self, other: &ScopeMetadata) {
        for (alias, fq) in &other.imports {
            self.imports
                .entry(alias.clone())
                .or_insert_with(|| fq.clone());
        }
    }

    /// The fully-qualified name imported under `alias`.
    pub fn import(&self, alias: &str) -> Option<&str> {
        self.imports
            .get(&alias.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports.iter().map(|(a, f)| (a.as_str(), f.as_str()))
    }
}

/// Source of scope metadata, keyed by scope id.
pub trait ScopeProvider {
    fn scope_metadata(&self, scope_id: &str) -> Option<ScopeMetadata>;
}

/// Write-once, read-many cache of scope metadata.
///
/// Keys are scope ids (the fully-qualified name of the declaring class, or
/// a file path for free functions).  Entries are never invalidated.
#[derive(Debug, Default)]
pub struct ScopeCache {
    scopes: RwLock<HashMap<String, Arc<ScopeMetadata>>>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope_id: &str) -> Option<Arc<ScopeMetadata>> {
        self.scopes.read().get(scope_id).cloned()
    }

    /// Return the cached metadata for `scope_id`, building it with `load`
    /// on first access.
    pub fn get_or_load<F>(&self, scope_id: &str, load: F) -> Arc<ScopeMetadata>
    where
        F: FnOnce() -> ScopeMetadata,
    {
        if let Some(scope) = self.get(scope_id) {
            return scope;
        }
        let built = Arc::new(load());
        let mut scopes = self.scopes.write();
        // Another caller may have won the race; keep the first entry.
        let entry = scopes
            .entry(scope_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(scope = scope_id, imports = built.imports.len(), "scope cached");
                built
            });
        Arc::clone(entry)
    }

    pub fn len(&self) -> usize {
        self.scopes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.read().is_empty()
    }
}

// ─── Context ────────────────────────────────────────────────────────────────

/// Everything needed to resolve names written inside one declaration.
#[derive(Clone)]
pub struct NameResolutionContext {
    scope_id: String,
    scope: Arc<ScopeMetadata>,
    own_type: Option<String>,
    construct: Option<String>,
    symbols: Arc<dyn SymbolTable + Send + Sync>,
}

impl std::fmt::Debug for NameResolutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameResolutionContext")
            .field("scope_id", &self.scope_id)
            .field("scope", &self.scope)
            .field("own_type", &self.own_type)
            .field("construct", &self.construct)
            .finish_non_exhaustive()
    }
}

impl NameResolutionContext {
    pub fn new(
        scope_id: impl Into<String>,
        scope: Arc<ScopeMetadata>,
        symbols: Arc<dyn SymbolTable + Send + Sync>,
    ) -> Self {
        Self {
            scope_id: scope_id.into(),
            scope,
            own_type: None,
            construct: None,
            symbols,
        }
    }

    /// Set the type `self`, `static` and `$this` refer to.
    pub fn with_own_type(mut self, own_type: impl AsRef<str>) -> Self {
        self.own_type = Some(strip_leading_backslash(own_type.as_ref()).to_string());
        self
    }

    /// Set the declaration identity reported in errors
    /// (e.g. `App\User::save()`).
    pub fn with_construct(mut self, construct: impl Into<String>) -> Self {
        self.construct = Some(construct.into());
        self
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub fn scope(&self) -> &ScopeMetadata {
        &self.scope
    }

    pub fn namespace(&self) -> &str {
        &self.scope.namespace
    }

    pub fn own_type(&self) -> Option<&str> {
        self.own_type.as_deref()
    }

    pub fn construct(&self) -> Option<&str> {
        self.construct.as_deref()
    }

    pub fn symbols(&self) -> &(dyn SymbolTable + Send + Sync) {
        self.symbols.as_ref()
    }

    /// Resolve a short or aliased class name to its fully-qualified form.
    ///
    /// Tried in order:
    /// 1. `namespace\alias`, if that class exists
    /// 2. the import table entry for `alias`
    /// 3. a qualified name that is, or extends, an import target
    /// 4. for a qualified alias `A\B`, the import of `A` followed by `\B`
    pub fn resolve(&self, alias: &str) -> Result<String, AliasError> {
        let alias = alias.trim();
        if let Some(absolute) = alias.strip_prefix('\\') {
            if let Some(canonical) = self.symbols.canonical(absolute) {
                return Ok(canonical.to_string());
            }
            return Err(self.alias_error(alias));
        }

        let candidate = qualify(self.namespace(), alias);
        if let Some(canonical) = self.symbols.canonical(&candidate) {
            return Ok(canonical.to_string());
        }

        if let Some(fq) = self.scope.import(alias) {
            return Ok(fq.to_string());
        }

        if alias.contains('\\')
            && let Some(fq) = self.imported_target(alias)
        {
            return Ok(fq);
        }

        if let Some((first, rest)) = alias.split_once('\\')
            && let Some(base) = self.scope.import(first)
        {
            return Ok(format!("{}\\{}", base, rest));
        }

        Err(self.alias_error(alias))
    }

    /// An already-qualified name reached through the import table, spelled
    /// the way the import spells it.
    fn imported_target(&self, name: &str) -> Option<String> {
        self.scope.imports().find_map(|(_, fq)| {
            let head = name.get(..fq.len())?;
            if !head.eq_ignore_ascii_case(fq) {
                return None;
            }
            let tail = &name[fq.len()..];
            (tail.is_empty() || tail.starts_with('\\')).then(|| format!("{}{}", fq, tail))
        })
    }

    /// [`resolve`](Self::resolve), discarding the error.
    pub fn try_resolve(&self, alias: &str) -> Option<String> {
        self.resolve(alias).ok()
    }

    fn alias_error(&self, alias: &str) -> AliasError {
        AliasError {
            alias: alias.to_string(),
            scope: self
                .construct
                .clone()
                .unwrap_or_else(|| self.scope_id.clone()),
        }
    }
}
