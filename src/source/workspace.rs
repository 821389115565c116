//! A set of parsed PHP files.
//!
//! The workspace is the in-process stand-in for a class loader: it knows
//! every declaration of the files added to it, builds the
//! [`ClassIndex`] the resolver checks class existence against, and
//! provides scope metadata (namespace + imports) per declaration.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::SourceError;
use crate::names::{ScopeMetadata, ScopeProvider};
use crate::symbols::{ClassIndex, ClassKind};
use crate::util::{qualify, strip_leading_backslash};

use super::{ClassDecl, FunctionDecl, SourceFile, parse_source};

/// How deep trait-of-trait imports are followed.
const MAX_TRAIT_DEPTH: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    files: Vec<SourceFile>,
    /// Lowercased class name → (file index, class index).
    classes: HashMap<String, (usize, usize)>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `content` and add its declarations.  A class declared twice
    /// keeps its first declaration.
    pub fn add_source(
        &mut self,
        path: impl AsRef<Path>,
        content: &str,
    ) -> Result<&SourceFile, SourceError> {
        let file = parse_source(path.as_ref(), content)?;
        let file_idx = self.files.len();
        for (class_idx, class) in file.classes.iter().enumerate() {
            self.classes
                .entry(class.name.to_ascii_lowercase())
                .or_insert((file_idx, class_idx));
        }
        self.files.push(file);
        Ok(&self.files[file_idx])
    }

    /// Read and add a PHP file.
    pub fn add_file(&mut self, path: &Path) -> Result<&SourceFile, SourceError> {
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_source(path, &content)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Look up a class-like declaration by fully-qualified name.
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        let key = strip_leading_backslash(name).to_ascii_lowercase();
        let &(file_idx, class_idx) = self.classes.get(&key)?;
        self.files.get(file_idx)?.classes.get(class_idx)
    }

    /// A symbol table holding every class-like of the workspace.
    pub fn class_index(&self) -> ClassIndex {
        let mut index = ClassIndex::new();
        for file in &self.files {
            for class in &file.classes {
                if self.class(&class.name).is_some_and(|c| std::ptr::eq(c, class)) {
                    index.insert(class.symbol());
                }
            }
        }
        index
    }

    fn function_by_scope(&self, scope_id: &str) -> Option<&FunctionDecl> {
        self.files.iter().find_map(|file| {
            file.functions
                .iter()
                .find(|f| f.scope_id(&file.path) == scope_id)
        })
    }

    /// The scope of a class: its own imports, plus the imports of the
    /// files declaring its used traits.
    fn class_scope(&self, class: &ClassDecl, depth: usize) -> ScopeMetadata {
        let mut scope = ScopeMetadata::from_source(&class.namespace, &class.imports_text);
        if depth >= MAX_TRAIT_DEPTH {
            return scope;
        }
        for written in &class.traits {
            let fq = trait_name(&scope, written);
            match self.class(&fq) {
                Some(used) if used.kind == ClassKind::Trait => {
                    let trait_scope = self.class_scope(used, depth + 1);
                    scope.merge_imports(&trait_scope);
                }
                _ => tracing::trace!(class = %class.name, used = %fq, "used trait not in workspace"),
            }
        }
        scope
    }
}

/// Resolve a `use SomeTrait;` name the way PHP does for class references.
fn trait_name(scope: &ScopeMetadata, written: &str) -> String {
    if let Some(absolute) = written.strip_prefix('\\') {
        return absolute.to_string();
    }
    let (first, rest) = match written.split_once('\\') {
        Some((first, rest)) => (first, Some(rest)),
        None => (written, None),
    };
    match (scope.import(first), rest) {
        (Some(base), Some(rest)) => format!("{}\\{}", base, rest),
        (Some(base), None) => base.to_string(),
        (None, _) => qualify(&scope.namespace, written),
    }
}

impl ScopeProvider for Workspace {
    fn scope_metadata(&self, scope_id: &str) -> Option<ScopeMetadata> {
        if let Some(class) = self.class(scope_id) {
            return Some(self.class_scope(class, 0));
        }
        self.function_by_scope(scope_id)
            .map(|f| ScopeMetadata::from_source(&f.namespace, &f.imports_text))
    }
}
