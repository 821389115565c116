//! PHP source introspection.
//!
//! Parses PHP files with `mago_syntax` and extracts what the reflection
//! layer needs from them: class-like declarations (with their methods,
//! properties, used traits and enum cases), free functions, the doc
//! comment attached to each of them, and the namespace and `use`
//! statements in effect at each declaration.
//!
//! Sub-modules:
//! - [`use_statements`]: `use` statement → import table extraction
//! - [`workspace`]: a set of parsed files acting as symbol table and
//!   scope metadata provider

mod use_statements;
mod workspace;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::error::SourceError;
use crate::reflect::Declaration;
use crate::symbols::{CaseValue, ClassKind, ClassSymbol, EnumCase, EnumInfo};
use crate::types::Builtin;
use crate::util::qualify;

pub use workspace::Workspace;

/// A method or property of a class-like declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    /// Method name, or property name without the `$`.
    pub name: String,
    pub doc: Option<String>,
    pub is_static: bool,
}

/// A class, interface, trait or enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Fully-qualified name.
    pub name: String,
    pub kind: ClassKind,
    pub namespace: String,
    /// The `use` statements preceding the declaration in its namespace.
    pub imports_text: String,
    pub doc: Option<String>,
    /// Used traits, as written.
    pub traits: Vec<String>,
    pub methods: Vec<MemberDecl>,
    pub properties: Vec<MemberDecl>,
    /// Enum cases, or literal-valued constants of a class.
    pub enum_info: Option<EnumInfo>,
}

impl ClassDecl {
    /// The symbol-table entry for this declaration.
    pub fn symbol(&self) -> ClassSymbol {
        let symbol = ClassSymbol::new(&self.name, self.kind);
        match &self.enum_info {
            Some(info) => symbol.with_enum(info.clone()),
            None => symbol,
        }
    }

    fn base_declaration(&self, doc: Option<&str>, construct: String) -> Declaration {
        Declaration::new(&self.name)
            .with_doc_comment(doc)
            .with_namespace(&self.namespace)
            .with_imports(&self.imports_text)
            .with_own_type(&self.name)
            .with_construct(construct)
    }

    /// The class comment's declaration.  The scope id is the class name.
    pub fn declaration(&self) -> Declaration {
        self.base_declaration(self.doc.as_deref(), self.name.clone())
    }

    pub fn method_declaration(&self, method: &MemberDecl) -> Declaration {
        self.base_declaration(
            method.doc.as_deref(),
            format!("{}::{}()", self.name, method.name),
        )
    }

    pub fn property_declaration(&self, property: &MemberDecl) -> Declaration {
        self.base_declaration(
            property.doc.as_deref(),
            format!("{}::${}", self.name, property.name),
        )
    }

    pub fn method(&self, name: &str) -> Option<&MemberDecl> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn property(&self, name: &str) -> Option<&MemberDecl> {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A free function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Fully-qualified name.
    pub name: String,
    pub namespace: String,
    pub imports_text: String,
    pub doc: Option<String>,
}

impl FunctionDecl {
    /// Free functions have no class to key their scope on; the scope id is
    /// `<file>#<function>`.
    pub fn scope_id(&self, path: &Path) -> String {
        format!("{}#{}", path.display(), self.name)
    }

    pub fn declaration(&self, path: &Path) -> Declaration {
        Declaration::new(self.scope_id(path))
            .with_doc_comment(self.doc.as_deref())
            .with_namespace(&self.namespace)
            .with_imports(&self.imports_text)
            .with_construct(format!("{}()", self.name))
    }
}

/// The declarations of one parsed PHP file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
}

impl SourceFile {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        let name = crate::util::strip_leading_backslash(name);
        self.classes
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        let name = crate::util::strip_leading_backslash(name);
        self.functions
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Parse PHP source text into its declarations.
///
/// The parser recovers from syntax errors on its own; a panic inside it is
/// caught and reported as [`SourceError::ParserPanicked`].
pub fn parse_source(path: impl Into<PathBuf>, content: &str) -> Result<SourceFile, SourceError> {
    let path = path.into();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let arena = bumpalo::Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = mago_syntax::parser::parse_file_content(&arena, file_id, content);

        let mut collector = Collector {
            content,
            trivia: program.trivia.as_slice(),
            classes: Vec::new(),
            functions: Vec::new(),
        };
        let mut uses = Vec::new();
        collector.walk(program.statements.iter(), "", &mut uses);
        (collector.classes, collector.functions)
    }));

    match result {
        Ok((classes, functions)) => {
            tracing::debug!(
                path = %path.display(),
                classes = classes.len(),
                functions = functions.len(),
                "source parsed"
            );
            Ok(SourceFile {
                path,
                classes,
                functions,
            })
        }
        Err(_) => {
            tracing::error!(path = %path.display(), "parser panicked");
            Err(SourceError::ParserPanicked {
                name: path.display().to_string(),
            })
        }
    }
}

/// Parse the text of a scope's `use` statements into an import table
/// (alias → fully-qualified name).
pub fn parse_imports(text: &str) -> IndexMap<String, String> {
    if text.trim().is_empty() {
        return IndexMap::new();
    }
    let content = format!("<?php\n{}\n", text);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let arena = bumpalo::Bump::new();
        let file_id = mago_database::file::FileId::new("imports.php");
        let program = mago_syntax::parser::parse_file_content(&arena, file_id, &content);
        let mut imports = IndexMap::new();
        use_statements::collect_imports(program.statements.iter(), &mut imports);
        imports
    }));
    result.unwrap_or_else(|_| {
        tracing::warn!("parser panicked on import statements");
        IndexMap::new()
    })
}

// ─── AST walk ───────────────────────────────────────────────────────────────

struct Collector<'a> {
    content: &'a str,
    trivia: &'a [Trivia<'a>],
    classes: Vec<ClassDecl>,
    functions: Vec<FunctionDecl>,
}

impl<'a> Collector<'a> {
    fn text(&self, node: &impl HasSpan) -> &'a str {
        let span = node.span();
        self.content
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }

    /// The `/** */` comment above `node`.  Only whitespace and plain
    /// comments may sit between the two.
    fn doc(&self, node: &impl HasSpan) -> Option<String> {
        let start = node.span().start.offset;
        let above = &self.trivia[..self.trivia.partition_point(|t| t.span.start.offset < start)];
        let mut boundary = start as usize;
        for trivia in above.iter().rev() {
            let gap = self
                .content
                .get(trivia.span.end.offset as usize..boundary)
                .unwrap_or_default();
            if !gap.trim().is_empty() {
                return None;
            }
            if let TriviaKind::DocBlockComment = trivia.kind {
                return Some(trivia.value.to_string());
            }
            boundary = trivia.span.start.offset as usize;
        }
        None
    }

    /// Walk one statement list.  `uses` holds the `use` statements seen so
    /// far in the current namespace.
    fn walk(
        &mut self,
        statements: impl Iterator<Item = &'a Statement<'a>>,
        namespace: &str,
        uses: &mut Vec<&'a str>,
    ) {
        for statement in statements {
            match statement {
                Statement::Namespace(ns) => {
                    let name = ns
                        .name
                        .as_ref()
                        .map(|ident| ident.value().to_string())
                        .unwrap_or_default();
                    let mut ns_uses = Vec::new();
                    self.walk(ns.statements().iter(), &name, &mut ns_uses);
                }
                Statement::Block(block) => {
                    self.walk(block.statements.iter(), namespace, uses);
                }
                Statement::Use(use_stmt) => uses.push(self.text(use_stmt)),
                Statement::Class(class) => {
                    let decl = self.class_like(
                        class.name.value,
                        ClassKind::Class,
                        class.members.iter(),
                        None,
                        namespace,
                        uses,
                        class,
                    );
                    self.classes.push(decl);
                }
                Statement::Interface(iface) => {
                    let decl = self.class_like(
                        iface.name.value,
                        ClassKind::Interface,
                        iface.members.iter(),
                        None,
                        namespace,
                        uses,
                        iface,
                    );
                    self.classes.push(decl);
                }
                Statement::Trait(trait_def) => {
                    let decl = self.class_like(
                        trait_def.name.value,
                        ClassKind::Trait,
                        trait_def.members.iter(),
                        None,
                        namespace,
                        uses,
                        trait_def,
                    );
                    self.classes.push(decl);
                }
                Statement::Enum(enum_def) => {
                    let backing = enum_def
                        .backing_type_hint
                        .as_ref()
                        .and_then(|hint| {
                            let text = self.text(hint).trim_start_matches(':').trim();
                            Builtin::from_name(text)
                        });
                    let decl = self.class_like(
                        enum_def.name.value,
                        ClassKind::Enum,
                        enum_def.members.iter(),
                        Some(backing),
                        namespace,
                        uses,
                        enum_def,
                    );
                    self.classes.push(decl);
                }
                Statement::Function(func) => {
                    self.functions.push(FunctionDecl {
                        name: qualify(namespace, func.name.value),
                        namespace: namespace.to_string(),
                        imports_text: uses.join("\n"),
                        doc: self.doc(func),
                    });
                }
                _ => {}
            }
        }
    }

    /// Build a class-like declaration.  `enum_backing` is `Some` for
    /// enums (holding the declared backing type, if any).
    #[allow(clippy::too_many_arguments)]
    fn class_like(
        &self,
        short: &str,
        kind: ClassKind,
        members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
        enum_backing: Option<Option<Builtin>>,
        namespace: &str,
        uses: &[&'a str],
        node: &impl HasSpan,
    ) -> ClassDecl {
        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut traits = Vec::new();
        let mut constants = Vec::new();
        let mut cases = Vec::new();

        for member in members {
            match member {
                ClassLikeMember::Method(method) => methods.push(MemberDecl {
                    name: method.name.value.to_string(),
                    doc: self.doc(member),
                    is_static: method.modifiers.iter().any(|m| m.is_static()),
                }),
                ClassLikeMember::Property(property) => {
                    let is_static = property.modifiers().iter().any(|m| m.is_static());
                    let doc = self.doc(member);
                    for var in property.variables().iter() {
                        let raw_name = var.name.to_string();
                        properties.push(MemberDecl {
                            name: raw_name.trim_start_matches('$').to_string(),
                            doc: doc.clone(),
                            is_static,
                        });
                    }
                }
                ClassLikeMember::Constant(constant) => {
                    for item in constant.items.iter() {
                        constants.push(EnumCase {
                            name: item.name.value.to_string(),
                            value: assigned_value(self.text(item)),
                        });
                    }
                }
                ClassLikeMember::EnumCase(enum_case) => {
                    cases.push(EnumCase {
                        name: enum_case.item.name().value.to_string(),
                        value: assigned_value(self.text(enum_case)),
                    });
                }
                ClassLikeMember::TraitUse(trait_use) => {
                    for name in trait_use.trait_names.iter() {
                        traits.push(name.value().to_string());
                    }
                }
            }
        }

        // Classes whose constants have literal values act as pseudo-enums.
        let enum_info = match enum_backing {
            Some(backing) => Some(EnumInfo { backing, cases }),
            None if kind == ClassKind::Class && constants.iter().any(|c| c.value.is_some()) => {
                Some(EnumInfo {
                    backing: None,
                    cases: constants,
                })
            }
            None => None,
        };

        ClassDecl {
            name: qualify(namespace, short),
            kind,
            namespace: namespace.to_string(),
            imports_text: uses.join("\n"),
            doc: self.doc(node),
            traits,
            methods,
            properties,
            enum_info,
        }
    }
}

/// The literal after `=` in `case X = 'x';` or `X = 1`.
fn assigned_value(text: &str) -> Option<CaseValue> {
    let (_, value) = text.split_once('=')?;
    CaseValue::from_literal(value.trim().trim_end_matches(';'))
}
