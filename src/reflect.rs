//! Declaration-level documentation access.
//!
//! A [`Reflector`] ties the pieces together: it builds (and caches) the
//! name-resolution context of a [`Declaration`], runs tag extraction over
//! its doc comment and wraps the result in a façade for the kind of
//! declaration ([`FunctionComment`], [`ClassComment`],
//! [`PropertyComment`]).

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::docblock::{DocContext, Tag, TagCollection, extract_tags};
use crate::error::{ConfigError, TagNotFound, TypeError};
use crate::names::{NameResolutionContext, ScopeCache, ScopeMetadata, ScopeProvider};
use crate::symbols::{ClassIndex, SymbolTable};
use crate::types::{Builtin, Type, TypeResolver};

/// What the reflector consumes per declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub doc_comment: Option<String>,
    /// Key of the declaring scope (class name, or file + function).
    pub scope_id: String,
    pub namespace: String,
    /// Raw text of the `use` statements in effect.
    pub imports_text: String,
    /// The type `self`, `static` and `$this` refer to.
    pub own_type: Option<String>,
    /// Identity reported in errors, e.g. `App\User::save()`.
    pub construct: Option<String>,
}

impl Declaration {
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            ..Self::default()
        }
    }

    pub fn with_doc_comment(mut self, comment: Option<&str>) -> Self {
        self.doc_comment = comment.map(str::to_string);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_imports(mut self, imports_text: impl Into<String>) -> Self {
        self.imports_text = imports_text.into();
        self
    }

    pub fn with_own_type(mut self, own_type: impl Into<String>) -> Self {
        self.own_type = Some(own_type.into());
        self
    }

    pub fn with_construct(mut self, construct: impl Into<String>) -> Self {
        self.construct = Some(construct.into());
        self
    }
}

pub struct Reflector {
    resolver: TypeResolver,
    scopes: ScopeCache,
    symbols: Arc<dyn SymbolTable + Send + Sync>,
    provider: Option<Arc<dyn ScopeProvider + Send + Sync>>,
    nullable_defaults: bool,
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("resolver", &self.resolver)
            .field("scopes", &self.scopes.len())
            .field("nullable_defaults", &self.nullable_defaults)
            .finish_non_exhaustive()
    }
}

impl Reflector {
    pub fn new(resolver: TypeResolver, symbols: Arc<dyn SymbolTable + Send + Sync>) -> Self {
        Self {
            resolver,
            scopes: ScopeCache::new(),
            symbols,
            provider: None,
            nullable_defaults: true,
        }
    }

    /// Build a reflector from configuration: extra aliases go to the
    /// resolver, known classes are merged into `index`.
    pub fn from_config(config: &Config, mut index: ClassIndex) -> Result<Self, ConfigError> {
        let aliases = crate::types::AliasTable::with_extras(&config.aliases)?;
        index.extend_known(&config.known_classes);
        let mut reflector = Self::new(TypeResolver::new().with_aliases(aliases), Arc::new(index));
        reflector.nullable_defaults = config.nullable_defaults;
        Ok(reflector)
    }

    /// Use `provider` for scope metadata instead of each declaration's
    /// own `imports_text`.
    pub fn with_provider(mut self, provider: Arc<dyn ScopeProvider + Send + Sync>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_nullable_defaults(mut self, enabled: bool) -> Self {
        self.nullable_defaults = enabled;
        self
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    pub fn scopes(&self) -> &ScopeCache {
        &self.scopes
    }

    /// The name-resolution context of a declaration.  Scope metadata is
    /// loaded once per scope id.
    pub fn context(&self, decl: &Declaration) -> NameResolutionContext {
        let scope = self.scopes.get_or_load(&decl.scope_id, || {
            self.provider
                .as_ref()
                .and_then(|provider| provider.scope_metadata(&decl.scope_id))
                .unwrap_or_else(|| ScopeMetadata::from_source(&decl.namespace, &decl.imports_text))
        });
        let mut ctx = NameResolutionContext::new(&decl.scope_id, scope, Arc::clone(&self.symbols));
        if let Some(own_type) = &decl.own_type {
            ctx = ctx.with_own_type(own_type);
        }
        if let Some(construct) = &decl.construct {
            ctx = ctx.with_construct(construct.clone());
        }
        ctx
    }

    /// Resolve a type string in the context of `decl`.
    pub fn resolve_type(&self, raw: &str, decl: &Declaration) -> Result<Type, TypeError> {
        self.resolver.resolve(raw, &self.context(decl))
    }

    /// Extract the tags of `decl`'s doc comment.  A missing comment gives
    /// an empty collection.
    pub fn comment(&self, decl: &Declaration) -> Result<DocComment, TypeError> {
        let ctx = self.context(decl);
        let cx = DocContext::new(&self.resolver, &ctx).with_nullable_defaults(self.nullable_defaults);
        let tags = match &decl.doc_comment {
            Some(text) => extract_tags(text, &cx)?,
            None => TagCollection::new().with_construct(decl.construct.clone()),
        };
        Ok(DocComment { tags })
    }

    pub fn function_comment(&self, decl: &Declaration) -> Result<FunctionComment, TypeError> {
        self.comment(decl).map(FunctionComment)
    }

    pub fn class_comment(&self, decl: &Declaration) -> Result<ClassComment, TypeError> {
        self.comment(decl).map(ClassComment)
    }

    pub fn property_comment(&self, decl: &Declaration) -> Result<PropertyComment, TypeError> {
        self.comment(decl).map(PropertyComment)
    }
}

// ─── Comment façades ────────────────────────────────────────────────────────

/// The extracted tags of one doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocComment {
    tags: TagCollection,
}

impl DocComment {
    pub fn tags(&self) -> &TagCollection {
        &self.tags
    }

    pub fn into_tags(self) -> TagCollection {
        self.tags
    }
}

/// Accessors shared by every comment façade.
pub trait Comment {
    fn tags(&self) -> &TagCollection;

    fn summary(&self) -> Option<&str> {
        self.tags().summary()
    }

    fn description(&self) -> Option<&str> {
        self.tags().description()
    }
}

impl Comment for DocComment {
    fn tags(&self) -> &TagCollection {
        &self.tags
    }
}

fn mixed() -> Type {
    Type::builtin(Builtin::Mixed)
}

/// Comment of a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FunctionComment(DocComment);

impl Comment for FunctionComment {
    fn tags(&self) -> &TagCollection {
        &self.0.tags
    }
}

impl FunctionComment {
    pub fn return_tag(&self) -> Option<&Tag> {
        self.tags().single("return")
    }

    /// The declared return type; `mixed` when absent or unresolvable.
    pub fn return_type(&self) -> Type {
        self.return_tag()
            .and_then(Tag::resolved_type)
            .cloned()
            .unwrap_or_else(mixed)
    }

    /// `@param` tags in declaration order.
    pub fn params(&self) -> Vec<&Tag> {
        self.tags()
            .bag("param")
            .map(|bag| bag.iter().collect())
            .unwrap_or_default()
    }

    pub fn param(&self, name: &str) -> Result<&Tag, TagNotFound> {
        self.tags().named("param", name)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.param(name).is_ok()
    }

    /// `@throws` tags in declaration order.
    pub fn throws(&self) -> Vec<&Tag> {
        self.tags()
            .group("throws")
            .map(|group| group.iter().collect())
            .unwrap_or_default()
    }

    /// Whether the function declares any `@throws`, or one whose type
    /// names `class` (compared case-insensitively, leading `\` ignored).
    pub fn is_throws(&self, class: Option<&str>) -> bool {
        let throws = self.throws();
        let Some(class) = class else {
            return !throws.is_empty();
        };
        let class = crate::util::strip_leading_backslash(class);
        throws.iter().any(|tag| {
            tag.resolved_type().is_some_and(|ty| {
                let names: Vec<&str> = match ty.members() {
                    Some(members) => members.iter().filter_map(Type::class_name).collect(),
                    None => ty.class_name().into_iter().collect(),
                };
                names.iter().any(|name| name.eq_ignore_ascii_case(class))
            })
        })
    }
}

/// Comment of a class, interface, trait or enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassComment(DocComment);

impl Comment for ClassComment {
    fn tags(&self) -> &TagCollection {
        &self.0.tags
    }
}

/// Tag names a virtual property may be declared with.
const PROPERTY_TAGS: &[&str] = &["property", "property-read", "property-write"];

impl ClassComment {
    /// The `@method` tag declaring `name`.
    pub fn method(&self, name: &str) -> Result<&Tag, TagNotFound> {
        self.tags().named("method", name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_ok()
    }

    /// The `@property`, `@property-read` or `@property-write` tag
    /// declaring `name`, tried in that order.
    pub fn property(&self, name: &str) -> Result<&Tag, TagNotFound> {
        PROPERTY_TAGS
            .iter()
            .find_map(|tag| self.tags().named(tag, name).ok())
            .ok_or_else(|| self.tags().not_found(&format!("property {}", name)))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_ok()
    }
}

/// Comment of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyComment(DocComment);

impl Comment for PropertyComment {
    fn tags(&self) -> &TagCollection {
        &self.0.tags
    }
}

impl PropertyComment {
    pub fn var_tag(&self) -> Option<&Tag> {
        self.tags().single("var")
    }

    /// The declared type; `mixed` when absent or unresolvable.
    pub fn var_type(&self) -> Type {
        self.var_tag()
            .and_then(Tag::resolved_type)
            .cloned()
            .unwrap_or_else(mixed)
    }
}
