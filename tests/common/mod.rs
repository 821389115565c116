#![allow(dead_code)]

use std::sync::Arc;

use phpdoc_reflect::docblock::{DocContext, TagCollection, extract_tags};
use phpdoc_reflect::names::{NameResolutionContext, ScopeMetadata};
use phpdoc_reflect::symbols::{CaseValue, ClassIndex, ClassKind, ClassSymbol, EnumCase, EnumInfo};
use phpdoc_reflect::types::{Builtin, Type, TypeResolver};
use phpdoc_reflect::TypeError;

/// Scope id (and declaring type) of the default test context.
pub const SCOPE: &str = "App\\Http\\Controller";

fn case(name: &str, value: Option<CaseValue>) -> EnumCase {
    EnumCase {
        name: name.to_string(),
        value,
    }
}

/// The class-likes every test can refer to.
///
/// - `App\Http\Controller`, `App\Models\User`, `App\Models\Post`
///   (classes)
/// - `App\Contracts\Repository` (interface), `App\Concerns\HasName` (trait)
/// - `App\Enums\Suit` (string-backed), `App\Enums\Status` (int-backed),
///   `App\Enums\Direction` (pure)
/// - `App\Support\Levels` (int constants), `App\Support\Flags` (mixed
///   constants)
/// - `Exception`, `InvalidArgumentException`
pub fn symbols() -> ClassIndex {
    let mut index = ClassIndex::new();
    index.insert(ClassSymbol::new(SCOPE, ClassKind::Class));
    index.insert(ClassSymbol::new("App\\Models\\User", ClassKind::Class));
    index.insert(ClassSymbol::new("App\\Models\\Post", ClassKind::Class));
    index.insert(ClassSymbol::new(
        "App\\Contracts\\Repository",
        ClassKind::Interface,
    ));
    index.insert(ClassSymbol::new("App\\Concerns\\HasName", ClassKind::Trait));
    index.insert(
        ClassSymbol::new("App\\Enums\\Suit", ClassKind::Enum).with_enum(EnumInfo {
            backing: Some(Builtin::String),
            cases: vec![
                case("Hearts", Some(CaseValue::String("H".into()))),
                case("Spades", Some(CaseValue::String("S".into()))),
            ],
        }),
    );
    index.insert(
        ClassSymbol::new("App\\Enums\\Status", ClassKind::Enum).with_enum(EnumInfo {
            backing: Some(Builtin::Int),
            cases: vec![
                case("Active", Some(CaseValue::Int(1))),
                case("Inactive", Some(CaseValue::Int(0))),
            ],
        }),
    );
    index.insert(
        ClassSymbol::new("App\\Enums\\Direction", ClassKind::Enum).with_enum(EnumInfo {
            backing: None,
            cases: vec![case("Up", None), case("Down", None)],
        }),
    );
    index.insert(
        ClassSymbol::new("App\\Support\\Levels", ClassKind::Class).with_enum(EnumInfo {
            backing: None,
            cases: vec![
                case("LOW", Some(CaseValue::Int(1))),
                case("HIGH", Some(CaseValue::Int(3))),
            ],
        }),
    );
    index.insert(
        ClassSymbol::new("App\\Support\\Flags", ClassKind::Class).with_enum(EnumInfo {
            backing: None,
            cases: vec![
                case("A", Some(CaseValue::Int(1))),
                case("B", Some(CaseValue::String("b".into()))),
            ],
        }),
    );
    index.extend_known(["Exception", "InvalidArgumentException"]);
    index
}

/// Namespace `App\Http`, importing `User`, `Repository as Repo`, the
/// `App\Enums` namespace as `Enums` and `Vendor\Lib\Client`, which is not
/// in the symbol table.
pub fn scope() -> ScopeMetadata {
    ScopeMetadata::new("App\\Http")
        .with_import("User", "App\\Models\\User")
        .with_import("Repo", "App\\Contracts\\Repository")
        .with_import("Enums", "App\\Enums")
        .with_import("Client", "Vendor\\Lib\\Client")
}

/// The default context: declared inside `App\Http\Controller`.
pub fn context() -> NameResolutionContext {
    NameResolutionContext::new(SCOPE, Arc::new(scope()), Arc::new(symbols()))
        .with_own_type(SCOPE)
        .with_construct(SCOPE)
}

/// A context in `namespace` with no imports and no declaring type.
pub fn bare_context(namespace: &str) -> NameResolutionContext {
    NameResolutionContext::new(
        format!("{}\\Scope", namespace),
        Arc::new(ScopeMetadata::new(namespace)),
        Arc::new(symbols()),
    )
}

pub fn resolve(raw: &str) -> Result<Type, TypeError> {
    TypeResolver::new().resolve(raw, &context())
}

pub fn tags(comment: &str) -> TagCollection {
    try_tags(comment).expect("comment should not contain a fatal type error")
}

pub fn try_tags(comment: &str) -> Result<TagCollection, TypeError> {
    let resolver = TypeResolver::new();
    let names = context();
    extract_tags(comment, &DocContext::new(&resolver, &names))
}

pub fn int() -> Type {
    Type::builtin(Builtin::Int)
}

pub fn string() -> Type {
    Type::builtin(Builtin::String)
}

pub fn class(name: &str) -> Type {
    Type::class(name)
}
