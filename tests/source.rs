//! Declarations, doc comments and scopes read from PHP source.

use std::fs;

use phpdoc_reflect::source::{Workspace, parse_imports, parse_source};
use phpdoc_reflect::symbols::{CaseValue, EnumCase};
use phpdoc_reflect::{ClassKind, ScopeProvider, SourceError, SymbolTable};
use phpdoc_reflect::types::Builtin;
use pretty_assertions::assert_eq;

const MODELS: &str = r#"<?php
namespace App\Models;

use App\Contracts\Repository;
use App\Concerns\HasName;

/**
 * A registered user.
 *
 * @property-read int $id
 * @method static User create(array $attributes)
 */
final class User implements Repository
{
    use HasName;

    public const ACTIVE = 1;
    public const BANNED = 2;

    /** @var string */
    public $email;

    /** @var int[] */
    public static $ids = [], $other;

    /**
     * @param int $id
     * @return static|null
     */
    public static function find(int $id) {}

    public function save(): void {}
}

/** Things with an owner. */
interface Owned
{
    /** @return User */
    public function owner();
}

enum Suit: string
{
    case Hearts = 'H';
    case Spades = 'S';
}

enum Direction
{
    case Up;
    case Down;
}

/**
 * Format a user.
 *
 * @param User $user
 */
function format_user($user) {}
"#;

#[test]
fn class_likes_are_collected_with_their_kind() {
    let file = parse_source("models.php", MODELS).unwrap();
    let kinds: Vec<(&str, ClassKind)> = file
        .classes
        .iter()
        .map(|c| (c.name.as_str(), c.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("App\\Models\\User", ClassKind::Class),
            ("App\\Models\\Owned", ClassKind::Interface),
            ("App\\Models\\Suit", ClassKind::Enum),
            ("App\\Models\\Direction", ClassKind::Enum),
        ]
    );
    assert_eq!(file.path.to_str(), Some("models.php"));
}

#[test]
fn class_members_and_docs() {
    let file = parse_source("models.php", MODELS).unwrap();
    let user = file.class("\\app\\models\\user").unwrap();

    assert!(user.doc.as_deref().is_some_and(|d| d.contains("@property-read int $id")));
    assert_eq!(user.namespace, "App\\Models");
    assert_eq!(user.traits, vec!["HasName"]);

    let methods: Vec<&str> = user.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["find", "save"]);
    let find = user.method("FIND").unwrap();
    assert!(find.is_static);
    assert!(find.doc.as_deref().is_some_and(|d| d.contains("@return static|null")));
    assert_eq!(user.method("save").and_then(|m| m.doc.as_deref()), None);

    let properties: Vec<(&str, bool)> = user
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.is_static))
        .collect();
    assert_eq!(properties, vec![("email", false), ("ids", true), ("other", true)]);
    assert_eq!(
        user.property("$ids").and_then(|p| p.doc.as_deref()),
        Some("/** @var int[] */")
    );
}

#[test]
fn literal_constants_make_a_pseudo_enum() {
    let file = parse_source("models.php", MODELS).unwrap();
    let info = file.class("App\\Models\\User").and_then(|c| c.enum_info.clone()).unwrap();
    assert_eq!(info.backing, None);
    assert_eq!(
        info.cases,
        vec![
            EnumCase {
                name: "ACTIVE".into(),
                value: Some(CaseValue::Int(1)),
            },
            EnumCase {
                name: "BANNED".into(),
                value: Some(CaseValue::Int(2)),
            },
        ]
    );
    assert!(file.class("App\\Models\\Owned").unwrap().enum_info.is_none());
}

#[test]
fn enums_keep_backing_and_cases() {
    let file = parse_source("models.php", MODELS).unwrap();

    let suit = file.class("App\\Models\\Suit").and_then(|c| c.enum_info.clone()).unwrap();
    assert_eq!(suit.backing, Some(Builtin::String));
    assert_eq!(
        suit.cases.iter().map(|c| c.value.clone()).collect::<Vec<_>>(),
        vec![
            Some(CaseValue::String("H".into())),
            Some(CaseValue::String("S".into()))
        ]
    );

    let direction = file
        .class("App\\Models\\Direction")
        .and_then(|c| c.enum_info.clone())
        .unwrap();
    assert_eq!(direction.backing, None);
    assert_eq!(direction.cases.len(), 2);
    assert!(direction.cases.iter().all(|c| c.value.is_none()));
}

#[test]
fn functions_are_namespaced() {
    let file = parse_source("models.php", MODELS).unwrap();
    let function = file.function("app\\models\\FORMAT_USER").unwrap();
    assert_eq!(function.name, "App\\Models\\format_user");
    assert!(function.doc.as_deref().is_some_and(|d| d.contains("@param User $user")));
    assert_eq!(
        function.scope_id(&file.path),
        "models.php#App\\Models\\format_user"
    );
}

#[test]
fn declarations_carry_scope_and_construct() {
    let file = parse_source("models.php", MODELS).unwrap();
    let user = file.class("App\\Models\\User").unwrap();

    let decl = user.method_declaration(user.method("find").unwrap());
    assert_eq!(decl.scope_id, "App\\Models\\User");
    assert_eq!(decl.namespace, "App\\Models");
    assert_eq!(decl.own_type.as_deref(), Some("App\\Models\\User"));
    assert_eq!(decl.construct.as_deref(), Some("App\\Models\\User::find()"));
    assert!(decl.imports_text.contains("use App\\Contracts\\Repository;"));

    let decl = user.property_declaration(user.property("email").unwrap());
    assert_eq!(decl.construct.as_deref(), Some("App\\Models\\User::$email"));
}

#[test]
fn use_statements_are_snapshotted_per_declaration() {
    let source = r"<?php
namespace First;

use Lib\A;

class One {}

use Lib\B;

class Two {}

namespace Second;

use Lib\C;

class Three {}
";
    let file = parse_source("multi.php", source).unwrap();
    let imports = |name: &str| {
        let class = file.class(name).unwrap();
        parse_imports(&class.imports_text)
            .into_iter()
            .map(|(alias, _)| alias)
            .collect::<Vec<_>>()
    };
    assert_eq!(imports("First\\One"), vec!["A"]);
    assert_eq!(imports("First\\Two"), vec!["A", "B"]);
    assert_eq!(imports("Second\\Three"), vec!["C"]);
}

#[test]
fn global_declarations_have_no_namespace() {
    let file = parse_source("global.php", "<?php\n/** @var int */\nclass Plain {}\n").unwrap();
    let plain = file.class("Plain").unwrap();
    assert_eq!(plain.name, "Plain");
    assert_eq!(plain.namespace, "");
    assert_eq!(plain.doc.as_deref(), Some("/** @var int */"));
}

#[test]
fn comments_separated_by_code_are_not_attached() {
    let source = "<?php\n/** Orphan. */\n$x = 1;\nclass Late {}\n";
    let file = parse_source("orphan.php", source).unwrap();
    assert_eq!(file.class("Late").unwrap().doc, None);
}

#[test]
fn plain_comments_between_doc_and_declaration_are_skipped() {
    let source = "<?php\n/** First. */\n/** Nearest. */\n// note\n/* block */\n# hash\nclass Noted {}\n";
    let file = parse_source("noted.php", source).unwrap();
    assert_eq!(file.class("Noted").unwrap().doc.as_deref(), Some("/** Nearest. */"));
}

#[test]
fn import_text_parsing() {
    let imports = parse_imports("use A\\B;\nuse C\\D as E;");
    assert_eq!(imports.get("B").map(String::as_str), Some("A\\B"));
    assert_eq!(imports.get("E").map(String::as_str), Some("C\\D"));
    assert!(parse_imports("   ").is_empty());
}

// ─── Workspace ──────────────────────────────────────────────────────────────

const CONCERNS: &str = r"<?php
namespace App\Concerns;

use App\Support\Name;

trait HasName
{
    /** @return Name */
    public function name() {}
}
";

#[test]
fn workspace_reads_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("User.php");
    fs::write(&path, MODELS).unwrap();

    let mut workspace = Workspace::new();
    let file = workspace.add_file(&path).unwrap();
    assert_eq!(file.classes.len(), 4);
    assert_eq!(workspace.files().len(), 1);
    assert!(workspace.class("app\\models\\USER").is_some());
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut workspace = Workspace::new();
    let err = workspace.add_file(&dir.path().join("missing.php")).unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
    assert!(err.to_string().contains("missing.php"));
}

#[test]
fn class_index_covers_every_declaration() {
    let mut workspace = Workspace::new();
    workspace.add_source("models.php", MODELS).unwrap();
    workspace.add_source("concerns.php", CONCERNS).unwrap();

    let index = workspace.class_index();
    assert_eq!(index.len(), 5);
    assert!(index.exists("App\\Concerns\\HasName"));
    assert_eq!(
        index.enum_info("App\\Models\\Suit").and_then(|info| info.backing),
        Some(Builtin::String)
    );
    assert_eq!(
        index.class_like("App\\Concerns\\HasName").map(|s| s.kind),
        Some(ClassKind::Trait)
    );
}

#[test]
fn first_declaration_of_a_class_wins() {
    let mut workspace = Workspace::new();
    workspace
        .add_source("a.php", "<?php\nnamespace App;\n/** First. */\nclass Dup {}\n")
        .unwrap();
    workspace
        .add_source("b.php", "<?php\nnamespace App;\n/** Second. */\nclass Dup {}\n")
        .unwrap();
    assert_eq!(
        workspace.class("App\\Dup").and_then(|c| c.doc.as_deref()),
        Some("/** First. */")
    );
    assert_eq!(workspace.class_index().len(), 1);
}

#[test]
fn class_scopes_include_trait_imports() {
    let mut workspace = Workspace::new();
    workspace.add_source("models.php", MODELS).unwrap();
    workspace.add_source("concerns.php", CONCERNS).unwrap();

    let scope = workspace.scope_metadata("App\\Models\\User").unwrap();
    assert_eq!(scope.namespace, "App\\Models");
    assert_eq!(scope.import("Repository"), Some("App\\Contracts\\Repository"));
    assert_eq!(scope.import("Name"), Some("App\\Support\\Name"));

    let trait_scope = workspace.scope_metadata("App\\Concerns\\HasName").unwrap();
    assert_eq!(trait_scope.import("Repository"), None);
}

#[test]
fn function_scopes_are_keyed_by_file() {
    let mut workspace = Workspace::new();
    workspace.add_source("models.php", MODELS).unwrap();

    let scope = workspace
        .scope_metadata("models.php#App\\Models\\format_user")
        .unwrap();
    assert_eq!(scope.namespace, "App\\Models");
    assert_eq!(scope.import("HasName"), Some("App\\Concerns\\HasName"));
    assert!(workspace.scope_metadata("nowhere.php#f").is_none());
}
