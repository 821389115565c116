//! `use` statement extraction.
//!
//! Builds the import table of a scope: imported alias → fully-qualified
//! class name.  Function and constant imports are skipped since they can
//! never name a type.

use indexmap::IndexMap;
use mago_syntax::ast::*;

use crate::util::{short_name, strip_leading_backslash};

/// Walk statements (recursing into namespace bodies) and collect class
/// imports into `imports`.
pub(crate) fn collect_imports<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    imports: &mut IndexMap<String, String>,
) {
    for statement in statements {
        match statement {
            Statement::Use(use_stmt) => extract_use_items(&use_stmt.items, imports),
            Statement::Namespace(namespace) => {
                collect_imports(namespace.statements().iter(), imports);
            }
            _ => {}
        }
    }
}

/// Extract the class imports of one `use` statement.
pub(crate) fn extract_use_items(items: &UseItems, imports: &mut IndexMap<String, String>) {
    match items {
        // `use Foo\Bar;`, `use Foo\Bar as Baz, Qux\Quux;`
        UseItems::Sequence(seq) => {
            for item in seq.items.iter() {
                register_use_item(item, None, imports);
            }
        }
        // `use function Foo\bar;`
        UseItems::TypedSequence(seq) => {
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, imports);
            }
        }
        // `use function Foo\{bar, baz};`
        UseItems::TypedList(list) => {
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), imports);
            }
        }
        // `use Foo\{Bar, Baz as B, function qux};`
        UseItems::MixedList(list) => {
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), imports);
            }
        }
    }
}

/// Register one imported name.  Group members are relative to
/// `group_prefix`; the alias defaults to the last name segment.
fn register_use_item(
    item: &UseItem,
    group_prefix: Option<&str>,
    imports: &mut IndexMap<String, String>,
) {
    let item_name = item.name.value();
    let fq = match group_prefix {
        Some(prefix) => format!(
            "{}\\{}",
            strip_leading_backslash(prefix).trim_end_matches('\\'),
            item_name
        ),
        None => strip_leading_backslash(item_name).to_string(),
    };

    let alias = match item.alias {
        Some(ref alias) => alias.identifier.value.to_string(),
        None => short_name(&fq).to_string(),
    };

    tracing::trace!(alias = %alias, fq = %fq, "import registered");
    imports.insert(alias, fq);
}
