//! Shape grammars: maps, key/value arrays, ranges, literal sets and
//! enum-derived types.

mod common;

use common::{class, int, resolve, string, try_tags};
use phpdoc_reflect::TypeError;
use phpdoc_reflect::types::{Builtin, MapEntry, ShapeDefinition, Type};
use pretty_assertions::assert_eq;

fn shape_of(raw: &str) -> (Builtin, ShapeDefinition) {
    let ty = resolve(raw).unwrap_or_else(|err| panic!("`{}` should resolve: {}", raw, err));
    let (base, shape) = ty
        .shape()
        .unwrap_or_else(|| panic!("`{}` should be shaped, got `{}`", raw, ty));
    (base, shape.clone())
}

// ─── Map ────────────────────────────────────────────────────────────────────

#[test]
fn map_optional_entries_are_nullable() {
    let (base, shape) = shape_of("array{a: int, b?: string}");
    assert_eq!(base, Builtin::Array);
    assert_eq!(
        shape,
        ShapeDefinition::Map(vec![
            MapEntry {
                key: "a".into(),
                ty: int(),
                optional: false,
            },
            MapEntry {
                key: "b".into(),
                ty: Type::nullable(string()),
                optional: true,
            },
        ])
    );
    assert!(shape.entry("b").is_some_and(|e| e.ty.allows_null()));
}

#[test]
fn map_entries_without_keys_are_indexed() {
    let (_, shape) = shape_of("array{int, string}");
    assert_eq!(shape.entry("0").map(|e| &e.ty), Some(&int()));
    assert_eq!(shape.entry("1").map(|e| &e.ty), Some(&string()));
}

#[test]
fn map_keys_may_be_quoted() {
    let ty = resolve("array{'first name': string, \"id\": int}").unwrap();
    let (_, shape) = ty.shape().unwrap();
    assert!(shape.entry("first name").is_some());
    assert!(shape.entry("id").is_some());
    assert_eq!(ty.to_string(), "array{'first name': string, id: int}");
}

#[test]
fn keys_with_single_quotes_render_double_quoted() {
    let ty = resolve("array{\"it's\": int, 'say \"hi\"': string}").unwrap();
    let (_, shape) = ty.shape().unwrap();
    assert!(shape.entry("it's").is_some());
    assert!(shape.entry("say \"hi\"").is_some());
    let rendered = ty.to_string();
    assert_eq!(rendered, "array{\"it's\": int, 'say \"hi\"': string}");
    assert_eq!(resolve(&rendered).unwrap(), ty);
}

#[test]
fn map_values_resolve_recursively() {
    let (_, shape) = shape_of("array{user: User, tags: string[], meta: array{x: ?int}}");
    assert_eq!(
        shape.entry("user").map(|e| &e.ty),
        Some(&class("App\\Models\\User"))
    );
    assert_eq!(
        shape.entry("tags").map(|e| &e.ty),
        Some(&Type::array_of(string()))
    );
    let meta = shape.entry("meta").map(|e| e.ty.to_string());
    assert_eq!(meta.as_deref(), Some("array{x: ?int}"));
}

#[test]
fn map_accepts_a_trailing_comma_and_empty_braces() {
    let (_, shape) = shape_of("array{a: int,}");
    assert!(matches!(shape, ShapeDefinition::Map(ref entries) if entries.len() == 1));
    let (_, empty) = shape_of("array{}");
    assert_eq!(empty, ShapeDefinition::Map(vec![]));
}

#[test]
fn map_rejects_duplicate_keys() {
    let err = resolve("array{a: int, a: string}").unwrap_err();
    assert!(
        matches!(err, TypeError::Shape { shape: "map", .. }),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn object_shapes_use_the_object_base() {
    let (base, shape) = shape_of("object{name: string, age?: int}");
    assert_eq!(base, Builtin::Object);
    assert_eq!(shape.name(), "map");
    let ty = resolve("object{name: string}").unwrap();
    assert!(!ty.is_iterable());
}

#[test]
fn non_empty_array_shapes_keep_the_map() {
    let (base, shape) = shape_of("non-empty-array{id: int}");
    assert_eq!(base, Builtin::Array);
    assert!(shape.entry("id").is_some());
}

// ─── KeyValue ───────────────────────────────────────────────────────────────

#[test]
fn key_value_with_both_parameters() {
    let (_, shape) = shape_of("array<string, User>");
    assert_eq!(
        shape,
        ShapeDefinition::KeyValue {
            key: Some(string()),
            value: class("App\\Models\\User"),
        }
    );
}

#[test]
fn key_value_with_only_a_value() {
    let (_, shape) = shape_of("array<int|string>");
    assert_eq!(
        shape,
        ShapeDefinition::KeyValue {
            key: None,
            value: Type::Union(vec![int(), string()]),
        }
    );
}

#[test]
fn key_value_rejects_three_parameters() {
    assert!(matches!(
        resolve("array<int, string, bool>"),
        Err(TypeError::Shape {
            shape: "key-value",
            ..
        })
    ));
}

// ─── MinMax ─────────────────────────────────────────────────────────────────

#[test]
fn min_max_bounds() {
    assert_eq!(
        shape_of("int<1,5>"),
        (Builtin::Int, ShapeDefinition::MinMax { min: 1, max: 5 })
    );
    assert_eq!(shape_of("int<3, 3>").1, ShapeDefinition::MinMax { min: 3, max: 3 });
}

#[test]
fn min_greater_than_max_fails() {
    let err = resolve("int<5,1>").unwrap_err();
    assert!(matches!(err, TypeError::Shape { shape: "min-max", .. }));
    assert!(!err.is_fatal());
}

#[test]
fn negative_bounds_are_not_a_range() {
    assert!(resolve("int<-1, 5>").is_err());
}

// ─── OneOf ──────────────────────────────────────────────────────────────────

#[test]
fn one_of_literals_are_quote_aware() {
    assert_eq!(
        shape_of("string<\"a\", 'b,c', d>").1,
        ShapeDefinition::OneOf(vec!["a".into(), "b,c".into(), "d".into()])
    );
    assert_eq!(
        shape_of("string<\"say \"\"hi\"\"\">").1,
        ShapeDefinition::OneOf(vec!["say \"hi\"".into()])
    );
}

#[test]
fn one_of_renders_double_quoted() {
    let ty = resolve("string<'draft', 'published'>").unwrap();
    assert_eq!(ty.to_string(), "string<\"draft\", \"published\">");
    assert!(ty.is_scalar());
}

// ─── EnumKey / EnumValue ────────────────────────────────────────────────────

#[test]
fn enum_shapes_use_the_backing_type() {
    assert_eq!(
        shape_of("value-of<Enums\\Suit>"),
        (
            Builtin::String,
            ShapeDefinition::EnumValue {
                enumeration: "App\\Enums\\Suit".into(),
                case_type: Builtin::String,
            }
        )
    );
    assert_eq!(
        shape_of("key-of<\\App\\Enums\\Status>").1,
        ShapeDefinition::EnumKey {
            enumeration: "App\\Enums\\Status".into(),
            case_type: Builtin::Int,
        }
    );
}

#[test]
fn enum_shapes_fall_back_to_uniform_constant_types() {
    assert_eq!(
        shape_of("value-of<\\App\\Support\\Levels>").1,
        ShapeDefinition::EnumValue {
            enumeration: "App\\Support\\Levels".into(),
            case_type: Builtin::Int,
        }
    );
}

#[test]
fn pure_enums_resolve_to_the_enum_itself() {
    assert_eq!(
        resolve("value-of<Enums\\Direction>").unwrap(),
        class("App\\Enums\\Direction")
    );
}

#[test]
fn mixed_case_types_are_fatal() {
    let err = resolve("value-of<\\App\\Support\\Flags>").unwrap_err();
    assert_eq!(
        err,
        TypeError::EnumType {
            name: "App\\Support\\Flags".into()
        }
    );
    assert!(err.is_fatal());
}

#[test]
fn mixed_case_types_escape_tag_extraction() {
    let result = try_tags("/** @param value-of<\\App\\Support\\Flags> $flag */");
    assert!(matches!(result, Err(TypeError::EnumType { .. })));
}

#[test]
fn unknown_enumerations_fail_alias_resolution() {
    assert!(matches!(
        resolve("key-of<Missing>"),
        Err(TypeError::Alias(_))
    ));
}
