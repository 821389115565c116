//! Raw comment text → ordered notations.

use phpdoc_reflect::docblock::{RawNotation, parse};
use pretty_assertions::assert_eq;

fn notation(tag: &str, value: &str) -> RawNotation {
    RawNotation {
        tag: tag.to_string(),
        value: value.to_string(),
    }
}

#[test]
fn empty_comments_have_no_notations() {
    assert_eq!(parse(""), vec![]);
    assert_eq!(parse("/** */"), vec![]);
    assert_eq!(parse("/**\n *\n */"), vec![]);
}

#[test]
fn leading_text_splits_into_summary_and_description() {
    let comment = "/**
     * Summary line.
     * More text.
     * Even more text.
     *
     * @param string $name first
     *   part two
     * @return void
     */";
    assert_eq!(
        parse(comment),
        vec![
            notation("summary", "Summary line."),
            notation("description", "More text. Even more text."),
            notation("param", "string $name first part two"),
            notation("return", "void"),
        ]
    );
}

#[test]
fn two_leading_lines_are_all_description() {
    let comment = "/**\n * First line.\n * Second line.\n * @api\n */";
    assert_eq!(
        parse(comment),
        vec![
            notation("description", "First line. Second line."),
            notation("api", ""),
        ]
    );
}

#[test]
fn one_space_indent_does_not_continue() {
    let comment = "/**\n * @param int $x\n *  not a continuation\n *   a continuation\n */";
    assert_eq!(parse(comment), vec![notation("param", "int $x a continuation")]);
}

#[test]
fn deeper_indent_does_not_continue() {
    let comment = "/**\n * @param string $x first\n *     aligned text\n *   second part\n */";
    assert_eq!(
        parse(comment),
        vec![notation("param", "string $x first second part")]
    );
}

#[test]
fn continuation_fills_an_empty_value() {
    let comment = "/**\n * @deprecated\n *   use other() instead\n */";
    assert_eq!(
        parse(comment),
        vec![notation("deprecated", "use other() instead")]
    );
}

#[test]
fn malformed_notations_are_dropped() {
    let comment = "/**
     * @param int $a
     * @ param int $b
     * @param(int) $c
     * @return int
     */";
    assert_eq!(
        parse(comment),
        vec![notation("param", "int $a"), notation("return", "int")]
    );
}

#[test]
fn source_order_is_preserved() {
    let comment = "/**
     * @throws RuntimeException
     * @param int $b
     * @param int $a
     * @throws LogicException
     */";
    let tags: Vec<String> = parse(comment).into_iter().map(|n| n.tag).collect();
    assert_eq!(tags, vec!["throws", "param", "param", "throws"]);
}

#[test]
fn single_line_comments() {
    assert_eq!(parse("/** @var int */"), vec![notation("var", "int")]);
    assert_eq!(
        parse("/** Just text. */"),
        vec![notation("description", "Just text.")]
    );
}

#[test]
fn tag_names_keep_dashes_and_namespaces() {
    let comment = "/**\n * @property-read int $id\n * @psalm-return list<int>\n */";
    assert_eq!(
        parse(comment),
        vec![
            notation("property-read", "int $id"),
            notation("psalm-return", "list<int>"),
        ]
    );
}
