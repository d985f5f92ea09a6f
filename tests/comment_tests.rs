//! Comment handling: line and block comments are inter-token whitespace
//! everywhere.

use lyre::ast::{Declaration, ExpressionKind, File};
use lyre::parse;

fn parse_file(input: &str) -> File<'_> {
    match parse(input) {
        Ok(file) => file,
        Err(error) => panic!("parsing failed: {} at {}", error.message, error.range.start),
    }
}

#[test]
fn line_comments_between_declarations() {
    let source = "\
// leading comment
module M
// before the import
import A.B
// before the definition
def x = 1
// trailing comment";
    let file = parse_file(source);
    assert_eq!(file.module, "M");
    assert_eq!(file.imports.len(), 1);
    assert_eq!(file.declarations.len(), 1);
}

#[test]
fn block_comments_inside_declarations() {
    let source = "module M\ndef /* name next */ x /* then the body */ = /* here */ 1";
    let file = parse_file(source);
    let Declaration::Function(f) = &file.declarations[0] else {
        panic!("expected a function");
    };
    assert_eq!(f.name, "x");
    assert!(matches!(
        f.body.as_ref().map(|b| &b.kind),
        Some(ExpressionKind::Literal { .. })
    ));
}

#[test]
fn block_comments_may_span_lines() {
    let source = "module M\n/* a\n   multi-line\n   comment */\ndef x = 1";
    let file = parse_file(source);
    assert_eq!(file.declarations.len(), 1);
}

#[test]
fn line_comment_runs_to_end_of_input() {
    let file = parse_file("module M // no trailing newline");
    assert_eq!(file.module, "M");
}

#[test]
fn unterminated_block_comment_is_an_error() {
    assert!(parse("module M /* never closed").is_err());
}

#[test]
fn comment_markers_inside_strings_are_content() {
    let file = parse_file("module M\ndef s = \"// not a comment\"");
    let Declaration::Function(f) = &file.declarations[0] else {
        panic!("expected a function");
    };
    let Some(ExpressionKind::Literal { value }) = f.body.as_ref().map(|b| &b.kind) else {
        panic!("expected a literal body");
    };
    assert_eq!(format!("{value:?}"), "String(\"// not a comment\")");
}

#[test]
fn comments_do_not_nest() {
    // the block comment ends at the first `*/`; the rest must parse
    let source = "module M /* outer /* inner */ def x = 1";
    let file = parse_file(source);
    assert_eq!(file.declarations.len(), 1);
}
