//! File-level parse tests: module headers, imports, and whole-file
//! behavior.

use lyre::ast::{Declaration, ExpressionKind, File, PatternKind, TypeKind};
use lyre::parse;

fn parse_file(input: &str) -> File<'_> {
    match parse(input) {
        Ok(file) => file,
        Err(error) => panic!("parsing failed: {} at {}", error.message, error.range.start),
    }
}

#[test]
fn parse_module_header_only() {
    let file = parse_file("module M");
    assert_eq!(file.module, "M");
    assert!(file.imports.is_empty());
    assert!(file.declarations.is_empty());
}

#[test]
fn parse_qualified_module_name() {
    let file = parse_file("module Core.Data.List");
    assert_eq!(file.module, "Core.Data.List");
}

#[test]
fn empty_source_is_an_error() {
    let error = parse("").unwrap_err();
    assert_eq!(error.message, "Expected 'module'");
}

#[test]
fn module_name_must_be_a_valid_identifier() {
    let error = parse("module 1M").unwrap_err();
    assert_eq!(error.message, "Invalid identifier");
    assert_eq!(error.range.start.line, 1);
    assert_eq!(error.range.start.column, 8);
}

#[test]
fn trailing_whitespace_and_comments_are_skipped() {
    let file = parse_file("module M\n\n// trailing\n/* and more */\n   ");
    assert_eq!(file.module, "M");
}

#[test]
fn garbage_after_declarations_is_an_error() {
    assert!(parse("module M ???").is_err());
}

#[test]
fn parse_plain_import() {
    let file = parse_file("module M\nimport A.B");
    assert_eq!(file.imports.len(), 1);
    let import = &file.imports[0];
    assert_eq!(import.module, "A.B");
    assert_eq!(import.alias, None);
    assert!(!import.expose_all);
    assert!(import.expose.is_empty());
}

#[test]
fn parse_import_with_alias_and_exposing_list() {
    let file = parse_file("module M\nimport A.B as C exposing (x, y)");
    let import = &file.imports[0];
    assert_eq!(import.module, "A.B");
    assert_eq!(import.alias, Some("C"));
    assert!(!import.expose_all);
    assert_eq!(import.expose, vec!["x", "y"]);
}

#[test]
fn parse_import_exposing_all() {
    let file = parse_file("module M\nimport A.B exposing *");
    let import = &file.imports[0];
    assert!(import.expose_all);
    assert!(import.expose.is_empty());
}

#[test]
fn parse_multiple_imports() {
    let file = parse_file("module M\nimport A\nimport B as B2\nimport C exposing (f)");
    assert_eq!(file.imports.len(), 3);
    assert_eq!(file.imports[1].alias, Some("B2"));
    assert_eq!(file.imports[2].expose, vec!["f"]);
}

#[test]
fn parse_function_with_let_body() {
    let file = parse_file("module M\ndef f(x) = let y = x in y");
    let Declaration::Function(f) = &file.declarations[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(f.name, "f");
    assert_eq!(f.params.len(), 1);
    let body = f.body.as_ref().expect("function body");
    let ExpressionKind::LetValue {
        pattern,
        value,
        body: nested,
    } = &body.kind
    else {
        panic!("expected a let binding");
    };
    assert!(matches!(pattern.kind, PatternKind::Named { name: "y" }));
    assert!(matches!(value.kind, ExpressionKind::Var { name: "x" }));
    assert!(matches!(nested.kind, ExpressionKind::Var { name: "y" }));
}

#[test]
fn parse_annotated_function_synthesizes_its_type() {
    let file = parse_file("module M\ndef add(x : Int, y : Int) : Int = x + y");
    let Declaration::Function(f) = &file.declarations[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(f.name, "add");
    assert_eq!(f.params.len(), 2);
    for param in &f.params {
        assert!(matches!(param.kind, PatternKind::Named { .. }));
        assert!(param.ty.is_some());
    }

    let ty = f.ty.as_ref().expect("synthesized type");
    let TypeKind::Function { params, ret } = &ty.kind else {
        panic!("expected a function type");
    };
    assert_eq!(params.len(), 2);
    assert!(matches!(ret.kind, TypeKind::Named { name: "Int", .. }));

    let body = f.body.as_ref().expect("function body");
    let ExpressionKind::BinOp { left, op, right } = &body.kind else {
        panic!("expected a binary operation");
    };
    assert!(matches!(left.kind, ExpressionKind::Var { name: "x" }));
    assert_eq!(op.name, "+");
    assert!(matches!(right.kind, ExpressionKind::Var { name: "y" }));
}

#[test]
fn every_node_range_lies_within_the_source() {
    let source = "module M\nimport A.B as C\ndef f(x) = select x case _ -> 0 end";
    let file = parse_file(source);
    let len = source.len();
    assert!(file.module_range.end.position <= len);
    for import in &file.imports {
        assert!(import.range.start.position <= import.range.end.position);
        assert!(import.range.end.position <= len);
    }
    for declaration in &file.declarations {
        let range = declaration.range();
        assert!(range.start.position <= range.end.position);
        assert!(range.end.position <= len);
    }
}

#[test]
fn identifiers_borrow_from_the_source_buffer() {
    let source = String::from("module M\ndef answer = 42");
    let file = parse_file(&source);
    let name = file.declarations[0].name();
    // pointer identity: the name is a slice of the original buffer
    let offset = name.as_ptr() as usize - source.as_ptr() as usize;
    assert_eq!(&source[offset..offset + name.len()], "answer");
}

#[test]
fn parse_a_realistic_module() {
    let source = r#"
module Demo.Tree
import Demo.Basics exposing (max)

infix (|>) : (left 4) = applyFlipped

alias Pair[a, b] = (a, b)

type Tree[a] = | Leaf | Node(left: Tree[a], value: a, right: Tree[a])

def native size(t : Tree[a]) : Int

def depth(t : Tree[a]) : Int =
    select t
        case Leaf -> 0
        case Node(l, _, r) -> 1 + max(depth(l), depth(r))
    end

def main = let t = Node(Leaf, 1, Leaf) in depth(t)
"#;
    let file = parse_file(source);
    assert_eq!(file.module, "Demo.Tree");
    assert_eq!(file.imports.len(), 1);
    assert_eq!(file.declarations.len(), 6);

    let names: Vec<&str> = file.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["|>", "Pair", "Tree", "size", "depth", "main"]);

    let Declaration::Function(size) = &file.declarations[3] else {
        panic!("expected a function declaration");
    };
    assert!(size.body.is_none());
    assert!(size.ty.is_some());
}
