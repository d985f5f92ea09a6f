//! Engine-level tests: the invariants every combinator must uphold,
//! exercised on small hand-built rules.

use lyre::parser::combinators::{
    all, delimited, delimited_empty, delimited_full, exact, label, number_literal, one_of,
    optional, repeat, ForwardDeclaration, Parser, Rule,
};
use lyre::parser::{Grammar, Parsed};
use lyre::reader::Reader;

fn ws() -> Option<Rule> {
    None
}

#[test]
fn exact_matches_and_advances() {
    let rule = exact("module", ws());
    let mut reader = Reader::new("module M");
    let value = rule.parse(&mut reader);
    assert!(value.has_value());
    assert_eq!(value.text(), "module");
    assert_eq!(reader.location().position, 6);
}

#[test]
fn exact_failure_rewinds() {
    let rule = exact("module", ws());
    let mut reader = Reader::new("mod M");
    let before = reader.location();
    let value = rule.parse(&mut reader);
    assert!(value.has_error());
    assert_eq!(reader.location(), before);
}

#[test]
fn all_failure_rewinds_partial_progress() {
    let rule = all(vec![exact("a", ws()), exact("b", ws())]);
    let mut reader = Reader::new("ac");
    let before = reader.location();
    let value = rule.parse(&mut reader);
    assert!(value.has_error());
    assert_eq!(reader.location(), before);
}

#[test]
fn one_of_returns_first_success() {
    let rule = one_of(vec![exact("foo", ws()), exact("bar", ws())], ws());
    let mut reader = Reader::new("bar");
    let value = rule.parse(&mut reader);
    assert!(value.has_value());
    assert_eq!(value.text(), "bar");
}

#[test]
fn one_of_picks_the_furthest_error() {
    // the second alternative gets two tokens deep before failing, so its
    // error is the one reported
    let rule = one_of(
        vec![
            all(vec![exact("a", ws()), exact("x", ws())]),
            all(vec![exact("a", ws()), exact("b", ws()), exact("y", ws())]),
        ],
        ws(),
    );
    let mut reader = Reader::new("abz");
    let before = reader.location();
    let value = rule.parse(&mut reader);
    let Parsed::Error { range, message } = value else {
        panic!("expected an error");
    };
    assert_eq!(range.start.position, 2);
    assert_eq!(message, "Expected 'y'");
    assert_eq!(reader.location(), before);
}

#[test]
fn optional_yields_zero_width_skipped() {
    let rule = optional(exact("x", ws()));
    let mut reader = Reader::new("y");
    let before = reader.location();
    let value = rule.parse(&mut reader);
    assert!(value.is_skipped());
    assert_eq!(value.range().start, before);
    assert_eq!(value.range().end, before);
    assert_eq!(reader.location(), before);
}

#[test]
fn delimited_collects_items_without_separators() {
    let rule = delimited(
        exact("x", ws()),
        Some(exact("(", ws())),
        exact(")", ws()),
        exact(",", ws()),
        ws(),
    );
    let mut reader = Reader::new("(x,x,x)");
    let value = rule.parse(&mut reader);
    assert_eq!(value.into_values().len(), 3);
}

#[test]
fn delimited_rejects_empty_by_default() {
    let rule = delimited(
        exact("x", ws()),
        Some(exact("(", ws())),
        exact(")", ws()),
        exact(",", ws()),
        ws(),
    );
    let mut reader = Reader::new("()");
    let before = reader.location();
    assert!(rule.parse(&mut reader).has_error());
    assert_eq!(reader.location(), before);
}

#[test]
fn delimited_empty_accepts_empty() {
    let rule = delimited_empty(
        exact("x", ws()),
        Some(exact("(", ws())),
        exact(")", ws()),
        exact(",", ws()),
        ws(),
    );
    let mut reader = Reader::new("()");
    let value = rule.parse(&mut reader);
    assert!(value.has_value());
    assert!(value.into_values().is_empty());
}

#[test]
fn delimited_full_distinguishes_the_first_item() {
    let rule = delimited_full(
        exact("x", ws()),
        Some(exact("(", ws())),
        exact(")", ws()),
        exact(",", ws()),
        ws(),
        Some(exact("y", ws())),
        false,
        true,
    );
    let mut reader = Reader::new("(y,x,x,)");
    let value = rule.parse(&mut reader);
    assert!(value.has_value());
    // trailing separator before the suffix is tolerated here
    assert_eq!(value.into_values().len(), 3);
}

#[test]
fn repeat_stops_cleanly_when_guard_fails() {
    let rule = repeat(exact("a", ws()), exact("ab", ws()), ws(), true);
    let mut reader = Reader::new("ababx");
    let value = rule.parse(&mut reader);
    assert_eq!(value.into_values().len(), 2);
    assert_eq!(reader.location().position, 4);
}

#[test]
fn repeat_requires_one_item_unless_empty_allowed() {
    let rule = repeat(exact("a", ws()), exact("ab", ws()), ws(), false);
    let mut reader = Reader::new("xx");
    assert!(rule.parse(&mut reader).has_error());

    let rule = repeat(exact("a", ws()), exact("ab", ws()), ws(), true);
    let mut reader = Reader::new("xx");
    assert!(rule.parse(&mut reader).has_value());
}

#[test]
fn number_literal_exposes_both_readings() {
    let rule = number_literal(ws());

    let mut reader = Reader::new("42");
    let Parsed::Number {
        is_int,
        int,
        is_float,
        float,
        ..
    } = rule.parse(&mut reader)
    else {
        panic!("expected a number");
    };
    assert!(is_int);
    assert_eq!(int, 42);
    assert!(is_float);
    assert_eq!(float, 42.0);

    let mut reader = Reader::new("3.14");
    let Parsed::Number {
        is_int,
        is_float,
        float,
        ..
    } = rule.parse(&mut reader)
    else {
        panic!("expected a number");
    };
    assert!(!is_int);
    assert!(is_float);
    assert!((float - 3.14).abs() < 1e-9);
}

#[test]
fn number_literal_leaves_a_bare_dot_alone() {
    let rule = number_literal(ws());
    let mut reader = Reader::new("1.x");
    let value = rule.parse(&mut reader);
    assert!(value.has_value());
    // only the integer part is consumed; `.x` is an access
    assert_eq!(reader.location().position, 1);
}

#[test]
fn whitespace_rule_is_idempotent() {
    let grammar = Grammar::new();
    let mut reader = Reader::new("  // comment\n  /* block */  x");
    grammar.whitespace.parse(&mut reader);
    let after_first = reader.location();
    grammar.whitespace.parse(&mut reader);
    assert_eq!(reader.location(), after_first);
    assert_eq!(reader.current_char(), u32::from('x'));
}

#[test]
fn forward_declaration_caps_recursion() {
    let fd = ForwardDeclaration::declare();
    let rule: Rule = fd.clone();
    fd.define(vec![rule.clone()]);

    let mut reader = Reader::new("x");
    let Parsed::Error { message, range } = rule.parse(&mut reader) else {
        panic!("expected the recursion guard to trip");
    };
    assert_eq!(message, "Recursion limit exceeded");
    assert!(range.is_empty());

    // the depth counter unwinds, so the rule stays usable
    let Parsed::Error { message, .. } = rule.parse(&mut reader) else {
        panic!("expected the recursion guard to trip again");
    };
    assert_eq!(message, "Recursion limit exceeded");
}

#[test]
fn label_rewrites_the_message_only() {
    let rule = label(exact("=", ws()), "Expected definition body");
    let mut reader = Reader::new("x");
    let Parsed::Error { message, .. } = rule.parse(&mut reader) else {
        panic!("expected an error");
    };
    assert_eq!(message, "Expected definition body");
}
