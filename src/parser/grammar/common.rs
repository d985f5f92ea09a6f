//! Shared grammar rules: the whitespace/comment eater, identifier
//! entities, and literal constants.

use crate::ast::{Literal, Type};
use crate::parser::combinators::{
    delimited, entity, exact, ignore_any, map, multi_line_comment, number_literal, one_of,
    single_line_comment, string_literal, whitespace, Rule, Step,
};
use crate::parser::value::{Node, Parsed};

/// Codepoints an identifier may consist of.
pub const IDENT_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_`";
/// Codepoints an identifier may not start with.
pub const IDENT_NOT_FIRST: &str = "0123456789_`";
/// Codepoints an infix operator consists of.
pub const INFIX_CHARS: &str = "!#$%&*+-/:;<=>?^|~`";
/// Separator of qualified identifier segments.
pub const IDENT_SEPARATOR: char = '.';

/// Rules shared across every grammar category.
pub struct Common {
    /// The ambient whitespace-and-comments eater; never fails.
    pub ws: Rule,
    pub identifier: Rule,
    pub qualified_identifier: Rule,
    pub infix_identifier: Rule,
    pub wrapped_infix_identifier: Rule,
    /// `[a, b, ...]` — bracketed declaration type parameters.
    pub type_parameters: Rule,
    /// Any literal constant: char, float, int, string, unit.
    pub literal: Rule,
}

impl Common {
    pub fn new() -> Common {
        let ws = ignore_any(
            vec![
                whitespace(),
                single_line_comment("//", None),
                multi_line_comment("/*", "*/", None),
            ],
            None,
        );

        let identifier = map(entity(identifier_step, Some(ws.clone())), ident_node);
        let qualified_identifier = map(entity(qualified_step, Some(ws.clone())), qualified_node);
        let infix_identifier = map(entity(infix_step, Some(ws.clone())), infix_node);
        let wrapped_infix_identifier =
            map(entity(wrapped_infix_step, Some(ws.clone())), wrapped_infix_node);

        let type_parameters = delimited(
            identifier.clone(),
            Some(exact("[", Some(ws.clone()))),
            exact("]", Some(ws.clone())),
            exact(",", Some(ws.clone())),
            Some(ws.clone()),
        );

        let char_literal = map(
            string_literal("'", "'", "\\", Some(ws.clone())),
            char_literal_node,
        );
        let float_literal = map(number_literal(Some(ws.clone())), float_literal_node);
        let int_literal = map(number_literal(Some(ws.clone())), int_literal_node);
        let str_literal = map(
            string_literal("\"", "\"", "\\", Some(ws.clone())),
            string_literal_node,
        );
        let unit_literal = map(exact("()", Some(ws.clone())), unit_literal_node);
        let literal = one_of(
            vec![
                char_literal,
                float_literal,
                int_literal,
                str_literal,
                unit_literal,
            ],
            Some(ws.clone()),
        );

        Common {
            ws,
            identifier,
            qualified_identifier,
            infix_identifier,
            wrapped_infix_identifier,
            type_parameters,
            literal,
        }
    }
}

// === entity aggregators ===

fn in_set(set: &str, next: u32) -> bool {
    char::from_u32(next).is_some_and(|c| set.contains(c))
}

fn valid_identifier(text: &str) -> bool {
    match text.chars().next() {
        Some(first) => !IDENT_NOT_FIRST.contains(first),
        None => false,
    }
}

fn identifier_step(accumulated: &str, next: u32) -> Step {
    if in_set(IDENT_CHARS, next) {
        return Step {
            valid: false,
            complete: false,
        };
    }
    Step {
        complete: true,
        valid: valid_identifier(accumulated),
    }
}

fn qualified_step(accumulated: &str, next: u32) -> Step {
    if in_set(IDENT_CHARS, next) || next == u32::from(IDENT_SEPARATOR) {
        return Step {
            valid: false,
            complete: false,
        };
    }
    Step {
        complete: true,
        valid: !accumulated.is_empty()
            && accumulated.split(IDENT_SEPARATOR).all(valid_identifier),
    }
}

fn infix_step(accumulated: &str, next: u32) -> Step {
    if in_set(INFIX_CHARS, next) {
        return Step {
            valid: false,
            complete: false,
        };
    }
    Step {
        complete: true,
        valid: !accumulated.is_empty(),
    }
}

fn wrapped_infix_step(accumulated: &str, next: u32) -> Step {
    if in_set(INFIX_CHARS, next) || next == u32::from('(') || next == u32::from(')') {
        return Step {
            valid: false,
            complete: false,
        };
    }
    let valid = accumulated.len() > 2
        && accumulated.starts_with('(')
        && accumulated.ends_with(')')
        && accumulated[1..accumulated.len() - 1]
            .chars()
            .all(|c| INFIX_CHARS.contains(c));
    Step {
        complete: true,
        valid,
    }
}

// === identifier maps ===

fn ident_node(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(range, Node::Ident(value.text()))
}

fn qualified_node(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(range, Node::QualifiedIdent(value.text()))
}

fn infix_node(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(range, Node::InfixIdent(value.text()))
}

fn wrapped_infix_node(value: Parsed) -> Parsed {
    let range = value.range();
    let text = value.text();
    Parsed::node(range, Node::InfixIdent(&text[1..text.len() - 1]))
}

// === literal maps ===

fn char_literal_node(value: Parsed) -> Parsed {
    let range = value.range();
    let text = value.text();
    let inner = &text[1..text.len() - 1];

    let mut chars = inner.chars();
    let decoded = match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, _) if c != '\\' => Some(c),
        (Some('\\'), Some(escaped), None) => Some(unescape(escaped)),
        _ => None,
    };
    match decoded {
        Some(c) => Parsed::node(range, Node::Literal(Literal::Char(c))),
        None => Parsed::error(range, "Expected single character"),
    }
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        other => other,
    }
}

fn int_literal_node(value: Parsed) -> Parsed {
    let range = value.range();
    let Parsed::Number { is_int, int, .. } = value else {
        unreachable!("expected a number value");
    };
    if !is_int {
        return Parsed::error(range, "Expected integer");
    }
    Parsed::node(range, Node::Literal(Literal::Int(int)))
}

fn float_literal_node(value: Parsed) -> Parsed {
    let range = value.range();
    let Parsed::Number {
        is_int,
        is_float,
        float,
        ..
    } = value
    else {
        unreachable!("expected a number value");
    };
    // a plain integer lexeme is an Int; only fractional/exponent forms
    // become floats here
    if !is_float || is_int {
        return Parsed::error(range, "Expected float");
    }
    Parsed::node(range, Node::Literal(Literal::Float(float)))
}

fn string_literal_node(value: Parsed) -> Parsed {
    let range = value.range();
    let text = value.text();
    Parsed::node(range, Node::Literal(Literal::String(&text[1..text.len() - 1])))
}

fn unit_literal_node(value: Parsed) -> Parsed {
    Parsed::node(value.range(), Node::Literal(Literal::Unit))
}

// === small shared helpers for grammar maps ===

/// Mapper picking the second value of a two-element sequence, e.g. the
/// payload after a keyword.
pub(crate) fn second(value: Parsed) -> Parsed {
    let [_, second] = value.into_array();
    second
}

/// Extract an optional type from a `Skipped`-or-type value.
pub(crate) fn optional_type(value: Parsed) -> Option<Type> {
    if value.is_skipped() {
        None
    } else {
        Some(value.into_node().into_type())
    }
}

/// Extract an identifier list from a `Skipped`-or-sequence value.
pub(crate) fn optional_idents(value: Parsed) -> Vec<&str> {
    if value.is_skipped() {
        Vec::new()
    } else {
        value
            .into_values()
            .into_iter()
            .map(|v| v.into_node().into_ident())
            .collect()
    }
}
