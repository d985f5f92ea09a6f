//! Pattern rules, plus the function-signature rule shared between `def`
//! definitions and `let` functions.

use crate::ast::{FieldPattern, FunctionSignature, Pattern, PatternKind};
use crate::parser::combinators::{
    all, delimited, delimited_empty, exact, map, one_of, optional, repeat, ForwardDeclaration, Rule,
};
use crate::parser::value::{Node, Parsed};

use super::common::{optional_type, Common};
use super::types::TypeRules;

pub struct PatternRules {
    /// Any pattern.
    pub pattern: Rule,
    /// `name [(p, ...)] [: T]` — a definition head.
    pub signature: Rule,
    /// `(p, p, ...)` — a parenthesized parameter list, possibly empty.
    pub parameters: Rule,
}

pub fn build(common: &Common, types: &TypeRules) -> PatternRules {
    let ws = &common.ws;
    let pattern_fd = ForwardDeclaration::declare();
    let pattern_rule: Rule = pattern_fd.clone();

    let any = map(exact("_", Some(ws.clone())), any_pattern);

    let constant = map(
        all(vec![common.literal.clone(), optional(types.annotation.clone())]),
        constant_pattern,
    );

    // a constructor pattern always has its parenthesized argument list; a
    // bare identifier stays a binding
    let constructor = map(
        all(vec![
            common.qualified_identifier.clone(),
            delimited_empty(
                pattern_rule.clone(),
                Some(exact("(", Some(ws.clone()))),
                exact(")", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
            optional(types.annotation.clone()),
        ]),
        constructor_pattern,
    );

    let named = map(
        all(vec![
            common.identifier.clone(),
            optional(types.annotation.clone()),
        ]),
        named_pattern,
    );

    let list = map(
        all(vec![
            delimited_empty(
                pattern_rule.clone(),
                Some(exact("[", Some(ws.clone()))),
                exact("]", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
            optional(types.annotation.clone()),
        ]),
        list_pattern,
    );

    let record = map(
        all(vec![
            delimited(
                common.identifier.clone(),
                Some(exact("{", Some(ws.clone()))),
                exact("}", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
            optional(types.annotation.clone()),
        ]),
        record_pattern,
    );

    let tuple = map(
        all(vec![
            delimited(
                pattern_rule.clone(),
                Some(exact("(", Some(ws.clone()))),
                exact(")", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
            optional(types.annotation.clone()),
        ]),
        tuple_pattern,
    );

    let primary = one_of(
        vec![any, constant, constructor, named, list, record, tuple],
        Some(ws.clone()),
    );

    // `as` aliases and `|` cons parse as postfix on a primary pattern;
    // cons is right-associative through the recursive pattern rule
    let alias_tail = all(vec![
        exact("as", Some(ws.clone())),
        common.identifier.clone(),
        optional(types.annotation.clone()),
    ]);
    let cons_tail = all(vec![
        exact("|", Some(ws.clone())),
        pattern_rule.clone(),
        optional(types.annotation.clone()),
    ]);
    let tail_guard = one_of(
        vec![exact("as", Some(ws.clone())), exact("|", Some(ws.clone()))],
        Some(ws.clone()),
    );
    let pattern = map(
        all(vec![
            primary,
            repeat(
                tail_guard,
                one_of(vec![alias_tail, cons_tail], Some(ws.clone())),
                Some(ws.clone()),
                true,
            ),
        ]),
        fold_pattern,
    );
    pattern_fd.define(vec![pattern]);

    let parameters = delimited_empty(
        pattern_rule.clone(),
        Some(exact("(", Some(ws.clone()))),
        exact(")", Some(ws.clone())),
        exact(",", Some(ws.clone())),
        Some(ws.clone()),
    );

    let signature = map(
        all(vec![
            common.identifier.clone(),
            optional(parameters.clone()),
            optional(types.annotation.clone()),
        ]),
        signature_node,
    );

    PatternRules {
        pattern: pattern_rule,
        signature,
        parameters,
    }
}

fn any_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(
        range,
        Node::Pattern(Pattern {
            range,
            ty: None,
            kind: PatternKind::Any,
        }),
    )
}

fn constant_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    let [literal, annotation] = value.into_array();
    Parsed::node(
        range,
        Node::Pattern(Pattern {
            range,
            ty: optional_type(annotation),
            kind: PatternKind::Literal {
                value: literal.into_node().into_literal(),
            },
        }),
    )
}

fn named_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    let [name, annotation] = value.into_array();
    Parsed::node(
        range,
        Node::Pattern(Pattern {
            range,
            ty: optional_type(annotation),
            kind: PatternKind::Named {
                name: name.into_node().into_ident(),
            },
        }),
    )
}

fn constructor_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    let [name, values, annotation] = value.into_array();
    let name_range = name.range();
    let values = values
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_pattern())
        .collect();
    Parsed::node(
        range,
        Node::Pattern(Pattern {
            range,
            ty: optional_type(annotation),
            kind: PatternKind::Constructor {
                name: name.into_node().into_ident(),
                name_range,
                values,
            },
        }),
    )
}

fn list_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    let [items, annotation] = value.into_array();
    let items = items
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_pattern())
        .collect();
    Parsed::node(
        range,
        Node::Pattern(Pattern {
            range,
            ty: optional_type(annotation),
            kind: PatternKind::List { items },
        }),
    )
}

fn record_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    let [fields, annotation] = value.into_array();
    let fields = fields
        .into_values()
        .into_iter()
        .map(|v| {
            let field_range = v.range();
            FieldPattern {
                name: v.into_node().into_ident(),
                range: field_range,
            }
        })
        .collect();
    Parsed::node(
        range,
        Node::Pattern(Pattern {
            range,
            ty: optional_type(annotation),
            kind: PatternKind::Record { fields },
        }),
    )
}

fn tuple_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    let [items, annotation] = value.into_array();
    let mut items: Vec<Pattern> = items
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_pattern())
        .collect();
    let ty = optional_type(annotation);
    // a one-element tuple is just parenthesized grouping
    if items.len() == 1 {
        let mut inner = items.remove(0);
        if ty.is_some() {
            inner.ty = ty;
        }
        return Parsed::node(range, Node::Pattern(inner));
    }
    Parsed::node(
        range,
        Node::Pattern(Pattern {
            range,
            ty,
            kind: PatternKind::Tuple { items },
        }),
    )
}

fn fold_pattern(value: Parsed) -> Parsed {
    let range = value.range();
    let [first, tails] = value.into_array();
    let mut pattern = first.into_node().into_pattern();

    for tail in tails.into_values() {
        let tail_range = tail.range();
        let [op, operand, annotation] = tail.into_array();
        let merged = pattern.range.merge(&tail_range);
        let ty = optional_type(annotation);
        pattern = match op.text() {
            "as" => Pattern {
                range: merged,
                ty,
                kind: PatternKind::Alias {
                    inner: Box::new(pattern),
                    name: operand.into_node().into_ident(),
                },
            },
            _ => Pattern {
                range: merged,
                ty,
                kind: PatternKind::Cons {
                    head: Box::new(pattern),
                    tail: Box::new(operand.into_node().into_pattern()),
                },
            },
        };
    }

    Parsed::node(range, Node::Pattern(pattern))
}

fn signature_node(value: Parsed) -> Parsed {
    let range = value.range();
    let [name, params, annotation] = value.into_array();
    let name_range = name.range();
    let params = if params.is_skipped() {
        Vec::new()
    } else {
        params
            .into_values()
            .into_iter()
            .map(|v| v.into_node().into_pattern())
            .collect()
    };
    Parsed::node(
        range,
        Node::Signature(FunctionSignature {
            range,
            name: name.into_node().into_ident(),
            name_range,
            params,
            return_type: optional_type(annotation),
        }),
    )
}
