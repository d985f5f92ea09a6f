//! Expression rules.
//!
//! `Apply`, `Access` and binary operator chains are written
//! left-recursively in the surface grammar; here they parse as a primary
//! expression followed by postfix/operator tails, folded into the same
//! node shapes. Operator chains fold left-associatively into flat
//! `BinOp` nodes — one operator per node, precedence untouched.

use crate::ast::{Expression, ExpressionKind, Field, InfixOp, SelectCase};
use crate::parser::combinators::{
    all, delimited, delimited_empty, exact, map, one_of, optional, repeat, ForwardDeclaration, Rule,
};
use crate::parser::value::{Node, Parsed};

use super::common::{optional_type, second, Common, IDENT_SEPARATOR};
use super::pattern::PatternRules;
use super::types::TypeRules;

pub fn build(common: &Common, types: &TypeRules, patterns: &PatternRules) -> Rule {
    let ws = &common.ws;
    let expr_fd = ForwardDeclaration::declare();
    let expr_rule: Rule = expr_fd.clone();
    let term_fd = ForwardDeclaration::declare();
    let term_rule: Rule = term_fd.clone();
    let let_fd = ForwardDeclaration::declare();
    let let_rule: Rule = let_fd.clone();

    let literal = map(common.literal.clone(), literal_expression);

    let infix_var = map(common.wrapped_infix_identifier.clone(), infix_var_expression);

    let lambda = map(
        all(vec![
            delimited_empty(
                patterns.pattern.clone(),
                Some(exact("\\(", Some(ws.clone()))),
                exact(")", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
            optional(types.annotation.clone()),
            exact("->", Some(ws.clone())),
            expr_rule.clone(),
        ]),
        lambda_expression,
    );

    let if_expr = map(
        all(vec![
            exact("if", Some(ws.clone())),
            expr_rule.clone(),
            exact("then", Some(ws.clone())),
            expr_rule.clone(),
            exact("else", Some(ws.clone())),
            expr_rule.clone(),
        ]),
        if_expression,
    );

    // both let forms end in either `in <expr>` or another chained let
    let let_tail = one_of(
        vec![
            map(
                all(vec![exact("in", Some(ws.clone())), expr_rule.clone()]),
                second,
            ),
            let_rule.clone(),
        ],
        Some(ws.clone()),
    );
    let let_function = map(
        all(vec![
            exact("let", Some(ws.clone())),
            common.identifier.clone(),
            patterns.parameters.clone(),
            optional(types.annotation.clone()),
            exact("=", Some(ws.clone())),
            expr_rule.clone(),
            let_tail.clone(),
        ]),
        let_function_expression,
    );
    let let_value = map(
        all(vec![
            exact("let", Some(ws.clone())),
            patterns.pattern.clone(),
            exact("=", Some(ws.clone())),
            expr_rule.clone(),
            let_tail,
        ]),
        let_value_expression,
    );
    let_fd.define(vec![let_function, let_value]);

    let select_case = all(vec![
        exact("case", Some(ws.clone())),
        patterns.pattern.clone(),
        exact("->", Some(ws.clone())),
        expr_rule.clone(),
    ]);
    let select = map(
        all(vec![
            exact("select", Some(ws.clone())),
            expr_rule.clone(),
            repeat(
                exact("case", Some(ws.clone())),
                select_case,
                Some(ws.clone()),
                false,
            ),
            exact("end", Some(ws.clone())),
        ]),
        select_expression,
    );

    let list = map(
        delimited_empty(
            expr_rule.clone(),
            Some(exact("[", Some(ws.clone()))),
            exact("]", Some(ws.clone())),
            exact(",", Some(ws.clone())),
            Some(ws.clone()),
        ),
        list_expression,
    );

    let field = all(vec![
        common.identifier.clone(),
        exact("=", Some(ws.clone())),
        expr_rule.clone(),
    ]);

    // `{ record | field = e, ... }`; the record part is a term so the `|`
    // stays the update separator rather than an infix operator
    let update = map(
        all(vec![
            exact("{", Some(ws.clone())),
            term_rule.clone(),
            exact("|", Some(ws.clone())),
            delimited(
                field.clone(),
                None,
                exact("}", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
        ]),
        update_expression,
    );

    let record = map(
        delimited_empty(
            field,
            Some(exact("{", Some(ws.clone()))),
            exact("}", Some(ws.clone())),
            exact(",", Some(ws.clone())),
            Some(ws.clone()),
        ),
        record_expression,
    );

    let negate = map(
        all(vec![exact("-", Some(ws.clone())), term_rule.clone()]),
        negate_expression,
    );

    let accessor = map(
        all(vec![exact(".", Some(ws.clone())), common.identifier.clone()]),
        accessor_expression,
    );

    let constructor = map(
        all(vec![
            common.qualified_identifier.clone(),
            optional(delimited_empty(
                expr_rule.clone(),
                Some(exact("(", Some(ws.clone()))),
                exact(")", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            )),
        ]),
        constructor_expression,
    );

    let var = map(common.qualified_identifier.clone(), var_expression);

    let tuple = map(
        delimited(
            expr_rule.clone(),
            Some(exact("(", Some(ws.clone()))),
            exact(")", Some(ws.clone())),
            exact(",", Some(ws.clone())),
            Some(ws.clone()),
        ),
        tuple_expression,
    );

    let atom = one_of(
        vec![
            literal,
            infix_var,
            lambda,
            if_expr,
            let_rule,
            select,
            list,
            update,
            record,
            negate,
            accessor,
            constructor,
            var,
            tuple,
        ],
        Some(ws.clone()),
    );

    // postfix: `(args)` applications and `.field` accesses
    let postfix_guard = one_of(
        vec![exact("(", Some(ws.clone())), exact(".", Some(ws.clone()))],
        Some(ws.clone()),
    );
    let apply_args = delimited_empty(
        expr_rule.clone(),
        Some(exact("(", Some(ws.clone()))),
        exact(")", Some(ws.clone())),
        exact(",", Some(ws.clone())),
        Some(ws.clone()),
    );
    let access_field = map(
        all(vec![exact(".", Some(ws.clone())), common.identifier.clone()]),
        second,
    );
    let term = map(
        all(vec![
            atom,
            repeat(
                postfix_guard,
                one_of(vec![apply_args, access_field], Some(ws.clone())),
                Some(ws.clone()),
                true,
            ),
        ]),
        fold_postfix,
    );
    term_fd.define(vec![term]);

    // operator chains: a term followed by (operator, term) pairs
    let binop_tail = all(vec![common.infix_identifier.clone(), term_rule.clone()]);
    let expression = map(
        all(vec![
            term_rule.clone(),
            repeat(
                common.infix_identifier.clone(),
                binop_tail,
                Some(ws.clone()),
                true,
            ),
        ]),
        fold_binop,
    );
    expr_fd.define(vec![expression]);

    expr_rule
}

fn literal_expression(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Literal {
                value: value.into_node().into_literal(),
            },
        }),
    )
}

fn infix_var_expression(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::InfixVar {
                name: value.into_node().into_ident(),
            },
        }),
    )
}

fn var_expression(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Var {
                name: value.into_node().into_ident(),
            },
        }),
    )
}

fn accessor_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, field] = value.into_array();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Accessor {
                field: field.into_node().into_ident(),
            },
        }),
    )
}

fn lambda_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [params, annotation, _, body] = value.into_array();
    let params = params
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_pattern())
        .collect();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Lambda {
                params,
                return_type: optional_type(annotation),
                body: Box::new(body.into_node().into_expression()),
            },
        }),
    )
}

fn if_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, condition, _, then_branch, _, else_branch] = value.into_array();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::If {
                condition: Box::new(condition.into_node().into_expression()),
                then_branch: Box::new(then_branch.into_node().into_expression()),
                else_branch: Box::new(else_branch.into_node().into_expression()),
            },
        }),
    )
}

fn let_function_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, name, params, annotation, _, body, nested] = value.into_array();
    let name_range = name.range();
    let params = params
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_pattern())
        .collect();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::LetFunction {
                name: name.into_node().into_ident(),
                name_range,
                params,
                return_type: optional_type(annotation),
                body: Box::new(body.into_node().into_expression()),
                nested: Box::new(nested.into_node().into_expression()),
            },
        }),
    )
}

fn let_value_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, pattern, _, bound, body] = value.into_array();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::LetValue {
                pattern: Box::new(pattern.into_node().into_pattern()),
                value: Box::new(bound.into_node().into_expression()),
                body: Box::new(body.into_node().into_expression()),
            },
        }),
    )
}

fn select_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, subject, cases, _] = value.into_array();
    let cases = cases
        .into_values()
        .into_iter()
        .map(|case| {
            let case_range = case.range();
            let [_, pattern, _, body] = case.into_array();
            SelectCase {
                range: case_range,
                pattern: pattern.into_node().into_pattern(),
                body: body.into_node().into_expression(),
            }
        })
        .collect();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Select {
                subject: Box::new(subject.into_node().into_expression()),
                cases,
            },
        }),
    )
}

fn list_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let items = value
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_expression())
        .collect();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::List { items },
        }),
    )
}

fn field_from(value: Parsed) -> Field {
    let range = value.range();
    let [name, _, field_value] = value.into_array();
    let name_range = name.range();
    Field {
        range,
        name: name.into_node().into_ident(),
        name_range,
        value: field_value.into_node().into_expression(),
    }
}

fn record_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let fields = value.into_values().into_iter().map(field_from).collect();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Record { fields },
        }),
    )
}

fn update_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, record, _, fields] = value.into_array();
    let fields = fields.into_values().into_iter().map(field_from).collect();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Update {
                record: Box::new(record.into_node().into_expression()),
                fields,
            },
        }),
    )
}

fn negate_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, inner] = value.into_array();
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Negate {
                inner: Box::new(inner.into_node().into_expression()),
            },
        }),
    )
}

fn tuple_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let mut items: Vec<Expression> = value
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_expression())
        .collect();
    // a one-element tuple is just parenthesized grouping
    if items.len() == 1 {
        let inner = items.remove(0);
        return Parsed::node(range, Node::Expression(inner));
    }
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Tuple { items },
        }),
    )
}

fn constructor_expression(value: Parsed) -> Parsed {
    let range = value.range();
    let [name, args] = value.into_array();
    let name_range = name.range();
    let qualified = name.into_node().into_ident();
    let Some((module, data, option)) = split_constructor(qualified) else {
        return Parsed::error(name_range, "Expected constructor name");
    };
    let args = if args.is_skipped() {
        Vec::new()
    } else {
        args.into_values()
            .into_iter()
            .map(|v| v.into_node().into_expression())
            .collect()
    };
    Parsed::node(
        range,
        Node::Expression(Expression {
            range,
            kind: ExpressionKind::Constructor {
                module,
                data,
                option,
                name_range,
                args,
            },
        }),
    )
}

/// Split a qualified constructor reference into module, data and option
/// parts: the option is the last segment (must be uppercase-initial), the
/// data is the second-to-last segment when it is uppercase-initial too,
/// the module is whatever precedes them.
fn split_constructor(qualified: &str) -> Option<(&str, &str, &str)> {
    fn uppercase_initial(segment: &str) -> bool {
        segment.chars().next().is_some_and(|c| c.is_ascii_uppercase())
    }

    let (prefix, option) = match qualified.rfind(IDENT_SEPARATOR) {
        Some(i) => (&qualified[..i], &qualified[i + 1..]),
        None => ("", qualified),
    };
    if !uppercase_initial(option) {
        return None;
    }
    let (module, data) = match prefix.rfind(IDENT_SEPARATOR) {
        Some(i) if uppercase_initial(&prefix[i + 1..]) => (&prefix[..i], &prefix[i + 1..]),
        None if uppercase_initial(prefix) => ("", prefix),
        _ => (prefix, ""),
    };
    Some((module, data, option))
}

fn fold_postfix(value: Parsed) -> Parsed {
    let range = value.range();
    let [first, tails] = value.into_array();
    let mut expression = first.into_node().into_expression();

    for tail in tails.into_values() {
        let tail_range = tail.range();
        let merged = expression.range.merge(&tail_range);
        expression = match tail {
            Parsed::Node {
                range: field_range,
                node,
            } => Expression {
                range: merged,
                kind: ExpressionKind::Access {
                    record: Box::new(expression),
                    field: node.into_ident(),
                    field_range,
                },
            },
            args => {
                let args = args
                    .into_values()
                    .into_iter()
                    .map(|v| v.into_node().into_expression())
                    .collect();
                Expression {
                    range: merged,
                    kind: ExpressionKind::Apply {
                        function: Box::new(expression),
                        args,
                    },
                }
            }
        };
    }

    Parsed::node(range, Node::Expression(expression))
}

fn fold_binop(value: Parsed) -> Parsed {
    let range = value.range();
    let [first, tails] = value.into_array();
    let mut expression = first.into_node().into_expression();

    for tail in tails.into_values() {
        let [op, rhs] = tail.into_array();
        let op_range = op.range();
        let right = rhs.into_node().into_expression();
        let merged = expression.range.merge(&right.range);
        expression = Expression {
            range: merged,
            kind: ExpressionKind::BinOp {
                left: Box::new(expression),
                op: InfixOp {
                    name: op.into_node().into_ident(),
                    range: op_range,
                },
                right: Box::new(right),
            },
        };
    }

    Parsed::node(range, Node::Expression(expression))
}
