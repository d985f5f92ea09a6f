//! Type expression rules.

use crate::ast::{Type, TypeField, TypeKind};
use crate::parser::combinators::{
    all, delimited, exact, map, one_of, optional, ForwardDeclaration, Rule,
};
use crate::parser::value::{Node, Parsed};

use super::common::{second, Common};

pub struct TypeRules {
    /// Any type expression.
    pub ty: Rule,
    /// `: Type` — used wherever a node may carry an annotation.
    pub annotation: Rule,
}

pub fn build(common: &Common) -> TypeRules {
    let ws = &common.ws;
    let ty = ForwardDeclaration::declare();
    let ty_rule: Rule = ty.clone();

    let annotation = map(
        all(vec![exact(":", Some(ws.clone())), ty_rule.clone()]),
        second,
    );

    // (T, T, ...) : R
    let function = map(
        all(vec![
            delimited(
                ty_rule.clone(),
                Some(exact("(", Some(ws.clone()))),
                exact(")", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
            annotation.clone(),
        ]),
        function_type,
    );

    // a lowercase-initial identifier; must come before named types in the
    // alternation or it would never match
    let variable = map(common.identifier.clone(), variable_type);

    let type_arguments = delimited(
        ty_rule.clone(),
        Some(exact("[", Some(ws.clone()))),
        exact("]", Some(ws.clone())),
        exact(",", Some(ws.clone())),
        Some(ws.clone()),
    );
    let named = map(
        all(vec![common.identifier.clone(), optional(type_arguments)]),
        named_type,
    );

    let record = map(
        delimited(
            all(vec![common.identifier.clone(), annotation.clone()]),
            Some(exact("{", Some(ws.clone()))),
            exact("}", Some(ws.clone())),
            exact(",", Some(ws.clone())),
            Some(ws.clone()),
        ),
        record_type,
    );

    let tuple = map(
        delimited(
            ty_rule.clone(),
            Some(exact("(", Some(ws.clone()))),
            exact(")", Some(ws.clone())),
            exact(",", Some(ws.clone())),
            Some(ws.clone()),
        ),
        tuple_type,
    );

    let unit = map(exact("()", Some(ws.clone())), unit_type);

    ty.define(vec![function, variable, named, record, tuple, unit]);

    TypeRules {
        ty: ty_rule,
        annotation,
    }
}

fn function_type(value: Parsed) -> Parsed {
    let range = value.range();
    let [params, ret] = value.into_array();
    let params = params
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_type())
        .collect();
    let ret = Box::new(ret.into_node().into_type());
    Parsed::node(
        range,
        Node::Type(Type {
            range,
            kind: TypeKind::Function { params, ret },
        }),
    )
}

fn variable_type(value: Parsed) -> Parsed {
    let range = value.range();
    let name = value.into_node().into_ident();
    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Parsed::error(range, "Expected lowercase identifier for variable type");
    }
    Parsed::node(
        range,
        Node::Type(Type {
            range,
            kind: TypeKind::Variable { name },
        }),
    )
}

fn named_type(value: Parsed) -> Parsed {
    let range = value.range();
    let [name, args] = value.into_array();
    let name_range = name.range();
    let args = if args.is_skipped() {
        Vec::new()
    } else {
        args.into_values()
            .into_iter()
            .map(|v| v.into_node().into_type())
            .collect()
    };
    Parsed::node(
        range,
        Node::Type(Type {
            range,
            kind: TypeKind::Named {
                name: name.into_node().into_ident(),
                name_range,
                args,
            },
        }),
    )
}

fn record_type(value: Parsed) -> Parsed {
    let range = value.range();
    let fields = value
        .into_values()
        .into_iter()
        .map(|field| {
            let [name, ty] = field.into_array();
            let name_range = name.range();
            TypeField {
                name: name.into_node().into_ident(),
                name_range,
                ty: ty.into_node().into_type(),
            }
        })
        .collect();
    Parsed::node(
        range,
        Node::Type(Type {
            range,
            kind: TypeKind::Record { fields },
        }),
    )
}

fn tuple_type(value: Parsed) -> Parsed {
    let range = value.range();
    let mut items: Vec<Type> = value
        .into_values()
        .into_iter()
        .map(|v| v.into_node().into_type())
        .collect();
    // a one-element tuple is just parenthesized grouping
    if items.len() == 1 {
        let inner = items.remove(0);
        return Parsed::node(range, Node::Type(inner));
    }
    Parsed::node(
        range,
        Node::Type(Type {
            range,
            kind: TypeKind::Tuple { items },
        }),
    )
}

fn unit_type(value: Parsed) -> Parsed {
    let range = value.range();
    Parsed::node(
        range,
        Node::Type(Type {
            range,
            kind: TypeKind::Unit,
        }),
    )
}
