//! Top-level rules: module header, imports, the four declaration forms,
//! and the file rule.

use crate::ast::{
    Alias, Associativity, Data, DataConstructor, DataConstructorParam, Declaration, File, Function,
    FunctionSignature, Import, Infix, Type, TypeKind,
};
use crate::parser::combinators::{
    all, delimited, eof, exact, label, map, number_literal, one_of, optional, optional_branch,
    repeat, Rule,
};
use crate::parser::value::{Node, Parsed};

use super::common::{optional_idents, optional_type, second, Common};
use super::pattern::PatternRules;
use super::types::TypeRules;

pub fn build(common: &Common, types: &TypeRules, patterns: &PatternRules, expression: &Rule) -> Rule {
    let ws = &common.ws;

    let module = map(
        all(vec![
            exact("module", Some(ws.clone())),
            common.qualified_identifier.clone(),
        ]),
        second,
    );

    let exposing = one_of(
        vec![
            exact("*", Some(ws.clone())),
            delimited(
                common.identifier.clone(),
                Some(exact("(", Some(ws.clone()))),
                exact(")", Some(ws.clone())),
                exact(",", Some(ws.clone())),
                Some(ws.clone()),
            ),
        ],
        Some(ws.clone()),
    );
    let import = map(
        all(vec![
            exact("import", Some(ws.clone())),
            common.qualified_identifier.clone(),
            optional(all(vec![
                exact("as", Some(ws.clone())),
                common.identifier.clone(),
            ])),
            optional(all(vec![exact("exposing", Some(ws.clone())), exposing])),
        ]),
        import_declaration,
    );
    let imports = repeat(exact("import", Some(ws.clone())), import, Some(ws.clone()), true);

    // alias: the native branch has no bound type, the plain one requires it
    let alias = map(
        all(vec![
            exact("alias", Some(ws.clone())),
            optional(exact("hidden", Some(ws.clone()))),
            optional_branch(
                exact("native", Some(ws.clone())),
                Some(all(vec![
                    common.identifier.clone(),
                    optional(common.type_parameters.clone()),
                ])),
                Some(all(vec![
                    common.identifier.clone(),
                    optional(common.type_parameters.clone()),
                    exact("=", Some(ws.clone())),
                    types.ty.clone(),
                ])),
            ),
        ]),
        alias_declaration,
    );

    let infix = map(
        all(vec![
            exact("infix", Some(ws.clone())),
            optional(exact("hidden", Some(ws.clone()))),
            common.wrapped_infix_identifier.clone(),
            exact(":", Some(ws.clone())),
            exact("(", Some(ws.clone())),
            one_of(
                vec![
                    exact("left", Some(ws.clone())),
                    exact("right", Some(ws.clone())),
                    exact("non", Some(ws.clone())),
                ],
                Some(ws.clone()),
            ),
            number_literal(Some(ws.clone())),
            exact(")", Some(ws.clone())),
            exact("=", Some(ws.clone())),
            common.identifier.clone(),
        ]),
        infix_declaration,
    );

    let constructor_params = delimited(
        map(
            all(vec![
                optional(all(vec![
                    common.identifier.clone(),
                    exact(":", Some(ws.clone())),
                ])),
                types.ty.clone(),
            ]),
            constructor_param,
        ),
        Some(exact("(", Some(ws.clone()))),
        exact(")", Some(ws.clone())),
        exact(",", Some(ws.clone())),
        Some(ws.clone()),
    );
    // the leading bar is optional on the first constructor only
    let first_constructor = map(
        all(vec![
            optional(exact("|", Some(ws.clone()))),
            optional(exact("hidden", Some(ws.clone()))),
            common.identifier.clone(),
            optional(constructor_params.clone()),
        ]),
        constructor_declaration,
    );
    let next_constructor = map(
        all(vec![
            exact("|", Some(ws.clone())),
            optional(exact("hidden", Some(ws.clone()))),
            common.identifier.clone(),
            optional(constructor_params),
        ]),
        constructor_declaration,
    );
    let data = map(
        all(vec![
            exact("type", Some(ws.clone())),
            optional(exact("hidden", Some(ws.clone()))),
            common.identifier.clone(),
            optional(common.type_parameters.clone()),
            exact("=", Some(ws.clone())),
            first_constructor,
            repeat(
                exact("|", Some(ws.clone())),
                next_constructor,
                Some(ws.clone()),
                true,
            ),
        ]),
        data_declaration,
    );

    // def resolves to one of four shapes; the native keyword switches
    // which pair of shapes is allowed
    let native_branch = one_of(
        vec![
            all(vec![common.identifier.clone(), types.annotation.clone()]),
            all(vec![patterns.signature.clone()]),
        ],
        Some(ws.clone()),
    );
    let body_bind = label(exact("=", Some(ws.clone())), "Expected definition body");
    let normal_branch = one_of(
        vec![
            all(vec![
                common.identifier.clone(),
                optional(types.annotation.clone()),
                body_bind.clone(),
                expression.clone(),
            ]),
            all(vec![
                patterns.signature.clone(),
                body_bind,
                expression.clone(),
            ]),
        ],
        Some(ws.clone()),
    );
    let function = map(
        all(vec![
            exact("def", Some(ws.clone())),
            optional(exact("hidden", Some(ws.clone()))),
            optional_branch(
                exact("native", Some(ws.clone())),
                Some(native_branch),
                Some(normal_branch),
            ),
        ]),
        function_declaration,
    );

    let declarations = repeat(
        one_of(
            vec![
                exact("alias", Some(ws.clone())),
                exact("infix", Some(ws.clone())),
                exact("type", Some(ws.clone())),
                exact("def", Some(ws.clone())),
            ],
            Some(ws.clone()),
        ),
        one_of(vec![alias, infix, data, function], Some(ws.clone())),
        Some(ws.clone()),
        true,
    );

    map(
        all(vec![module, imports, declarations, eof(Some(ws.clone()))]),
        file_node,
    )
}

fn unpack<'s, const N: usize>(values: Vec<Parsed<'s>>) -> [Parsed<'s>; N] {
    match <[Parsed<'s>; N]>::try_from(values) {
        Ok(values) => values,
        Err(_) => unreachable!("sequence arity mismatch"),
    }
}

fn import_declaration(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, module, alias, exposing] = value.into_array();

    let alias = if alias.is_skipped() {
        None
    } else {
        let [_, name] = alias.into_array();
        Some(name.into_node().into_ident())
    };

    let (expose_all, expose) = if exposing.is_skipped() {
        (false, Vec::new())
    } else {
        let [_, listing] = exposing.into_array();
        match listing {
            Parsed::Token { .. } => (true, Vec::new()),
            listing => (
                false,
                listing
                    .into_values()
                    .into_iter()
                    .map(|v| v.into_node().into_ident())
                    .collect(),
            ),
        }
    };

    Parsed::node(
        range,
        Node::Import(Import {
            range,
            module: module.into_node().into_ident(),
            alias,
            expose_all,
            expose,
        }),
    )
}

fn alias_declaration(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, hidden, branch] = value.into_array();
    let hidden = !hidden.is_skipped();

    let values = branch.into_values();
    let (name, params, aliased) = match values.len() {
        2 => {
            let [name, params] = unpack(values);
            (name, params, None)
        }
        _ => {
            let [name, params, _, ty] = unpack(values);
            (name, params, Some(ty.into_node().into_type()))
        }
    };

    let name_range = name.range();
    Parsed::node(
        range,
        Node::Declaration(Declaration::Alias(Alias {
            range,
            name: name.into_node().into_ident(),
            name_range,
            hidden,
            type_params: optional_idents(params),
            aliased,
        })),
    )
}

fn infix_declaration(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, hidden, op, _, _, assoc, precedence, _, _, target] = value.into_array();

    let Parsed::Number {
        range: precedence_range,
        is_int,
        int,
        ..
    } = precedence
    else {
        unreachable!("expected a number value");
    };
    if !is_int {
        return Parsed::error(
            precedence_range,
            "Expected integer for infix operator precedence",
        );
    }

    let associativity = match assoc.text() {
        "left" => Associativity::Left,
        "right" => Associativity::Right,
        _ => Associativity::None,
    };

    let name_range = op.range();
    Parsed::node(
        range,
        Node::Declaration(Declaration::Infix(Infix {
            range,
            name: op.into_node().into_ident(),
            name_range,
            hidden: !hidden.is_skipped(),
            associativity,
            precedence: int,
            alias_of: target.into_node().into_ident(),
        })),
    )
}

fn constructor_param(value: Parsed) -> Parsed {
    let range = value.range();
    let [name, ty] = value.into_array();
    let (name, name_range) = if name.is_skipped() {
        (None, name.range())
    } else {
        let [ident, _] = name.into_array();
        let ident_range = ident.range();
        (Some(ident.into_node().into_ident()), ident_range)
    };
    Parsed::node(
        range,
        Node::ConstructorParam(DataConstructorParam {
            range,
            name,
            name_range,
            ty: ty.into_node().into_type(),
        }),
    )
}

fn constructor_declaration(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, hidden, name, params] = value.into_array();
    let name_range = name.range();
    let params = if params.is_skipped() {
        Vec::new()
    } else {
        params
            .into_values()
            .into_iter()
            .map(|v| v.into_node().into_constructor_param())
            .collect()
    };
    Parsed::node(
        range,
        Node::Constructor(DataConstructor {
            range,
            name: name.into_node().into_ident(),
            name_range,
            hidden: !hidden.is_skipped(),
            params,
        }),
    )
}

fn data_declaration(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, hidden, name, params, _, first, rest] = value.into_array();

    let mut constructors = vec![first.into_node().into_constructor()];
    constructors.extend(
        rest.into_values()
            .into_iter()
            .map(|v| v.into_node().into_constructor()),
    );

    let name_range = name.range();
    Parsed::node(
        range,
        Node::Declaration(Declaration::Data(Data {
            range,
            name: name.into_node().into_ident(),
            name_range,
            hidden: !hidden.is_skipped(),
            type_params: optional_idents(params),
            constructors,
        })),
    )
}

/// `FunctionType` synthesized from a fully annotated signature; `None`
/// when any annotation is missing.
fn synthesized_type<'s>(signature: &FunctionSignature<'s>) -> Option<Type<'s>> {
    let ret = signature.return_type.clone()?;
    let mut params = Vec::with_capacity(signature.params.len());
    for param in &signature.params {
        params.push(param.ty.clone()?);
    }
    Some(Type {
        range: signature.range,
        kind: TypeKind::Function {
            params,
            ret: Box::new(ret),
        },
    })
}

fn function_declaration(value: Parsed) -> Parsed {
    let range = value.range();
    let [_, hidden, branch] = value.into_array();
    let hidden = !hidden.is_skipped();

    let values = branch.into_values();
    let function = match values.len() {
        // native function: a complete signature, no body
        1 => {
            let [signature] = unpack(values);
            let signature = signature.into_node().into_signature();
            let Some(ty) = synthesized_type(&signature) else {
                return Parsed::error(signature.range, "Expected type annotation");
            };
            Function {
                range,
                name: signature.name,
                name_range: signature.name_range,
                hidden,
                params: signature.params,
                ty: Some(ty),
                body: None,
            }
        }
        // native constant: name and type, no body
        2 => {
            let [name, ty] = unpack(values);
            let name_range = name.range();
            Function {
                range,
                name: name.into_node().into_ident(),
                name_range,
                hidden,
                params: Vec::new(),
                ty: Some(ty.into_node().into_type()),
                body: None,
            }
        }
        // function: signature and body
        3 => {
            let [signature, _, body] = unpack(values);
            let signature = signature.into_node().into_signature();
            let ty = synthesized_type(&signature);
            Function {
                range,
                name: signature.name,
                name_range: signature.name_range,
                hidden,
                params: signature.params,
                ty,
                body: Some(body.into_node().into_expression()),
            }
        }
        // constant: name, optional type, body
        4 => {
            let [name, annotation, _, body] = unpack(values);
            let name_range = name.range();
            Function {
                range,
                name: name.into_node().into_ident(),
                name_range,
                hidden,
                params: Vec::new(),
                ty: optional_type(annotation),
                body: Some(body.into_node().into_expression()),
            }
        }
        _ => unreachable!("definition branch arity mismatch"),
    };

    Parsed::node(range, Node::Declaration(Declaration::Function(function)))
}

fn file_node(value: Parsed) -> Parsed {
    let range = value.range();
    let [module, imports, declarations, _] = value.into_array();
    let module_range = module.range();
    Parsed::node(
        range,
        Node::File(File {
            module: module.into_node().into_ident(),
            module_range,
            imports: imports
                .into_values()
                .into_iter()
                .map(|v| v.into_node().into_import())
                .collect(),
            declarations: declarations
                .into_values()
                .into_iter()
                .map(|v| v.into_node().into_declaration())
                .collect(),
        }),
    )
}
