//! # Syntax Tree
//!
//! The tree produced by the parser, mirroring the source as written: no
//! name resolution, no precedence rebalancing, no desugaring. Every node
//! carries the source [`Range`] it was parsed from, and every identifier
//! borrows its bytes from the source buffer — the buffer must outlive the
//! tree.
//!
//! The tree is split by syntactic category:
//!
//! - Top level — [`File`], [`Import`], [`Declaration`] (this module)
//! - [`expression`] — the expression sublanguage
//! - [`pattern`] — patterns for parameters, lets and `select` cases
//! - [`types`] — type expressions and annotations

use crate::span::Range;

pub mod expression;
pub mod pattern;
pub mod types;

pub use expression::{Expression, ExpressionKind, Field, InfixOp, Literal, SelectCase};
pub use pattern::{FieldPattern, Pattern, PatternKind};
pub use types::{Type, TypeField, TypeKind};

/// A parsed source file: module header, imports, declarations.
#[derive(Debug, Clone)]
pub struct File<'s> {
    pub module: &'s str,
    pub module_range: Range,
    pub imports: Vec<Import<'s>>,
    pub declarations: Vec<Declaration<'s>>,
}

/// `import Qualified.Name [as Alias] [exposing (* | (a, b, ...))]`
#[derive(Debug, Clone)]
pub struct Import<'s> {
    pub range: Range,
    pub module: &'s str,
    pub alias: Option<&'s str>,
    pub expose_all: bool,
    pub expose: Vec<&'s str>,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Declaration<'s> {
    Alias(Alias<'s>),
    Infix(Infix<'s>),
    Data(Data<'s>),
    Function(Function<'s>),
}

impl<'s> Declaration<'s> {
    pub fn range(&self) -> Range {
        match self {
            Declaration::Alias(a) => a.range,
            Declaration::Infix(i) => i.range,
            Declaration::Data(d) => d.range,
            Declaration::Function(f) => f.range,
        }
    }

    pub fn name(&self) -> &'s str {
        match self {
            Declaration::Alias(a) => a.name,
            Declaration::Infix(i) => i.name,
            Declaration::Data(d) => d.name,
            Declaration::Function(f) => f.name,
        }
    }
}

/// `alias [hidden] [native] Name[params] [= Type]`
///
/// A native alias carries no aliased type; a non-native one always does.
#[derive(Debug, Clone)]
pub struct Alias<'s> {
    pub range: Range,
    pub name: &'s str,
    pub name_range: Range,
    pub hidden: bool,
    pub type_params: Vec<&'s str>,
    pub aliased: Option<Type<'s>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    None,
    Right,
}

/// `infix [hidden] (op) : (left|right|non N) = function`
#[derive(Debug, Clone)]
pub struct Infix<'s> {
    pub range: Range,
    pub name: &'s str,
    pub name_range: Range,
    pub hidden: bool,
    pub associativity: Associativity,
    pub precedence: i64,
    pub alias_of: &'s str,
}

/// `type [hidden] Name[params] = [|] Ctor | Ctor | ...`
#[derive(Debug, Clone)]
pub struct Data<'s> {
    pub range: Range,
    pub name: &'s str,
    pub name_range: Range,
    pub hidden: bool,
    pub type_params: Vec<&'s str>,
    pub constructors: Vec<DataConstructor<'s>>,
}

/// One constructor of a data declaration: `[hidden] Name[(param, ...)]`.
#[derive(Debug, Clone)]
pub struct DataConstructor<'s> {
    pub range: Range,
    pub name: &'s str,
    pub name_range: Range,
    pub hidden: bool,
    pub params: Vec<DataConstructorParam<'s>>,
}

/// A constructor parameter, `[name :] Type`.
#[derive(Debug, Clone)]
pub struct DataConstructorParam<'s> {
    pub range: Range,
    pub name: Option<&'s str>,
    pub name_range: Range,
    pub ty: Type<'s>,
}

/// `def [hidden] [native] name(params) [: Type] [= body]`
///
/// Covers all four definition forms. A native definition has no body and
/// always carries a type; an unannotated constant carries neither.
#[derive(Debug, Clone)]
pub struct Function<'s> {
    pub range: Range,
    pub name: &'s str,
    pub name_range: Range,
    pub hidden: bool,
    pub params: Vec<Pattern<'s>>,
    pub ty: Option<Type<'s>>,
    pub body: Option<Expression<'s>>,
}

/// The head of a function definition: name, parameter patterns and an
/// optional return type. Shared between `def` and `let` functions.
#[derive(Debug, Clone)]
pub struct FunctionSignature<'s> {
    pub range: Range,
    pub name: &'s str,
    pub name_range: Range,
    pub params: Vec<Pattern<'s>>,
    pub return_type: Option<Type<'s>>,
}
