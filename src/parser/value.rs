//! # Parse Values
//!
//! Every combinator returns a [`Parsed`] value: either an error or a piece
//! of recognized input. Errors are ordinary values, never panics — a failed
//! parse produces exactly one [`Parsed::Error`] describing the furthest
//! point reached.
//!
//! Primitive combinators produce [`Parsed::Token`] spans over the source;
//! composition combinators collect them into [`Parsed::Sequence`]; grammar
//! maps replace raw values with typed [`Parsed::Node`] payloads carrying
//! finished AST pieces.

use crate::ast::{
    DataConstructor, DataConstructorParam, Declaration, Expression, File, FunctionSignature,
    Import, Literal, Pattern, Type,
};
use crate::span::{Location, Range};

/// What a span-producing primitive recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Exact,
    WhiteSpace,
    SingleLineComment,
    MultiLineComment,
    Entity,
    StringLiteral,
    Eof,
}

/// The result of one combinator application.
#[derive(Debug, Clone)]
pub enum Parsed<'s> {
    /// The combinator failed. The range covers the attempted region; an
    /// error raised outside parsing (e.g. unreadable file) carries the
    /// zero sentinel range.
    Error { range: Range, message: String },
    /// A span of recognized source text.
    Token {
        kind: TokenKind,
        range: Range,
        text: &'s str,
    },
    /// A numeric lexeme with both of its possible readings. `42` is both
    /// an integer and a float; `3.14` only a float.
    Number {
        range: Range,
        is_int: bool,
        int: i64,
        is_float: bool,
        float: f64,
    },
    /// A zero-width placeholder from `optional` when the inner rule did
    /// not match.
    Skipped { range: Range },
    /// A whitespace/comment run consumed by `ignore_any`.
    Ignored { range: Range, text: &'s str },
    /// The collected sub-values of a composite rule.
    Sequence {
        range: Range,
        values: Vec<Parsed<'s>>,
    },
    /// A typed payload produced by a grammar map.
    Node { range: Range, node: Node<'s> },
}

impl<'s> Parsed<'s> {
    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Parsed::Error {
            range,
            message: message.into(),
        }
    }

    /// An error with no position, for failures outside parsing.
    pub fn error_unpositioned(message: impl Into<String>) -> Self {
        Parsed::Error {
            range: Range::default(),
            message: message.into(),
        }
    }

    pub fn skipped_at(location: Location) -> Self {
        Parsed::Skipped {
            range: Range::empty_at(location),
        }
    }

    pub fn node(range: Range, node: Node<'s>) -> Self {
        Parsed::Node { range, node }
    }

    pub fn range(&self) -> Range {
        match self {
            Parsed::Error { range, .. }
            | Parsed::Token { range, .. }
            | Parsed::Number { range, .. }
            | Parsed::Skipped { range }
            | Parsed::Ignored { range, .. }
            | Parsed::Sequence { range, .. }
            | Parsed::Node { range, .. } => *range,
        }
    }

    pub fn has_error(&self) -> bool {
        matches!(self, Parsed::Error { .. })
    }

    pub fn has_value(&self) -> bool {
        !self.has_error()
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Parsed::Skipped { .. })
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Parsed::Ignored { .. })
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        match self {
            Parsed::Token { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The recognized text of a token or ignored run.
    pub fn text(&self) -> &'s str {
        match self {
            Parsed::Token { text, .. } | Parsed::Ignored { text, .. } => *text,
            _ => unreachable!("value carries no text"),
        }
    }

    /// Unwrap a sequence's sub-values. Grammar maps call this on values
    /// whose shape the rule they map over guarantees.
    pub fn into_values(self) -> Vec<Parsed<'s>> {
        match self {
            Parsed::Sequence { values, .. } => values,
            _ => unreachable!("expected a sequence value"),
        }
    }

    /// Unwrap a sequence with a statically known arity.
    pub fn into_array<const N: usize>(self) -> [Parsed<'s>; N] {
        match <[Parsed<'s>; N]>::try_from(self.into_values()) {
            Ok(values) => values,
            Err(_) => unreachable!("sequence arity mismatch"),
        }
    }

    pub fn into_node(self) -> Node<'s> {
        match self {
            Parsed::Node { node, .. } => node,
            _ => unreachable!("expected a typed node value"),
        }
    }
}

/// Typed payloads carried by [`Parsed::Node`]. One variant per domain
/// value that flows between grammar rules; the closed enum replaces the
/// downcasting a dynamically-typed value model would need.
#[derive(Debug, Clone)]
pub enum Node<'s> {
    Ident(&'s str),
    QualifiedIdent(&'s str),
    InfixIdent(&'s str),
    Literal(Literal<'s>),
    Type(Type<'s>),
    Pattern(Pattern<'s>),
    Expression(Expression<'s>),
    Signature(FunctionSignature<'s>),
    Import(Import<'s>),
    Declaration(Declaration<'s>),
    Constructor(DataConstructor<'s>),
    ConstructorParam(DataConstructorParam<'s>),
    File(File<'s>),
}

impl<'s> Node<'s> {
    pub fn into_ident(self) -> &'s str {
        match self {
            Node::Ident(name) | Node::QualifiedIdent(name) | Node::InfixIdent(name) => name,
            _ => unreachable!("expected an identifier node"),
        }
    }

    pub fn into_literal(self) -> Literal<'s> {
        match self {
            Node::Literal(value) => value,
            _ => unreachable!("expected a literal node"),
        }
    }

    pub fn into_type(self) -> Type<'s> {
        match self {
            Node::Type(ty) => ty,
            _ => unreachable!("expected a type node"),
        }
    }

    pub fn into_pattern(self) -> Pattern<'s> {
        match self {
            Node::Pattern(pattern) => pattern,
            _ => unreachable!("expected a pattern node"),
        }
    }

    pub fn into_expression(self) -> Expression<'s> {
        match self {
            Node::Expression(expression) => expression,
            _ => unreachable!("expected an expression node"),
        }
    }

    pub fn into_signature(self) -> FunctionSignature<'s> {
        match self {
            Node::Signature(signature) => signature,
            _ => unreachable!("expected a signature node"),
        }
    }

    pub fn into_import(self) -> Import<'s> {
        match self {
            Node::Import(import) => import,
            _ => unreachable!("expected an import node"),
        }
    }

    pub fn into_declaration(self) -> Declaration<'s> {
        match self {
            Node::Declaration(declaration) => declaration,
            _ => unreachable!("expected a declaration node"),
        }
    }

    pub fn into_constructor(self) -> DataConstructor<'s> {
        match self {
            Node::Constructor(constructor) => constructor,
            _ => unreachable!("expected a constructor node"),
        }
    }

    pub fn into_constructor_param(self) -> DataConstructorParam<'s> {
        match self {
            Node::ConstructorParam(param) => param,
            _ => unreachable!("expected a constructor parameter node"),
        }
    }

    pub fn into_file(self) -> File<'s> {
        match self {
            Node::File(file) => file,
            _ => unreachable!("expected a file node"),
        }
    }
}
