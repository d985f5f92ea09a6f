//! # Parser
//!
//! The combinator engine ([`combinators`]), the values it produces
//! ([`value`]), the Lyre grammar ([`grammar`]) and the public parse
//! entry points.

pub mod combinators;
pub mod grammar;
pub mod value;

pub use combinators::{Parser, Rule, RECURSION_LIMIT};
pub use grammar::Grammar;
pub use value::{Node, Parsed, TokenKind};

use log::debug;
use thiserror::Error;

use crate::ast::{Expression, File};
use crate::reader::Reader;
use crate::span::Range;

/// A parse failure: the furthest point the parser reached, and why it
/// stopped there. Errors raised outside parsing carry the zero range.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub range: Range,
    pub message: String,
}

/// Parse a complete source file. The returned tree borrows identifiers
/// from `source`, so the buffer must outlive it.
pub fn parse(source: &str) -> Result<File<'_>, ParseError> {
    let grammar = Grammar::new();
    let mut reader = Reader::new(source);
    match grammar.file.parse(&mut reader) {
        Parsed::Error { range, message } => {
            debug!("parse failed at {}: {message}", range.start);
            Err(ParseError { range, message })
        }
        value => {
            let file = value.into_node().into_file();
            debug!(
                "parsed module {} ({} imports, {} declarations)",
                file.module,
                file.imports.len(),
                file.declarations.len()
            );
            Ok(file)
        }
    }
}

/// Parse a standalone expression, e.g. for tests or tooling.
pub fn parse_expression(source: &str) -> Result<Expression<'_>, ParseError> {
    let grammar = Grammar::new();
    let mut reader = Reader::new(source);
    match grammar.expression.parse(&mut reader) {
        Parsed::Error { range, message } => Err(ParseError { range, message }),
        value => Ok(value.into_node().into_expression()),
    }
}
