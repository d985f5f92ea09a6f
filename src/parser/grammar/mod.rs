//! Grammar for the Lyre language
//!
//! Rules are grouped by category:
//! - `common`: whitespace/comment handling, identifiers, literal constants
//! - `types`: type expressions and annotations
//! - `pattern`: patterns and function signatures
//! - `expression`: the expression sublanguage
//! - `declaration`: module header, imports, declarations, the file rule
//!
//! Construction order follows the dependency chain; recursive rules are
//! forward-declared and their alternatives installed once every referent
//! exists.

mod common;
mod declaration;
mod expression;
mod pattern;
mod types;

use log::trace;

use crate::parser::combinators::Rule;

use common::Common;

/// The wired-up rule set. Construct once per parse (or share; rules hold
/// no parse state).
pub struct Grammar {
    /// The whole-file rule: module, imports, declarations, end of input.
    pub file: Rule,
    /// A standalone expression.
    pub expression: Rule,
    /// A standalone pattern.
    pub pattern: Rule,
    /// A standalone type expression.
    pub ty: Rule,
    /// The ambient whitespace-and-comments eater.
    pub whitespace: Rule,
}

impl Grammar {
    pub fn new() -> Grammar {
        trace!("wiring grammar rules");
        let common = Common::new();
        let types = types::build(&common);
        let patterns = pattern::build(&common, &types);
        let expression = expression::build(&common, &types, &patterns);
        let file = declaration::build(&common, &types, &patterns, &expression);

        Grammar {
            file,
            expression,
            pattern: patterns.pattern,
            ty: types.ty,
            whitespace: common.ws,
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}
