//! # Parser Combinators
//!
//! The engine the grammar is built from. A combinator is a value
//! implementing [`Parser`]; rules are composed by value and shared behind
//! [`Rc`], so one whitespace rule can be referenced by every terminal.
//!
//! Two invariants hold at every combinator boundary:
//!
//! 1. **Rewind on failure.** A combinator either succeeds and leaves the
//!    reader after the consumed input, or fails and restores the reader to
//!    the exact position it was called at. Alternation depends on this;
//!    a combinator that fails without rewinding poisons every later
//!    alternative.
//! 2. **Furthest error wins.** When every alternative of [`one_of`] fails,
//!    the error whose range starts furthest into the input is returned —
//!    the alternative that got the deepest before failing is the one the
//!    user was most likely writing.
//!
//! Recursive rules are tied with [`ForwardDeclaration`], which also guards
//! against runaway recursion with a hard depth cap.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::reader::Reader;
use crate::span::{Location, Range};

use super::value::{Parsed, TokenKind};

/// Recursion cap for each [`ForwardDeclaration`] instance.
pub const RECURSION_LIMIT: usize = 256;

/// A composable parser. Implementations hold their configuration and no
/// mutable state; the reader is the only thing a parse mutates.
pub trait Parser {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s>;
}

/// A shared, reference-counted rule.
pub type Rule = Rc<dyn Parser>;

/// Transforms a parsed value into another; may reject it with an error.
pub type Mapper = for<'s> fn(Parsed<'s>) -> Parsed<'s>;

/// Verdict of an [`entity`] aggregator for one more codepoint.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub valid: bool,
    pub complete: bool,
}

/// Character-by-character recognizer driving [`entity`]. Receives the text
/// accumulated so far and the next codepoint (`0` at end of input).
pub type Aggregator = fn(&str, u32) -> Step;

fn skip_ws(ws: &Option<Rule>, reader: &mut Reader) {
    if let Some(ws) = ws {
        ws.parse(reader);
    }
}

fn rewind_with_error<'s>(
    reader: &mut Reader<'s>,
    origin: Location,
    range: Range,
    message: impl Into<String>,
) -> Parsed<'s> {
    reader.set_location(origin);
    Parsed::error(range, message)
}

// === Primitive combinators ===

struct Exact {
    target: &'static str,
    ws: Option<Rule>,
}

impl Parser for Exact {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let origin = reader.location();
        skip_ws(&self.ws, reader);
        let start = reader.location();

        for expected in self.target.chars() {
            if reader.current_char() != u32::from(expected) || !reader.advance() {
                let range = Range::new(start, reader.location());
                return rewind_with_error(
                    reader,
                    origin,
                    range,
                    format!("Expected '{}'", self.target),
                );
            }
        }

        let range = Range::new(start, reader.location());
        Parsed::Token {
            kind: TokenKind::Exact,
            range,
            text: reader.sub(range),
        }
    }
}

/// Match `target` codepoint by codepoint.
pub fn exact(target: &'static str, ws: Option<Rule>) -> Rule {
    Rc::new(Exact { target, ws })
}

struct WhiteSpace;

impl Parser for WhiteSpace {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let start = reader.location();

        while let Some(c) = char::from_u32(reader.current_char()) {
            if !c.is_whitespace() || !reader.advance() {
                break;
            }
        }

        if reader.location() > start {
            let range = Range::new(start, reader.location());
            Parsed::Token {
                kind: TokenKind::WhiteSpace,
                range,
                text: reader.sub(range),
            }
        } else {
            Parsed::error(Range::empty_at(start), "Expected whitespace")
        }
    }
}

/// One or more Unicode whitespace codepoints.
pub fn whitespace() -> Rule {
    Rc::new(WhiteSpace)
}

struct SingleLineComment {
    prefix: Exact,
}

impl Parser for SingleLineComment {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let prefix = self.prefix.parse(reader);
        if prefix.has_error() {
            return prefix;
        }

        while reader.current_char() != u32::from('\n') && reader.advance() {}

        let range = Range::new(prefix.range().start, reader.location());
        Parsed::Token {
            kind: TokenKind::SingleLineComment,
            range,
            text: reader.sub(range),
        }
    }
}

/// `prefix` followed by everything up to the end of the line.
pub fn single_line_comment(prefix: &'static str, ws: Option<Rule>) -> Rule {
    Rc::new(SingleLineComment {
        prefix: Exact { target: prefix, ws },
    })
}

struct MultiLineComment {
    open: Exact,
    close: Exact,
}

impl Parser for MultiLineComment {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let origin = reader.location();

        let open = self.open.parse(reader);
        if open.has_error() {
            return open;
        }

        loop {
            let close = self.close.parse(reader);
            if close.has_value() {
                break;
            }
            if !reader.advance() {
                // ran off the end of the input before the terminator
                reader.set_location(origin);
                return close;
            }
        }

        let range = Range::new(open.range().start, reader.location());
        Parsed::Token {
            kind: TokenKind::MultiLineComment,
            range,
            text: reader.sub(range),
        }
    }
}

/// `open` followed by anything up to and including `close`. Not nesting.
pub fn multi_line_comment(open: &'static str, close: &'static str, ws: Option<Rule>) -> Rule {
    Rc::new(MultiLineComment {
        open: Exact { target: open, ws },
        close: Exact {
            target: close,
            ws: None,
        },
    })
}

struct IgnoreAny {
    tokens: Vec<Rule>,
    ws: Option<Rule>,
}

impl Parser for IgnoreAny {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let start = reader.location();
        skip_ws(&self.ws, reader);

        let mut consumed = true;
        while consumed {
            consumed = false;
            for token in &self.tokens {
                skip_ws(&self.ws, reader);
                if token.parse(reader).has_value() {
                    consumed = true;
                    break;
                }
            }
        }

        let range = Range::new(start, reader.location());
        Parsed::Ignored {
            range,
            text: reader.sub(range),
        }
    }
}

/// Repeatedly consume any of `tokens` until none matches. Never fails;
/// an empty run yields an empty span.
pub fn ignore_any(tokens: Vec<Rule>, ws: Option<Rule>) -> Rule {
    Rc::new(IgnoreAny { tokens, ws })
}

struct Entity {
    aggregator: Aggregator,
    ws: Option<Rule>,
}

impl Parser for Entity {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let origin = reader.location();
        skip_ws(&self.ws, reader);
        let start = reader.location();

        loop {
            let accumulated = reader.sub(Range::new(start, reader.location()));
            let step = (self.aggregator)(accumulated, reader.current_char());
            if step.complete {
                let range = Range::new(start, reader.location());
                if step.valid {
                    return Parsed::Token {
                        kind: TokenKind::Entity,
                        range,
                        text: reader.sub(range),
                    };
                }
                return rewind_with_error(reader, origin, range, "Invalid identifier");
            }
            if !reader.advance() {
                let range = Range::new(start, reader.location());
                return rewind_with_error(reader, origin, range, "Invalid identifier");
            }
        }
    }
}

/// Accumulate codepoints one at a time under control of `aggregator`.
pub fn entity(aggregator: Aggregator, ws: Option<Rule>) -> Rule {
    Rc::new(Entity { aggregator, ws })
}

struct StringLiteral {
    open: Exact,
    close: Exact,
    escape: Exact,
}

impl Parser for StringLiteral {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let origin = reader.location();

        let open = self.open.parse(reader);
        if open.has_error() {
            return open;
        }

        loop {
            if self.escape.parse(reader).has_value() {
                // the codepoint after the escape is content, whatever it is
                if !reader.advance() {
                    let range = Range::new(open.range().start, reader.location());
                    return rewind_with_error(
                        reader,
                        origin,
                        range,
                        format!("Expected '{}'", self.close.target),
                    );
                }
                continue;
            }
            let close = self.close.parse(reader);
            if close.has_value() {
                break;
            }
            if !reader.advance() {
                reader.set_location(origin);
                return close;
            }
        }

        let range = Range::new(open.range().start, reader.location());
        Parsed::Token {
            kind: TokenKind::StringLiteral,
            range,
            text: reader.sub(range),
        }
    }
}

/// A delimited literal with an escape character. The produced span covers
/// the whole lexeme, delimiters included.
pub fn string_literal(
    open: &'static str,
    close: &'static str,
    escape: &'static str,
    ws: Option<Rule>,
) -> Rule {
    Rc::new(StringLiteral {
        open: Exact { target: open, ws },
        close: Exact {
            target: close,
            ws: None,
        },
        escape: Exact {
            target: escape,
            ws: None,
        },
    })
}

struct NumberLiteral {
    ws: Option<Rule>,
}

impl NumberLiteral {
    fn digit(reader: &Reader) -> bool {
        char::from_u32(reader.current_char()).is_some_and(|c| c.is_ascii_digit())
    }
}

impl Parser for NumberLiteral {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let origin = reader.location();
        skip_ws(&self.ws, reader);
        let start = reader.location();

        if !Self::digit(reader) {
            let range = Range::empty_at(start);
            return rewind_with_error(reader, origin, range, "Expected number");
        }
        while Self::digit(reader) && reader.advance() {}

        // fractional part, only if a digit follows the dot
        if reader.current_char() == u32::from('.') {
            let before_dot = reader.location();
            reader.advance();
            if Self::digit(reader) {
                while Self::digit(reader) && reader.advance() {}
            } else {
                reader.set_location(before_dot);
            }
        }

        // exponent, only if digits follow
        if reader.current_char() == u32::from('e') || reader.current_char() == u32::from('E') {
            let before_exponent = reader.location();
            reader.advance();
            if reader.current_char() == u32::from('+') || reader.current_char() == u32::from('-') {
                reader.advance();
            }
            if Self::digit(reader) {
                while Self::digit(reader) && reader.advance() {}
            } else {
                reader.set_location(before_exponent);
            }
        }

        let range = Range::new(start, reader.location());
        let text = reader.sub(range);
        let int = text.parse::<i64>();
        let float = text.parse::<f64>();
        Parsed::Number {
            range,
            is_int: int.is_ok(),
            int: int.unwrap_or_default(),
            is_float: float.is_ok(),
            float: float.unwrap_or_default(),
        }
    }
}

/// A numeric lexeme, exposing both its integer and float readings.
pub fn number_literal(ws: Option<Rule>) -> Rule {
    Rc::new(NumberLiteral { ws })
}

struct Eof {
    ws: Option<Rule>,
}

impl Parser for Eof {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let origin = reader.location();
        skip_ws(&self.ws, reader);

        if reader.at_end() {
            return Parsed::Token {
                kind: TokenKind::Eof,
                range: Range::empty_at(reader.location()),
                text: "",
            };
        }
        let range = Range::empty_at(reader.location());
        rewind_with_error(reader, origin, range, "Expected end of file")
    }
}

/// Succeeds only at the end of the input.
pub fn eof(ws: Option<Rule>) -> Rule {
    Rc::new(Eof { ws })
}

// === Composition combinators ===

struct All {
    tokens: Vec<Rule>,
    filter: fn(&Parsed) -> bool,
}

fn keep_unignored(value: &Parsed) -> bool {
    !value.is_ignored()
}

impl Parser for All {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let start = reader.location();
        let mut values = Vec::with_capacity(self.tokens.len());

        for token in &self.tokens {
            let value = token.parse(reader);
            if value.has_error() {
                reader.set_location(start);
                return value;
            }
            if (self.filter)(&value) {
                values.push(value);
            }
        }

        Parsed::Sequence {
            range: Range::new(start, reader.location()),
            values,
        }
    }
}

/// Run every rule in order; the first failure rewinds and propagates.
/// Ignored whitespace runs are dropped from the collected values.
pub fn all(tokens: Vec<Rule>) -> Rule {
    Rc::new(All {
        tokens,
        filter: keep_unignored,
    })
}

/// [`all`] with a custom filter deciding which sub-values to keep.
pub fn all_filtered(tokens: Vec<Rule>, filter: fn(&Parsed) -> bool) -> Rule {
    Rc::new(All { tokens, filter })
}

struct OneOf {
    tokens: Vec<Rule>,
    ws: Option<Rule>,
}

impl Parser for OneOf {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let origin = reader.location();
        skip_ws(&self.ws, reader);

        let mut furthest: Option<Parsed<'s>> = None;
        for token in &self.tokens {
            let value = token.parse(reader);
            if value.has_value() {
                return value;
            }
            let is_further = furthest
                .as_ref()
                .is_none_or(|f| value.range().start > f.range().start);
            if is_further {
                furthest = Some(value);
            }
        }

        reader.set_location(origin);
        furthest.unwrap_or_else(|| Parsed::error(Range::empty_at(origin), "No alternative matched"))
    }
}

/// Try each rule in order; the first success wins. If all fail, the error
/// that starts furthest into the input is returned.
pub fn one_of(tokens: Vec<Rule>, ws: Option<Rule>) -> Rule {
    Rc::new(OneOf { tokens, ws })
}

struct Optional {
    token: Rule,
    dependent: Option<Rule>,
    alternative: Option<Rule>,
}

impl Parser for Optional {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let start = reader.location();

        let value = self.token.parse(reader);
        if value.has_error() {
            if let Some(alternative) = &self.alternative {
                let alt = alternative.parse(reader);
                if alt.has_error() {
                    reader.set_location(start);
                }
                return alt;
            }
            return Parsed::skipped_at(reader.location());
        }
        let Some(dependent) = &self.dependent else {
            return value;
        };
        let dep = dependent.parse(reader);
        if dep.has_error() {
            reader.set_location(start);
        }
        dep
    }
}

/// Try `token`; on failure, yield a zero-width skipped value instead.
pub fn optional(token: Rule) -> Rule {
    Rc::new(Optional {
        token,
        dependent: None,
        alternative: None,
    })
}

/// Two-way branch on a probe: if `token` matches, `dependent` must follow
/// and provides the value; otherwise `alternative` runs. A missing
/// `alternative` degrades to a skipped value, a missing `dependent` keeps
/// the probe's own value.
pub fn optional_branch(token: Rule, dependent: Option<Rule>, alternative: Option<Rule>) -> Rule {
    Rc::new(Optional {
        token,
        dependent,
        alternative,
    })
}

struct Delimited {
    item: Rule,
    prefix: Option<Rule>,
    suffix: Rule,
    separator: Rule,
    ws: Option<Rule>,
    first_item: Option<Rule>,
    allow_empty: bool,
    allow_separator_before_suffix: bool,
}

impl Parser for Delimited {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let start = reader.location();
        skip_ws(&self.ws, reader);

        if let Some(prefix) = &self.prefix {
            let value = prefix.parse(reader);
            if value.has_error() {
                reader.set_location(start);
                return value;
            }
        }

        let mut values = Vec::new();
        let mut first = true;
        loop {
            skip_ws(&self.ws, reader);
            let separator = self.separator.parse(reader);

            if separator.has_error()
                || self.allow_separator_before_suffix
                || !first
                || self.allow_empty
            {
                skip_ws(&self.ws, reader);
                if self.suffix.parse(reader).has_value() {
                    break;
                }
            }

            skip_ws(&self.ws, reader);
            let rule = match (&self.first_item, first) {
                (Some(first_item), true) => first_item,
                _ => &self.item,
            };
            let item = rule.parse(reader);
            if item.has_error() {
                reader.set_location(start);
                return item;
            }
            values.push(item);
            first = false;
        }

        Parsed::Sequence {
            range: Range::new(start, reader.location()),
            values,
        }
    }
}

/// A prefix-delimited, separator-separated, suffix-terminated sequence,
/// e.g. `(a, b, c)`. Yields the items only.
pub fn delimited(
    item: Rule,
    prefix: Option<Rule>,
    suffix: Rule,
    separator: Rule,
    ws: Option<Rule>,
) -> Rule {
    Rc::new(Delimited {
        item,
        prefix,
        suffix,
        separator,
        ws,
        first_item: None,
        allow_empty: false,
        allow_separator_before_suffix: false,
    })
}

/// [`delimited`] accepting the empty sequence (`()`, `[]`, `{}`).
pub fn delimited_empty(
    item: Rule,
    prefix: Option<Rule>,
    suffix: Rule,
    separator: Rule,
    ws: Option<Rule>,
) -> Rule {
    Rc::new(Delimited {
        item,
        prefix,
        suffix,
        separator,
        ws,
        first_item: None,
        allow_empty: true,
        allow_separator_before_suffix: false,
    })
}

/// Fully parameterized [`delimited`].
#[allow(clippy::too_many_arguments)]
pub fn delimited_full(
    item: Rule,
    prefix: Option<Rule>,
    suffix: Rule,
    separator: Rule,
    ws: Option<Rule>,
    first_item: Option<Rule>,
    allow_empty: bool,
    allow_separator_before_suffix: bool,
) -> Rule {
    Rc::new(Delimited {
        item,
        prefix,
        suffix,
        separator,
        ws,
        first_item,
        allow_empty,
        allow_separator_before_suffix,
    })
}

struct Repeat {
    guard: Rule,
    body: Rule,
    ws: Option<Rule>,
    allow_empty: bool,
}

impl Parser for Repeat {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let start = reader.location();
        skip_ws(&self.ws, reader);

        let mut values = Vec::new();
        loop {
            // peek the guard, then rewind regardless of its verdict
            let item_start = reader.location();
            skip_ws(&self.ws, reader);
            let guard = self.guard.parse(reader);
            reader.set_location(item_start);

            if guard.has_error() {
                if values.is_empty() && !self.allow_empty {
                    reader.set_location(start);
                    return guard;
                }
                break;
            }

            skip_ws(&self.ws, reader);
            let body = self.body.parse(reader);
            if body.has_error() {
                reader.set_location(start);
                return body;
            }
            values.push(body);
        }

        Parsed::Sequence {
            range: Range::new(start, reader.location()),
            values,
        }
    }
}

/// While `guard` matches (peeked, never consumed), parse `body`. A body
/// failure fails the whole sequence.
pub fn repeat(guard: Rule, body: Rule, ws: Option<Rule>, allow_empty: bool) -> Rule {
    Rc::new(Repeat {
        guard,
        body,
        ws,
        allow_empty,
    })
}

struct Map {
    token: Rule,
    mapper: Mapper,
}

impl Parser for Map {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let start = reader.location();
        let value = self.token.parse(reader);
        if value.has_error() {
            return value;
        }
        let mapped = (self.mapper)(value);
        if mapped.has_error() {
            // a rejected value must not leave the reader advanced
            reader.set_location(start);
        }
        mapped
    }
}

/// Transform the inner rule's value. The mapper may reject the value with
/// an error, e.g. for post-parse validation; the reader is rewound then.
pub fn map(token: Rule, mapper: Mapper) -> Rule {
    Rc::new(Map { token, mapper })
}

struct Label {
    token: Rule,
    message: &'static str,
}

impl Parser for Label {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        match self.token.parse(reader) {
            Parsed::Error { range, .. } => Parsed::error(range, self.message),
            value => value,
        }
    }
}

/// Replace the inner rule's error message, keeping its range.
pub fn label(token: Rule, message: &'static str) -> Rule {
    Rc::new(Label { token, message })
}

/// An indirection for recursive rules. Created empty, its alternatives
/// are installed once every referent exists; consuming it behaves like
/// [`one_of`] over the alternatives. A hard depth cap keeps pathological
/// recursion from overflowing the stack.
pub struct ForwardDeclaration {
    alternatives: RefCell<Vec<Rule>>,
    depth: Cell<usize>,
}

impl ForwardDeclaration {
    pub fn declare() -> Rc<ForwardDeclaration> {
        Rc::new(ForwardDeclaration {
            alternatives: RefCell::new(Vec::new()),
            depth: Cell::new(0),
        })
    }

    /// Install the alternatives. Must happen before the first `parse`.
    pub fn define(&self, alternatives: Vec<Rule>) {
        *self.alternatives.borrow_mut() = alternatives;
    }
}

impl Parser for ForwardDeclaration {
    fn parse<'s>(&self, reader: &mut Reader<'s>) -> Parsed<'s> {
        let depth = self.depth.get() + 1;
        if depth > RECURSION_LIMIT {
            return Parsed::error(
                Range::empty_at(reader.location()),
                "Recursion limit exceeded",
            );
        }
        self.depth.set(depth);

        let origin = reader.location();
        let mut furthest: Option<Parsed<'s>> = None;
        let mut result = None;
        for token in self.alternatives.borrow().iter() {
            let value = token.parse(reader);
            if value.has_value() {
                result = Some(value);
                break;
            }
            let is_further = furthest
                .as_ref()
                .is_none_or(|f| value.range().start > f.range().start);
            if is_further {
                furthest = Some(value);
            }
        }

        self.depth.set(depth - 1);
        result.unwrap_or_else(|| {
            reader.set_location(origin);
            furthest
                .unwrap_or_else(|| Parsed::error(Range::empty_at(origin), "No alternative matched"))
        })
    }
}
