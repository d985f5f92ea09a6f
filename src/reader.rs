//! # Source Reader
//!
//! A single-codepoint cursor over a UTF-8 source buffer. The reader is the
//! only mutable object involved in a parse: every combinator reads the
//! current character and location from it, advances it on success, and
//! restores it on failure.
//!
//! ## Backtracking
//!
//! Combinators save the current location before attempting a match and
//! restore it when the match fails:
//!
//! ```text
//! let start = reader.location();   // save
//! // ... attempt to parse ...
//! reader.set_location(start);      // rewind and let an alternative try
//! ```
//!
//! `set_location` only accepts locations previously observed on the same
//! reader, so the cursor always sits on a codepoint boundary.

use crate::span::{Location, Range};

/// Cursor over an immutable source buffer.
///
/// Tracks the absolute byte offset plus one-based line and column. The
/// column counts codepoints; a newline starts the next line at column 1.
pub struct Reader<'s> {
    source: &'s str,
    location: Location,
    current: u32,
    width: usize,
}

impl<'s> Reader<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut reader = Self {
            source,
            location: Location::new(0, 1, 1),
            current: 0,
            width: 0,
        };
        reader.peek();
        reader
    }

    /// The codepoint under the cursor, or `0` at end of input.
    pub fn current_char(&self) -> u32 {
        self.current
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn at_end(&self) -> bool {
        self.width == 0
    }

    /// Borrow the source bytes covered by `range`.
    pub fn sub(&self, range: Range) -> &'s str {
        &self.source[range.start.position..range.end.position]
    }

    /// Advance past the current codepoint, updating line and column.
    /// Returns `false` if the cursor is already at end of input.
    pub fn advance(&mut self) -> bool {
        if self.width == 0 {
            return false;
        }
        if self.current == u32::from('\n') {
            self.location.line += 1;
            self.location.column = 0;
        }
        self.location.column += 1;
        self.location.position += self.width;
        self.peek();
        true
    }

    /// Rewind (or fast-forward) to a location previously observed on this
    /// reader.
    pub fn set_location(&mut self, location: Location) {
        self.location = location;
        self.peek();
    }

    fn peek(&mut self) {
        match self.source[self.location.position..].chars().next() {
            Some(c) => {
                self.current = u32::from(c);
                self.width = c.len_utf8();
            }
            None => {
                self.current = 0;
                self.width = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lines_and_columns() {
        let mut reader = Reader::new("ab\ncd");
        assert_eq!(reader.location(), Location::new(0, 1, 1));
        assert!(reader.advance()); // past 'a'
        assert!(reader.advance()); // past 'b'
        assert_eq!(reader.location(), Location::new(2, 1, 3));
        assert!(reader.advance()); // past '\n'
        assert_eq!(reader.location(), Location::new(3, 2, 1));
        assert_eq!(reader.current_char(), u32::from('c'));
    }

    #[test]
    fn counts_codepoints_not_bytes() {
        let mut reader = Reader::new("λx");
        assert!(reader.advance());
        // two bytes consumed, one column
        assert_eq!(reader.location(), Location::new(2, 1, 2));
        assert_eq!(reader.current_char(), u32::from('x'));
    }

    #[test]
    fn advance_fails_at_end() {
        let mut reader = Reader::new("a");
        assert!(reader.advance());
        assert_eq!(reader.current_char(), 0);
        assert!(!reader.advance());
        assert!(reader.at_end());
    }

    #[test]
    fn rewind_restores_current_char() {
        let mut reader = Reader::new("xyz");
        let start = reader.location();
        reader.advance();
        reader.advance();
        assert_eq!(reader.current_char(), u32::from('z'));
        reader.set_location(start);
        assert_eq!(reader.current_char(), u32::from('x'));
    }

    #[test]
    fn sub_borrows_the_buffer() {
        let mut reader = Reader::new("hello");
        let start = reader.location();
        reader.advance();
        reader.advance();
        let range = Range::new(start, reader.location());
        assert_eq!(reader.sub(range), "he");
    }
}
