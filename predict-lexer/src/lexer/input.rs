use super::Position;

/// Cursor over the input of the lexer.
///
/// It keeps track of the byte offset into the input and the line/column of the next
/// character that has not been consumed yet.
pub(super) struct InputIter<'a> {
    input: &'a str,
    offset: usize,
    pos: Position,
}

/// Token returned by the [`InputIter`].
#[derive(Debug, Clone)]
pub(super) struct InputIterToken {
    pub(super) source: String,
    pub(super) pos: Position,
}

impl<'a> InputIter<'a> {
    /// Creates a new [`InputIter`].
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            pos: Position::start(),
        }
    }

    /// Returns the part of the input that has not been consumed.
    pub(super) fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    pub(super) fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Position of the next unconsumed character.
    pub(super) fn pos(&self) -> Position {
        self.pos
    }

    /// Consumes `len` bytes of input and returns them as a token starting at the
    /// position the cursor was at.
    ///
    /// `len` must fall on a character boundary.
    pub(super) fn consume_token(&mut self, len: usize) -> InputIterToken {
        let start = self.pos;
        let source = &self.input[self.offset..self.offset + len];

        for ch in source.chars() {
            match ch {
                '\n' => {
                    self.pos.line += 1;
                    self.pos.column = 1;
                }
                _ => self.pos.column += 1,
            }
        }
        self.offset += len;

        InputIterToken {
            source: source.to_string(),
            pos: start,
        }
    }

    /// Consumes a single character, used when no rule matches the input.
    pub(super) fn consume_char(&mut self) -> Option<(char, InputIterToken)> {
        let ch = self.rest().chars().next()?;
        Some((ch, self.consume_token(ch.len_utf8())))
    }
}

#[cfg(test)]
mod tests {
    use super::{InputIter, Position};

    #[test]
    fn tracks_lines_and_columns() {
        let mut iter = InputIter::new("ab\ncd");

        let token = iter.consume_token(2);
        assert_eq!(token.source, "ab");
        assert_eq!(token.pos, Position::new(1, 1));

        iter.consume_token(1);
        assert_eq!(iter.pos(), Position::new(2, 1));

        let (ch, token) = iter.consume_char().unwrap();
        assert_eq!(ch, 'c');
        assert_eq!(token.pos, Position::new(2, 1));
        assert_eq!(iter.rest(), "d");
    }

    #[test]
    fn multi_byte_characters() {
        let mut iter = InputIter::new("εx");

        let (ch, _) = iter.consume_char().unwrap();
        assert_eq!(ch, 'ε');
        assert_eq!(iter.pos(), Position::new(1, 2));
        assert_eq!(iter.rest(), "x");
        assert!(!iter.is_empty());
    }
}
