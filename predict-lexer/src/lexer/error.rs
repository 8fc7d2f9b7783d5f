use thiserror::Error;

use super::Position;

pub type LexResult<T> = Result<T, LexError>;

#[derive(Debug, Error)]
pub enum LexError {
    /// A token rule was given a pattern the regex engine rejects.
    #[error("invalid token pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// No rule matched the input at `pos`.
    #[error("invalid character '{character}' at {pos}")]
    InvalidCharacter { character: char, pos: Position },
}

impl LexError {
    /// Position of the offending input, if the error stems from scanning.
    pub fn pos(&self) -> Option<Position> {
        match self {
            LexError::Pattern { .. } => None,
            LexError::InvalidCharacter { pos, .. } => Some(*pos),
        }
    }
}
