use predict_lexer::LexError;
use predict_parser::GrammarError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Setup failures of the front-end. Diagnostics about the compiled source are not errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
    #[error("invalid scanner: {0}")]
    Lexer(#[from] LexError),
}
