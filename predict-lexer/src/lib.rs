pub use lexer::{
    error::{LexError, LexResult},
    Lexer, LexerGenerator, Position, Token, TokenKind,
};

mod lexer;
