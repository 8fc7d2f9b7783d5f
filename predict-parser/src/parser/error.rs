use thiserror::Error;

/// Syntax errors detected by the predictive parser. Each one triggers panic-mode recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected '{expected}', found '{found}'")]
    TerminalMismatch { expected: String, found: String },
    #[error("unexpected token '{found}' for non-terminal '{variable}'")]
    NoProduction { variable: String, found: String },
    #[error("unexpected end of input, expected '{expected}'")]
    UnexpectedEof { expected: String },
    #[error("unexpected token '{found}' after end of input")]
    TrailingInput { found: String },
    /// The same variable was expanded twice without consuming input.
    #[error("non-terminal '{variable}' expands to itself without consuming input")]
    ExpansionCycle { variable: String },
}

/// Semantic errors raised by the identifier hooks. They never interrupt the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("Symbol '{name}' already declared at {previous}")]
    Redeclaration {
        name: String,
        previous: predict_lexer::Position,
    },
    #[error("Use of undeclared variable '{name}'")]
    Undeclared { name: String },
    #[error("Type mismatch: cannot assign {found} value '{operand}' to '{name}' of type {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
        operand: String,
    },
}
