use predict_lexer::Position;
use thiserror::Error;

use crate::{DiagnosticKind, Entry};

/// Storage the parser declares identifiers into and resolves them from.
///
/// Implementations shared between concurrent parses must serialize their own inserts.
pub trait SymbolTable {
    /// Declares `name` with the type keyword it was declared under, if any.
    ///
    /// # Fails
    ///
    /// When `name` is already declared. The existing entry stays untouched.
    fn insert(&mut self, name: &str, ty: Option<&str>, pos: Position)
        -> Result<(), AlreadyDeclared>;

    fn lookup(&self, name: &str) -> Option<&Entry>;

    fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{name}' already declared at {previous}")]
pub struct AlreadyDeclared {
    pub name: String,
    /// Where the existing declaration was made.
    pub previous: Position,
}

/// Accumulates diagnostics of every phase.
pub trait DiagnosticSink {
    fn report(&mut self, kind: DiagnosticKind, message: String, pos: Position);

    /// Whether anything other than a warning was reported.
    fn has_errors(&self) -> bool;
}
