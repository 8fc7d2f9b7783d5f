pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use grammar::{Grammar, GrammarBuilder, GrammarError, GrammarResult, Production};
pub use parser::{
    error::{SemanticError, SyntaxError},
    ll1::{Config, Ll1, Outcome, Parse},
    table::{Conflict, ParseTable},
    trace::{Action, Step},
    traits::{AlreadyDeclared, DiagnosticSink, SymbolTable},
};
pub use sets::Sets;
pub use symbols::{Entry, Symbols};

pub mod report;

mod diagnostic;
mod grammar;
mod parser;
mod sets;
mod symbols;

/// Spelling of the reserved empty-derivation symbol.
pub const EPSILON: &str = "ε";
/// Spelling of the reserved end-of-input symbol.
pub const END_MARKER: &str = "$";

/// Represents a single terminal/variable in the body of a production, or one of the two
/// reserved sentinels.
///
/// Ids are only meaningful for the [`Grammar`] that handed them out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(TerminalId),
    Variable(VariableId),
    Epsilon,
    // Note: `Eof` is implicitly available in every grammar. It is pushed at the bottom of the
    // parse stack and seeded into the follow set of the start variable.
    Eof,
}

/// Column key of the [`ParseTable`]: a user terminal or end of input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    T(TerminalId),
    Eof,
}

/// Index of a terminal in declaration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(pub(crate) usize);

/// Index of a variable (non-terminal) in declaration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(pub(crate) usize);

/// Index of a production in declaration order. This is the payload of a parse table cell.
pub type ProductionId = usize;

/// List of [`Symbol`]s a `Variable` maps to.
pub(crate) type Body = Vec<Symbol>;

impl TerminalId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl VariableId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Symbol {
    /// Returns the table column this symbol occupies, if it is terminal-like.
    pub fn as_terminal(self) -> Option<Terminal> {
        match self {
            Symbol::Terminal(t) => Some(Terminal::T(t)),
            Symbol::Eof => Some(Terminal::Eof),
            Symbol::Variable(_) | Symbol::Epsilon => None,
        }
    }
}

impl From<Terminal> for Symbol {
    fn from(value: Terminal) -> Self {
        match value {
            Terminal::T(t) => Symbol::Terminal(t),
            Terminal::Eof => Symbol::Eof,
        }
    }
}

impl From<TerminalId> for Terminal {
    fn from(value: TerminalId) -> Self {
        Self::T(value)
    }
}

impl From<TerminalId> for Symbol {
    fn from(value: TerminalId) -> Self {
        Symbol::Terminal(value)
    }
}

impl From<VariableId> for Symbol {
    fn from(value: VariableId) -> Self {
        Symbol::Variable(value)
    }
}
