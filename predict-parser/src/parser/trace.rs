use super::error::SyntaxError;
use crate::{ProductionId, Symbol, Terminal};

/// One row of the parse trace, recorded after the action was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Stack contents, bottom first.
    pub stack: Vec<Symbol>,
    /// Source text of the lookahead token, `$` at end of input.
    pub lookahead: String,
    pub production: Option<ProductionId>,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Initial,
    Match(Terminal),
    Expand,
    Accept,
    Error(SyntaxError),
    /// Tokens are being discarded up to a synchronizing terminal.
    Panic,
    /// The stack was reset to a restart point.
    Resume,
    /// Input ended during recovery.
    Abort,
}

impl Action {
    /// Short label for trace tables.
    pub fn label(&self) -> String {
        match self {
            Action::Initial => "Initial".into(),
            Action::Match(_) => "Match".into(),
            Action::Expand => "Expand".into(),
            Action::Accept => "Accept".into(),
            Action::Error(err) => format!("Error: {err}"),
            Action::Panic => "Panic".into(),
            Action::Resume => "Resume".into(),
            Action::Abort => "Abort".into(),
        }
    }
}
