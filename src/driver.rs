use predict_lexer::{LexError, Token};
use predict_parser::{
    Config, DiagnosticKind, DiagnosticSink, Diagnostics, Ll1, Parse, Symbols,
};

use crate::{language, Result};

/// Everything one run over a source text produced.
#[derive(Debug)]
pub struct Compilation {
    /// Scanned tokens, ending with `Eof`.
    pub tokens: Vec<Token>,
    pub engine: Ll1,
    pub parse: Parse,
    pub symbols: Symbols,
    /// Lexical errors, table conflicts, then syntax and semantic diagnostics.
    pub diagnostics: Diagnostics,
}

impl Compilation {
    /// Whether the parse accepted and nothing but warnings was reported.
    pub fn succeeded(&self) -> bool {
        self.parse.is_accepted() && !self.diagnostics.has_errors()
    }
}

/// Scans and parses `source`.
///
/// # Fails
///
/// Only when the language definition itself is invalid.
pub fn compile(source: &str, trace: bool) -> Result<Compilation> {
    let mut diagnostics = Diagnostics::new();

    let mut lexer = language::lexer()?.tokenize(source);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    for err in lexer.errors() {
        let message = match err {
            LexError::InvalidCharacter { character, .. } => {
                format!("Invalid character '{character}'")
            }
            err => err.to_string(),
        };
        diagnostics.report(DiagnosticKind::Lexical, message, err.pos().unwrap_or_default());
    }
    tracing::info!(
        tokens = tokens.len(),
        errors = lexer.errors().len(),
        "lexical analysis done"
    );

    let config = Config {
        trace,
        ..language::config()
    };
    let engine = Ll1::new(language::grammar()?, config);
    diagnostics.extend(
        engine
            .table()
            .conflicts()
            .iter()
            .map(|c| c.to_diagnostic(engine.grammar())),
    );

    let mut symbols = Symbols::new();
    let parse = engine.parse(tokens.iter().cloned(), &mut symbols, &mut diagnostics);
    tracing::info!(outcome = ?parse.outcome, symbols = symbols.len(), "parsing done");

    Ok(Compilation {
        tokens,
        engine,
        parse,
        symbols,
        diagnostics,
    })
}
