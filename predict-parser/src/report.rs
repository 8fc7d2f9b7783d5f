//! Human-readable artifacts of a front-end run: the solved sets, the prediction table, the
//! parse trace, the symbol table and the collected diagnostics.

use std::fmt::Write;

use predict_lexer::Token;

use crate::{
    Action, DiagnosticKind, Diagnostics, Grammar, ParseTable, Sets, Step, Symbol, Symbols,
    Terminal,
};

/// FIRST sets of every variable followed by their FOLLOW sets, in declaration order.
pub fn first_follow(grammar: &Grammar, sets: &Sets) -> String {
    let mut out = String::from("=== FIRST SETS ===\n");
    for (variable, name) in grammar.variables() {
        let _ = writeln!(out, "FIRST({name}) = {{ {} }}", join(grammar, sets.first(variable)));
    }

    out.push_str("\n=== FOLLOW SETS ===\n");
    for (variable, name) in grammar.variables() {
        let _ = writeln!(out, "FOLLOW({name}) = {{ {} }}", join(grammar, sets.follow(variable)));
    }

    out
}

fn join<'a>(grammar: &Grammar, symbols: impl IntoIterator<Item = &'a Symbol>) -> String {
    symbols
        .into_iter()
        .map(|s| grammar.name(*s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Markdown grid of the prediction table. Columns are the terminals in declaration order
/// followed by `$`; absent entries are left blank.
pub fn parse_table(grammar: &Grammar, table: &ParseTable) -> String {
    let columns: Vec<Terminal> = grammar
        .terminals()
        .map(|(t, _)| Terminal::T(t))
        .chain(std::iter::once(Terminal::Eof))
        .collect();

    let mut out = String::from("| Non-Terminal |");
    for column in &columns {
        let _ = write!(out, " {} |", escape(grammar.name(*column)));
    }
    out.push_str("\n|---|");
    out.push_str(&"---|".repeat(columns.len()));
    out.push('\n');

    for (variable, name) in grammar.variables() {
        let _ = write!(out, "| {} |", escape(name));
        for column in &columns {
            match table.get(variable, *column) {
                Some(production) => {
                    let _ = write!(out, " {production} |");
                }
                None => out.push_str("  |"),
            }
        }
        out.push('\n');
    }

    if !table.is_ll1() {
        let _ = writeln!(out, "\n{} conflict(s):\n", table.conflicts().len());
        for conflict in table.conflicts() {
            let _ = writeln!(out, "- {}", conflict.to_diagnostic(grammar).message());
        }
    }

    out.push_str("\nProductions:\n\n");
    for id in 0..grammar.productions().len() {
        let _ = writeln!(out, "{id}. {}", grammar.display_production(id));
    }

    out
}

/// Markdown table of the parse steps.
pub fn trace(grammar: &Grammar, steps: &[Step]) -> String {
    let mut out = String::from(
        "| Stack Contents | Current Input | Production Used | Action |\n\
         |---|---|---|---|\n",
    );

    for step in steps {
        let stack = step
            .stack
            .iter()
            .map(|s| escape(grammar.name(*s)))
            .collect::<Vec<_>>()
            .join(" ");
        let production = step
            .production
            .map(|id| escape(&grammar.display_production(id)))
            .unwrap_or_default();
        let action = match &step.action {
            Action::Match(terminal) => format!("Match '{}'", escape(grammar.name(*terminal))),
            action => escape(&action.label()),
        };

        let _ = writeln!(
            out,
            "| {stack} | {} | {production} | {action} |",
            escape(&step.lookahead)
        );
    }

    out
}

/// `|` would split a markdown cell.
fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}

/// CSV of declared identifiers in declaration order.
pub fn symbols(symbols: &Symbols) -> String {
    let mut out = String::from("Serial No,Name,Type,Line,Column\n");
    for entry in symbols.entries() {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            entry.serial,
            entry.name,
            entry.ty.as_deref().unwrap_or_default(),
            entry.pos.line,
            entry.pos.column
        );
    }
    out
}

/// CSV of the scanned token stream.
pub fn tokens(tokens: &[Token]) -> String {
    let mut out = String::from("Token Type,Lexeme,Line,Column\n");
    for token in tokens {
        let _ = writeln!(
            out,
            "{},\"{}\",{},{}",
            token.kind,
            token.source.replace('"', "\"\""),
            token.pos.line,
            token.pos.column
        );
    }
    out
}

/// Totals, then the diagnostics grouped by kind, then all of them in report order.
pub fn diagnostics(diagnostics: &Diagnostics) -> String {
    let warnings = diagnostics.count(DiagnosticKind::Warning);

    let mut out = String::from("=== Compilation Errors and Warnings ===\n");
    let _ = writeln!(out, "Total errors: {}", diagnostics.len() - warnings);
    let _ = writeln!(out, "Total warnings: {warnings}");

    out.push_str("\n=== Errors by Type ===\n");
    for kind in DiagnosticKind::ALL {
        let _ = writeln!(out, "\n{kind}s:");

        let mut any = false;
        for diagnostic in diagnostics.of_kind(kind) {
            any = true;
            let pos = diagnostic.pos();
            let _ = writeln!(
                out,
                "  Line {}, Column {}: {}",
                pos.line,
                pos.column,
                diagnostic.message()
            );
        }
        if !any {
            out.push_str("  None\n");
        }
    }

    out.push_str("\n=== All Errors (in order of occurrence) ===\n");
    for diagnostic in diagnostics.iter() {
        let _ = writeln!(out, "{diagnostic}");
    }

    out
}
