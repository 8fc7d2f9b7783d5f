use std::collections::BTreeMap;

use predict_lexer::Position;

use crate::{
    Diagnostic, DiagnosticKind, Grammar, ProductionId, Sets, Symbol, Terminal, VariableId,
};

/// LL(1) prediction table: `(variable, lookahead) → production`.
///
/// An absent cell is a definite syntax error at parse time. When a cell is written twice
/// the later production wins and the overwrite is recorded as a [`Conflict`], even when
/// both writes carry the same production.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTable {
    cells: BTreeMap<(VariableId, Terminal), ProductionId>,
    conflicts: Vec<Conflict>,
}

/// A second write to a filled cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub variable: VariableId,
    pub terminal: Terminal,
    pub previous: ProductionId,
    pub replacement: ProductionId,
}

impl ParseTable {
    pub fn new_ll1(grammar: &Grammar, sets: &Sets) -> Self {
        let mut table = Self::default();

        for (id, production) in grammar.productions().iter().enumerate() {
            let head = production.head();
            let first = sets.first_of_sequence(production.body());

            for terminal in first.iter().filter_map(|s| s.as_terminal()) {
                table.insert(grammar, head, terminal, id);
            }

            if first.contains(&Symbol::Epsilon) {
                // nullable body, predict on everything that may follow the head
                for terminal in sets.follow(head).iter().filter_map(|s| s.as_terminal()) {
                    table.insert(grammar, head, terminal, id);
                }
            }
        }

        tracing::debug!(
            cells = table.cells.len(),
            conflicts = table.conflicts.len(),
            "ll(1) table built"
        );

        table
    }

    fn insert(
        &mut self,
        grammar: &Grammar,
        variable: VariableId,
        terminal: Terminal,
        production: ProductionId,
    ) {
        let Some(previous) = self.cells.insert((variable, terminal), production) else {
            return;
        };

        tracing::warn!(
            variable = grammar.name(variable),
            terminal = grammar.name(terminal),
            previous = %grammar.display_production(previous),
            replacement = %grammar.display_production(production),
            "ll(1) conflict"
        );

        self.conflicts.push(Conflict {
            variable,
            terminal,
            previous,
            replacement: production,
        });
    }

    pub fn get(&self, variable: VariableId, terminal: Terminal) -> Option<ProductionId> {
        self.cells.get(&(variable, terminal)).copied()
    }

    /// Whether any cell of `variable`'s row is filled for `terminal`'s column.
    pub fn predicts(&self, variable: VariableId, terminal: Terminal) -> bool {
        self.cells.contains_key(&(variable, terminal))
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Filled cells, ordered by variable and then by terminal.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, Terminal, ProductionId)> + '_ {
        self.cells.iter().map(|((v, t), p)| (*v, *t, *p))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Conflict {
    pub fn to_diagnostic(&self, grammar: &Grammar) -> Diagnostic {
        Diagnostic::new(
            DiagnosticKind::Warning,
            format!(
                "LL(1) conflict at [{}, {}]: '{}' replaced by '{}'",
                grammar.name(self.variable),
                grammar.name(self.terminal),
                grammar.display_production(self.previous),
                grammar.display_production(self.replacement),
            ),
            Position::new(0, 0),
        )
    }
}
