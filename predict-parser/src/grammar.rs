use crate::{Body, ProductionId, Symbol, TerminalId, VariableId, END_MARKER, EPSILON};

use std::collections::HashMap;

use thiserror::Error;

/// Rendered for ids that were handed out by another grammar.
const UNKNOWN: &str = "<unknown>";

pub type GrammarResult<T> = Result<T, GrammarError>;

/// Malformed grammar definitions. These are fatal at setup time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("symbol not found: {0}")]
    NotFound(String),
    #[error("symbol `{symbol}` in a production of `{head}` is not declared")]
    UnknownSymbol { head: String, symbol: String },
    #[error("`{0}` must be a declared non-terminal")]
    NotAVariable(String),
    #[error("`{0}` is a reserved symbol and cannot be declared")]
    ReservedName(String),
    #[error("start variable not set")]
    MissingStartVariable,
}

/// A context-free grammar: declared terminals and variables, an ordered list of
/// productions and a start variable.
///
/// A [`Grammar`] can only be obtained through [`GrammarBuilder::build`] and is immutable
/// afterwards. Everything derived from it ([`Sets`](crate::Sets),
/// [`ParseTable`](crate::ParseTable)) borrows it read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    names: Names,
    productions: Vec<Production>,
    start_variable: VariableId,
    /// Variables panic-mode recovery may restart from, highest priority first.
    restart_points: Vec<VariableId>,
}

/// A single rule `head → body`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    head: VariableId,
    body: Body,
}

/// Declaration-ordered name tables plus reverse lookup maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Names {
    terminals: Vec<String>,
    variables: Vec<String>,
    terminal_ids: HashMap<String, TerminalId>,
    variable_ids: HashMap<String, VariableId>,
}

impl Names {
    fn add_terminal(&mut self, name: &str) -> GrammarResult<TerminalId> {
        check_reserved(name)?;
        if let Some(id) = self.terminal_ids.get(name) {
            return Ok(*id);
        }

        let id = TerminalId(self.terminals.len());
        self.terminals.push(name.to_string());
        self.terminal_ids.insert(name.to_string(), id);
        Ok(id)
    }

    fn add_variable(&mut self, name: &str) -> GrammarResult<VariableId> {
        check_reserved(name)?;
        if let Some(id) = self.variable_ids.get(name) {
            return Ok(*id);
        }

        let id = VariableId(self.variables.len());
        self.variables.push(name.to_string());
        self.variable_ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Resolves `name`: sentinels first, then variables, then terminals.
    fn find(&self, name: &str) -> Option<Symbol> {
        match name {
            EPSILON => Some(Symbol::Epsilon),
            END_MARKER => Some(Symbol::Eof),
            _ => self
                .variable_ids
                .get(name)
                .map(|v| Symbol::Variable(*v))
                .or_else(|| self.terminal_ids.get(name).map(|t| Symbol::Terminal(*t))),
        }
    }

    fn find_variable(&self, name: &str) -> GrammarResult<VariableId> {
        match self.find(name) {
            Some(Symbol::Variable(v)) => Ok(v),
            _ => Err(GrammarError::NotAVariable(name.to_string())),
        }
    }

    fn name(&self, symbol: Symbol) -> &str {
        let name = match symbol {
            Symbol::Terminal(t) => self.terminals.get(t.0),
            Symbol::Variable(v) => self.variables.get(v.0),
            Symbol::Epsilon => return EPSILON,
            Symbol::Eof => return END_MARKER,
        };

        name.map_or(UNKNOWN, String::as_str)
    }
}

fn check_reserved(name: &str) -> GrammarResult<()> {
    match name {
        EPSILON | END_MARKER => Err(GrammarError::ReservedName(name.to_string())),
        _ => Ok(()),
    }
}

impl Grammar {
    /// Creates a new `GrammarBuilder`.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Resolves a symbol by name. Resolution order is fixed: the reserved sentinels, then
    /// variables, then terminals.
    pub fn find_symbol(&self, name: &str) -> GrammarResult<Symbol> {
        self.names
            .find(name)
            .ok_or_else(|| GrammarError::NotFound(name.to_string()))
    }

    pub fn find_terminal(&self, name: &str) -> Option<TerminalId> {
        self.names.terminal_ids.get(name).copied()
    }

    pub fn find_variable(&self, name: &str) -> Option<VariableId> {
        self.names.variable_ids.get(name).copied()
    }

    /// Name of `symbol`. Sentinels render as `ε` and `$`.
    pub fn name(&self, symbol: impl Into<Symbol>) -> &str {
        self.names.name(symbol.into())
    }

    /// Terminals in declaration order.
    pub fn terminals(&self) -> impl Iterator<Item = (TerminalId, &str)> + '_ {
        self.names
            .terminals
            .iter()
            .enumerate()
            .map(|(i, name)| (TerminalId(i), name.as_str()))
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &str)> + '_ {
        self.names
            .variables
            .iter()
            .enumerate()
            .map(|(i, name)| (VariableId(i), name.as_str()))
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.productions.get(id)
    }

    /// Returns the productions of `variable` in declaration order.
    pub fn productions_for(
        &self,
        variable: VariableId,
    ) -> impl Iterator<Item = (ProductionId, &Production)> + '_ {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.head == variable)
    }

    pub fn start_variable(&self) -> VariableId {
        self.start_variable
    }

    pub fn restart_points(&self) -> &[VariableId] {
        &self.restart_points
    }

    /// Renders a production as `head → body`.
    pub fn display_production(&self, id: ProductionId) -> String {
        match self.production(id) {
            Some(production) => format!(
                "{} → {}",
                self.name(production.head),
                production
                    .body
                    .iter()
                    .map(|s| self.name(*s))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            None => format!("#{id}"),
        }
    }
}

impl Production {
    pub fn head(&self) -> VariableId {
        self.head
    }

    pub fn body(&self) -> &[Symbol] {
        &self.body
    }

    /// Whether this is the explicit empty alternative `head → ε`.
    pub fn is_epsilon(&self) -> bool {
        self.body == [Symbol::Epsilon]
    }
}

/// Builder struct for the [`Grammar`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    names: Names,
    productions: Vec<Production>,
    start_variable: Option<VariableId>,
    restart_points: Vec<VariableId>,
}

impl GrammarBuilder {
    /// Creates a new [`GrammarBuilder`] without symbols, productions or start variable.
    fn new() -> Self {
        Self::default()
    }

    /// Declares a terminal. Re-declaring an existing terminal returns its id.
    pub fn add_terminal(&mut self, name: &str) -> GrammarResult<TerminalId> {
        self.names.add_terminal(name)
    }

    /// Declares a variable. Re-declaring an existing variable returns its id.
    pub fn add_variable(&mut self, name: &str) -> GrammarResult<VariableId> {
        self.names.add_variable(name)
    }

    /// Adds the production `head → body`. All names must already be declared, except `ε`
    /// and `$`. An empty body is stored as `[ε]`.
    pub fn add_production<I, S>(&mut self, head: &str, body: I) -> GrammarResult<ProductionId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let head_id = self.names.find_variable(head)?;

        let body = body
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.names.find(name).ok_or_else(|| GrammarError::UnknownSymbol {
                    head: head.to_string(),
                    symbol: name.to_string(),
                })
            })
            .collect::<GrammarResult<Body>>()?;

        // default empty bodies to `Symbol::Epsilon`
        let body = if body.is_empty() {
            Body::from([Symbol::Epsilon])
        } else {
            body
        };

        self.productions.push(Production {
            head: head_id,
            body,
        });
        Ok(self.productions.len() - 1)
    }

    /// Sets the start variable of the [`Grammar`].
    pub fn set_start_variable(&mut self, name: &str) -> GrammarResult<()> {
        self.start_variable = Some(self.names.find_variable(name)?);
        Ok(())
    }

    /// Appends a variable panic-mode recovery may restart from. Earlier calls take
    /// priority.
    pub fn add_restart_point(&mut self, name: &str) -> GrammarResult<()> {
        let variable = self.names.find_variable(name)?;
        if !self.restart_points.contains(&variable) {
            self.restart_points.push(variable);
        }
        Ok(())
    }

    pub fn with_terminals<I, S>(mut self, names: I) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add_terminal(name.as_ref())?;
        }
        Ok(self)
    }

    pub fn with_variables<I, S>(mut self, names: I) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add_variable(name.as_ref())?;
        }
        Ok(self)
    }

    /// Adds a production to the [`Grammar`].
    pub fn with_production<I, S>(mut self, head: &str, body: I) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_production(head, body)?;
        Ok(self)
    }

    /// Adds a set of alternatives for the same head, in order.
    pub fn with_productions<Bs, I, S>(mut self, head: &str, bodies: Bs) -> GrammarResult<Self>
    where
        Bs: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for body in bodies {
            self.add_production(head, body)?;
        }
        Ok(self)
    }

    pub fn with_start_variable(mut self, name: &str) -> GrammarResult<Self> {
        self.set_start_variable(name)?;
        Ok(self)
    }

    pub fn with_restart_points<I, S>(mut self, names: I) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add_restart_point(name.as_ref())?;
        }
        Ok(self)
    }

    /// Freezes the [`Grammar`]. Fails when no start variable is set.
    pub fn build(self) -> GrammarResult<Grammar> {
        let start_variable = self
            .start_variable
            .ok_or(GrammarError::MissingStartVariable)?;

        for (i, name) in self.names.variables.iter().enumerate() {
            if !self.productions.iter().any(|p| p.head == VariableId(i)) {
                tracing::warn!(variable = %name, "variable has no productions");
            }
        }

        tracing::debug!(
            terminals = self.names.terminals.len(),
            variables = self.names.variables.len(),
            productions = self.productions.len(),
            "grammar built"
        );

        Ok(Grammar {
            names: self.names,
            productions: self.productions,
            start_variable,
            restart_points: self.restart_points,
        })
    }
}
