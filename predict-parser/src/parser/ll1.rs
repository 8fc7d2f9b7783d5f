use std::collections::{BTreeSet, HashMap};

use predict_lexer::{Token, TokenKind};

use super::{
    error::{SemanticError, SyntaxError},
    table::ParseTable,
    trace::{Action, Step},
    traits::{AlreadyDeclared, DiagnosticSink, SymbolTable},
};
use crate::{
    DiagnosticKind, Grammar, ProductionId, Sets, Symbol, Terminal, TerminalId, VariableId,
};

/// Semantic profile of the parsed language: which terminals are token classes, which open
/// and close declarations, and where panic mode may resynchronize.
///
/// Names that the grammar does not declare as terminals are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Terminal every identifier token canonicalizes to.
    pub identifier: String,
    /// Terminal every integer or float literal canonicalizes to.
    pub constant: String,
    /// Terminals that switch declaration mode on.
    pub type_keywords: Vec<String>,
    /// Terminals panic mode skips up to and including.
    pub sync_terminals: Vec<String>,
    /// Terminals that switch declaration mode off.
    pub declaration_ends: Vec<String>,
    /// Terminals separating declarators, e.g. `,`.
    pub separators: Vec<String>,
    pub assignment_operators: Vec<String>,
    /// Declared types only integral values may be assigned to.
    pub integral_types: Vec<String>,
    /// Type name reported for float literals.
    pub float_literal_type: String,
    /// Resume from the first restart point whose table row predicts the lookahead instead
    /// of always from the highest-priority one.
    pub predictive_restart: bool,
    /// Whether [`Parse::trace`] is recorded.
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        fn names(names: &[&str]) -> Vec<String> {
            names.iter().map(|n| n.to_string()).collect()
        }

        Self {
            identifier: "ID".into(),
            constant: "CONST".into(),
            type_keywords: names(&["int", "float"]),
            sync_terminals: names(&[";"]),
            declaration_ends: names(&[";"]),
            separators: names(&[","]),
            assignment_operators: names(&["="]),
            integral_types: names(&["int"]),
            float_literal_type: "float".into(),
            predictive_restart: false,
            trace: true,
        }
    }
}

/// [`Config`] resolved against a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Profile {
    identifier: Option<TerminalId>,
    constant: Option<TerminalId>,
    type_keywords: BTreeSet<TerminalId>,
    sync_terminals: BTreeSet<TerminalId>,
    declaration_ends: BTreeSet<TerminalId>,
    separators: BTreeSet<TerminalId>,
    assignment_operators: BTreeSet<TerminalId>,
}

impl Profile {
    fn resolve(grammar: &Grammar, config: &Config) -> Self {
        let find = |name: &String| {
            let terminal = grammar.find_terminal(name);
            if terminal.is_none() {
                tracing::debug!(terminal = %name, "configured terminal not in grammar");
            }
            terminal
        };
        let set = |names: &[String]| names.iter().filter_map(find).collect::<BTreeSet<_>>();

        Self {
            identifier: find(&config.identifier),
            constant: find(&config.constant),
            type_keywords: set(&config.type_keywords),
            sync_terminals: set(&config.sync_terminals),
            declaration_ends: set(&config.declaration_ends),
            separators: set(&config.separators),
            assignment_operators: set(&config.assignment_operators),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    Reject,
}

/// Result of a single [`Ll1::parse`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub outcome: Outcome,
    /// Chronological steps. Empty when tracing is disabled.
    pub trace: Vec<Step>,
}

impl Parse {
    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accept
    }
}

/// Table-driven predictive parser.
///
/// Owns the frozen grammar with its sets and table. Every [`parse`](Ll1::parse) call keeps
/// its own stack, so a single `Ll1` can serve concurrent parses.
#[derive(Debug, Clone)]
pub struct Ll1 {
    grammar: Grammar,
    sets: Sets,
    table: ParseTable,
    config: Config,
    profile: Profile,
}

impl Ll1 {
    pub fn new(grammar: Grammar, config: Config) -> Self {
        let sets = Sets::solve(&grammar);
        let table = ParseTable::new_ll1(&grammar, &sets);

        Self::from_parts(grammar, sets, table, config)
    }

    /// Assembles a parser from precomputed sets and table of `grammar`.
    pub fn from_parts(grammar: Grammar, sets: Sets, table: ParseTable, config: Config) -> Self {
        let profile = Profile::resolve(&grammar, &config);

        Self {
            grammar,
            sets,
            table,
            config,
            profile,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &Sets {
        &self.sets
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses `tokens`, declaring and resolving identifiers through `symbols` and
    /// reporting every diagnostic to `sink`.
    ///
    /// A run that had to recover from a syntax error is rejected even when the remaining
    /// input parsed. Side effects on `symbols` and `sink` are kept either way.
    pub fn parse<I, S, D>(&self, tokens: I, symbols: &mut S, sink: &mut D) -> Parse
    where
        I: IntoIterator<Item = Token>,
        S: SymbolTable + ?Sized,
        D: DiagnosticSink + ?Sized,
    {
        let mut tokens = tokens.into_iter();
        let lookahead = tokens
            .next()
            .unwrap_or_else(|| Token::eof(predict_lexer::Position::start()));
        let terminal = self.canonical(&lookahead);

        let run = Run {
            engine: self,
            tokens,
            symbols,
            sink,
            stack: vec![Symbol::Eof, self.grammar.start_variable().into()],
            lookahead,
            terminal,
            in_declaration: false,
            declared_type: None,
            assignment: Assignment::Idle,
            expansions: HashMap::new(),
            syntax_errors: 0,
            trace: Vec::new(),
        };

        run.run()
    }

    /// Table column of `token`: identifiers and literals map to their class terminal,
    /// everything else matches by spelling.
    fn canonical(&self, token: &Token) -> Option<Terminal> {
        match token.kind {
            TokenKind::Eof => Some(Terminal::Eof),
            TokenKind::Identifier => self.profile.identifier.map(Terminal::T),
            TokenKind::Integer | TokenKind::Float => self.profile.constant.map(Terminal::T),
            TokenKind::Invalid => None,
            TokenKind::Keyword | TokenKind::Operator | TokenKind::Punctuation => {
                self.grammar.find_terminal(&token.source).map(Terminal::T)
            }
        }
    }

    /// Variable to resume from after panic mode: the highest-priority restart point, or the
    /// start variable when the grammar declares none.
    ///
    /// With [`Config::predictive_restart`] the first restart point that predicts
    /// `lookahead` is preferred.
    fn restart_point(&self, lookahead: Option<Terminal>) -> VariableId {
        let points = self.grammar.restart_points();

        lookahead
            .filter(|_| self.config.predictive_restart)
            .and_then(|t| points.iter().find(|v| self.table.predicts(**v, t)))
            .or_else(|| points.first())
            .copied()
            .unwrap_or_else(|| self.grammar.start_variable())
    }

    /// Terminals `variable` has a prediction for, rendered for messages.
    fn expected(&self, variable: VariableId) -> String {
        let expected: Vec<_> = self
            .table
            .iter()
            .filter(|(v, _, _)| *v == variable)
            .map(|(_, t, _)| self.grammar.name(t))
            .collect();

        match expected.is_empty() {
            true => self.grammar.name(variable).to_string(),
            false => expected.join("' or '"),
        }
    }
}

/// Identifier assignment the hooks are following.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Assignment {
    Idle,
    /// An identifier was matched and may become an assignment target.
    Lhs { name: String, ty: Option<String> },
    /// Operands after an assignment operator. `target` is set only for integral targets.
    Rhs { name: String, target: Option<String> },
}

/// State of one parse run.
struct Run<'p, I, S: ?Sized, D: ?Sized> {
    engine: &'p Ll1,
    tokens: I,
    symbols: &'p mut S,
    sink: &'p mut D,
    stack: Vec<Symbol>,
    lookahead: Token,
    /// Canonical column of `lookahead`. `None` for tokens the grammar does not know.
    terminal: Option<Terminal>,
    in_declaration: bool,
    /// Type keyword of the declaration being parsed.
    declared_type: Option<String>,
    assignment: Assignment,
    /// Stack length after each variable was last popped, since the last consumed token.
    expansions: HashMap<VariableId, usize>,
    syntax_errors: usize,
    trace: Vec<Step>,
}

impl<I, S, D> Run<'_, I, S, D>
where
    I: Iterator<Item = Token>,
    S: SymbolTable + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    fn run(mut self) -> Parse {
        let engine = self.engine;
        let grammar = &engine.grammar;
        self.record(None, Action::Initial);

        let outcome = loop {
            let Some(top) = self.stack.pop() else {
                break Outcome::Reject;
            };

            let len = self.stack.len();
            self.expansions.retain(|_, depth| *depth <= len);

            let error = match top {
                Symbol::Eof if self.terminal == Some(Terminal::Eof) => {
                    self.record(None, Action::Accept);
                    break match self.syntax_errors {
                        0 => Outcome::Accept,
                        _ => Outcome::Reject,
                    };
                }
                Symbol::Eof => SyntaxError::TrailingInput {
                    found: self.lookahead.source.clone(),
                },
                Symbol::Terminal(terminal) if self.terminal == Some(Terminal::T(terminal)) => {
                    self.matched(terminal);
                    continue;
                }
                Symbol::Terminal(terminal) if self.lookahead.is_eof() => {
                    SyntaxError::UnexpectedEof {
                        expected: grammar.name(terminal).to_string(),
                    }
                }
                Symbol::Terminal(terminal) => SyntaxError::TerminalMismatch {
                    expected: grammar.name(terminal).to_string(),
                    found: self.lookahead.source.clone(),
                },
                Symbol::Variable(variable) => match self.expand(variable) {
                    Ok(()) => continue,
                    Err(err) => err,
                },
                Symbol::Epsilon => continue,
            };

            if !self.syntax_error(error) {
                break Outcome::Reject;
            }
        };

        tracing::debug!(
            ?outcome,
            syntax_errors = self.syntax_errors,
            steps = self.trace.len(),
            "parse finished"
        );

        Parse {
            outcome,
            trace: self.trace,
        }
    }

    fn expand(&mut self, variable: VariableId) -> Result<(), SyntaxError> {
        let engine = self.engine;
        let grammar = &engine.grammar;
        let depth = self.stack.len();

        if self.expansions.get(&variable).is_some_and(|d| *d <= depth) {
            return Err(SyntaxError::ExpansionCycle {
                variable: grammar.name(variable).to_string(),
            });
        }
        self.expansions.insert(variable, depth);

        let production = self
            .terminal
            .and_then(|t| engine.table.get(variable, t))
            .and_then(|id| grammar.production(id).map(|p| (id, p)));

        let Some((id, production)) = production else {
            return Err(match self.lookahead.is_eof() {
                true => SyntaxError::UnexpectedEof {
                    expected: engine.expected(variable),
                },
                false => SyntaxError::NoProduction {
                    variable: grammar.name(variable).to_string(),
                    found: self.lookahead.source.clone(),
                },
            });
        };

        self.stack.extend(
            production
                .body()
                .iter()
                .rev()
                .filter(|s| **s != Symbol::Epsilon),
        );
        self.record(Some(id), Action::Expand);

        Ok(())
    }

    /// Consumes the lookahead, which matched `terminal`.
    fn matched(&mut self, terminal: TerminalId) {
        self.record(None, Action::Match(Terminal::T(terminal)));
        self.expansions.clear();

        let token = self.lookahead.clone();
        self.on_match(terminal, &token);
        self.advance();
    }

    fn advance(&mut self) {
        if self.lookahead.is_eof() {
            return;
        }

        let pos = self.lookahead.pos;
        self.lookahead = self.tokens.next().unwrap_or_else(|| Token::eof(pos));
        self.terminal = self.engine.canonical(&self.lookahead);
    }

    /// Reports `err` and runs panic-mode recovery. Returns whether parsing can resume.
    fn syntax_error(&mut self, err: SyntaxError) -> bool {
        tracing::debug!(%err, pos = %self.lookahead.pos, "syntax error");

        self.syntax_errors += 1;
        self.sink
            .report(DiagnosticKind::Syntax, err.to_string(), self.lookahead.pos);
        self.record(None, Action::Error(err));

        self.recover()
    }

    /// Discards input up to and including the next synchronizing terminal, then resets the
    /// stack to `[$, restart point]`.
    fn recover(&mut self) -> bool {
        let engine = self.engine;
        self.record(None, Action::Panic);

        loop {
            if self.lookahead.is_eof() {
                self.record(None, Action::Abort);
                return false;
            }

            let sync = matches!(
                self.terminal,
                Some(Terminal::T(t)) if engine.profile.sync_terminals.contains(&t)
            );
            tracing::trace!(token = %self.lookahead.source, pos = %self.lookahead.pos, "skipped");
            self.advance();

            if sync {
                break;
            }
        }

        let restart = engine.restart_point(self.terminal);
        tracing::debug!(
            restart = engine.grammar.name(restart),
            pos = %self.lookahead.pos,
            "resuming"
        );

        self.stack = vec![Symbol::Eof, restart.into()];
        self.in_declaration = false;
        self.declared_type = None;
        self.assignment = Assignment::Idle;
        self.expansions.clear();
        self.record(None, Action::Resume);

        true
    }

    /// Declaration-mode transitions and semantic hooks of a matched terminal.
    fn on_match(&mut self, terminal: TerminalId, token: &Token) {
        let engine = self.engine;
        let profile = &engine.profile;

        if profile.identifier == Some(terminal) {
            self.on_identifier(token);
            return;
        }
        if profile.constant == Some(terminal) {
            self.on_constant(token);
            return;
        }

        if profile.type_keywords.contains(&terminal) {
            self.in_declaration = true;
            self.declared_type = Some(token.source.clone());
        }
        if profile.declaration_ends.contains(&terminal) {
            self.in_declaration = false;
            self.declared_type = None;
        }

        self.assignment = match std::mem::replace(&mut self.assignment, Assignment::Idle) {
            Assignment::Lhs { name, ty } if profile.assignment_operators.contains(&terminal) => {
                let integral = &engine.config.integral_types;
                let target = ty.filter(|ty| integral.contains(ty));
                Assignment::Rhs { name, target }
            }
            rhs @ Assignment::Rhs { .. }
                if !profile.declaration_ends.contains(&terminal)
                    && !profile.sync_terminals.contains(&terminal)
                    && !profile.separators.contains(&terminal) =>
            {
                rhs
            }
            _ => Assignment::Idle,
        };
    }

    fn on_identifier(&mut self, token: &Token) {
        let name = token.source.as_str();

        if self.in_declaration && !matches!(self.assignment, Assignment::Rhs { .. }) {
            let inserted = self
                .symbols
                .insert(name, self.declared_type.as_deref(), token.pos);

            if let Err(AlreadyDeclared { name, previous }) = inserted {
                self.semantic_error(SemanticError::Redeclaration { name, previous }, token);
            }

            self.assignment = Assignment::Lhs {
                name: name.to_string(),
                ty: self.declared_type.clone(),
            };
            return;
        }

        let ty = match self.symbols.lookup(name) {
            Some(entry) => entry.ty.clone(),
            None => {
                self.semantic_error(
                    SemanticError::Undeclared {
                        name: name.to_string(),
                    },
                    token,
                );
                None
            }
        };

        match &self.assignment {
            Assignment::Rhs { name: target, target: Some(expected) } => {
                let integral = &self.engine.config.integral_types;

                if let Some(found) = ty.filter(|ty| !integral.contains(ty)) {
                    let err = SemanticError::TypeMismatch {
                        name: target.clone(),
                        expected: expected.clone(),
                        found,
                        operand: name.to_string(),
                    };
                    self.semantic_error(err, token);
                }
            }
            Assignment::Rhs { .. } => {}
            Assignment::Idle | Assignment::Lhs { .. } => {
                self.assignment = Assignment::Lhs {
                    name: name.to_string(),
                    ty,
                };
            }
        }
    }

    fn on_constant(&mut self, token: &Token) {
        if token.kind != TokenKind::Float {
            return;
        }

        if let Assignment::Rhs {
            name,
            target: Some(expected),
        } = &self.assignment
        {
            let err = SemanticError::TypeMismatch {
                name: name.clone(),
                expected: expected.clone(),
                found: self.engine.config.float_literal_type.clone(),
                operand: token.source.clone(),
            };
            self.semantic_error(err, token);
        }
    }

    fn semantic_error(&mut self, err: SemanticError, token: &Token) {
        tracing::debug!(%err, pos = %token.pos, "semantic error");
        self.sink
            .report(DiagnosticKind::Semantic, err.to_string(), token.pos);
    }

    fn record(&mut self, production: Option<ProductionId>, action: Action) {
        let lookahead = match self.lookahead.is_eof() {
            true => crate::END_MARKER.to_string(),
            false => self.lookahead.source.clone(),
        };

        tracing::trace!(
            depth = self.stack.len(),
            %lookahead,
            production,
            action = %action.label(),
            "step"
        );

        if self.engine.config.trace {
            self.trace.push(Step {
                stack: self.stack.clone(),
                lookahead,
                production,
                action,
            });
        }
    }
}
