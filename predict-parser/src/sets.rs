use crate::{Grammar, Symbol, VariableId};

use std::collections::{BTreeMap, BTreeSet};

static EMPTY: BTreeSet<Symbol> = BTreeSet::new();

/// FIRST and FOLLOW sets of a [`Grammar`], solved to their least fixed point.
///
/// FIRST is known for every symbol of the grammar, including the sentinels
/// (`FIRST(ε) = {ε}`, `FIRST($) = {$}`). FOLLOW is known for every variable and never
/// contains `ε`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sets {
    first: BTreeMap<Symbol, BTreeSet<Symbol>>,
    follow: BTreeMap<VariableId, BTreeSet<Symbol>>,
}

impl Sets {
    pub fn solve(grammar: &Grammar) -> Self {
        let mut sets = Self {
            first: BTreeMap::from([
                (Symbol::Epsilon, BTreeSet::from([Symbol::Epsilon])),
                (Symbol::Eof, BTreeSet::from([Symbol::Eof])),
            ]),
            follow: BTreeMap::new(),
        };

        for (terminal, _) in grammar.terminals() {
            sets.first
                .insert(terminal.into(), BTreeSet::from([terminal.into()]));
        }
        for (variable, _) in grammar.variables() {
            sets.first.insert(variable.into(), BTreeSet::new());
            sets.follow.insert(variable, BTreeSet::new());
        }

        let first_passes = sets.solve_first(grammar);
        let follow_passes = sets.solve_follow(grammar);

        tracing::debug!(first_passes, follow_passes, "first and follow sets solved");

        sets
    }

    /// Iterates over all productions until no FIRST set changes in a full pass. Returns the
    /// number of passes.
    fn solve_first(&mut self, grammar: &Grammar) -> usize {
        let mut passes = 0;

        loop {
            passes += 1;
            let mut changed = false;

            for production in grammar.productions() {
                let first = self.first_of_sequence(production.body());
                changed |= extend_set(
                    self.first.entry(production.head().into()).or_default(),
                    first,
                );
            }

            if !changed {
                return passes;
            }
        }
    }

    fn solve_follow(&mut self, grammar: &Grammar) -> usize {
        self.follow
            .entry(grammar.start_variable())
            .or_default()
            .insert(Symbol::Eof);

        let mut passes = 0;

        loop {
            passes += 1;
            let mut changed = false;

            for production in grammar.productions() {
                let body = production.body();

                for (i, symbol) in body.iter().enumerate() {
                    let Symbol::Variable(variable) = *symbol else {
                        continue;
                    };

                    // follow[variable] ⊇ first[rest] \ {ε}, plus follow[head] if rest is
                    // nullable
                    let rest = self.first_of_sequence(&body[i + 1..]);
                    let mut additions: BTreeSet<Symbol> = rest
                        .iter()
                        .filter(|s| **s != Symbol::Epsilon)
                        .copied()
                        .collect();

                    if rest.contains(&Symbol::Epsilon) {
                        additions.extend(self.follow(production.head()).iter().copied());
                    }

                    changed |= extend_set(self.follow.entry(variable).or_default(), additions);
                }
            }

            if !changed {
                return passes;
            }
        }
    }

    /// FIRST set of `symbol`. Symbols foreign to the solved grammar have an empty set.
    pub fn first(&self, symbol: impl Into<Symbol>) -> &BTreeSet<Symbol> {
        self.first.get(&symbol.into()).unwrap_or(&EMPTY)
    }

    pub fn follow(&self, variable: VariableId) -> &BTreeSet<Symbol> {
        self.follow.get(&variable).unwrap_or(&EMPTY)
    }

    /// FIRST of the concatenation `symbols`. Contains `ε` iff every symbol is nullable,
    /// so the empty sequence yields `{ε}`.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> BTreeSet<Symbol> {
        let mut result = BTreeSet::new();

        for symbol in symbols {
            let first = self.first(*symbol);
            result.extend(first.iter().filter(|s| **s != Symbol::Epsilon).copied());

            if !first.contains(&Symbol::Epsilon) {
                return result;
            }
        }

        result.insert(Symbol::Epsilon);
        result
    }

    pub fn is_nullable(&self, symbol: impl Into<Symbol>) -> bool {
        self.first(symbol).contains(&Symbol::Epsilon)
    }
}

/// Extends `set` and returns whether it grew.
fn extend_set(set: &mut BTreeSet<Symbol>, iter: impl IntoIterator<Item = Symbol>) -> bool {
    let len = set.len();
    set.extend(iter);
    len != set.len()
}

#[cfg(test)]
mod tests {
    use super::Sets;
    use crate::{Grammar, Symbol};

    use std::collections::BTreeSet;

    /// Renders a set by name so assertions read like the grammar.
    fn names<'g>(grammar: &'g Grammar, set: &BTreeSet<Symbol>) -> BTreeSet<&'g str> {
        set.iter().map(|s| grammar.name(*s)).collect()
    }

    fn first<'g>(grammar: &'g Grammar, sets: &Sets, name: &str) -> BTreeSet<&'g str> {
        match grammar.find_symbol(name) {
            Ok(symbol) => names(grammar, sets.first(symbol)),
            Err(_) => BTreeSet::new(),
        }
    }

    fn follow<'g>(grammar: &'g Grammar, sets: &Sets, name: &str) -> BTreeSet<&'g str> {
        match grammar.find_variable(name) {
            Some(variable) => names(grammar, sets.follow(variable)),
            None => BTreeSet::new(),
        }
    }

    mod first {
        use super::{first, names, Sets};
        use crate::{Grammar, Symbol};

        use std::collections::BTreeSet;

        #[test]
        fn first_set() -> Result<(), Box<dyn std::error::Error>> {
            let grammar = Grammar::builder()
                .with_terminals(["bracket", "identifier", "semi"])?
                .with_variables(["function", "prototype", "body"])?
                .with_start_variable("function")?
                .with_production("function", ["prototype", "body"])?
                .with_productions("prototype", [vec!["bracket"], vec![]])?
                .with_productions("body", [vec!["identifier", "semi"], vec!["semi"]])?
                .build()?;
            let sets = Sets::solve(&grammar);

            assert_eq!(
                first(&grammar, &sets, "function"),
                BTreeSet::from(["identifier", "semi", "bracket"])
            );
            assert_eq!(
                first(&grammar, &sets, "body"),
                BTreeSet::from(["identifier", "semi"])
            );
            assert_eq!(
                first(&grammar, &sets, "prototype"),
                BTreeSet::from(["bracket", "ε"])
            );
            assert_eq!(first(&grammar, &sets, "semi"), BTreeSet::from(["semi"]));

            Ok(())
        }

        #[test]
        fn first_recursive() -> Result<(), Box<dyn std::error::Error>> {
            let grammar = Grammar::builder()
                .with_variables(["function", "prototype", "body"])?
                .with_start_variable("function")?
                .with_production("body", ["function"])?
                .with_production("function", ["prototype"])?
                .with_productions("prototype", [vec!["body"], vec![]])?
                .build()?;
            let sets = Sets::solve(&grammar);

            for variable in ["function", "prototype", "body"] {
                assert_eq!(first(&grammar, &sets, variable), BTreeSet::from(["ε"]));
            }

            Ok(())
        }

        #[test]
        fn first_recursive_self() -> Result<(), Box<dyn std::error::Error>> {
            let grammar = Grammar::builder()
                .with_terminals(["bracket"])?
                .with_variables(["function", "prototype", "body"])?
                .with_start_variable("function")?
                .with_productions(
                    "function",
                    [vec!["function", "ε", "body", "bracket"], vec!["prototype"]],
                )?
                .with_production("prototype", ["ε"])?
                .with_production("body", ["ε"])?
                .build()?;
            let sets = Sets::solve(&grammar);

            assert_eq!(
                first(&grammar, &sets, "function"),
                BTreeSet::from(["bracket", "ε"])
            );

            Ok(())
        }

        #[test]
        fn variable_without_productions() -> Result<(), Box<dyn std::error::Error>> {
            let grammar = Grammar::builder()
                .with_terminals(["a"])?
                .with_variables(["s", "dead"])?
                .with_start_variable("s")?
                .with_productions("s", [vec!["dead", "a"], vec!["a"]])?
                .build()?;
            let sets = Sets::solve(&grammar);

            assert!(first(&grammar, &sets, "dead").is_empty());
            assert_eq!(first(&grammar, &sets, "s"), BTreeSet::from(["a"]));

            Ok(())
        }

        #[test]
        fn sequence() -> Result<(), Box<dyn std::error::Error>> {
            let grammar = Grammar::builder()
                .with_terminals(["a", "b"])?
                .with_variables(["s", "n"])?
                .with_start_variable("s")?
                .with_production("s", ["n", "b"])?
                .with_productions("n", [vec!["a"], vec![]])?
                .build()?;
            let sets = Sets::solve(&grammar);

            let n = grammar.find_symbol("n")?;
            let b = grammar.find_symbol("b")?;

            assert_eq!(sets.first_of_sequence(&[]), BTreeSet::from([Symbol::Epsilon]));
            assert_eq!(
                names(&grammar, &sets.first_of_sequence(&[n, n])),
                BTreeSet::from(["a", "ε"])
            );
            assert_eq!(
                names(&grammar, &sets.first_of_sequence(&[n, b, n])),
                BTreeSet::from(["a", "b"])
            );
            assert!(sets.is_nullable(n));
            assert!(!sets.is_nullable(b));
            assert_eq!(sets.first(Symbol::Eof), &BTreeSet::from([Symbol::Eof]));

            Ok(())
        }
    }

    mod follow {
        use super::{first, follow, Sets};
        use crate::Grammar;

        use std::collections::BTreeSet;

        #[test]
        fn follow_set() -> Result<(), Box<dyn std::error::Error>> {
            let grammar = Grammar::builder()
                .with_terminals(["a", "b", "c", "f", "g", "h"])?
                .with_variables(["S", "B", "C", "D", "E", "F"])?
                .with_start_variable("S")?
                .with_production("S", ["a", "B", "D", "h"])?
                .with_production("B", ["c", "C"])?
                .with_productions("C", [vec!["b", "C"], vec![]])?
                .with_production("D", ["E", "F"])?
                .with_productions("E", [vec!["g"], vec![]])?
                .with_productions("F", [vec!["f"], vec![]])?
                .build()?;
            let sets = Sets::solve(&grammar);

            assert_eq!(follow(&grammar, &sets, "S"), BTreeSet::from(["$"]));
            assert_eq!(follow(&grammar, &sets, "B"), BTreeSet::from(["g", "f", "h"]));
            assert_eq!(follow(&grammar, &sets, "C"), BTreeSet::from(["g", "f", "h"]));
            assert_eq!(follow(&grammar, &sets, "D"), BTreeSet::from(["h"]));
            assert_eq!(follow(&grammar, &sets, "E"), BTreeSet::from(["f", "h"]));
            assert_eq!(follow(&grammar, &sets, "F"), BTreeSet::from(["h"]));

            Ok(())
        }

        #[test]
        fn expressions() -> Result<(), Box<dyn std::error::Error>> {
            let grammar = Grammar::builder()
                .with_terminals(["+", "*", "(", ")", "id"])?
                .with_variables(["E", "E'", "T", "T'", "F"])?
                .with_start_variable("E")?
                .with_production("E", ["T", "E'"])?
                .with_productions("E'", [vec!["+", "T", "E'"], vec![]])?
                .with_production("T", ["F", "T'"])?
                .with_productions("T'", [vec!["*", "F", "T'"], vec![]])?
                .with_productions("F", [vec!["(", "E", ")"], vec!["id"]])?
                .build()?;
            let sets = Sets::solve(&grammar);

            assert_eq!(first(&grammar, &sets, "E"), BTreeSet::from(["(", "id"]));
            assert_eq!(first(&grammar, &sets, "E'"), BTreeSet::from(["+", "ε"]));
            assert_eq!(first(&grammar, &sets, "T'"), BTreeSet::from(["*", "ε"]));

            assert_eq!(follow(&grammar, &sets, "E"), BTreeSet::from([")", "$"]));
            assert_eq!(follow(&grammar, &sets, "E'"), BTreeSet::from([")", "$"]));
            assert_eq!(follow(&grammar, &sets, "T"), BTreeSet::from(["+", ")", "$"]));
            assert_eq!(follow(&grammar, &sets, "T'"), BTreeSet::from(["+", ")", "$"]));
            assert_eq!(
                follow(&grammar, &sets, "F"),
                BTreeSet::from(["+", "*", ")", "$"])
            );

            Ok(())
        }
    }

    mod proptest {
        use super::Sets;
        use crate::{Grammar, GrammarResult, Symbol, VariableId};

        use proptest::prelude::*;
        use proptest_derive::Arbitrary;

        const VARIABLES: usize = 4;
        const TERMINALS: usize = 3;

        #[derive(Debug, Clone, Copy, Arbitrary)]
        enum GenSymbol {
            Variable(#[proptest(strategy = "0..VARIABLES")] usize),
            Terminal(#[proptest(strategy = "0..TERMINALS")] usize),
        }

        type Rules = Vec<(usize, Vec<GenSymbol>)>;

        fn rules() -> impl Strategy<Value = Rules> {
            prop::collection::vec(
                (0..VARIABLES, prop::collection::vec(any::<GenSymbol>(), 0..4)),
                1..10,
            )
        }

        fn build(rules: &Rules) -> GrammarResult<Grammar> {
            let mut builder = Grammar::builder()
                .with_terminals((0..TERMINALS).map(|t| format!("t{t}")))?
                .with_variables((0..VARIABLES).map(|v| format!("V{v}")))?
                .with_start_variable("V0")?;

            for (head, body) in rules {
                let body = body.iter().map(|s| match s {
                    GenSymbol::Variable(v) => format!("V{v}"),
                    GenSymbol::Terminal(t) => format!("t{t}"),
                });
                builder.add_production(&format!("V{head}"), body)?;
            }

            builder.build()
        }

        /// Whether `variable` derives the empty string, by search over derivations that
        /// never revisit a variable on the current path.
        fn derives_empty(
            grammar: &Grammar,
            variable: VariableId,
            path: &mut Vec<VariableId>,
        ) -> bool {
            if path.contains(&variable) {
                return false;
            }
            path.push(variable);

            let result = grammar.productions_for(variable).any(|(_, production)| {
                production.body().iter().all(|symbol| match symbol {
                    Symbol::Epsilon => true,
                    Symbol::Variable(v) => derives_empty(grammar, *v, path),
                    Symbol::Terminal(_) | Symbol::Eof => false,
                })
            });

            path.pop();
            result
        }

        proptest! {
            #[test]
            fn order_independent(
                (rules, shuffled) in rules().prop_flat_map(|r| (Just(r.clone()), Just(r).prop_shuffle()))
            ) {
                let grammar = build(&rules).map_err(|e| TestCaseError::fail(e.to_string()))?;
                let shuffled = build(&shuffled).map_err(|e| TestCaseError::fail(e.to_string()))?;

                prop_assert_eq!(Sets::solve(&grammar), Sets::solve(&shuffled));
            }

            #[test]
            fn idempotent(rules in rules()) {
                let grammar = build(&rules).map_err(|e| TestCaseError::fail(e.to_string()))?;

                prop_assert_eq!(Sets::solve(&grammar), Sets::solve(&grammar));
            }

            #[test]
            fn nullable_iff_derives_empty(rules in rules()) {
                let grammar = build(&rules).map_err(|e| TestCaseError::fail(e.to_string()))?;
                let sets = Sets::solve(&grammar);

                for (variable, _) in grammar.variables() {
                    prop_assert_eq!(
                        sets.is_nullable(variable),
                        derives_empty(&grammar, variable, &mut Vec::new())
                    );
                    prop_assert!(!sets.follow(variable).contains(&Symbol::Epsilon));
                }
            }
        }
    }
}
