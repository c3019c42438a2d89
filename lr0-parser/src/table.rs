use std::fmt::{self, Display, Formatter};

use crate::automaton::Automaton;
use crate::grammar::{Grammar, GrammarError};
use crate::symbol::Symbol;

/// One cell of the action/goto table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEntry {
    /// Consume the current token, push `target`.
    Shift { target: usize },
    /// Pop the rule's right-hand-side length worth of states/values, apply
    /// the rule's constructor, and goto the state recorded for the rule's
    /// left-hand side.
    Reduce { rule: usize },
    /// Push `target` after a reduce has exposed the reduced nonterminal.
    Goto { target: usize },
    /// The completed item is the start rule: parsing is done.
    Accept { rule: usize },
    /// No entry was ever recorded for this (state, symbol) pair.
    Unreachable,
}

impl Display for TableEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TableEntry::Shift { target } => write!(f, "s{target}"),
            TableEntry::Reduce { rule } => write!(f, "r{rule}"),
            TableEntry::Goto { target } => write!(f, "g{target}"),
            TableEntry::Accept { rule } => write!(f, "acc({rule})"),
            TableEntry::Unreachable => write!(f, "-"),
        }
    }
}

/// The action/goto table produced by table construction: a flat,
/// row-major grid of `state_count` rows by `grammar.column_count()`
/// columns.
pub struct ActionTable {
    entries: Vec<TableEntry>,
    columns: usize,
    state_count: usize,
    start_state: usize,
}

impl ActionTable {
    pub fn entry(&self, state: usize, symbol: Symbol, grammar: &Grammar) -> TableEntry {
        self.entries[state * self.columns + grammar.column_of(symbol)]
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn start_state(&self) -> usize {
        self.start_state
    }
}

/// Builds the action/goto table for `grammar` over its canonical
/// collection of LR(0) states.
///
/// For every state and every symbol: a nonterminal with a non-empty GOTO
/// becomes `Goto`; a terminal is `Shift` if the state has a transition on
/// it, or `Reduce`/`Accept` if the state contains exactly one completed
/// item. A completed item for the start rule becomes `Accept`, but only
/// on the end-of-input column — every other terminal column in that row
/// stays whatever a plain `Shift`/`Unreachable` lookup would give it, so
/// `Accept` appears exactly once in the whole table. Two completed items
/// in the same state is a reduce/reduce conflict; a completed item
/// alongside a shift on the same terminal is a shift/reduce conflict.
/// Conflicts are collected rather than returned on the first one, so a
/// caller sees the whole grammar's problems at once.
pub fn build_table(grammar: &Grammar, automaton: &Automaton) -> Result<ActionTable, Vec<GrammarError>> {
    let columns = grammar.column_count();
    let mut entries = vec![TableEntry::Unreachable; automaton.state_count() * columns];
    let mut errors = Vec::new();

    for state in 0..automaton.state_count() {
        let item_set = automaton.item_set(state);
        let completed: Vec<_> = item_set
            .iter()
            .filter(|item| item.is_complete(grammar))
            .collect();

        if completed.len() > 1 {
            errors.push(GrammarError::ReduceReduceConflict {
                state,
                rules: completed.iter().map(|item| item.rule_index()).collect(),
            });
        }

        for symbol in grammar.all_symbols() {
            let target = automaton.transition(state, symbol);
            let col = state * columns + grammar.column_of(symbol);

            match symbol {
                Symbol::NonTerminal(_) => {
                    if let Some(target) = target {
                        entries[col] = TableEntry::Goto { target };
                    }
                }
                Symbol::Terminal(_) | Symbol::End => {
                    let item = (completed.len() == 1).then(|| completed[0]);
                    let starts_here = item.map_or(false, |item| grammar.is_start_rule(item.rule_index()));
                    // A completed start-rule item only ever matters on the
                    // end-of-input column: the grammar invariant that `$`
                    // is the last symbol of the start rule's right-hand
                    // side means no other terminal column reaches this
                    // item. Restricting Accept to that one column is what
                    // keeps it unique table-wide.
                    let reduces_here = item.is_some() && (!starts_here || symbol == Symbol::End);
                    if reduces_here {
                        let item = item.unwrap();
                        entries[col] = if starts_here {
                            TableEntry::Accept {
                                rule: item.rule_index(),
                            }
                        } else {
                            TableEntry::Reduce {
                                rule: item.rule_index(),
                            }
                        };
                        if target.is_some() {
                            errors.push(GrammarError::ShiftReduceConflict { state, terminal: symbol });
                        }
                    } else if let Some(target) = target {
                        entries[col] = TableEntry::Shift { target };
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(ActionTable {
            entries,
            columns,
            state_count: automaton.state_count(),
            start_state: automaton.start_state(),
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn arithmetic_grammar() -> Grammar {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let e = b.nonterminal("E");
        let plus = b.terminal("+");
        let num = b.terminal("num");
        b.set_start(s).unwrap();
        b.rule(s, vec![e, Symbol::End]).unwrap();
        b.rule(e, vec![e, plus, num]).unwrap();
        b.rule(e, vec![num]).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn no_conflicts_for_unambiguous_grammar() {
        let g = arithmetic_grammar();
        let automaton = Automaton::build(&g);
        let table = build_table(&g, &automaton).expect("no conflicts expected");
        assert_eq!(table.start_state(), automaton.start_state());
    }

    #[test]
    fn shift_reduce_conflict_is_detected() {
        // dangling-else-shaped ambiguity: Stmt -> if Stmt | if Stmt else Stmt | other
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let stmt = b.nonterminal("Stmt");
        let iff = b.terminal("if");
        let els = b.terminal("else");
        let other = b.terminal("other");
        b.set_start(s).unwrap();
        b.rule(s, vec![stmt, Symbol::End]).unwrap();
        b.rule(stmt, vec![other]).unwrap();
        // ambiguous pair sharing a prefix after `if Stmt`
        b.rule(stmt, vec![iff, stmt]).unwrap();
        b.rule(stmt, vec![iff, stmt, els, stmt]).unwrap();
        let g = b.build().unwrap();
        let automaton = Automaton::build(&g);
        let result = build_table(&g, &automaton);
        assert!(result.is_err());
    }
}
