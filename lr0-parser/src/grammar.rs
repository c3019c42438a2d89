use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::symbol::{Symbol, SymbolIdx};

/// A single production: `lhs -> rhs`.
///
/// Rules are identified by their position in `Grammar::rules()`; that index
/// is what `Item` stores, rather than a reference to the rule itself.
#[derive(Debug, Clone)]
pub struct Rule {
    lhs: SymbolIdx,
    rhs: Vec<Symbol>,
}

impl Rule {
    pub fn lhs(&self) -> SymbolIdx {
        self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }
}

/// Construction-time failure. Every kind the action table builder can
/// report lives here too, since grammar validation and table construction
/// are both "can this grammar be accepted" failures from the caller's
/// point of view.
#[derive(Debug, Clone)]
pub enum GrammarError {
    /// A rule referenced a terminal or nonterminal index that was never
    /// registered with the builder.
    UndefinedSymbol(String),
    /// No rule (or more than one rule) has the designated start symbol as
    /// its left-hand side.
    NoStartRule,
    /// A rule's right-hand side was empty. This grammar model has no
    /// epsilon production.
    EmptyProduction { lhs: SymbolIdx },
    ShiftReduceConflict { state: usize, terminal: Symbol },
    ReduceReduceConflict { state: usize, rules: Vec<usize> },
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UndefinedSymbol(name) => {
                write!(f, "undefined symbol: {name}")
            }
            GrammarError::NoStartRule => {
                write!(f, "grammar must have exactly one rule for the start symbol")
            }
            GrammarError::EmptyProduction { lhs } => {
                write!(f, "rule for nonterminal {lhs} has an empty right-hand side")
            }
            GrammarError::ShiftReduceConflict { state, terminal } => {
                write!(f, "shift/reduce conflict in state {state} on {terminal:?}")
            }
            GrammarError::ReduceReduceConflict { state, rules } => {
                write!(f, "reduce/reduce conflict in state {state} between rules {rules:?}")
            }
        }
    }
}

impl Error for GrammarError {}

/// A grammar: a fixed set of terminals, a fixed set of nonterminals, a
/// start symbol, and the rules connecting them.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminal_names: Vec<String>,
    nonterminal_names: Vec<String>,
    rules: Vec<Rule>,
    start: SymbolIdx,
}

impl Grammar {
    pub fn terminal_count(&self) -> usize {
        self.terminal_names.len()
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminal_names.len()
    }

    pub fn terminal_name(&self, idx: SymbolIdx) -> &str {
        &self.terminal_names[idx as usize]
    }

    pub fn nonterminal_name(&self, idx: SymbolIdx) -> &str {
        &self.nonterminal_names[idx as usize]
    }

    pub fn start_symbol(&self) -> Symbol {
        Symbol::NonTerminal(self.start)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, idx: usize) -> &Rule {
        &self.rules[idx]
    }

    pub fn is_start_rule(&self, idx: usize) -> bool {
        self.rules[idx].lhs == self.start
    }

    /// Indices of every rule whose left-hand side is the start symbol.
    /// This grammar model requires exactly one (enforced at build time),
    /// but closure construction asks for all of them uniformly.
    pub fn start_rule_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.lhs == self.start)
            .map(|(i, _)| i)
    }

    pub fn rules_for_lhs(&self, lhs: SymbolIdx) -> impl Iterator<Item = usize> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.lhs == lhs)
            .map(|(i, _)| i)
    }

    pub fn terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.terminal_names.len() as SymbolIdx).map(Symbol::Terminal)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.nonterminal_names.len() as SymbolIdx).map(Symbol::NonTerminal)
    }

    /// Terminals, then the end-of-input symbol, then nonterminals — the
    /// full column space of the action/goto table.
    pub fn all_symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.terminals()
            .chain(std::iter::once(Symbol::End))
            .chain(self.nonterminals())
    }

    pub fn column_count(&self) -> usize {
        self.terminal_count() + 1 + self.nonterminal_count()
    }

    pub fn column_of(&self, symbol: Symbol) -> usize {
        match symbol {
            Symbol::Terminal(idx) => idx as usize,
            Symbol::End => self.terminal_count(),
            Symbol::NonTerminal(idx) => self.terminal_count() + 1 + idx as usize,
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{} ->", self.nonterminal_names[rule.lhs as usize])?;
            for symbol in &rule.rhs {
                match symbol {
                    Symbol::Terminal(idx) => write!(f, " {}", self.terminal_names[*idx as usize])?,
                    Symbol::End => write!(f, " $")?,
                    Symbol::NonTerminal(idx) => {
                        write!(f, " {}", self.nonterminal_names[*idx as usize])?
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Builds a `Grammar` from explicitly registered terminals, nonterminals,
/// and rules. Unlike a textual-grammar frontend, every symbol reference
/// here is already a validated `Symbol` returned by `terminal`/`nonterminal`,
/// so `UndefinedSymbol` can only arise from a rule built against a
/// `Symbol` from a different builder.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    terminal_names: Vec<String>,
    nonterminal_names: Vec<String>,
    rules: Vec<Rule>,
    start: Option<SymbolIdx>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminal(&mut self, name: impl Into<String>) -> Symbol {
        let idx = self.terminal_names.len() as SymbolIdx;
        self.terminal_names.push(name.into());
        Symbol::Terminal(idx)
    }

    pub fn nonterminal(&mut self, name: impl Into<String>) -> Symbol {
        let idx = self.nonterminal_names.len() as SymbolIdx;
        self.nonterminal_names.push(name.into());
        Symbol::NonTerminal(idx)
    }

    pub fn set_start(&mut self, start: Symbol) -> Result<(), GrammarError> {
        match start {
            Symbol::NonTerminal(idx) => {
                self.start = Some(idx);
                Ok(())
            }
            other => Err(GrammarError::UndefinedSymbol(format!(
                "start symbol must be a nonterminal, got {other:?}"
            ))),
        }
    }

    pub fn rule(&mut self, lhs: Symbol, rhs: Vec<Symbol>) -> Result<(), GrammarError> {
        let lhs_idx = match lhs {
            Symbol::NonTerminal(idx) => idx,
            other => {
                return Err(GrammarError::UndefinedSymbol(format!(
                    "rule left-hand side must be a nonterminal, got {other:?}"
                )))
            }
        };
        if lhs_idx as usize >= self.nonterminal_names.len() {
            return Err(GrammarError::UndefinedSymbol(format!(
                "nonterminal {lhs_idx} was never registered"
            )));
        }
        if rhs.is_empty() {
            return Err(GrammarError::EmptyProduction { lhs: lhs_idx });
        }
        for symbol in &rhs {
            match symbol {
                Symbol::Terminal(idx) if (*idx as usize) >= self.terminal_names.len() => {
                    return Err(GrammarError::UndefinedSymbol(format!(
                        "terminal {idx} was never registered"
                    )))
                }
                Symbol::NonTerminal(idx) if (*idx as usize) >= self.nonterminal_names.len() => {
                    return Err(GrammarError::UndefinedSymbol(format!(
                        "nonterminal {idx} was never registered"
                    )))
                }
                _ => {}
            }
        }
        self.rules.push(Rule { lhs: lhs_idx, rhs });
        Ok(())
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let start = self.start.ok_or(GrammarError::NoStartRule)?;
        let start_rule_count = self.rules.iter().filter(|r| r.lhs == start).count();
        if start_rule_count != 1 {
            return Err(GrammarError::NoStartRule);
        }
        Ok(Grammar {
            terminal_names: self.terminal_names,
            nonterminal_names: self.nonterminal_names,
            rules: self.rules,
            start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic_grammar() -> Grammar {
        // S -> E $
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
    fn builds_valid_grammar() {
        let g = arithmetic_grammar();
        assert_eq!(g.rules().len(), 3);
        assert_eq!(g.terminal_count(), 2);
        assert_eq!(g.nonterminal_count(), 2);
    }

    #[test]
    fn rejects_missing_start_rule() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        b.set_start(s).unwrap();
        assert!(matches!(b.build(), Err(GrammarError::NoStartRule)));
    }

    #[test]
    fn rejects_empty_production() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        b.set_start(s).unwrap();
        assert!(matches!(
            b.rule(s, vec![]),
            Err(GrammarError::EmptyProduction { .. })
        ));
    }
}
