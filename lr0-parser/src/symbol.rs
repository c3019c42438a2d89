/// Index into a grammar's terminal or nonterminal list.
pub type SymbolIdx = u32;

/// A grammar symbol: a terminal produced by the scanner, the reserved
/// end-of-input terminal, or a nonterminal produced by reduction.
///
/// There is no `Epsilon` variant: this grammar model forbids empty
/// productions (see spec's Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(SymbolIdx),
    End,
    NonTerminal(SymbolIdx),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::End)
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }
}
