use std::fmt::{self, Display, Formatter};

use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// An LR(0) item: a rule together with a dot position marking how much of
/// its right-hand side has already been matched.
///
/// Two items are equal iff they reference the same rule and the same dot
/// position — equivalent to comparing `(lhs, seen, rest)` since the rule
/// index fully determines `lhs`/`rhs` and the dot position determines the
/// `seen`/`rest` split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    rule: usize,
    dot: usize,
}

impl Item {
    /// An item with the dot at the very start of the rule's right-hand side.
    pub fn initial(rule: usize) -> Self {
        Item { rule, dot: 0 }
    }

    pub fn rule_index(&self) -> usize {
        self.rule
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.rule(self.rule).rhs().len()
    }

    pub fn symbol_after_dot(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.rule(self.rule).rhs().get(self.dot).copied()
    }

    /// The item with the dot moved one symbol to the right. Does not
    /// check against the rule's length, so advancing a complete item
    /// silently produces a dot position past the end of the right-hand
    /// side; callers only call this after `symbol_after_dot` confirmed
    /// there's a symbol there to advance past.
    pub fn advance(&self) -> Self {
        Item {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }

    pub fn display<'g>(&self, grammar: &'g Grammar) -> ItemDisplay<'g> {
        ItemDisplay {
            grammar,
            item: *self,
        }
    }
}

pub struct ItemDisplay<'g> {
    grammar: &'g Grammar,
    item: Item,
}

impl Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rule = self.grammar.rule(self.item.rule);
        write!(f, "{} ->", self.grammar.nonterminal_name(rule.lhs()))?;
        for (i, symbol) in rule.rhs().iter().enumerate() {
            if i == self.item.dot {
                write!(f, " •")?;
            }
            match symbol {
                Symbol::Terminal(idx) => write!(f, " {}", self.grammar.terminal_name(*idx))?,
                Symbol::End => write!(f, " $")?,
                Symbol::NonTerminal(idx) => write!(f, " {}", self.grammar.nonterminal_name(*idx))?,
            }
        }
        if self.item.dot == rule.rhs().len() {
            write!(f, " •")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    #[test]
    fn advance_and_complete() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let e = b.nonterminal("E");
        b.set_start(s).unwrap();
        b.rule(s, vec![e, Symbol::End]).unwrap();
        let g = b.build().unwrap();

        let item = Item::initial(0);
        assert!(!item.is_complete(&g));
        assert_eq!(item.symbol_after_dot(&g), Some(e));

        let item = item.advance();
        assert_eq!(item.symbol_after_dot(&g), Some(Symbol::End));

        let item = item.advance();
        assert!(item.is_complete(&g));
        assert_eq!(item.symbol_after_dot(&g), None);
    }
}
