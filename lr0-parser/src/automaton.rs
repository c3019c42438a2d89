use std::collections::HashSet;

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::bidimap::BidiMap;
use crate::grammar::Grammar;
use crate::item::Item;
use crate::sets::OrderedSet;
use crate::symbol::Symbol;

pub type ItemSet = OrderedSet<Item>;

/// Closes `items` under rule expansion: whenever the dot sits before a
/// nonterminal, add that nonterminal's productions (dot at position 0) to
/// the set, one pass per nonterminal, until a fixpoint is reached.
///
/// Each nonterminal is expanded at most once per call: once its productions
/// have been added, later items whose dot also sits before it don't trigger
/// a second expansion.
pub fn closure(items: impl IntoIterator<Item = Item>, grammar: &Grammar) -> ItemSet {
    let mut set = ItemSet::new();
    let mut worklist = Vec::new();
    for item in items {
        if set.insert(item) {
            worklist.push(item);
        }
    }

    let mut pending: HashSet<u32> = (0..grammar.nonterminal_count() as u32).collect();

    let mut i = 0;
    while i < worklist.len() {
        let item = worklist[i];
        i += 1;
        if let Some(Symbol::NonTerminal(y)) = item.symbol_after_dot(grammar) {
            if pending.remove(&y) {
                for rule in grammar.rules_for_lhs(y) {
                    let new_item = Item::initial(rule);
                    if set.insert(new_item) {
                        worklist.push(new_item);
                    }
                }
            }
        }
    }

    set
}

/// The state reached from `state` by shifting/going to `symbol`, or an
/// empty set if nothing in `state` has `symbol` after its dot.
pub fn goto(state: &ItemSet, symbol: Symbol, grammar: &Grammar) -> ItemSet {
    let advanced: Vec<Item> = state
        .iter()
        .filter(|item| item.symbol_after_dot(grammar) == Some(symbol))
        .map(Item::advance)
        .collect();
    closure(advanced, grammar)
}

/// The canonical collection of LR(0) states, represented as a graph whose
/// nodes are item sets and whose edges are labeled by the symbol that
/// triggers the transition. A `BidiMap` recovers a state's item set from
/// its `NodeIndex` and vice versa, the same pairing the teacher's LR
/// automaton construction uses to avoid storing item sets twice.
pub struct Automaton {
    graph: Graph<(), Symbol>,
    states: BidiMap<ItemSet, NodeIndex>,
    start: NodeIndex,
}

impl Automaton {
    pub fn build(grammar: &Grammar) -> Self {
        let start_items: Vec<Item> = grammar.start_rule_indices().map(Item::initial).collect();
        let start_set = closure(start_items, grammar);

        let mut graph = Graph::new();
        let mut states = BidiMap::new();
        let start = graph.add_node(());
        states.insert(start_set, start);

        let mut unprocessed = vec![start];
        while let Some(node) = unprocessed.pop() {
            let item_set = states.get_b_to_a(&node).expect("node must be registered").clone();

            let mut symbols_after_dot: Vec<Symbol> = Vec::new();
            for item in item_set.iter() {
                if let Some(symbol) = item.symbol_after_dot(grammar) {
                    if !symbols_after_dot.contains(&symbol) {
                        symbols_after_dot.push(symbol);
                    }
                }
            }

            for symbol in symbols_after_dot {
                let target_set = goto(&item_set, symbol, grammar);
                if target_set.is_empty() {
                    continue;
                }
                let target_node = match states.get_a_to_b(&target_set) {
                    Some(existing) => *existing,
                    None => {
                        let new_node = graph.add_node(());
                        states.insert(target_set, new_node);
                        unprocessed.push(new_node);
                        new_node
                    }
                };
                graph.add_edge(node, target_node, symbol);
            }
        }

        Automaton {
            graph,
            states,
            start,
        }
    }

    pub fn start_state(&self) -> usize {
        self.start.index()
    }

    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn item_set(&self, state: usize) -> &ItemSet {
        self.states
            .get_b_to_a(&NodeIndex::new(state))
            .expect("state index out of range")
    }

    /// The state reached by shifting/going to `symbol` from `state`, if any.
    pub fn transition(&self, state: usize, symbol: Symbol) -> Option<usize> {
        let node = NodeIndex::new(state);
        self.graph
            .edges(node)
            .find(|edge| *edge.weight() == symbol)
            .map(|edge| edge.target().index())
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
    fn closure_expands_start_state() {
        let g = arithmetic_grammar();
        let start_items: Vec<Item> = g.start_rule_indices().map(Item::initial).collect();
        let set = closure(start_items, &g);
        // S -> . E $, E -> . E + num, E -> . num
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn automaton_has_transition_on_e_from_start() {
        let g = arithmetic_grammar();
        let automaton = Automaton::build(&g);
        assert!(automaton.state_count() > 1);
        let e_nonterminal = Symbol::NonTerminal(1); // E, registered second
        assert!(automaton
            .transition(automaton.start_state(), e_nonterminal)
            .is_some());
    }
}
