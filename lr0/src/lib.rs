//! Facade crate re-exporting the generator, driver, ART builder, and
//! scanner harness as a single dependency.

pub use lr0_art::{Art, ArtBuilder, ArtError};
pub use lr0_driver::{Constructor, Driver, ParseError};
pub use lr0_parser::{
    build_table, closure, goto, ActionTable, Automaton, Grammar, GrammarBuilder, GrammarError, Item,
    ItemSet, OrderedSet, Rule, Symbol, SymbolIdx, TableEntry,
};
pub use lr0_scanner::{Scanner, ScannerError, TerminalMatcher};
