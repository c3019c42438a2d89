//! A thin scanner harness pairing a set of prefix matchers with a
//! [`Driver`](lr0_driver::Driver).
//!
//! Concrete scanners for any particular grammar are out of scope here;
//! this crate only defines the contract a matcher implements and the
//! declaration-order loop that drives it.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use lr0_driver::{Driver, ParseError};
use lr0_parser::Symbol;

/// One candidate lexeme. `try_match` is offered the unconsumed suffix of
/// the input and either recognizes a prefix of it or declines.
pub trait TerminalMatcher<V> {
    /// On a match, returns how many bytes of `input` were consumed, the
    /// terminal symbol produced, and its value. Returns `None` if `input`
    /// does not start with this matcher's lexeme.
    fn try_match(&self, input: &[u8]) -> Option<(usize, Symbol, V)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerError {
    /// No matcher recognized a prefix of the input at this offset.
    UnknownLexeme(usize),
    Parse(ParseError),
}

impl Display for ScannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScannerError::UnknownLexeme(offset) => write!(f, "unrecognized lexeme at offset {offset}"),
            ScannerError::Parse(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScannerError {}

impl From<ParseError> for ScannerError {
    fn from(err: ParseError) -> Self {
        ScannerError::Parse(err)
    }
}

/// Pairs a [`Driver`] with an ordered list of matchers and feeds it the
/// whole of an input buffer.
///
/// On each iteration the matchers are tried in declaration order against
/// the remaining input; the first match consumes its prefix and feeds the
/// produced terminal into `read_token`. When the input is exhausted, the
/// end-of-input terminal is fed. A matcher list with no match at the
/// current offset is an `UnknownLexeme`, never a silent skip.
pub struct Scanner<'t, V> {
    driver: Driver<'t, V>,
    matchers: &'t [Box<dyn TerminalMatcher<V>>],
}

impl<'t, V> Scanner<'t, V> {
    pub fn new(driver: Driver<'t, V>, matchers: &'t [Box<dyn TerminalMatcher<V>>]) -> Self {
        Scanner { driver, matchers }
    }

    /// Runs the matcher loop to completion over `input`, then feeds the
    /// end-of-input terminal and returns the reduced start-symbol value.
    pub fn scan(mut self, input: &[u8], end_value: V) -> Result<V, ScannerError> {
        let mut offset = 0;
        while offset < input.len() {
            let remaining = &input[offset..];
            let matched = self.matchers.iter().find_map(|m| m.try_match(remaining));
            let (consumed, terminal, value) = matched.ok_or(ScannerError::UnknownLexeme(offset))?;
            self.driver.read_token(terminal, value)?;
            offset += consumed;
        }
        let accepted = self.driver.read_token(Symbol::End, end_value)?;
        debug_assert!(accepted, "feeding end-of-input must accept a well-formed grammar");
        Ok(self.driver.result()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lr0_driver::Constructor;
    use lr0_parser::{build_table, ActionTable, Automaton, Grammar, GrammarBuilder};

    #[derive(Debug, Clone, PartialEq)]
    enum Value {
        Num(i64),
        Sum(i64),
        End,
    }

    // S -> E $
    // E -> E + num
    // E -> num
    fn arithmetic() -> (Grammar, ActionTable) {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let e = b.nonterminal("E");
        let plus = b.terminal("+");
        let num = b.terminal("num");
        b.set_start(s).unwrap();
        b.rule(s, vec![e, Symbol::End]).unwrap();
        b.rule(e, vec![e, plus, num]).unwrap();
        b.rule(e, vec![num]).unwrap();
        let grammar = b.build().unwrap();
        let automaton = Automaton::build(&grammar);
        let table = build_table(&grammar, &automaton).unwrap();
        (grammar, table)
    }

    fn constructors() -> Vec<Constructor<Value>> {
        vec![
            Box::new(|mut args: Vec<Value>| args.remove(0)),
            Box::new(|args: Vec<Value>| {
                let lhs = match &args[0] {
                    Value::Sum(n) | Value::Num(n) => *n,
                    Value::End => unreachable!(),
                };
                let rhs = match &args[2] {
                    Value::Sum(n) | Value::Num(n) => *n,
                    Value::End => unreachable!(),
                };
                Value::Sum(lhs + rhs)
            }),
            Box::new(|mut args: Vec<Value>| args.remove(0)),
        ]
    }

    struct PlusMatcher;
    impl TerminalMatcher<Value> for PlusMatcher {
        fn try_match(&self, input: &[u8]) -> Option<(usize, Symbol, Value)> {
            if input.first() == Some(&b'+') {
                Some((1, Symbol::Terminal(0), Value::End))
            } else {
                None
            }
        }
    }

    struct DigitMatcher;
    impl TerminalMatcher<Value> for DigitMatcher {
        fn try_match(&self, input: &[u8]) -> Option<(usize, Symbol, Value)> {
            let len = input.iter().take_while(|b| b.is_ascii_digit()).count();
            if len == 0 {
                return None;
            }
            let text = std::str::from_utf8(&input[..len]).unwrap();
            let n: i64 = text.parse().unwrap();
            Some((len, Symbol::Terminal(1), Value::Num(n)))
        }
    }

    #[test]
    fn scans_and_reduces_sum() {
        let (grammar, table) = arithmetic();
        let ctors = constructors();
        let driver = Driver::new(&grammar, &table, &ctors);
        let matchers: Vec<Box<dyn TerminalMatcher<Value>>> = vec![Box::new(PlusMatcher), Box::new(DigitMatcher)];
        let scanner = Scanner::new(driver, &matchers);

        let result = scanner.scan(b"12+7", Value::End).unwrap();
        assert_eq!(result, Value::Sum(19));
    }

    #[test]
    fn unknown_lexeme_is_reported() {
        let (grammar, table) = arithmetic();
        let ctors = constructors();
        let driver = Driver::new(&grammar, &table, &ctors);
        let matchers: Vec<Box<dyn TerminalMatcher<Value>>> = vec![Box::new(PlusMatcher), Box::new(DigitMatcher)];
        let scanner = Scanner::new(driver, &matchers);

        let err = scanner.scan(b"12?7", Value::End).unwrap_err();
        assert_eq!(err, ScannerError::UnknownLexeme(2));
    }
}
