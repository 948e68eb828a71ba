use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use super::{
    END_MARK, EPSILON, IDENTIFIER, MAX_PRODUCTIONS, MAX_PRODUCTION_LEN, MAX_RULES,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    NonTerminal(char),
    Literal(char),
    /// The two-character `id` token.
    Identifier,
    Epsilon,
    EndMarker,
}

impl Symbol {
    pub fn from_char(c: char) -> Self {
        match c {
            'A'..='Z' => Symbol::NonTerminal(c),
            EPSILON => Symbol::Epsilon,
            c => Symbol::Literal(c),
        }
    }

    /// Splits grammar text into symbols. `id` is read as one symbol.
    pub fn scan(text: &str) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == 'i' && chars.peek() == Some(&'d') {
                chars.next();
                symbols.push(Symbol::Identifier);
            } else {
                symbols.push(Symbol::from_char(c));
            }
        }
        symbols
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_non_terminal()
    }

    pub fn non_terminal(&self) -> Option<char> {
        match self {
            Symbol::NonTerminal(c) => Some(*c),
            _ => None,
        }
    }

    /// Number of input bytes the symbol spans when it is read as a token.
    pub fn width(&self) -> usize {
        match self {
            Symbol::Literal(c) | Symbol::NonTerminal(c) => c.len_utf8(),
            Symbol::Identifier => IDENTIFIER.len(),
            Symbol::Epsilon | Symbol::EndMarker => 0,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::NonTerminal(c) | Symbol::Literal(c) => write!(f, "{}", c),
            Symbol::Identifier => f.write_str(IDENTIFIER),
            Symbol::Epsilon => write!(f, "{}", EPSILON),
            Symbol::EndMarker => write!(f, "{}", END_MARK),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One alternative right-hand side. Either a non-empty sequence without
/// Epsilon in it, or the lone Epsilon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    symbols: Vec<Symbol>,
}

impl Production {
    pub fn new(symbols: Vec<Symbol>) -> Result<Self> {
        let symbols: Vec<Symbol> = symbols
            .into_iter()
            .filter(|s| *s != Symbol::Epsilon)
            .collect();
        if symbols.is_empty() {
            return Ok(Self::epsilon());
        }
        if symbols.len() > MAX_PRODUCTION_LEN {
            return Err(Error::capacity("symbols per production", MAX_PRODUCTION_LEN));
        }
        Ok(Self { symbols })
    }

    pub fn epsilon() -> Self {
        Self {
            symbols: vec![Symbol::Epsilon],
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::new(Symbol::scan(text))
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbols == [Symbol::Epsilon]
    }

    /// The symbols as written, `[Epsilon]` for the empty production.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The symbols that are actually derived, empty for the empty production.
    pub fn body(&self) -> &[Symbol] {
        if self.is_epsilon() {
            &[]
        } else {
            &self.symbols
        }
    }

    pub fn first_symbol(&self) -> Option<Symbol> {
        self.body().first().copied()
    }

    pub fn starts_with(&self, prefix: &[Symbol]) -> bool {
        self.body().starts_with(prefix)
    }

    pub fn append(&self, symbol: Symbol) -> Result<Self> {
        let mut symbols = self.body().to_vec();
        symbols.push(symbol);
        Self::new(symbols)
    }

    /// Drops the first `n` symbols; what is left may be the empty production.
    pub fn suffix(&self, n: usize) -> Result<Self> {
        Self::new(self.body().get(n..).unwrap_or_default().to_vec())
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

impl Serialize for Production {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub non_terminal: char,
    productions: Vec<Production>,
}

impl Rule {
    pub fn new(non_terminal: char) -> Self {
        Self {
            non_terminal,
            productions: Vec::new(),
        }
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn add_production(&mut self, production: Production) -> Result<()> {
        if self.productions.len() >= MAX_PRODUCTIONS {
            return Err(Error::capacity("productions per rule", MAX_PRODUCTIONS));
        }
        self.productions.push(production);
        Ok(())
    }

    pub fn set_productions(&mut self, productions: Vec<Production>) -> Result<()> {
        if productions.len() > MAX_PRODUCTIONS {
            return Err(Error::capacity("productions per rule", MAX_PRODUCTIONS));
        }
        self.productions = productions;
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> ", self.non_terminal)?;
        for (i, production) in self.productions.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", production)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    rule_table: HashMap<char, usize>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, non_terminal: char) -> Option<&Rule> {
        self.rule_table.get(&non_terminal).map(|&i| &self.rules[i])
    }

    pub fn start_symbol(&self) -> Option<char> {
        self.rules.first().map(|r| r.non_terminal)
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = char> + '_ {
        self.rules.iter().map(|r| r.non_terminal)
    }

    pub fn is_defined(&self, non_terminal: char) -> bool {
        self.rule_table.contains_key(&non_terminal)
    }

    /// Adds productions for `non_terminal`, creating its rule if needed.
    /// Returns the index of the rule.
    pub fn add_rule(&mut self, non_terminal: char, productions: Vec<Production>) -> Result<usize> {
        let idx = match self.rule_table.get(&non_terminal) {
            Some(&idx) => idx,
            None => {
                if self.rules.len() >= MAX_RULES {
                    return Err(Error::capacity("rules", MAX_RULES));
                }
                self.rules.push(Rule::new(non_terminal));
                self.rule_table.insert(non_terminal, self.rules.len() - 1);
                self.rules.len() - 1
            }
        };
        for production in productions {
            self.rules[idx].add_production(production)?;
        }
        Ok(idx)
    }

    pub(crate) fn set_productions(&mut self, idx: usize, productions: Vec<Production>) -> Result<()> {
        self.rules[idx].set_productions(productions)
    }

    fn mentioned_non_terminals(&self) -> HashSet<char> {
        self.rules
            .iter()
            .flat_map(|r| r.productions.iter())
            .flat_map(|p| p.symbols().iter())
            .filter_map(|s| s.non_terminal())
            .collect()
    }

    /// The first letter that is neither a rule head nor used in any production.
    pub fn find_available_non_terminal(&self) -> Result<char> {
        let mentioned = self.mentioned_non_terminals();
        ('A'..='Z')
            .find(|c| !self.is_defined(*c) && !mentioned.contains(c))
            .ok_or(Error::NonTerminalsExhausted)
    }

    /// Non-terminals used in some production that have no rule of their own.
    pub fn undefined_non_terminals(&self) -> Vec<char> {
        let mut undefined: Vec<char> = self
            .mentioned_non_terminals()
            .into_iter()
            .filter(|c| !self.is_defined(*c))
            .collect();
        undefined.sort_unstable();
        undefined
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scan_reads_identifier_as_one_symbol() {
        assert_eq!(
            Symbol::scan("id+iA#"),
            vec![
                Symbol::Identifier,
                Symbol::Literal('+'),
                Symbol::Literal('i'),
                Symbol::NonTerminal('A'),
                Symbol::Epsilon,
            ]
        );
    }

    #[test]
    fn production_normalizes_epsilon() {
        assert!(Production::parse("#").unwrap().is_epsilon());
        assert!(Production::parse("").unwrap().is_epsilon());
        assert_eq!(Production::parse("a#B").unwrap().to_string(), "aB");
        assert!(Production::parse("#").unwrap().body().is_empty());
    }

    #[test]
    fn production_length_is_bounded() {
        let long = "a".repeat(MAX_PRODUCTION_LEN + 1);
        assert!(matches!(
            Production::parse(&long),
            Err(Error::CapacityExceeded { limit: MAX_PRODUCTION_LEN, .. })
        ));
    }

    #[test]
    fn rule_production_count_is_bounded() {
        let mut rule = Rule::new('S');
        for _ in 0..MAX_PRODUCTIONS {
            rule.add_production(Production::parse("a").unwrap()).unwrap();
        }
        assert!(rule.add_production(Production::parse("a").unwrap()).is_err());
    }

    #[test]
    fn available_non_terminal_skips_used_letters() {
        let mut g = Grammar::new();
        g.add_rule('S', vec![Production::parse("aB").unwrap()]).unwrap();
        g.add_rule('A', vec![Production::parse("c").unwrap()]).unwrap();
        assert_eq!(g.find_available_non_terminal().unwrap(), 'C');
        assert_eq!(g.undefined_non_terminals(), vec!['B']);
    }

    #[test]
    fn available_non_terminal_exhausted() {
        let mut g = Grammar::new();
        for c in 'A'..='Z' {
            g.add_rule(c, vec![Production::parse("a").unwrap()]).unwrap();
        }
        assert!(matches!(
            g.find_available_non_terminal(),
            Err(Error::NonTerminalsExhausted)
        ));
    }
}
