use std::fmt;

use log::warn;
use serde::Serialize;

use super::{Production, Symbol, MAX_RULES};
use crate::error::{Error, Result};
use crate::Grammar;

/// A grammar line that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredLine {
    pub line: usize,
    pub text: String,
    pub reason: &'static str,
}

impl fmt::Display for IgnoredLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {} ({:?})", self.line, self.reason, self.text)
    }
}

impl Grammar {
    pub fn parse(grammar: &str) -> Result<Self> {
        Self::parse_with_warnings(grammar).map(|(g, _)| g)
    }

    /// Loads `LHS -> RHS1 | RHS2 | ...` lines. Spaces are insignificant.
    /// Lines that do not define a rule are returned alongside the grammar.
    pub fn parse_with_warnings(grammar: &str) -> Result<(Self, Vec<IgnoredLine>)> {
        let mut g = Self::new();
        let mut ignored: Vec<IgnoredLine> = Vec::new();
        let mut definitions = 0;

        for (i, raw) in grammar.lines().enumerate() {
            let line: String = raw.chars().filter(|&c| c != ' ').collect();
            if line.trim().is_empty() {
                continue;
            }
            let mut skip = |reason: &'static str| {
                warn!("ignoring grammar line {}: {}", i + 1, reason);
                ignored.push(IgnoredLine {
                    line: i + 1,
                    text: raw.to_string(),
                    reason,
                });
            };

            let Some((left, rights)) = line.split_once("->") else {
                skip("missing \"->\"");
                continue;
            };
            let left = left.trim();
            let rights = rights.trim();
            if left.is_empty() || rights.is_empty() {
                skip("empty side");
                continue;
            }
            let mut left_chars = left.chars();
            let non_terminal = match (left_chars.next(), left_chars.next()) {
                (Some(c @ 'A'..='Z'), None) => c,
                _ => {
                    skip("left side is not a single non-terminal");
                    continue;
                }
            };

            definitions += 1;
            if definitions > MAX_RULES {
                return Err(Error::capacity("rules", MAX_RULES));
            }

            let productions = rights
                .split('|')
                .filter(|right| !right.is_empty())
                .map(|right| Production::new(Symbol::scan(right)))
                .collect::<Result<Vec<_>>>()?;
            g.add_rule(non_terminal, productions)?;
        }

        Ok((g, ignored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("E -> E+T | T\nT -> id").unwrap();
        assert_eq!(g.start_symbol(), Some('E'));
        assert_eq!(g.rules().len(), 2);
        let e = g.rule('E').unwrap();
        assert_eq!(
            e.productions()[0].symbols(),
            &[
                Symbol::NonTerminal('E'),
                Symbol::Literal('+'),
                Symbol::NonTerminal('T')
            ]
        );
        assert_eq!(g.rule('T').unwrap().productions()[0].symbols(), &[Symbol::Identifier]);
    }

    #[test]
    fn spaces_are_insignificant() {
        let g = Grammar::parse("  S ->  a B |  #  ").unwrap();
        let s = g.rule('S').unwrap();
        assert_eq!(s.productions()[0].to_string(), "aB");
        assert!(s.productions()[1].is_epsilon());
    }

    #[test]
    fn lines_without_arrow_are_reported() {
        let (g, ignored) = Grammar::parse_with_warnings("S -> a\nnot a rule\n\nx -> b\n-> c").unwrap();
        assert_eq!(g.rules().len(), 1);
        assert_eq!(
            ignored.iter().map(|l| l.line).collect::<Vec<_>>(),
            vec![2, 4, 5]
        );
        assert_eq!(ignored[0].reason, "missing \"->\"");
    }

    #[test]
    fn repeated_left_side_extends_rule() {
        let g = Grammar::parse("S -> a\nS -> b").unwrap();
        assert_eq!(g.rules().len(), 1);
        assert_eq!(g.rule('S').unwrap().productions().len(), 2);
    }

    #[test]
    fn empty_alternatives_are_skipped() {
        let g = Grammar::parse("S -> a||b|").unwrap();
        assert_eq!(g.rule('S').unwrap().productions().len(), 2);
    }

    #[test]
    fn empty_parse() {
        let g = Grammar::parse("  \n  ").unwrap();
        assert!(g.rules().is_empty());
    }

    #[test]
    fn too_many_rules() {
        let text: String = ('A'..='Z')
            .cycle()
            .take(MAX_RULES + 1)
            .map(|c| format!("{} -> a\n", c))
            .collect();
        assert!(matches!(
            Grammar::parse(&text),
            Err(Error::CapacityExceeded { limit: MAX_RULES, .. })
        ));
    }
}
