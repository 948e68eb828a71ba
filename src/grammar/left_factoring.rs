use indexmap::IndexMap;
use log::debug;

use super::{Production, Symbol};
use crate::error::Result;
use crate::Grammar;

/// How often left factoring is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactoringPolicy {
    /// Extract at most one shared prefix from each rule present before the pass.
    #[default]
    SinglePass,
    /// Repeat passes over every rule, new ones included, until nothing changes.
    FixedPoint,
}

/// Finds the longest prefix shared by the largest group of productions.
/// Returns the prefix and which productions carry it.
fn shared_prefix(productions: &[Production]) -> (Vec<Symbol>, Vec<bool>) {
    let mut in_play = vec![true; productions.len()];
    let mut prefix: Vec<Symbol> = Vec::new();

    loop {
        let offset = prefix.len();
        let mut counts: IndexMap<Symbol, usize> = IndexMap::new();
        for (production, _) in productions.iter().zip(&in_play).filter(|(_, &k)| k) {
            if let Some(&symbol) = production.body().get(offset) {
                *counts.entry(symbol).or_default() += 1;
            }
        }

        // ties go to the symbol seen first
        let best = counts
            .iter()
            .fold(None, |best: Option<(Symbol, usize)>, (&symbol, &count)| match best {
                Some((_, max)) if max >= count => best,
                _ => Some((symbol, count)),
            });

        match best {
            Some((symbol, count)) if count >= 2 => {
                for (k, production) in productions.iter().enumerate() {
                    in_play[k] = in_play[k] && production.body().get(offset) == Some(&symbol);
                }
                prefix.push(symbol);
            }
            _ => break,
        }
    }

    (prefix, in_play)
}

impl Grammar {
    /// Left-factors the grammar and returns the number of rules appended.
    pub fn left_factor(&mut self, policy: FactoringPolicy) -> Result<usize> {
        let before = self.rules().len();
        match policy {
            FactoringPolicy::SinglePass => {
                self.left_factor_pass(before)?;
            }
            FactoringPolicy::FixedPoint => loop {
                let rules = self.rules().len();
                if self.left_factor_pass(rules)? == 0 {
                    break;
                }
            },
        }
        Ok(self.rules().len() - before)
    }

    /// Factors the first `rules` rules once each; returns how many changed.
    fn left_factor_pass(&mut self, rules: usize) -> Result<usize> {
        let mut factored = 0;
        for i in 0..rules {
            if self.left_factor_rule(i)? {
                factored += 1;
            }
        }
        Ok(factored)
    }

    fn left_factor_rule(&mut self, idx: usize) -> Result<bool> {
        let productions = self.rules()[idx].productions().to_vec();
        let (prefix, matched) = shared_prefix(&productions);
        if prefix.is_empty() {
            return Ok(false);
        }

        let fresh = self.find_available_non_terminal()?;
        let mut head = prefix.clone();
        head.push(Symbol::NonTerminal(fresh));
        let head = Production::new(head)?;

        let mut rewritten: Vec<Production> = Vec::new();
        let mut suffixes: Vec<Production> = Vec::new();
        for (production, matched) in productions.iter().zip(matched) {
            if !matched {
                rewritten.push(production.clone());
                continue;
            }
            if !rewritten.contains(&head) {
                rewritten.push(head.clone());
            }
            let suffix = production.suffix(prefix.len())?;
            if !suffixes.contains(&suffix) {
                suffixes.push(suffix);
            }
        }

        debug!(
            "left factoring {}: prefix {} moved into {}",
            self.rules()[idx].non_terminal,
            head,
            fresh
        );
        self.set_productions(idx, rewritten)?;
        self.add_rule(fresh, suffixes)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn factored(text: &str, policy: FactoringPolicy) -> (String, usize) {
        let mut g = Grammar::parse(text).unwrap();
        let added = g.left_factor(policy).unwrap();
        (g.to_string(), added)
    }

    #[test]
    fn dangling_else() {
        let (g, added) = factored("S -> iEtS | iEtSeS | a\nE -> b", FactoringPolicy::SinglePass);
        assert_eq!(added, 1);
        assert_eq!(g, "S -> iEtSA | a\nE -> b\nA -> # | eS\n");
    }

    #[test]
    fn no_shared_prefix_is_unchanged() {
        let (g, added) = factored("S -> aS | bS | c", FactoringPolicy::SinglePass);
        assert_eq!(added, 0);
        assert_eq!(g, "S -> aS | bS | c\n");
    }

    #[test]
    fn identical_suffixes_are_deduplicated() {
        let (g, _) = factored("S -> ab | ab | c", FactoringPolicy::SinglePass);
        assert_eq!(g, "S -> abA | c\nA -> #\n");
    }

    #[test]
    fn largest_group_wins_and_ties_go_to_first_seen() {
        let (g, _) = factored("S -> xa | yb | yc | xd", FactoringPolicy::SinglePass);
        assert_eq!(g, "S -> xA | yb | yc\nA -> a | d\n");
    }

    #[test]
    fn single_pass_leaves_other_groups() {
        let (g, added) = factored("S -> ab | ac | xb | xc", FactoringPolicy::SinglePass);
        assert_eq!(added, 1);
        assert_eq!(g, "S -> aA | xb | xc\nA -> b | c\n");
    }

    #[test]
    fn fixed_point_factors_every_group() {
        let (g, added) = factored("S -> ab | ac | xb | xc", FactoringPolicy::FixedPoint);
        assert_eq!(added, 2);
        assert_eq!(g, "S -> aA | xB\nA -> b | c\nB -> b | c\n");
    }

    #[test]
    fn second_pass_appends_nothing() {
        let mut g = Grammar::parse("S -> iEtS | iEtSeS | a\nE -> b").unwrap();
        g.left_factor(FactoringPolicy::SinglePass).unwrap();
        assert_eq!(g.left_factor(FactoringPolicy::SinglePass).unwrap(), 0);
    }
}
