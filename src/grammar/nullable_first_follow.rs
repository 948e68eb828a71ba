use indexmap::{IndexMap, IndexSet};
use log::debug;

use super::{Symbol, MAX_SET_SIZE};
use crate::error::{Error, Result};
use crate::Grammar;

/// FIRST and FOLLOW sets of every non-terminal, in rule order.
///
/// Members keep the order in which they were first found. Epsilon in a FIRST
/// set marks a nullable non-terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstFollow {
    first: IndexMap<char, IndexSet<Symbol>>,
    follow: IndexMap<char, IndexSet<Symbol>>,
}

fn insert(set: &mut IndexSet<Symbol>, symbol: Symbol) -> Result<bool> {
    if set.contains(&symbol) {
        return Ok(false);
    }
    if set.len() >= MAX_SET_SIZE {
        return Err(Error::capacity("symbols per FIRST/FOLLOW set", MAX_SET_SIZE));
    }
    set.insert(symbol);
    Ok(true)
}

impl FirstFollow {
    pub fn first(&self, non_terminal: char) -> Option<&IndexSet<Symbol>> {
        self.first.get(&non_terminal)
    }

    pub fn follow(&self, non_terminal: char) -> Option<&IndexSet<Symbol>> {
        self.follow.get(&non_terminal)
    }

    pub fn is_nullable(&self, non_terminal: char) -> bool {
        self.first(non_terminal)
            .map_or(false, |first| first.contains(&Symbol::Epsilon))
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = char> + '_ {
        self.first.keys().copied()
    }

    /// FIRST of a symbol string. Contains Epsilon iff every symbol is nullable,
    /// so the empty string yields `{#}`. Undefined non-terminals derive nothing.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> IndexSet<Symbol> {
        let mut first = IndexSet::new();
        for symbol in symbols {
            match symbol {
                Symbol::Epsilon => continue,
                Symbol::NonTerminal(c) => {
                    let Some(nested) = self.first(*c) else {
                        return first;
                    };
                    first.extend(nested.iter().filter(|s| **s != Symbol::Epsilon).copied());
                    if !nested.contains(&Symbol::Epsilon) {
                        return first;
                    }
                }
                terminal => {
                    first.insert(*terminal);
                    return first;
                }
            }
        }
        first.insert(Symbol::Epsilon);
        first
    }

    fn calculate_first(&mut self, g: &Grammar) -> Result<()> {
        let mut changed = true;
        while changed {
            changed = false;
            for rule in g.rules() {
                for production in rule.productions() {
                    let first = self.first_of_sequence(production.body());
                    let set = self.first.entry(rule.non_terminal).or_default();
                    for symbol in first {
                        changed |= insert(set, symbol)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn calculate_follow(&mut self, g: &Grammar) -> Result<()> {
        if let Some(start) = g.start_symbol() {
            insert(self.follow.entry(start).or_default(), Symbol::EndMarker)?;
        }

        let mut changed = true;
        while changed {
            changed = false;
            for rule in g.rules() {
                for production in rule.productions() {
                    let body = production.body();
                    for (k, symbol) in body.iter().enumerate() {
                        let Some(target) = symbol.non_terminal() else {
                            continue;
                        };
                        if !g.is_defined(target) {
                            continue;
                        }

                        let rest = self.first_of_sequence(&body[k + 1..]);
                        let mut additions: Vec<Symbol> = rest
                            .iter()
                            .filter(|s| **s != Symbol::Epsilon)
                            .copied()
                            .collect();
                        if rest.contains(&Symbol::Epsilon) && rule.non_terminal != target {
                            if let Some(inherited) = self.follow(rule.non_terminal) {
                                additions.extend(inherited.iter().copied());
                            }
                        }

                        let set = self.follow.entry(target).or_default();
                        for symbol in additions {
                            changed |= insert(set, symbol)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Grammar {
    pub fn calculate_first_follow(&self) -> Result<FirstFollow> {
        let mut sets = FirstFollow::default();
        for non_terminal in self.non_terminal_iter() {
            sets.first.insert(non_terminal, IndexSet::new());
            sets.follow.insert(non_terminal, IndexSet::new());
        }

        sets.calculate_first(self)?;
        sets.calculate_follow(self)?;

        for non_terminal in sets.non_terminal_iter() {
            debug!(
                "FIRST({}) = {:?}, FOLLOW({}) = {:?}",
                non_terminal,
                sets.first[&non_terminal],
                non_terminal,
                sets.follow[&non_terminal]
            );
        }
        Ok(sets)
    }
}
