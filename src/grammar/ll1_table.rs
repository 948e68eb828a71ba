use std::fmt;

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use super::{nullable_first_follow::FirstFollow, Production, Symbol};
use crate::error::{Error, Result};
use crate::Grammar;

/// What to do when two productions claim the same table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Keep the first production written and record the collision.
    #[default]
    FirstWins,
    /// Fail with [`Error::TableConflict`] on the first collision.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableConflict {
    pub non_terminal: char,
    pub terminal: Symbol,
    pub kept: Production,
    pub rejected: Production,
}

impl fmt::Display for TableConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] holds {} -> {}, dropped {} -> {}",
            self.non_terminal,
            self.terminal,
            self.non_terminal,
            self.kept,
            self.non_terminal,
            self.rejected
        )
    }
}

/// The partial map (non-terminal, terminal) -> production.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LL1ParsingTable {
    rows: IndexMap<char, IndexMap<Symbol, Production>>,
    conflicts: Vec<TableConflict>,
}

impl LL1ParsingTable {
    pub fn get(&self, non_terminal: char, terminal: Symbol) -> Option<&Production> {
        self.rows.get(&non_terminal)?.get(&terminal)
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = char> + '_ {
        self.rows.keys().copied()
    }

    /// Every terminal that labels a filled cell, end marker last.
    pub fn terminals(&self) -> Vec<Symbol> {
        let mut terminals: Vec<Symbol> = Vec::new();
        for terminal in self.rows.values().flat_map(|row| row.keys()) {
            if *terminal != Symbol::EndMarker && !terminals.contains(terminal) {
                terminals.push(*terminal);
            }
        }
        terminals.push(Symbol::EndMarker);
        terminals
    }

    pub fn conflicts(&self) -> &[TableConflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    fn set(
        &mut self,
        non_terminal: char,
        terminal: Symbol,
        production: &Production,
        policy: ConflictPolicy,
    ) -> Result<()> {
        let row = self.rows.entry(non_terminal).or_default();
        let kept = match row.get(&terminal) {
            None => {
                row.insert(terminal, production.clone());
                return Ok(());
            }
            Some(kept) if kept == production => return Ok(()),
            Some(kept) => kept.clone(),
        };

        let conflict = TableConflict {
            non_terminal,
            terminal,
            kept,
            rejected: production.clone(),
        };
        if policy == ConflictPolicy::Reject {
            return Err(Error::TableConflict(conflict));
        }
        warn!("LL(1) conflict: {}", conflict);
        self.conflicts.push(conflict);
        Ok(())
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(
        &self,
        sets: &FirstFollow,
        policy: ConflictPolicy,
    ) -> Result<LL1ParsingTable> {
        let mut table = LL1ParsingTable::default();

        for rule in self.rules() {
            let left = rule.non_terminal;
            table.rows.entry(left).or_default();
            let follow: Vec<Symbol> = sets
                .follow(left)
                .map(|f| f.iter().copied().collect())
                .unwrap_or_default();

            for production in rule.productions() {
                if production.is_epsilon() {
                    for &terminal in &follow {
                        table.set(left, terminal, production, policy)?;
                    }
                    continue;
                }

                let first = sets.first_of_sequence(production.body());
                for &terminal in first.iter().filter(|s| **s != Symbol::Epsilon) {
                    table.set(left, terminal, production, policy)?;
                }
                if first.contains(&Symbol::Epsilon) {
                    for &terminal in &follow {
                        table.set(left, terminal, production, policy)?;
                    }
                }
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::left_factoring::FactoringPolicy;
    use pretty_assertions::assert_eq;
    use Symbol::*;

    fn build(text: &str, policy: ConflictPolicy) -> Result<(Grammar, FirstFollow, LL1ParsingTable)> {
        let mut g = Grammar::parse(text)?;
        g.left_factor(FactoringPolicy::SinglePass)?;
        g.eliminate_left_recursion()?;
        let sets = g.calculate_first_follow()?;
        let table = g.generate_ll1_parsing_table(&sets, policy)?;
        Ok((g, sets, table))
    }

    fn cell(table: &LL1ParsingTable, nt: char, t: Symbol) -> Option<String> {
        table.get(nt, t).map(|p| p.to_string())
    }

    #[test]
    fn expression_grammar() {
        let (_, _, table) = build("E -> E+T | T\nT -> id", ConflictPolicy::FirstWins).unwrap();
        assert_eq!(cell(&table, 'E', Identifier), Some("TA".to_string()));
        assert_eq!(cell(&table, 'A', Literal('+')), Some("+TA".to_string()));
        assert_eq!(cell(&table, 'A', EndMarker), Some("#".to_string()));
        assert_eq!(cell(&table, 'T', Identifier), Some("id".to_string()));
        assert_eq!(cell(&table, 'E', Literal('+')), None);
        assert_eq!(table.terminals(), vec![Identifier, Literal('+'), EndMarker]);
        assert!(table.is_ll1());
    }

    #[test]
    fn nullable_leading_non_terminal_uses_follow() {
        let (_, _, table) = build("S -> Ac\nA -> a | #", ConflictPolicy::FirstWins).unwrap();
        assert_eq!(cell(&table, 'S', Literal('a')), Some("Ac".to_string()));
        assert_eq!(cell(&table, 'S', Literal('c')), Some("Ac".to_string()));
        assert_eq!(cell(&table, 'A', Literal('c')), Some("#".to_string()));
    }

    #[test]
    fn every_first_and_follow_cell_is_filled() {
        let (g, sets, table) = build(
            "E -> E+T | T\nT -> T*F | F\nF -> (E) | id",
            ConflictPolicy::Reject,
        )
        .unwrap();
        for rule in g.rules() {
            for production in rule.productions() {
                let first = sets.first_of_sequence(production.body());
                for t in first.iter().filter(|s| **s != Epsilon) {
                    assert!(table.get(rule.non_terminal, *t).is_some());
                }
                if first.contains(&Epsilon) {
                    for t in sets.follow(rule.non_terminal).unwrap() {
                        assert!(table.get(rule.non_terminal, *t).is_some());
                    }
                }
            }
        }
    }

    #[test]
    fn conflicts_keep_first_writer() {
        let (_, _, table) =
            build("S -> iEtS | iEtSeS | a\nE -> b", ConflictPolicy::FirstWins).unwrap();
        assert_eq!(cell(&table, 'A', Literal('e')), Some("#".to_string()));
        assert_eq!(table.conflicts().len(), 1);
        let conflict = &table.conflicts()[0];
        assert_eq!(conflict.non_terminal, 'A');
        assert_eq!(conflict.terminal, Literal('e'));
        assert_eq!(conflict.rejected.to_string(), "eS");
        assert!(!table.is_ll1());
    }

    #[test]
    fn conflicts_can_be_rejected() {
        let result = build("S -> iEtS | iEtSeS | a\nE -> b", ConflictPolicy::Reject);
        assert!(matches!(result, Err(Error::TableConflict(TableConflict { non_terminal: 'A', .. }))));
    }
}
