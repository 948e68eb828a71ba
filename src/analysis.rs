use log::{info, warn};

use crate::error::{Error, Result};
use crate::grammar::{
    left_factoring::FactoringPolicy,
    ll1_parser::{LL1Parser, LineReport, ParseSummary},
    ll1_table::{ConflictPolicy, LL1ParsingTable},
    nullable_first_follow::FirstFollow,
};
use crate::Grammar;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub factoring: FactoringPolicy,
    pub conflicts: ConflictPolicy,
}

/// The grammar as it looked after each transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stages {
    pub original: Grammar,
    pub left_factored: Grammar,
    pub left_recursion_free: Grammar,
}

/// Everything derived from one grammar: the transformed rules, their sets and
/// the parsing table. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Analysis {
    stages: Stages,
    sets: FirstFollow,
    table: LL1ParsingTable,
}

impl Analysis {
    pub fn build(grammar: Grammar, options: &Options) -> Result<Self> {
        if grammar.rules().is_empty() {
            return Err(Error::EmptyGrammar);
        }
        for non_terminal in grammar.undefined_non_terminals() {
            warn!("{} is used but never defined", non_terminal);
        }

        let original = grammar.clone();
        let mut grammar = grammar;

        let added = grammar.left_factor(options.factoring)?;
        info!("left factoring added {} rule(s)", added);
        let left_factored = grammar.clone();

        let added = grammar.eliminate_left_recursion()?;
        info!("left recursion removal added {} rule(s)", added);

        let sets = grammar.calculate_first_follow()?;
        let table = grammar.generate_ll1_parsing_table(&sets, options.conflicts)?;
        info!(
            "parsing table built for {} non-terminal(s), {} conflict(s)",
            grammar.rules().len(),
            table.conflicts().len()
        );

        Ok(Self {
            stages: Stages {
                original,
                left_factored,
                left_recursion_free: grammar,
            },
            sets,
            table,
        })
    }

    pub fn parse(text: &str, options: &Options) -> Result<Self> {
        Self::build(Grammar::parse(text)?, options)
    }

    /// The final grammar the table was built from.
    pub fn grammar(&self) -> &Grammar {
        &self.stages.left_recursion_free
    }

    pub fn stages(&self) -> &Stages {
        &self.stages
    }

    pub fn sets(&self) -> &FirstFollow {
        &self.sets
    }

    pub fn table(&self) -> &LL1ParsingTable {
        &self.table
    }

    pub fn parser(&self) -> Result<LL1Parser<'_>> {
        LL1Parser::new(self.grammar(), &self.table)
    }

    pub fn check_line(&self, input: &str) -> Result<LineReport> {
        Ok(self.parser()?.parse_line(1, input))
    }

    pub fn check_input(&self, text: &str) -> Result<ParseSummary> {
        self.parser()?.parse_input(text)
    }
}
