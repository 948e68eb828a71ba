use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ll1_checker::grammar::{left_factoring::FactoringPolicy, ll1_table::ConflictPolicy};
use ll1_checker::Options;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Plain,
    Latex,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Factoring {
    SinglePass,
    FixedPoint,
}

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File with one candidate string per line
    pub input: PathBuf,

    /// File containing the grammar
    #[arg(short, long, value_name = "FILE", default_value = "grammar.txt")]
    pub grammar: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Plain)]
    pub format: Format,

    /// Extract one shared prefix per rule, or repeat until none is left
    #[arg(long, value_enum, default_value_t = Factoring::SinglePass)]
    pub factoring: Factoring,

    /// Fail on the first LL(1) conflict instead of keeping the first production
    #[arg(long)]
    pub strict: bool,

    /// Log more (-v info, -vv debug, -vvv every parser step)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            factoring: match self.factoring {
                Factoring::SinglePass => FactoringPolicy::SinglePass,
                Factoring::FixedPoint => FactoringPolicy::FixedPoint,
            },
            conflicts: if self.strict {
                ConflictPolicy::Reject
            } else {
                ConflictPolicy::FirstWins
            },
        }
    }
}
