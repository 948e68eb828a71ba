mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Format};
use ll1_checker::error::read_file;
use ll1_checker::grammar::{
    ll1_parser::ParseSummary,
    parse::IgnoredLine,
    pretty_print::{LL1TableOutput, NonTerminalOutputVec, ProductionOutputVec},
};
use ll1_checker::{Analysis, Grammar};
use log::LevelFilter;
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    ignored_lines: &'a [IgnoredLine],
    original: ProductionOutputVec<'a>,
    left_factored: ProductionOutputVec<'a>,
    left_recursion_free: ProductionOutputVec<'a>,
    sets: NonTerminalOutputVec<'a>,
    table: LL1TableOutput<'a>,
    summary: &'a ParseSummary,
}

fn print_plain(report: &Report) {
    println!("Original Grammar:\n{}\n", report.original.to_plaintext());
    println!("After Left Factoring:\n{}\n", report.left_factored.to_plaintext());
    println!(
        "After Left Recursion Removal:\n{}\n",
        report.left_recursion_free.to_plaintext()
    );
    println!("First & Follow Sets:\n{}\n", report.sets.to_plaintext());
    println!("LL(1) Parsing Table:\n{}\n", report.table.to_plaintext());
    println!("{}", report.summary.to_plaintext());
}

fn print_latex(report: &Report) {
    println!("{}\n", report.original.to_latex());
    println!("{}\n", report.left_factored.to_latex());
    println!("{}\n", report.left_recursion_free.to_latex());
    println!("{}\n", report.sets.to_latex());
    println!("{}\n", report.table.to_latex());
    println!("{}", report.summary.to_latex());
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let input = read_file(&cli.input)?;
    let (grammar, ignored_lines) = Grammar::parse_with_warnings(&read_file(&cli.grammar)?)?;
    let analysis = Analysis::build(grammar, &cli.options())?;
    let summary = analysis.check_input(&input)?;

    let stages = analysis.stages();
    let report = Report {
        ignored_lines: &ignored_lines,
        original: stages.original.to_production_output_vec(),
        left_factored: stages.left_factored.to_production_output_vec(),
        left_recursion_free: stages.left_recursion_free.to_production_output_vec(),
        sets: analysis.sets().to_non_terminal_output_vec(),
        table: analysis.table().to_output(),
        summary: &summary,
    };

    match cli.format {
        Format::Plain => print_plain(&report),
        Format::Latex => print_latex(&report),
        Format::Json => println!("{}", serde_json::to_string(&report)?),
    }
    Ok(())
}
