extern crate wasm_bindgen;

use std::fmt::Display;

use wasm_bindgen::prelude::*;

pub mod analysis;
pub mod error;
pub mod grammar;
pub use analysis::{Analysis, Options};
pub use error::{Error, Result};
pub use grammar::Grammar;

fn error_json(e: impl Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match Analysis::parse(grammar, &Options::default()) {
        Ok(a) => a
            .sets()
            .to_non_terminal_output_vec()
            .to_json()
            .unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn check_strings_to_json(grammar: &str, input: &str) -> String {
    match Analysis::parse(grammar, &Options::default()).and_then(|a| a.check_input(input)) {
        Ok(summary) => summary.to_json().unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}

#[cfg(test)]
mod pipeline_tests {
    use crate::grammar::{ll1_parser::Outcome, Symbol, MAX_RULES};
    use crate::{Analysis, Error, Grammar, Options};
    use pretty_assertions::assert_eq;
    use Symbol::*;

    const EXPR: &str = "E -> E+T | T\nT -> id";

    fn members(set: Option<&indexmap::IndexSet<Symbol>>) -> Vec<Symbol> {
        set.unwrap().iter().copied().collect()
    }

    #[test]
    fn expression_grammar_sets_and_table() {
        let a = Analysis::parse(EXPR, &Options::default()).unwrap();
        assert_eq!(a.grammar().to_string(), "E -> TA\nT -> id\nA -> +TA | #\n");

        let sets = a.sets();
        assert_eq!(members(sets.first('T')), vec![Identifier]);
        assert_eq!(members(sets.first('A')), vec![Literal('+'), Epsilon]);
        assert_eq!(members(sets.follow('E')), vec![EndMarker]);
        assert_eq!(members(sets.follow('A')), vec![EndMarker]);
        assert_eq!(members(sets.follow('T')), vec![Literal('+'), EndMarker]);

        let table = a.table();
        assert_eq!(table.get('E', Identifier).unwrap().to_string(), "TA");
        assert_eq!(table.get('A', Literal('+')).unwrap().to_string(), "+TA");
        assert!(table.get('A', EndMarker).unwrap().is_epsilon());
    }

    #[test]
    fn sum_is_accepted() {
        let a = Analysis::parse(EXPR, &Options::default()).unwrap();
        let report = a.check_line("id+id").unwrap();
        assert_eq!(report.outcome, Outcome::Accepted);
        assert_eq!(report.error_count, 0);
    }

    #[test]
    fn dangling_plus_is_rejected_once() {
        let a = Analysis::parse(EXPR, &Options::default()).unwrap();
        let summary = a.check_input("id+").unwrap();
        assert_eq!(summary.lines[0].outcome, Outcome::RejectedWithErrors);
        assert_eq!(summary.lines[0].diagnostics.len(), 1);
        assert_eq!(summary.lines[0].error_count, 1);
        assert_eq!(summary.total_errors, 1);
    }

    #[test]
    fn right_recursive_grammar_is_untouched() {
        let a = Analysis::parse("S -> aS | bS | c", &Options::default()).unwrap();
        let stages = a.stages();
        assert_eq!(stages.original, stages.left_factored);
        assert_eq!(stages.left_factored, stages.left_recursion_free);
        assert!(a.check_line("abac").unwrap().is_accepted());
    }

    #[test]
    fn too_many_rules_is_rejected() {
        let text: String = ('A'..='Z')
            .cycle()
            .take(MAX_RULES + 1)
            .map(|c| format!("{} -> a\n", c))
            .collect();
        assert!(matches!(
            Analysis::parse(&text, &Options::default()),
            Err(Error::CapacityExceeded { limit: MAX_RULES, .. })
        ));
    }

    #[test]
    fn empty_grammar_is_rejected() {
        assert!(matches!(
            Analysis::build(Grammar::new(), &Options::default()),
            Err(Error::EmptyGrammar)
        ));
    }

    #[test]
    fn factoring_then_recursion_removal() {
        let a = Analysis::parse(
            "S -> iEtS | iEtSeS | a\nE -> E+b | b",
            &Options::default(),
        )
        .unwrap();
        assert_eq!(
            a.stages().left_factored.to_string(),
            "S -> iEtSA | a\nE -> E+b | b\nA -> # | eS\n"
        );
        assert_eq!(
            a.grammar().to_string(),
            "S -> iEtSA | a\nE -> bB\nA -> # | eS\nB -> +bB | #\n"
        );
        assert!(a.check_line("ib+bta").unwrap().is_accepted());
    }

    #[test]
    fn exhausted_letters_fail_explicitly() {
        let mut text: String = ('B'..='Z').map(|c| format!("{} -> c\n", c)).collect();
        text.insert_str(0, "A -> Aa | b\n");
        assert!(matches!(
            Analysis::parse(&text, &Options::default()),
            Err(Error::NonTerminalsExhausted)
        ));
    }

    #[test]
    fn json_entry_points() {
        let json = crate::check_strings_to_json(EXPR, "id+id\nid+");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_lines"], 2);
        assert_eq!(value["total_errors"], 1);

        let json = crate::first_follow_to_json(EXPR);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["data"][2]["name"], "A");
        assert_eq!(value["data"][2]["nullable"], true);

        let json = crate::first_follow_to_json("");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "grammar has no rules");
    }
}
