use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};
use serde::Serialize;

use super::{
    ll1_table::LL1ParsingTable, Symbol, ERROR_LIMIT, IDENTIFIER, MAX_INPUT_LINES,
    MAX_STACK_SIZE, MAX_STORED_ERRORS,
};
use crate::error::{Error, Result};
use crate::Grammar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Accepted,
    RejectedWithErrors,
    /// The error limit or the stack bound was hit and the rest of the line
    /// was not looked at.
    Aborted,
}

/// A recoverable problem found while checking one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// The expected terminal was not there; it was discarded.
    ParseMismatch { expected: Symbol, found: Symbol },
    /// The table has no entry; the non-terminal was discarded.
    NoProduction { non_terminal: char, found: Symbol },
    /// Table entries lead back to the same stack without reading input;
    /// the non-terminal was discarded.
    ExpansionCycle { non_terminal: char, found: Symbol },
    StackOverflow { limit: usize },
    TrailingInput { rest: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParseMismatch { expected, found } => {
                write!(f, "Expected '{}', found '{}'", expected, found)
            }
            Diagnostic::NoProduction {
                non_terminal,
                found,
            } => write!(f, "No production for {} with input {}", non_terminal, found),
            Diagnostic::ExpansionCycle {
                non_terminal,
                found,
            } => write!(
                f,
                "Expansion of {} with input {} loops without consuming input",
                non_terminal, found
            ),
            Diagnostic::StackOverflow { limit } => {
                write!(f, "Parse stack exceeded {} entries", limit)
            }
            Diagnostic::TrailingInput { rest } => {
                write!(f, "Unexpected input after parsing completed: {}", rest)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub line: usize,
    pub input: String,
    pub outcome: Outcome,
    /// The first diagnostics of the line, at most `MAX_STORED_ERRORS`.
    pub diagnostics: Vec<Diagnostic>,
    /// Every error found, including those not stored.
    pub error_count: usize,
}

impl LineReport {
    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }

    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub lines: Vec<LineReport>,
    pub total_lines: usize,
    pub total_errors: usize,
}

impl ParseSummary {
    pub fn all_accepted(&self) -> bool {
        self.lines.iter().all(|l| l.is_accepted())
    }
}

struct ParseState<'i> {
    stack: Vec<Symbol>,
    input: &'i str,
    cursor: usize,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    /// Stacks expanded since the last consumed token.
    expanded: HashSet<Vec<Symbol>>,
    overflowed: bool,
}

impl<'i> ParseState<'i> {
    fn new(start: char, input: &'i str) -> Self {
        Self {
            stack: vec![Symbol::EndMarker, Symbol::NonTerminal(start)],
            input,
            cursor: 0,
            diagnostics: Vec::new(),
            error_count: 0,
            expanded: HashSet::new(),
            overflowed: false,
        }
    }

    /// Replaces the non-terminal on top with `body`, reversed.
    /// Returns false when the stack bound is hit.
    fn expand(&mut self, body: &[Symbol]) -> bool {
        self.stack.pop();
        if self.stack.len() + body.len() > MAX_STACK_SIZE {
            self.report(Diagnostic::StackOverflow {
                limit: MAX_STACK_SIZE,
            });
            self.overflowed = true;
            return false;
        }
        self.stack.extend(body.iter().rev());
        true
    }

    fn consume(&mut self, token: Symbol) {
        self.cursor += token.width();
        self.expanded.clear();
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("error at byte {}: {}", self.cursor, diagnostic);
        if self.diagnostics.len() < MAX_STORED_ERRORS {
            self.diagnostics.push(diagnostic);
        }
        self.error_count += 1;
    }

    fn skip_spaces(&mut self) {
        while self.input[self.cursor..].starts_with(' ') {
            self.cursor += 1;
        }
    }

    fn next_token(&mut self) -> Symbol {
        self.skip_spaces();
        let rest = &self.input[self.cursor..];
        if rest.starts_with(IDENTIFIER) {
            return Symbol::Identifier;
        }
        match rest.chars().next() {
            Some(c) => Symbol::Literal(c),
            None => Symbol::EndMarker,
        }
    }

    fn stack_to_string(&self) -> String {
        self.stack
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Table-driven predictive parser with panic-mode recovery.
#[derive(Debug, Clone, Copy)]
pub struct LL1Parser<'a> {
    start: char,
    table: &'a LL1ParsingTable,
}

impl<'a> LL1Parser<'a> {
    pub fn new(grammar: &Grammar, table: &'a LL1ParsingTable) -> Result<Self> {
        let start = grammar.start_symbol().ok_or(Error::EmptyGrammar)?;
        Ok(Self { start, table })
    }

    /// Checks one line. Never fails: every problem ends up in the report.
    pub fn parse_line(&self, line: usize, input: &str) -> LineReport {
        let mut state = ParseState::new(self.start, input);

        while let Some(&top) = state.stack.last() {
            if state.error_count >= ERROR_LIMIT {
                break;
            }
            let token = state.next_token();
            trace!("stack: {} | input: {}", state.stack_to_string(), token);

            match top {
                Symbol::NonTerminal(non_terminal) => {
                    // The same stack at the same position can only repeat forever.
                    if !state.expanded.insert(state.stack.clone()) {
                        state.stack.pop();
                        state.report(Diagnostic::ExpansionCycle {
                            non_terminal,
                            found: token,
                        });
                        continue;
                    }
                    match self.table.get(non_terminal, token) {
                        Some(production) => {
                            trace!("apply {} -> {}", non_terminal, production);
                            if !state.expand(production.body()) {
                                break;
                            }
                        }
                        None => {
                            state.stack.pop();
                            state.report(Diagnostic::NoProduction {
                                non_terminal,
                                found: token,
                            });
                        }
                    }
                }
                Symbol::Epsilon => {
                    state.stack.pop();
                }
                expected => {
                    state.stack.pop();
                    if expected == token {
                        trace!("match {}", token);
                        state.consume(token);
                    } else {
                        state.report(Diagnostic::ParseMismatch {
                            expected,
                            found: token,
                        });
                    }
                }
            }
        }

        let outcome = if state.overflowed || state.error_count >= ERROR_LIMIT {
            Outcome::Aborted
        } else {
            state.skip_spaces();
            if state.cursor < input.len() {
                state.report(Diagnostic::TrailingInput {
                    rest: input[state.cursor..].to_string(),
                });
            }
            if state.error_count == 0 {
                Outcome::Accepted
            } else {
                Outcome::RejectedWithErrors
            }
        };

        LineReport {
            line,
            input: input.to_string(),
            outcome,
            diagnostics: state.diagnostics,
            error_count: state.error_count,
        }
    }

    /// Checks every line of `text`, numbering lines from 1.
    pub fn parse_input(&self, text: &str) -> Result<ParseSummary> {
        let inputs: Vec<&str> = text.lines().collect();
        if inputs.len() > MAX_INPUT_LINES {
            return Err(Error::capacity("input lines", MAX_INPUT_LINES));
        }

        let lines: Vec<LineReport> = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| self.parse_line(i + 1, input))
            .collect();
        let total_errors = lines.iter().map(|l| l.error_count).sum();

        Ok(ParseSummary {
            total_lines: lines.len(),
            total_errors,
            lines,
        })
    }
}
