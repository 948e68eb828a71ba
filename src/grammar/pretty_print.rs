use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    ll1_parser::{LineReport, Outcome, ParseSummary},
    ll1_table::LL1ParsingTable,
    nullable_first_follow::FirstFollow,
    Grammar, Production, Symbol,
};

fn symbol_to_latex(symbol: &Symbol) -> String {
    match symbol {
        Symbol::Epsilon => "\\epsilon".to_string(),
        Symbol::EndMarker => "\\$".to_string(),
        Symbol::NonTerminal(c) => c.to_string(),
        s => format!("\\text{{{}}}", escape::tex(s.to_string())),
    }
}

fn production_to_latex(production: &Production) -> String {
    production
        .symbols()
        .iter()
        .map(symbol_to_latex)
        .collect::<Vec<_>>()
        .join(" \\ ")
}

fn align_columns(output: &[Vec<String>]) -> String {
    let columns = output.iter().map(|line| line.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .filter_map(|line| line.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: char,
    #[serde(skip)]
    pub productions: &'a [Production],
    pub rights: Vec<String>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        format!("{} -> {}", self.left, self.rights.join(" | "))
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        let left = if and_sign {
            format!("{} & \\rightarrow &", self.left)
        } else {
            format!("{} \\rightarrow ", self.left)
        };
        let right = self
            .productions
            .iter()
            .map(production_to_latex)
            .collect::<Vec<_>>()
            .join(" \\mid ");
        left + &right
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.productions
            .iter()
            .map(|p| p.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|p| p.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .rules()
            .iter()
            .map(|rule| ProductionOutput {
                left: rule.non_terminal,
                productions: rule.productions(),
                rights: rule.productions().iter().map(|p| p.to_string()).collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: char,
    nullable: bool,
    first: Vec<&'a Symbol>,
    follow: Vec<&'a Symbol>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        fn f(a: &[&Symbol]) -> String {
            a.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
        }
        format!(
            "FIRST({}) = {{ {} }} | FOLLOW({}) = {{ {} }}",
            self.name,
            f(&self.first),
            self.name,
            f(&self.follow)
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&Symbol]) -> String {
            a.iter()
                .map(|s| format!("${}$", symbol_to_latex(s)))
                .collect::<Vec<_>>()
                .join(r"\ ")
        }
        format!(
            "{} & {} & {} & {}",
            self.name,
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl FirstFollow {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let data = self
            .non_terminal_iter()
            .map(|name| NonTerminalOutput {
                name,
                nullable: self.is_nullable(name),
                first: self.first(name).into_iter().flatten().collect(),
                follow: self.follow(name).into_iter().flatten().collect(),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1TableOutput<'a> {
    terminals: Vec<Symbol>,
    rows: Vec<(char, Vec<Option<&'a Production>>)>,
    conflicts: Vec<String>,
}

impl LL1TableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|cell| match cell {
                Some(production) => format!("{} -> {}", left, production),
                None => "-".to_string(),
            }));
            output.push(line);
        }

        let mut text = align_columns(&output);
        for conflict in &self.conflicts {
            text.push_str("\nconflict: ");
            text.push_str(conflict);
        }
        text
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(self.terminals.iter().map(symbol_to_latex));
        let header = header.join(" & ");

        let output = self
            .rows
            .iter()
            .map(|(left, row)| {
                std::iter::once(left.to_string())
                    .chain(row.iter().map(|cell| match cell {
                        Some(production) => {
                            format!("{} \\rightarrow {}", left, production_to_latex(production))
                        }
                        None => String::new(),
                    }))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl LL1ParsingTable {
    pub fn to_output(&self) -> LL1TableOutput {
        let terminals = self.terminals();
        let rows = self
            .non_terminals()
            .map(|left| {
                let cells = terminals.iter().map(|t| self.get(left, *t)).collect();
                (left, cells)
            })
            .collect();
        LL1TableOutput {
            terminals,
            rows,
            conflicts: self.conflicts().iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LineReport {
    fn status(&self) -> String {
        match self.outcome {
            Outcome::Accepted => "Parsing successful.".to_string(),
            Outcome::RejectedWithErrors => {
                format!("Syntax Error: {} errors detected", self.error_count)
            }
            Outcome::Aborted => format!(
                "Syntax Error: {} errors detected, parsing aborted",
                self.error_count
            ),
        }
    }
}

impl ParseSummary {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<String> =
            vec!["============== Parsing Summary ==============".to_string()];
        for line in &self.lines {
            output.push(format!("Line {}: {}", line.line, line.status()));
            if !line.is_accepted() {
                output.extend(line.messages().iter().map(|m| format!("  - {}", m)));
                output.push(String::new());
            }
        }
        output.push(if self.total_errors == 0 {
            "All strings parsed successfully.".to_string()
        } else {
            format!(
                "Parsing completed with a total of {} error(s).",
                self.total_errors
            )
        });
        output.join("\n")
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .lines
            .iter()
            .map(|line| {
                format!(
                    "{} & \\texttt{{{}}} & {} & {}",
                    line.line,
                    escape::tex(line.input.as_str()),
                    escape::tex(line.status()),
                    line.error_count
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{c|l|l|c}\n".to_string()
            + "Line & Input & Result & Errors\\\\\\hline\n"
            + &content
            + &format!("\\\\\\hline\n & & Total & {}\\\\\n\\end{{tabular}}", self.total_errors)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
