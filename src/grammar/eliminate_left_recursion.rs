use log::{debug, warn};

use super::{Production, Symbol};
use crate::error::Result;
use crate::Grammar;

impl Grammar {
    /// Removes immediate left recursion from every rule present before the
    /// call and returns the number of rules appended.
    ///
    /// `A -> A a | b` becomes `A -> b A'` and `A' -> a A' | #`. An empty
    /// `b` is replaced by `A'` alone. `A -> A` derives nothing and is dropped.
    pub fn eliminate_left_recursion(&mut self) -> Result<usize> {
        let before = self.rules().len();

        for i in 0..before {
            let non_terminal = self.rules()[i].non_terminal;
            let productions = self.rules()[i].productions().to_vec();

            let mut alphas: Vec<Production> = Vec::new();
            let mut betas: Vec<Production> = Vec::new();
            let mut self_loop = false;
            for production in productions {
                if production.first_symbol() == Some(Symbol::NonTerminal(non_terminal)) {
                    let alpha = production.suffix(1)?;
                    if alpha.is_epsilon() {
                        self_loop = true;
                    } else if !alphas.contains(&alpha) {
                        alphas.push(alpha);
                    }
                } else if !betas.contains(&production) {
                    betas.push(production);
                }
            }

            if alphas.is_empty() {
                if self_loop {
                    debug!("dropping {} -> {}", non_terminal, non_terminal);
                    self.set_productions(i, betas)?;
                }
                continue;
            }

            let fresh = self.find_available_non_terminal()?;
            let tail = Symbol::NonTerminal(fresh);
            let rewritten = betas
                .iter()
                .map(|beta| beta.append(tail))
                .collect::<Result<Vec<_>>>()?;
            let mut recursive = alphas
                .iter()
                .map(|alpha| alpha.append(tail))
                .collect::<Result<Vec<_>>>()?;
            recursive.push(Production::epsilon());

            if rewritten.is_empty() {
                warn!(
                    "every production of {} is left recursive, it now derives nothing",
                    non_terminal
                );
            }
            debug!(
                "left recursion in {} moved into {}",
                non_terminal, fresh
            );
            self.set_productions(i, rewritten)?;
            self.add_rule(fresh, recursive)?;
        }

        Ok(self.rules().len() - before)
    }
}
