use std::path::PathBuf;

use thiserror::Error;

use crate::grammar::ll1_table::TableConflict;

/// Fatal errors of the grammar pipeline.
///
/// Recoverable problems met while checking an input line are not errors;
/// they are collected as [`crate::grammar::ll1_parser::Diagnostic`]s in the
/// line report instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("capacity exceeded: at most {limit} {what} allowed")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error("no unused non-terminal remains, all of A-Z are taken")]
    NonTerminalsExhausted,

    #[error("grammar has no rules")]
    EmptyGrammar,

    #[error("LL(1) conflict: {0}")]
    TableConflict(TableConflict),

    #[error("cannot read {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn capacity(what: &'static str, limit: usize) -> Self {
        Error::CapacityExceeded { what, limit }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reads a whole text file, mapping any I/O failure to [`Error::FileNotFound`].
pub fn read_file(path: impl Into<PathBuf>) -> Result<String> {
    let path = path.into();
    std::fs::read_to_string(&path).map_err(|source| Error::FileNotFound { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = read_file("definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
        assert!(err.to_string().starts_with("cannot read definitely/not/here.txt"));
    }
}
