use serde::Serialize;
use thiserror::Error;

/// A syntax error at the farthest point any alternative reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{prefix}: {line}:{column} ({offset}): {inner}{}", expected_suffix(.expected))]
pub struct ParseError {
    pub prefix: String,
    pub inner: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub expected: Vec<String>,
}

fn expected_suffix(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(", expected one of [{}]", expected.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    /// A production returned a different kind of value than its caller
    /// asked for. This is a defect in the grammar, not in the input.
    #[error("parser produced {found} where {expected} was expected")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
    },
}

impl ParseFailure {
    pub fn syntax(&self) -> Option<&ParseError> {
        match self {
            Self::Syntax(err) => Some(err),
            Self::Unexpected { .. } => None,
        }
    }
}
