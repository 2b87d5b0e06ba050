//! Parse error types

use thiserror::Error;

use crate::base::SourceFilePosition;

/// A structured parse failure, located at the token that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `{`, `[`, math delimiter or environment was never closed.
    #[error("{at}: unclosed {what}")]
    Unclosed {
        what: &'static str,
        at: SourceFilePosition,
    },

    /// `\end{found}` closes an environment opened as `\begin{expected}`.
    #[error("{at}: \\end{{{found}}} does not match \\begin{{{expected}}}")]
    MismatchedEnvironment {
        expected: String,
        found: String,
        at: SourceFilePosition,
    },

    /// A closing token with nothing to close.
    #[error("{at}: unexpected {token}")]
    Unexpected {
        token: String,
        at: SourceFilePosition,
    },

    /// `\begin` or `\end` without a `{name}` argument.
    #[error("{at}: missing environment name after \\{command}")]
    MissingEnvironmentName {
        command: &'static str,
        at: SourceFilePosition,
    },
}

impl ParseError {
    pub fn position(&self) -> SourceFilePosition {
        match self {
            Self::Unclosed { at, .. }
            | Self::MismatchedEnvironment { at, .. }
            | Self::Unexpected { at, .. }
            | Self::MissingEnvironmentName { at, .. } => *at,
        }
    }
}
