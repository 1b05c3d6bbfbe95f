//! Errors raised while parsing fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("principal identifier is empty")]
    EmptyPrincipal,

    #[error("principal identifier {0:?} contains whitespace")]
    PrincipalWhitespace(String),

    #[error("unknown workflow phase {0:?}")]
    UnknownPhase(String),
}
