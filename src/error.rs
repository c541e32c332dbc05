use thiserror::Error;

/// Error taxonomy for every engine operation.
///
/// Each variant maps to a distinct recovery story: `Validation` never left the
/// process, `Rejected` carries the authority's verdict verbatim, `Transport`
/// means the authority could not be reached or answered garbage. None of them
/// escalate; the user simply retries the triggering action.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum BankError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Rejected(String),
    #[error("server unreachable: {0}")]
    Transport(String),
}

impl BankError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BankError>;
