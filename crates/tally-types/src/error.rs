use thiserror::Error;

/// Errors produced by type parsing and construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown transaction kind: {0}")]
    UnknownTransactionKind(String),

    #[error("unknown approval status: {0}")]
    UnknownApprovalStatus(String),
}
