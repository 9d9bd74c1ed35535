use tally_types::ApprovalStatus;

/// Errors produced by ledger operations.
///
/// Any error returned from a mutation guarantees that no state was touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("user not found")]
    UserNotFound,

    #[error("wallet not found")]
    WalletNotFound,

    #[error("approval request not found")]
    RequestNotFound,

    #[error("insufficient balance: have {balance}, need {requested}")]
    InsufficientBalance { balance: i64, requested: u64 },

    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    #[error("an account with this email already exists")]
    DuplicateEmail,

    #[error("request already resolved as {status}")]
    AlreadyResolved { status: ApprovalStatus },

    #[error("export failed: {0}")]
    Export(String),

    #[error("internal ledger error: {0}")]
    Internal(String),
}
