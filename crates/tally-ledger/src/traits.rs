use serde::{Deserialize, Serialize};
use tally_types::{
    ApprovalRequest, PublicUser, RequestId, Role, Transaction, User, UserId, Wallet,
};

use crate::error::LedgerError;
use crate::projection::AccountSummary;

/// Input for account creation. The wallet is created in the same unit of
/// work as the user record.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// A resolver's verdict on a pending approval request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Approve,
    Reject,
}

/// Write boundary: every balance mutation and account change.
pub trait LedgerWriter: Send + Sync {
    /// Create a user and its wallet atomically.
    fn create_account(&self, account: NewAccount) -> Result<(User, Wallet), LedgerError>;

    /// Remove a user, their wallet, and every transaction they touched.
    fn delete_account(&self, user: UserId) -> Result<(), LedgerError>;

    /// Overwrite a user's stored credential hash.
    fn set_password_hash(&self, user: UserId, password_hash: String) -> Result<(), LedgerError>;

    /// Move `amount` tokens from `sender` to `receiver`, appending one
    /// debit transaction. Returns the sender's new balance.
    fn transfer(&self, sender: UserId, receiver: UserId, amount: u64) -> Result<i64, LedgerError>;

    /// Grant `amount` fresh tokens to `receiver` on behalf of the
    /// administrative `actor`, appending one credit transaction. Returns
    /// the receiver's new balance.
    fn mint(&self, actor: UserId, receiver: UserId, amount: u64) -> Result<i64, LedgerError>;

    /// Apply a signed `delta` directly to `target`'s balance. The appended
    /// transaction's kind follows the sign of the delta.
    fn adjust(&self, actor: UserId, target: UserId, delta: i64) -> Result<Wallet, LedgerError>;

    /// Queue a signed balance delta for higher-privilege sign-off.
    fn submit_request(
        &self,
        requested_by: UserId,
        target_user: UserId,
        amount: i64,
    ) -> Result<ApprovalRequest, LedgerError>;

    /// Resolve a pending request. On approval the delta is applied in the
    /// same unit of work that flips the status: both commit or neither.
    fn resolve_request(
        &self,
        resolver: UserId,
        id: RequestId,
        resolution: Resolution,
    ) -> Result<ApprovalRequest, LedgerError>;
}

/// Read boundary: queries and projections never mutate.
pub trait LedgerReader: Send + Sync {
    fn find_user(&self, id: UserId) -> Result<User, LedgerError>;

    fn find_by_username(&self, username: &str) -> Result<User, LedgerError>;

    fn wallet_of(&self, user: UserId) -> Result<Wallet, LedgerError>;

    /// Users with their balances, optionally restricted to a role set.
    fn accounts(&self, roles: Option<&[Role]>) -> Result<Vec<AccountSummary>, LedgerError>;

    /// Case-insensitive substring search over student usernames and names.
    fn search_students(&self, term: &str, limit: usize) -> Result<Vec<PublicUser>, LedgerError>;

    /// Every transaction touching `user`, most recent first.
    fn transactions_for(&self, user: UserId) -> Result<Vec<Transaction>, LedgerError>;

    /// The whole log, most recent first.
    fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError>;

    fn find_request(&self, id: RequestId) -> Result<ApprovalRequest, LedgerError>;

    /// Requests still awaiting resolution, oldest first.
    fn pending_requests(&self) -> Result<Vec<ApprovalRequest>, LedgerError>;
}
