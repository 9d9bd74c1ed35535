use std::fmt;

use tally_types::Role;

use crate::error::AuthError;

/// Everything a request can ask the system to do.
///
/// Handlers authorize an `Action` against the caller's role claim before
/// touching the ledger; there is no other path to a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Debit a scanned student's wallet (vendor charge).
    ChargeStudent,
    /// Read one's own user record, wallet, and history.
    ViewOwnWallet,
    /// Look up students by name or username.
    SearchStudents,
    /// Top up a wallet (mint).
    Recharge,
    /// List user accounts with balances.
    ViewUsers,
    /// Create a new account.
    CreateUser,
    /// Delete an account and its data.
    DeleteUser,
    /// Apply a signed delta directly to a wallet.
    AdjustWallet,
    /// Propose a balance change for later sign-off.
    SubmitApproval,
    /// Approve or reject a pending proposal.
    ResolveApproval,
    /// Read any user's full transaction list.
    ViewUserTransactions,
    /// Export the transaction log as CSV.
    ExportTransactions,
    /// Overwrite another user's password.
    ResetPassword,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::ChargeStudent => "charge-student",
            Action::ViewOwnWallet => "view-own-wallet",
            Action::SearchStudents => "search-students",
            Action::Recharge => "recharge",
            Action::ViewUsers => "view-users",
            Action::CreateUser => "create-user",
            Action::DeleteUser => "delete-user",
            Action::AdjustWallet => "adjust-wallet",
            Action::SubmitApproval => "submit-approval",
            Action::ResolveApproval => "resolve-approval",
            Action::ViewUserTransactions => "view-user-transactions",
            Action::ExportTransactions => "export-transactions",
            Action::ResetPassword => "reset-password",
        };
        f.write_str(name)
    }
}

/// The single role -> capability table.
pub fn allows(role: Role, action: Action) -> bool {
    match action {
        Action::ViewOwnWallet => true,
        Action::ChargeStudent => role == Role::Vendor,
        Action::SearchStudents | Action::Recharge => role.at_least(Role::SubAdmin),
        Action::ViewUsers | Action::CreateUser | Action::SubmitApproval => {
            role.at_least(Role::Admin)
        }
        Action::DeleteUser
        | Action::AdjustWallet
        | Action::ResolveApproval
        | Action::ViewUserTransactions
        | Action::ExportTransactions
        | Action::ResetPassword => role == Role::SuperAdmin,
    }
}

/// Authorize or fail with [`AuthError::Forbidden`].
pub fn authorize(role: Role, action: Action) -> Result<(), AuthError> {
    if allows(role, action) {
        Ok(())
    } else {
        Err(AuthError::Forbidden { role, action })
    }
}
