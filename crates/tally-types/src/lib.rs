//! Foundation types for Tally, the carnival token ledger.
//!
//! This crate defines the vocabulary shared by every other Tally crate:
//! - Identifiers for users, transactions, and approval requests
//! - The role hierarchy (Student, Vendor, SubAdmin, Admin, SuperAdmin)
//! - Wallet, transaction, and approval-request records

pub mod error;
pub mod id;
pub mod records;
pub mod role;

pub use error::TypeError;
pub use id::{RequestId, TransactionId, UserId};
pub use records::{
    ApprovalRequest, ApprovalStatus, PublicUser, Transaction, TransactionKind, User, Wallet,
};
pub use role::Role;
