use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{RequestId, TransactionId, UserId};
use crate::role::Role;

/// A registered account. Every user owns exactly one [`Wallet`], created
/// in the same unit of work as the account itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    /// Salted password digest. Never serialized into API responses;
    /// handlers convert to [`PublicUser`] first.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The credential-free view exposed over the API.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// A [`User`] without its credential hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Per-user token balance record.
///
/// Balances are signed: the `adjust` operation may drive a wallet negative
/// when the ledger is configured to allow it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub owner: UserId,
    pub balance: i64,
    pub updated_at: DateTime<Utc>,
}

/// Classification of a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Tokens moved out of the sender's wallet (vendor charge, negative adjust).
    Debit,
    /// Tokens granted to the receiver by an administrative actor.
    Credit,
    /// Tokens added to the receiver by a SubAdmin top-up.
    Recharge,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "debit",
            TransactionKind::Credit => "credit",
            TransactionKind::Recharge => "recharge",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(TransactionKind::Debit),
            "credit" => Ok(TransactionKind::Credit),
            "recharge" => Ok(TransactionKind::Recharge),
            other => Err(TypeError::UnknownTransactionKind(other.to_string())),
        }
    }
}

/// Immutable record of one balance change. Once appended to the ledger a
/// transaction is never modified or deleted (except when its owner account
/// is purged entirely).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub sender: UserId,
    pub receiver: UserId,
    /// Always positive; direction is carried by `kind` and the
    /// sender/receiver pair.
    pub amount: u64,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of an [`ApprovalRequest`]. `Approved` and `Rejected`
/// are both terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(TypeError::UnknownApprovalStatus(other.to_string())),
        }
    }
}

/// A two-phase balance-change proposal: an Admin proposes a signed delta
/// against a target user, and a SuperAdmin later approves or rejects it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: RequestId,
    pub requested_by: UserId,
    pub target_user: UserId,
    /// Signed token delta to apply on approval.
    pub amount: i64,
    pub status: ApprovalStatus,
    pub resolved_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
