use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_types::{PublicUser, TransactionId, TransactionKind, UserId};

use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// A user together with their wallet balance, for admin listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub user: PublicUser,
    pub balance: i64,
}

/// Which way a transaction moved from one participant's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Tokens left this user's wallet.
    Debit,
    /// Tokens arrived in this user's wallet.
    Credit,
}

/// One row of a user's transaction history, annotated with the direction
/// and the display name of the other party.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: TransactionId,
    pub amount: u64,
    pub direction: Direction,
    pub other_party: String,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

/// Deterministic projection builders over the transaction log.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    /// A user's history, most recent first, at most `limit` entries.
    pub fn history<R: LedgerReader>(
        reader: &R,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let transactions = reader.transactions_for(user)?;

        let entries = transactions
            .into_iter()
            .take(limit)
            .map(|tx| {
                let (direction, other) = if tx.sender == user {
                    (Direction::Debit, tx.receiver)
                } else {
                    (Direction::Credit, tx.sender)
                };
                // A party deleted after the fact still leaves a readable row.
                let other_party = reader
                    .find_user(other)
                    .map(|u| u.full_name)
                    .unwrap_or_else(|_| "unknown".into());
                HistoryEntry {
                    id: tx.id,
                    amount: tx.amount,
                    direction,
                    other_party,
                    kind: tx.kind,
                    timestamp: tx.created_at,
                }
            })
            .collect();

        Ok(entries)
    }
}
