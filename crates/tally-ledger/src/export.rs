use serde::Serialize;
use tally_types::UserId;

use crate::error::LedgerError;
use crate::traits::LedgerReader;

const HEADERS: [&str; 8] = [
    "Date",
    "Sender Name",
    "Sender Username",
    "Receiver Name",
    "Receiver Username",
    "Amount",
    "Type",
    "Transaction ID",
];

/// One CSV row of the transaction export; field order matches [`HEADERS`].
#[derive(Debug, Serialize)]
struct ExportRow {
    date: String,
    sender_name: String,
    sender_username: String,
    receiver_name: String,
    receiver_username: String,
    amount: u64,
    kind: String,
    id: String,
}

/// Export the transaction log as CSV bytes, optionally filtered to one
/// user's transactions. Rows are most recent first, matching the audit
/// views.
pub fn export_csv<R: LedgerReader>(
    reader: &R,
    user: Option<UserId>,
) -> Result<Vec<u8>, LedgerError> {
    let transactions = match user {
        Some(id) => reader.transactions_for(id)?,
        None => reader.all_transactions()?,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(HEADERS)
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    for tx in transactions {
        let (sender_name, sender_username) = display_names(reader, tx.sender);
        let (receiver_name, receiver_username) = display_names(reader, tx.receiver);
        writer
            .serialize(ExportRow {
                date: tx.created_at.to_rfc3339(),
                sender_name,
                sender_username,
                receiver_name,
                receiver_username,
                amount: tx.amount,
                kind: tx.kind.to_string(),
                id: tx.id.to_string(),
            })
            .map_err(|e| LedgerError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| LedgerError::Export(e.to_string()))
}

fn display_names<R: LedgerReader>(reader: &R, user: UserId) -> (String, String) {
    match reader.find_user(user) {
        Ok(u) => (u.full_name, u.username),
        Err(_) => ("unknown".into(), "unknown".into()),
    }
}
