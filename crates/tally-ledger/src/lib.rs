//! Ledger core for Tally, the carnival token ledger.
//!
//! This crate owns the one invariant that matters: the sum of all wallet
//! balances changes only via a balanced transfer or an explicit
//! mint/adjust, and every change appends exactly one immutable transaction.
//! It provides:
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger`: accounts, wallets, the transaction log, and the
//!   approval queue under a single lock, so every mutation is one atomic
//!   unit of work
//! - History and account projections over the log
//! - CSV export of the transaction log

pub mod config;
pub mod error;
pub mod export;
pub mod memory;
pub mod projection;
pub mod traits;

pub use config::{BalanceFloor, LedgerConfig};
pub use error::LedgerError;
pub use export::export_csv;
pub use memory::InMemoryLedger;
pub use projection::{AccountSummary, Direction, HistoryEntry, ProjectionBuilder};
pub use traits::{LedgerReader, LedgerWriter, NewAccount, Resolution};
