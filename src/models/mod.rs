//! Tracked transaction views
//!
//! - `TransactionTracker`: memoized fetch, status, confirmations, finality polling
//! - `CoinTransaction`: sender/receiver/amount reconciliation of a transfer

pub mod coin_transaction;
pub mod transaction;

pub use coin_transaction::{verify_record, CoinTransaction};
pub use transaction::{RecordInput, RecordOutput, TransactionRecord, TransactionTracker};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Which party of a transfer is checked during verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Check the receiver (first output)
    Incoming,
    /// Check the sender (first input's previous output)
    Outgoing,
}
