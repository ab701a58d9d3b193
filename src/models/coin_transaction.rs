use bitcoin::Amount;

use super::transaction::{TransactionRecord, TransactionTracker};
use super::{TransactionStatus, TransferDirection};
use crate::bitcoin::amount::to_base_units;
use crate::config::NetworkConfig;
use crate::error::TransferError;
use crate::esplora::Indexer;

/// Reconcile a record against an expected transfer.
///
/// A pending record is reported as pending before any party or amount check.
/// Address comparison ignores case; the amount must match exactly.
pub fn verify_record(
    record: &TransactionRecord,
    direction: TransferDirection,
    address: &str,
    expected_amount: Amount,
) -> TransactionStatus {
    let status = record.status();
    if status == TransactionStatus::Pending {
        return status;
    }

    let party = match direction {
        TransferDirection::Incoming => record.receiver(),
        TransferDirection::Outgoing => record.sender(),
    };
    if !party.eq_ignore_ascii_case(address) {
        log::debug!(
            "Transaction {}: {:?} party is {}, expected {}",
            record.id,
            direction,
            party,
            address
        );
        return TransactionStatus::Failed;
    }

    if record.amount() != expected_amount {
        log::debug!(
            "Transaction {}: amount {} sats, expected {} sats",
            record.id,
            record.amount().to_sat(),
            expected_amount.to_sat()
        );
        return TransactionStatus::Failed;
    }

    status
}

/// A tracked transaction seen as a coin transfer: one payment to the first
/// output, funded by the first input's owner.
pub struct CoinTransaction<'a, I: Indexer + ?Sized> {
    tracker: TransactionTracker<'a, I>,
}

impl<'a, I: Indexer + ?Sized> CoinTransaction<'a, I> {
    pub fn new(id: impl Into<String>, indexer: &'a I, config: &'a NetworkConfig) -> Self {
        Self::from_tracker(TransactionTracker::new(id, indexer, config))
    }

    pub fn from_tracker(tracker: TransactionTracker<'a, I>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&mut self) -> &mut TransactionTracker<'a, I> {
        &mut self.tracker
    }

    pub fn into_tracker(self) -> TransactionTracker<'a, I> {
        self.tracker
    }

    pub fn receiver(&mut self) -> Result<String, TransferError> {
        Ok(self.tracker.fetch()?.receiver().to_string())
    }

    pub fn sender(&mut self) -> Result<String, TransferError> {
        self.tracker.sender()
    }

    pub fn amount(&mut self) -> Result<Amount, TransferError> {
        Ok(self.tracker.fetch()?.amount())
    }

    /// Check that the transaction moved `expected_amount` (decimal BTC) to or
    /// from `address`.
    pub fn verify_transfer(
        &mut self,
        direction: TransferDirection,
        address: &str,
        expected_amount: &str,
    ) -> Result<TransactionStatus, TransferError> {
        let record = self.tracker.fetch()?;
        if record.status() == TransactionStatus::Pending {
            return Ok(TransactionStatus::Pending);
        }

        let expected = to_base_units(expected_amount)?;
        Ok(verify_record(record, direction, address, expected))
    }
}
