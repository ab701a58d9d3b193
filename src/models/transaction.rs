use std::thread;
use std::time::Duration;

use bitcoin::Amount;
use chrono::{DateTime, Utc};

use super::TransactionStatus;
use crate::config::NetworkConfig;
use crate::error::{EsploraError, TransferError};
use crate::esplora::{Indexer, TxResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInput {
    pub txid: String,
    pub vout: u32,
    /// Owner of the spent output, when the indexer resolved it
    pub prevout_address: Option<String>,
    pub prevout_value: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutput {
    pub address: Option<String>,
    pub value: Amount,
}

/// Validated view of an indexer's transaction detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: String,
    pub inputs: Vec<RecordInput>,
    pub outputs: Vec<RecordOutput>,
    pub fee: Amount,
    pub block_height: Option<u64>,
    pub block_time: Option<u64>,
    pub confirmed: Option<bool>,
}

impl TransactionRecord {
    /// Map a `tx/{id}` reply, rejecting one that describes another transaction.
    pub fn from_response(requested_id: &str, response: TxResponse) -> Result<Self, TransferError> {
        if !response.txid.eq_ignore_ascii_case(requested_id) {
            return Err(EsploraError::Decode(format!(
                "Requested transaction {} but indexer returned {}",
                requested_id, response.txid
            ))
            .into());
        }

        let inputs = response
            .vin
            .into_iter()
            .map(|input| RecordInput {
                txid: input.txid,
                vout: input.vout,
                prevout_address: input
                    .prevout
                    .as_ref()
                    .and_then(|p| p.scriptpubkey_address.clone()),
                prevout_value: input.prevout.map(|p| Amount::from_sat(p.value)),
            })
            .collect();

        let outputs = response
            .vout
            .into_iter()
            .map(|output| RecordOutput {
                address: output.scriptpubkey_address,
                value: Amount::from_sat(output.value),
            })
            .collect();

        Ok(Self {
            id: response.txid,
            inputs,
            outputs,
            fee: Amount::from_sat(response.fee),
            block_height: response.status.block_height,
            block_time: response.status.block_time,
            confirmed: response.status.confirmed,
        })
    }

    /// A block slot without the confirmed flag counts as a failed inclusion.
    pub fn status(&self) -> TransactionStatus {
        match (self.block_height, self.confirmed) {
            (None, _) => TransactionStatus::Pending,
            (Some(_), Some(true)) => TransactionStatus::Confirmed,
            (Some(_), _) => TransactionStatus::Failed,
        }
    }

    /// Owner of the first input's previous output
    pub fn sender(&self) -> &str {
        self.inputs
            .first()
            .and_then(|i| i.prevout_address.as_deref())
            .unwrap_or("")
    }

    /// Destination of the first output
    pub fn receiver(&self) -> &str {
        self.outputs
            .first()
            .and_then(|o| o.address.as_deref())
            .unwrap_or("")
    }

    /// Value of the first output
    pub fn amount(&self) -> Amount {
        self.outputs.first().map(|o| o.value).unwrap_or(Amount::ZERO)
    }
}

/// Status of a possibly absent record; no record yet means pending.
pub fn status_of(record: Option<&TransactionRecord>) -> TransactionStatus {
    record.map_or(TransactionStatus::Pending, TransactionRecord::status)
}

/// Tracks one transaction id against the indexer.
///
/// The record is fetched on first access and memoized for the tracker's
/// lifetime; only `refresh` and the finality poll re-fetch it. A freshly
/// broadcast transaction may be unknown to the indexer for a while, so "not
/// found" replies are retried with a fixed backoff before giving up.
/// Single-owner: every operation that can fetch takes `&mut self`.
pub struct TransactionTracker<'a, I: Indexer + ?Sized> {
    id: String,
    indexer: &'a I,
    config: &'a NetworkConfig,
    record: Option<TransactionRecord>,
    not_found_retries: u32,
}

impl<'a, I: Indexer + ?Sized> TransactionTracker<'a, I> {
    pub fn new(id: impl Into<String>, indexer: &'a I, config: &'a NetworkConfig) -> Self {
        Self {
            id: id.into(),
            indexer,
            config,
            record: None,
            not_found_retries: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Block explorer link for the transaction
    pub fn url(&self) -> String {
        self.config.tx_url(&self.id)
    }

    /// Memoized record, if one has been fetched
    pub fn record(&self) -> Option<&TransactionRecord> {
        self.record.as_ref()
    }

    /// Not-found retries spent so far
    pub fn retries_used(&self) -> u32 {
        self.not_found_retries
    }

    pub fn fetch(&mut self) -> Result<&TransactionRecord, TransferError> {
        let record = match self.record.take() {
            Some(record) => record,
            None => self.load()?,
        };
        Ok(self.record.insert(record))
    }

    /// Drop the memoized record and fetch it again
    pub fn refresh(&mut self) -> Result<&TransactionRecord, TransferError> {
        self.record = None;
        self.fetch()
    }

    fn load(&mut self) -> Result<TransactionRecord, TransferError> {
        loop {
            match self.indexer.transaction(&self.id) {
                Ok(response) => return TransactionRecord::from_response(&self.id, response),
                Err(e) if e.is_not_found() => {
                    if self.not_found_retries >= self.config.max_not_found_retries {
                        log::warn!(
                            "Transaction {} still not found after {} retries",
                            self.id,
                            self.not_found_retries
                        );
                        return Err(TransferError::TransactionNotFound(self.id.clone()));
                    }
                    self.not_found_retries += 1;
                    log::debug!(
                        "Transaction {} not indexed yet, retry {}/{} in {:?}",
                        self.id,
                        self.not_found_retries,
                        self.config.max_not_found_retries,
                        self.config.not_found_backoff
                    );
                    thread::sleep(self.config.not_found_backoff);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn status(&mut self) -> Result<TransactionStatus, TransferError> {
        self.fetch()?;
        Ok(status_of(self.record.as_ref()))
    }

    /// Blocks mined on top of the transaction's block; 0 while pending
    pub fn confirmation_count(&mut self) -> Result<u64, TransferError> {
        match self.fetch()?.block_height {
            None => Ok(0),
            Some(height) => {
                let tip = self.indexer.tip_height()?;
                Ok(tip.saturating_sub(height))
            }
        }
    }

    /// Block height, 0 while pending
    pub fn block_height(&mut self) -> Result<u64, TransferError> {
        Ok(self.fetch()?.block_height.unwrap_or(0))
    }

    pub fn block_timestamp(&mut self) -> Result<Option<DateTime<Utc>>, TransferError> {
        Ok(self
            .fetch()?
            .block_time
            .and_then(|t| DateTime::from_timestamp(t as i64, 0)))
    }

    pub fn fee(&mut self) -> Result<Amount, TransferError> {
        Ok(self.fetch()?.fee)
    }

    /// Owner of the first input's previous output, empty when unknown
    pub fn sender(&mut self) -> Result<String, TransferError> {
        Ok(self.fetch()?.sender().to_string())
    }

    /// Poll with the configured interval until the status is terminal.
    pub fn await_finality(&mut self) -> TransactionStatus {
        self.wait(self.config.poll_interval)
    }

    /// Poll until the status leaves `Pending`.
    ///
    /// Errors resolve to `Failed` instead of propagating, as does exhausting
    /// the configured poll budget.
    pub fn wait(&mut self, poll_interval: Duration) -> TransactionStatus {
        let mut polls: u32 = 0;
        loop {
            match self.status() {
                Ok(TransactionStatus::Pending) => {}
                Ok(status) => {
                    log::info!("Transaction {} is {}", self.id, status);
                    return status;
                }
                Err(e) => {
                    log::warn!("Status check for {} failed: {}", self.id, e);
                    return TransactionStatus::Failed;
                }
            }

            polls += 1;
            if let Some(max_polls) = self.config.max_polls {
                if polls >= max_polls {
                    log::warn!(
                        "Transaction {} still pending after {} polls",
                        self.id,
                        polls
                    );
                    return TransactionStatus::Failed;
                }
            }

            log::debug!("Transaction {} pending, polling again in {:?}", self.id, poll_interval);
            thread::sleep(poll_interval);
            self.record = None;
        }
    }
}
