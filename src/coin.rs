//! Bitcoin as a transferable asset
//!
//! Ties the builder, signer and broadcaster to one indexer and network
//! configuration.

use bitcoin::Amount;

use crate::bitcoin::amount::{to_base_units, DECIMALS};
use crate::bitcoin::{Broadcaster, TransactionBuilder, TransactionSigner, UnsignedTransactionIntent, Utxo};
use crate::config::NetworkConfig;
use crate::error::TransferError;
use crate::esplora::{FeeSource, Indexer};
use crate::models::{CoinTransaction, TransactionTracker};

pub struct Coin<'a, I: Indexer + FeeSource + ?Sized> {
    indexer: &'a I,
    config: &'a NetworkConfig,
    builder: TransactionBuilder,
}

impl<'a, I: Indexer + FeeSource + ?Sized> Coin<'a, I> {
    pub fn new(indexer: &'a I, config: &'a NetworkConfig) -> Self {
        Self {
            indexer,
            config,
            builder: TransactionBuilder::new(config.network()),
        }
    }

    pub fn name(&self) -> &'static str {
        "Bitcoin"
    }

    pub fn symbol(&self) -> &'static str {
        "BTC"
    }

    pub fn decimals(&self) -> u32 {
        DECIMALS
    }

    pub fn config(&self) -> &NetworkConfig {
        self.config
    }

    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Confirmed balance of `owner`
    pub fn balance(&self, owner: &str) -> Result<Amount, TransferError> {
        let info = self.indexer.address_info(owner)?;
        let balance = info.confirmed_balance();
        log::debug!("Balance of {}: {} sats", owner, balance.to_sat());
        Ok(balance)
    }

    /// Prepare an unsigned transfer of `amount` (decimal BTC) spending all of
    /// the sender's UTXOs.
    pub fn transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: &str,
    ) -> Result<UnsignedTransactionIntent, TransferError> {
        log::info!("Transfer requested: {} BTC from {} to {}", amount, sender, receiver);

        let amount = to_base_units(amount)?;
        let balance = self.balance(sender)?;
        self.builder.validate(sender, receiver, amount, balance)?;

        let utxos = self
            .indexer
            .address_utxos(sender)?
            .iter()
            .map(|u| Utxo::from_response(sender, u))
            .collect::<Result<Vec<_>, _>>()?;

        self.builder.build(sender, receiver, amount, balance, utxos)
    }

    pub fn signer(&self) -> TransactionSigner<'a, I> {
        TransactionSigner::new(self.config.network(), self.indexer, self.config.default_fee_rate)
    }

    pub fn broadcaster(&self) -> Broadcaster<'a, I> {
        Broadcaster::new(self.indexer)
    }

    /// Track an already known transaction id
    pub fn track(&self, txid: impl Into<String>) -> TransactionTracker<'a, I> {
        TransactionTracker::new(txid, self.indexer, self.config)
    }

    pub fn transaction(&self, txid: impl Into<String>) -> CoinTransaction<'a, I> {
        CoinTransaction::new(txid, self.indexer, self.config)
    }
}
