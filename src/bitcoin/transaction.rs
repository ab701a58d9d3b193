use std::str::FromStr;

use bitcoin::blockdata::script::ScriptBuf;
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut};
use bitcoin::blockdata::witness::Witness;
use bitcoin::transaction::{OutPoint, Sequence};
use bitcoin::{absolute, Address, Amount, Network, Txid};

use crate::error::{EsploraError, TransferError};
use crate::esplora::UtxoResponse;

/// A spendable output owned by `address`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub txid: Txid,
    pub vout: u32,
    pub value: Amount,
    pub address: String,
}

impl Utxo {
    /// Map an indexer UTXO entry for `address`, failing on a malformed txid.
    pub fn from_response(address: &str, response: &UtxoResponse) -> Result<Self, TransferError> {
        let txid = response.txid.parse::<Txid>().map_err(|e| {
            EsploraError::Decode(format!("Invalid txid '{}': {}", response.txid, e))
        })?;
        Ok(Self {
            txid,
            vout: response.vout,
            value: Amount::from_sat(response.value),
            address: address.to_string(),
        })
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }
}

/// Validated transfer waiting for a fee and signatures.
///
/// Spends every UTXO it holds. Consumed by the signer; build a new one when
/// the inputs change.
#[derive(Debug)]
pub struct UnsignedTransactionIntent {
    from: Address,
    to: Address,
    amount: Amount,
    utxos: Vec<Utxo>,
    total_input: Amount,
}

impl UnsignedTransactionIntent {
    pub fn from(&self) -> &Address {
        &self.from
    }

    pub fn to(&self) -> &Address {
        &self.to
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn utxos(&self) -> &[Utxo] {
        &self.utxos
    }

    pub fn total_input(&self) -> Amount {
        self.total_input
    }
}

pub struct TransactionBuilder {
    network: Network,
}

impl TransactionBuilder {
    /// Create a new transaction builder for the specified network
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Parse an address and require it to belong to the builder's network
    pub fn parse_address(&self, address: &str) -> Result<Address, TransferError> {
        Address::from_str(address)
            .map_err(|e| TransferError::InvalidAddress(format!("'{}': {}", address, e)))?
            .require_network(self.network)
            .map_err(|e| {
                TransferError::InvalidAddress(format!("'{}' network mismatch: {}", address, e))
            })
    }

    /// Check transfer preconditions in order: amount, balance, distinct parties.
    pub fn validate(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
        balance: Amount,
    ) -> Result<(Address, Address), TransferError> {
        if amount == Amount::ZERO {
            return Err(TransferError::InvalidAmount(
                "Amount must be greater than zero".to_string(),
            ));
        }

        if amount > balance {
            return Err(TransferError::InsufficientBalance(format!(
                "Requested {} sats, but balance is {} sats",
                amount.to_sat(),
                balance.to_sat()
            )));
        }

        if from.eq_ignore_ascii_case(to) {
            return Err(TransferError::InvalidAddress(format!(
                "Sender and receiver are the same address: {}",
                from
            )));
        }

        Ok((self.parse_address(from)?, self.parse_address(to)?))
    }

    /// Build a transfer intent that spends all of the sender's UTXOs
    pub fn build(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
        balance: Amount,
        utxos: Vec<Utxo>,
    ) -> Result<UnsignedTransactionIntent, TransferError> {
        let (from_address, to_address) = self.validate(from, to, amount, balance)?;

        if utxos.is_empty() {
            return Err(TransferError::InsufficientBalance(format!(
                "No UTXOs available for {}",
                from
            )));
        }

        if let Some(foreign) = utxos.iter().find(|u| !u.address.eq_ignore_ascii_case(from)) {
            return Err(TransferError::InvalidAddress(format!(
                "UTXO {}:{} belongs to {}, not sender {}",
                foreign.txid, foreign.vout, foreign.address, from
            )));
        }

        let total_input = utxos
            .iter()
            .try_fold(Amount::ZERO, |total, u| total.checked_add(u.value))
            .ok_or_else(|| {
                EsploraError::Decode(format!("UTXO values of {} overflow a satoshi amount", from))
            })?;

        log::debug!(
            "Built intent: {} sats from {} to {} using {} UTXOs",
            amount.to_sat(),
            from,
            to,
            utxos.len()
        );

        Ok(UnsignedTransactionIntent {
            from: from_address,
            to: to_address,
            amount,
            utxos,
            total_input,
        })
    }

    /// Assemble the unsigned transaction: payment output first, change back to the sender
    pub fn assemble(
        &self,
        intent: &UnsignedTransactionIntent,
        fee: Amount,
    ) -> Result<Transaction, TransferError> {
        let total_input = intent.total_input();
        let needed = intent.amount.checked_add(fee).ok_or_else(|| {
            TransferError::InsufficientBalance("Amount plus fee overflows".to_string())
        })?;

        let change_amount = total_input.checked_sub(needed).ok_or_else(|| {
            TransferError::InsufficientBalance(format!(
                "Need {} sats (amount + fee), but only have {} sats",
                needed.to_sat(),
                total_input.to_sat()
            ))
        })?;

        let mut tx = Transaction {
            version: bitcoin::transaction::Version::TWO,
            lock_time: absolute::LockTime::ZERO,
            input: vec![],
            output: vec![],
        };

        for utxo in &intent.utxos {
            tx.input.push(TxIn {
                previous_output: utxo.outpoint(),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            });
        }

        tx.output.push(TxOut {
            value: intent.amount,
            script_pubkey: intent.to.script_pubkey(),
        });

        tx.output.push(TxOut {
            value: change_amount,
            script_pubkey: intent.from.script_pubkey(),
        });

        Ok(tx)
    }
}
