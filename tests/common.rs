//! Common test utilities for transfer and tracking integration tests
//!
//! This module provides shared test infrastructure including:
//! - A scripted in-memory indexer with call counters
//! - Test keys and addresses
//! - Canned Esplora responses
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::time::Duration;

use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::{Address, CompressedPublicKey, Network, PrivateKey, Transaction, Txid};
use btc_transfer::esplora::{
    AddressInfo, AddressStats, FeeRecommendation, TxInput, TxOutput, TxResponse, TxStatusResponse,
    UtxoResponse,
};
use btc_transfer::{EsploraError, FeeSource, Indexer, NetworkConfig};

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Testnet config with no sleeping between retries or polls
pub fn fast_config() -> NetworkConfig {
    NetworkConfig::testnet()
        .with_not_found_retry(6, Duration::ZERO)
        .with_polling(Duration::ZERO, None)
}

pub fn sender_key() -> PrivateKey {
    PrivateKey::new(SecretKey::from_slice(&[0x11; 32]).unwrap(), Network::Testnet)
}

/// P2WPKH testnet address controlled by `sender_key`
pub fn sender_address() -> Address {
    let secp = Secp256k1::new();
    let compressed = CompressedPublicKey::from_private_key(&secp, &sender_key()).unwrap();
    Address::p2wpkh(&compressed, Network::Testnet)
}

pub const RECEIVER: &str = "mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn";

pub fn txid_hex(byte: u8) -> String {
    format!("{:02x}", byte).repeat(32)
}

pub fn utxo(byte: u8, vout: u32, value: u64) -> UtxoResponse {
    UtxoResponse {
        txid: txid_hex(byte),
        vout,
        value,
        status: Default::default(),
    }
}

pub fn address_info(address: &str, funded: u64, spent: u64) -> AddressInfo {
    AddressInfo {
        address: address.to_string(),
        chain_stats: AddressStats {
            funded_txo_sum: funded,
            spent_txo_sum: spent,
            ..Default::default()
        },
        mempool_stats: AddressStats::default(),
    }
}

pub fn fee_table(half_hour_fee: u64) -> FeeRecommendation {
    FeeRecommendation {
        fastest_fee: half_hour_fee * 2,
        half_hour_fee,
        hour_fee: half_hour_fee / 2,
        economy_fee: 2,
        minimum_fee: 1,
    }
}

/// Transfer of `amount` sats from `sender` to `receiver`
pub fn tx_response(
    txid: &str,
    sender: &str,
    receiver: &str,
    amount: u64,
    status: TxStatusResponse,
) -> TxResponse {
    let output = |address: &str, value: u64| TxOutput {
        scriptpubkey: String::new(),
        scriptpubkey_type: "v0_p2wpkh".to_string(),
        scriptpubkey_address: Some(address.to_string()),
        value,
    };

    TxResponse {
        txid: txid.to_string(),
        version: 2,
        locktime: 0,
        vin: vec![TxInput {
            txid: txid_hex(0x01),
            vout: 0,
            prevout: Some(output(sender, 100_000)),
            scriptsig: String::new(),
            witness: None,
            is_coinbase: false,
            sequence: u32::MAX,
        }],
        vout: vec![output(receiver, amount), output(sender, 100_000 - amount - 3_740)],
        size: 222,
        weight: 561,
        fee: 3_740,
        status,
    }
}

pub fn pending() -> TxStatusResponse {
    TxStatusResponse {
        confirmed: Some(false),
        ..Default::default()
    }
}

pub fn confirmed_at(height: u64) -> TxStatusResponse {
    TxStatusResponse {
        confirmed: Some(true),
        block_height: Some(height),
        block_hash: Some(txid_hex(0xbb)),
        block_time: Some(1_700_000_000),
    }
}

pub fn not_found() -> EsploraError {
    EsploraError::NotFound("Transaction not found".to_string())
}

/// Indexer double serving canned replies.
///
/// Transaction replies are consumed in order; the last one repeats once the
/// script runs out. Broadcasts echo the txid of the submitted hex unless a
/// reply is scripted.
#[derive(Default)]
pub struct MockIndexer {
    pub addresses: HashMap<String, AddressInfo>,
    pub utxos: HashMap<String, Vec<UtxoResponse>>,
    pub tip: u64,
    pub fees: Option<FeeRecommendation>,
    pub broadcast_reply: Option<Result<String, EsploraError>>,
    tx_script: RefCell<VecDeque<Result<TxResponse, EsploraError>>>,

    pub address_calls: Cell<u32>,
    pub utxo_calls: Cell<u32>,
    pub tx_calls: Cell<u32>,
    pub tip_calls: Cell<u32>,
    pub broadcasts: RefCell<Vec<String>>,
}

impl MockIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, info: AddressInfo, utxos: Vec<UtxoResponse>) -> Self {
        self.utxos.insert(info.address.clone(), utxos);
        self.addresses.insert(info.address.clone(), info);
        self
    }

    pub fn with_fees(mut self, fees: FeeRecommendation) -> Self {
        self.fees = Some(fees);
        self
    }

    pub fn with_tip(mut self, tip: u64) -> Self {
        self.tip = tip;
        self
    }

    pub fn with_broadcast_reply(mut self, reply: Result<String, EsploraError>) -> Self {
        self.broadcast_reply = Some(reply);
        self
    }

    /// Queue transaction replies in the order they should be served
    pub fn script_tx(self, replies: Vec<Result<TxResponse, EsploraError>>) -> Self {
        self.tx_script.borrow_mut().extend(replies);
        self
    }

    /// Queue one more transaction reply on a shared indexer
    pub fn queue_tx(&self, reply: Result<TxResponse, EsploraError>) {
        self.tx_script.borrow_mut().push_back(reply);
    }

    fn bump(counter: &Cell<u32>) {
        counter.set(counter.get() + 1);
    }
}

impl Indexer for MockIndexer {
    fn address_info(&self, address: &str) -> Result<AddressInfo, EsploraError> {
        Self::bump(&self.address_calls);
        Ok(self
            .addresses
            .get(address)
            .cloned()
            .unwrap_or_else(|| address_info(address, 0, 0)))
    }

    fn address_utxos(&self, address: &str) -> Result<Vec<UtxoResponse>, EsploraError> {
        Self::bump(&self.utxo_calls);
        Ok(self.utxos.get(address).cloned().unwrap_or_default())
    }

    fn transaction(&self, txid: &str) -> Result<TxResponse, EsploraError> {
        Self::bump(&self.tx_calls);
        let mut script = self.tx_script.borrow_mut();
        let reply = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        reply.unwrap_or_else(|| Err(EsploraError::NotFound(txid.to_string())))
    }

    fn tip_height(&self) -> Result<u64, EsploraError> {
        Self::bump(&self.tip_calls);
        Ok(self.tip)
    }

    fn broadcast(&self, tx_hex: &str) -> Result<String, EsploraError> {
        self.broadcasts.borrow_mut().push(tx_hex.to_string());
        if let Some(reply) = &self.broadcast_reply {
            return reply.clone();
        }
        let bytes = hex::decode(tx_hex).map_err(|e| EsploraError::Decode(e.to_string()))?;
        let tx: Transaction = bitcoin::consensus::deserialize(&bytes)
            .map_err(|e| EsploraError::Decode(e.to_string()))?;
        Ok(tx.compute_txid().to_string())
    }
}

impl FeeSource for MockIndexer {
    fn recommended_fees(&self) -> Result<FeeRecommendation, EsploraError> {
        self.fees
            .ok_or_else(|| EsploraError::Transport("fee endpoint unreachable".to_string()))
    }
}

pub fn parse_txid(hex: &str) -> Txid {
    Txid::from_str(hex).unwrap()
}
