//! Esplora indexer collaborator
//!
//! - `Indexer`: address stats, UTXOs, transaction detail, tip height, broadcast
//! - `FeeSource`: recommended fee rates
//! - `EsploraClient`: blocking HTTP implementation of both

pub mod client;
pub mod types;

pub use client::EsploraClient;
pub use types::{
    AddressInfo, AddressStats, FeeRecommendation, TxInput, TxOutput, TxResponse,
    TxStatusResponse, UtxoResponse, UtxoStatus,
};

use crate::error::EsploraError;

/// Read and relay API of a block-explorer indexer.
pub trait Indexer {
    /// `GET address/{address}`
    fn address_info(&self, address: &str) -> Result<AddressInfo, EsploraError>;

    /// `GET address/{address}/utxo`, in indexer order
    fn address_utxos(&self, address: &str) -> Result<Vec<UtxoResponse>, EsploraError>;

    /// `GET tx/{txid}`
    fn transaction(&self, txid: &str) -> Result<TxResponse, EsploraError>;

    /// `GET blocks/tip/height`
    fn tip_height(&self) -> Result<u64, EsploraError>;

    /// `POST tx` with the raw hex body; returns the txid reported by the network
    fn broadcast(&self, tx_hex: &str) -> Result<String, EsploraError>;
}

/// Source of recommended fee rates.
pub trait FeeSource {
    fn recommended_fees(&self) -> Result<FeeRecommendation, EsploraError>;
}
