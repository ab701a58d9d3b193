/// Esplora API response types
///
/// One struct per endpoint, matching the Blockstream/mempool.space JSON format.
/// Fields the engine never reads default when absent so minor indexer
/// differences do not fail decoding.
use bitcoin::Amount;
use serde::{Deserialize, Serialize};

/// Funding/spending totals under `chain_stats` / `mempool_stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    #[serde(default)]
    pub funded_txo_count: u64,
    pub funded_txo_sum: u64,
    #[serde(default)]
    pub spent_txo_count: u64,
    pub spent_txo_sum: u64,
    #[serde(default)]
    pub tx_count: u64,
}

impl AddressStats {
    pub fn balance(&self) -> Amount {
        Amount::from_sat(self.funded_txo_sum.saturating_sub(self.spent_txo_sum))
    }
}

/// Response from /address/{address}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressInfo {
    #[serde(default)]
    pub address: String,
    pub chain_stats: AddressStats,
    #[serde(default)]
    pub mempool_stats: AddressStats,
}

impl AddressInfo {
    /// Confirmed on-chain balance (funded minus spent)
    pub fn confirmed_balance(&self) -> Amount {
        self.chain_stats.balance()
    }
}

/// UTXO response from /address/{address}/utxo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoResponse {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    #[serde(default)]
    pub status: UtxoStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtxoStatus {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<u64>,
}

/// Status object embedded in /tx/{txid}
///
/// `confirmed` stays optional: an indexer may report a block slot without
/// the flag, which the tracker classifies as a failed inclusion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxStatusResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<u64>,
}

/// Transaction response from /tx/{txid}
///
/// `fee` and `status` are required: a reply without them is not a
/// transaction detail and must not read as pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    pub txid: String,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub locktime: u32,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub weight: usize,
    pub fee: u64,
    pub status: TxStatusResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    pub txid: String,
    pub vout: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevout: Option<TxOutput>,
    #[serde(default)]
    pub scriptsig: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness: Option<Vec<String>>,
    #[serde(default)]
    pub is_coinbase: bool,
    #[serde(default)]
    pub sequence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub scriptpubkey: String,
    #[serde(default)]
    pub scriptpubkey_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

/// Response from mempool.space /v1/fees/recommended (sat/vB per tier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecommendation {
    pub fastest_fee: u64,
    pub half_hour_fee: u64,
    pub hour_fee: u64,
    pub economy_fee: u64,
    pub minimum_fee: u64,
}

/// JSON error body some indexers embed in non-200 replies
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}
