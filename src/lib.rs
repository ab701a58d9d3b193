//! btc-transfer: Bitcoin UTXO transfers against an Esplora indexer
//!
//! Builds, signs and broadcasts single-payment transactions that spend all of
//! a sender's UTXOs, and tracks them until they confirm.
//!
//! # Architecture
//!
//! - **Esplora client**: address stats, UTXOs, transaction detail, broadcast, fee tiers
//! - **Transaction pipeline**: builder -> signer -> broadcaster, with fee estimation
//! - **Tracking**: memoized transaction records, confirmation polling, transfer verification
//!
//! # Example
//!
//! ```ignore
//! use btc_transfer::{Coin, EsploraClient, FeePriority, NetworkConfig};
//!
//! let config = NetworkConfig::testnet();
//! let client = EsploraClient::new(config.clone())?;
//! let coin = Coin::new(&client, &config);
//!
//! let intent = coin.transfer(sender, receiver, "0.0005")?;
//! let signed = coin.signer().sign(intent, &wif, FeePriority::HalfHour)?;
//! let txid = coin.broadcaster().send(signed)?;
//!
//! let status = coin.track(txid.to_string()).await_finality();
//! ```

// Public modules
pub mod bitcoin;
pub mod coin;
pub mod config;
pub mod error;
pub mod esplora;
pub mod models;

// Re-exports for convenience
pub use crate::bitcoin::{
    from_base_units, to_base_units, Broadcaster, FeeEstimator, FeePriority, SignedTransaction,
    TransactionBuilder, TransactionSigner, UnsignedTransactionIntent, Utxo,
};
pub use coin::Coin;
pub use config::NetworkConfig;
pub use error::{EsploraError, TransferError};
pub use esplora::{EsploraClient, FeeSource, Indexer};
pub use models::{
    CoinTransaction, TransactionRecord, TransactionStatus, TransactionTracker, TransferDirection,
};

pub type Result<T> = std::result::Result<T, TransferError>;
