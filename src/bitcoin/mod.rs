//! Bitcoin protocol operations
//!
//! - Amount conversion
//! - Fee estimation
//! - Transaction building and signing
//! - Broadcasting

pub mod amount;
pub mod broadcast;
pub mod fees;
pub mod signer;
pub mod transaction;

// Re-export main types
pub use amount::{from_base_units, to_base_units};
pub use broadcast::Broadcaster;
pub use fees::{estimate_vsize, FeeEstimator, FeePriority};
pub use signer::{SignedTransaction, TransactionSigner};
pub use transaction::{TransactionBuilder, UnsignedTransactionIntent, Utxo};
