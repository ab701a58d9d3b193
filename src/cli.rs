//! # CLI Interface
//!
//! Command-line arguments for `btc-transfer`, using `clap` derive.

use clap::{Parser, Subcommand, ValueEnum};

use btc_transfer::TransferDirection;

/// Send bitcoin and follow it to confirmation.
#[derive(Parser, Debug)]
#[command(name = "btc-transfer", about = "Bitcoin UTXO transfers over Esplora", version)]
pub struct Cli {
    /// Use testnet endpoints and addresses (overrides BITCOIN_TESTNET).
    #[arg(long, global = true)]
    pub testnet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the confirmed balance of an address.
    Balance(BalanceArgs),
    /// Build, sign and broadcast a transfer.
    Send(SendArgs),
    /// Show the current status of a transaction.
    Status(TxArgs),
    /// Poll a transaction until it confirms or fails.
    Wait(WaitArgs),
    /// Check that a transaction moved an amount to or from an address.
    Verify(VerifyArgs),
}

#[derive(Parser, Debug)]
pub struct BalanceArgs {
    pub address: String,
}

#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Sender address; must be controlled by the key.
    #[arg(long)]
    pub from: String,

    #[arg(long)]
    pub to: String,

    /// Amount in BTC, e.g. 0.0005
    #[arg(long)]
    pub amount: String,

    /// Fee priority 1 (fastest) to 5 (minimum).
    #[arg(long, default_value_t = 2)]
    pub priority: u8,

    /// WIF-encoded private key of the sender.
    #[arg(long, env = "BTC_WIF", hide_env_values = true)]
    pub wif: String,

    /// Wait for the transaction to confirm after broadcasting.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Parser, Debug)]
pub struct TxArgs {
    pub txid: String,
}

#[derive(Parser, Debug)]
pub struct WaitArgs {
    pub txid: String,

    /// Give up after this many polls.
    #[arg(long)]
    pub max_polls: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    pub txid: String,

    #[arg(long, value_enum)]
    pub direction: Direction,

    /// Expected receiver (incoming) or sender (outgoing).
    #[arg(long)]
    pub address: String,

    /// Expected amount in BTC.
    #[arg(long)]
    pub amount: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl From<Direction> for TransferDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Incoming => TransferDirection::Incoming,
            Direction::Outgoing => TransferDirection::Outgoing,
        }
    }
}
