use bitcoin::Txid;

use super::signer::SignedTransaction;
use crate::error::{EsploraError, TransferError};
use crate::esplora::Indexer;

/// Submits signed transactions to the network's relay endpoint.
///
/// At most one submission per call; rejected transactions are never retried.
pub struct Broadcaster<'a, I: Indexer + ?Sized> {
    indexer: &'a I,
}

impl<'a, I: Indexer + ?Sized> Broadcaster<'a, I> {
    pub fn new(indexer: &'a I) -> Self {
        Self { indexer }
    }

    /// Broadcast a signed transaction and return the transaction ID
    pub fn send(&self, signed: SignedTransaction) -> Result<Txid, TransferError> {
        log::info!("Broadcasting transaction {}", signed.txid());

        let reply = match self.indexer.broadcast(signed.hex()) {
            Ok(reply) => reply,
            Err(EsploraError::Transport(msg)) => {
                return Err(EsploraError::Transport(msg).into());
            }
            Err(e) => {
                log::error!("Broadcast of {} rejected: {}", signed.txid(), e);
                return Err(TransferError::Broadcast(e.remote_message().to_string()));
            }
        };

        let txid = reply.trim().parse::<Txid>().map_err(|e| {
            EsploraError::Decode(format!("Broadcast returned invalid txid '{}': {}", reply, e))
        })?;

        if txid != signed.txid() {
            log::warn!(
                "Network reported txid {} for locally computed {}",
                txid,
                signed.txid()
            );
        }
        log::info!("Transaction broadcast - txid: {}", txid);
        Ok(txid)
    }
}
