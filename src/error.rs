//! Error types for transfer building, signing, broadcast and tracking.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid fee priority: {0} (expected 1-5)")]
    InvalidFeePriority(u8),

    #[error("RPC request error: {0}")]
    RpcRequest(#[from] EsploraError),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Broadcast error: {0}")]
    Broadcast(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

/// Failures talking to the Esplora indexer or the fee endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EsploraError {
    #[error("Transport error: {0}")]
    Transport(String),

    /// Indexer has not (yet) seen the requested object.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<i64>,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl EsploraError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EsploraError::NotFound(_))
    }

    /// Message reported by the remote side, verbatim where one was given.
    pub fn remote_message(&self) -> &str {
        match self {
            EsploraError::Transport(msg)
            | EsploraError::NotFound(msg)
            | EsploraError::Decode(msg) => msg,
            EsploraError::Api { message, .. } => message,
        }
    }
}

impl From<reqwest::Error> for EsploraError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            EsploraError::Decode(e.to_string())
        } else {
            EsploraError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for EsploraError {
    fn from(e: serde_json::Error) -> Self {
        EsploraError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esplora_error_converts_to_rpc_request() {
        let err: TransferError = EsploraError::Transport("connection refused".to_string()).into();
        assert!(matches!(err, TransferError::RpcRequest(_)));
        assert_eq!(
            err.to_string(),
            "RPC request error: Transport error: connection refused"
        );
    }

    #[test]
    fn test_remote_message_is_verbatim() {
        let err = EsploraError::Api {
            status: 400,
            message: "sendrawtransaction RPC error: min relay fee not met".to_string(),
            code: Some(-26),
        };
        assert_eq!(
            err.remote_message(),
            "sendrawtransaction RPC error: min relay fee not met"
        );
        assert!(!err.is_not_found());
        assert!(EsploraError::NotFound("Transaction not found".into()).is_not_found());
    }
}
