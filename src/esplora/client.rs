//! Blocking Esplora API client.
//!
//! Provides access to:
//! - Address stats and UTXOs
//! - Transaction detail and tip height
//! - Transaction broadcasting
//! - Fee recommendations (mempool.space)

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::types::{AddressInfo, ApiErrorBody, FeeRecommendation, TxResponse, UtxoResponse};
use super::{FeeSource, Indexer};
use crate::config::NetworkConfig;
use crate::error::EsploraError;

const TX_NOT_FOUND: &str = "Transaction not found";

pub struct EsploraClient {
    client: Client,
    config: NetworkConfig,
}

impl EsploraClient {
    pub fn new(config: NetworkConfig) -> Result<Self, EsploraError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    fn get_text(&self, url: &str) -> Result<String, EsploraError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        read_body(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EsploraError> {
        let body = self.get_text(url)?;
        serde_json::from_str(&body).map_err(EsploraError::from)
    }
}

impl Indexer for EsploraClient {
    fn address_info(&self, address: &str) -> Result<AddressInfo, EsploraError> {
        let mut info: AddressInfo = self.get_json(&self.config.endpoint(&format!("address/{}", address)))?;
        if info.address.is_empty() {
            info.address = address.to_string();
        }
        Ok(info)
    }

    fn address_utxos(&self, address: &str) -> Result<Vec<UtxoResponse>, EsploraError> {
        self.get_json(&self.config.endpoint(&format!("address/{}/utxo", address)))
    }

    fn transaction(&self, txid: &str) -> Result<TxResponse, EsploraError> {
        self.get_json(&self.config.endpoint(&format!("tx/{}", txid)))
    }

    fn tip_height(&self) -> Result<u64, EsploraError> {
        let text = self.get_text(&self.config.endpoint("blocks/tip/height"))?;
        text.trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| EsploraError::Decode(format!("tip height '{}': {}", text.trim(), e)))
    }

    fn broadcast(&self, tx_hex: &str) -> Result<String, EsploraError> {
        let url = self.config.endpoint("tx");
        log::debug!("Broadcasting transaction to: {}", url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(tx_hex.to_string())
            .send()?;

        Ok(read_body(response)?.trim().to_string())
    }
}

impl FeeSource for EsploraClient {
    fn recommended_fees(&self) -> Result<FeeRecommendation, EsploraError> {
        self.get_json(&self.config.fee_endpoint())
    }
}

fn read_body(response: reqwest::blocking::Response) -> Result<String, EsploraError> {
    let status = response.status();
    let body = response.text()?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(error_from_response(status, &body))
    }
}

/// Classify a non-success reply. A `{message, code}` object anywhere in the body
/// wins (bitcoind errors arrive wrapped in text); otherwise the raw body is kept.
fn error_from_response(status: StatusCode, body: &str) -> EsploraError {
    let body = body.trim();
    if status == StatusCode::NOT_FOUND || body.contains(TX_NOT_FOUND) {
        let message = if body.is_empty() { TX_NOT_FOUND } else { body };
        return EsploraError::NotFound(message.to_string());
    }

    if let Some(parsed) = embedded_error(body) {
        return EsploraError::Api {
            status: status.as_u16(),
            message: parsed.message,
            code: parsed.code,
        };
    }

    let message = if body.is_empty() {
        "Request failed".to_string()
    } else {
        body.to_string()
    };
    EsploraError::Api {
        status: status.as_u16(),
        message,
        code: None,
    }
}

fn embedded_error(body: &str) -> Option<ApiErrorBody> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}
