/// Network configuration
///
/// Selects the Esplora API, explorer and fee endpoints plus the Bitcoin network
/// parameters used for address and script encoding. Constructed explicitly and
/// passed to every component; there is no process-wide provider.
use std::env;
use std::time::Duration;

pub const MAINNET_API_URL: &str = "https://blockstream.info/api/";
pub const TESTNET_API_URL: &str = "https://blockstream.info/testnet/api/";
pub const MAINNET_EXPLORER_URL: &str = "https://blockstream.info/";
pub const TESTNET_EXPLORER_URL: &str = "https://blockstream.info/testnet/";
pub const MAINNET_FEE_API_URL: &str = "https://mempool.space/api";
pub const TESTNET_FEE_API_URL: &str = "https://mempool.space/testnet/api";

/// Fee rate (sat/vB) used when the fee endpoint cannot be reached.
pub const DEFAULT_FEE_RATE: u64 = 60;
pub const DEFAULT_MAX_NOT_FOUND_RETRIES: u32 = 6;
pub const DEFAULT_NOT_FOUND_BACKOFF: Duration = Duration::from_secs(2);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(4000);

#[derive(Clone, Debug)]
pub struct NetworkConfig {
    testnet: bool,
    /// Optional BlockCypher token for the websocket endpoint
    pub block_cypher_token: Option<String>,
    /// Esplora API base URL (trailing slash)
    pub api_url: String,
    /// Block explorer base URL (trailing slash)
    pub explorer_url: String,
    /// mempool.space-style API base URL for `v1/fees/recommended`
    pub fee_api_url: String,
    /// Websocket URL for push notifications, when one is available
    pub ws_url: Option<String>,
    pub default_fee_rate: u64,
    /// Retries granted to a tracker while the indexer reports "not found"
    pub max_not_found_retries: u32,
    pub not_found_backoff: Duration,
    pub poll_interval: Duration,
    /// Upper bound on finality polls; `None` polls until a terminal status
    pub max_polls: Option<u32>,
    pub request_timeout: Duration,
}

impl NetworkConfig {
    pub fn new(testnet: bool, block_cypher_token: Option<String>) -> Self {
        let (api_url, explorer_url, fee_api_url) = if testnet {
            (TESTNET_API_URL, TESTNET_EXPLORER_URL, TESTNET_FEE_API_URL)
        } else {
            (MAINNET_API_URL, MAINNET_EXPLORER_URL, MAINNET_FEE_API_URL)
        };

        let ws_url = match (&block_cypher_token, testnet) {
            (Some(token), true) => Some(format!(
                "wss://socket.blockcypher.com/v1/btc/test3?token={}",
                token
            )),
            (Some(token), false) => Some(format!(
                "wss://socket.blockcypher.com/v1/btc/main?token={}",
                token
            )),
            (None, false) => Some("wss://ws.blockchain.info/inv".to_string()),
            (None, true) => None,
        };

        Self {
            testnet,
            block_cypher_token,
            api_url: api_url.to_string(),
            explorer_url: explorer_url.to_string(),
            fee_api_url: fee_api_url.to_string(),
            ws_url,
            default_fee_rate: DEFAULT_FEE_RATE,
            max_not_found_retries: DEFAULT_MAX_NOT_FOUND_RETRIES,
            not_found_backoff: DEFAULT_NOT_FOUND_BACKOFF,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(false, None)
    }

    pub fn testnet() -> Self {
        Self::new(true, None)
    }

    /// Load configuration from environment variables
    ///
    /// - `BITCOIN_TESTNET`: "true"/"1" selects testnet (default mainnet)
    /// - `BLOCKCYPHER_TOKEN`: optional websocket token
    /// - `ESPLORA_URL`: overrides the Esplora API base URL
    /// - `FEE_API_URL`: overrides the fee recommendation base URL
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok(), false)
    }

    /// Like `from_env`, but `force_testnet` selects testnet regardless of
    /// `BITCOIN_TESTNET`. URL overrides still apply.
    pub fn from_env_with_testnet(force_testnet: bool) -> Self {
        Self::from_vars(|key| env::var(key).ok(), force_testnet)
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>, force_testnet: bool) -> Self {
        let testnet = force_testnet
            || var("BITCOIN_TESTNET")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false);
        let token = var("BLOCKCYPHER_TOKEN").filter(|t| !t.is_empty());

        let mut config = Self::new(testnet, token);
        if testnet {
            log::info!("Using TESTNET network");
        } else {
            log::info!("Using MAINNET network");
        }

        if let Some(url) = var("ESPLORA_URL") {
            config = config.with_api_url(url);
        }
        if let Some(url) = var("FEE_API_URL") {
            config = config.with_fee_api_url(url);
        }
        log::info!("Esplora URL: {}", config.api_url);

        config
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = with_trailing_slash(url.into());
        self
    }

    pub fn with_fee_api_url(mut self, url: impl Into<String>) -> Self {
        self.fee_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_not_found_retry(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_not_found_retries = max_retries;
        self.not_found_backoff = backoff;
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: Option<u32>) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    /// Network parameters for address and key encoding.
    pub fn network(&self) -> bitcoin::Network {
        if self.testnet {
            bitcoin::Network::Testnet
        } else {
            bitcoin::Network::Bitcoin
        }
    }

    /// Full URL for an Esplora endpoint such as `tx/{id}`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path.trim_start_matches('/'))
    }

    pub fn fee_endpoint(&self) -> String {
        format!("{}/v1/fees/recommended", self.fee_api_url)
    }

    pub fn tx_url(&self, txid: &str) -> String {
        format!("{}tx/{}", self.explorer_url, txid)
    }
}

impl Default for NetworkConfig {
    /// Mainnet with no websocket token
    fn default() -> Self {
        Self::mainnet()
    }
}

fn with_trailing_slash(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{}/", url)
    }
}
