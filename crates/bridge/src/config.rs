//! Bridge configuration.

use std::time::Duration;

/// Chain id of the network the bridge operates against.
pub const DEFAULT_CHAIN_ID: u64 = 25;

/// JSON-RPC endpoint used for nonce, gas and token metadata lookups.
pub const DEFAULT_RPC_URL: &str = "https://evm-cronos.crypto.org";

/// Block explorer API endpoint, exposed to consent surfaces for linking.
pub const DEFAULT_EXPLORER_API_URL: &str = "https://cronos.crypto.org/explorer/api";

/// IPC channel the injected provider publishes its events on.
pub const DEFAULT_CHANNEL_NAME: &str = "dapp-browser-ipc";

/// Static configuration of one provider bridge instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Chain id stamped into every signed transaction.
    pub chain_id: u64,
    /// HTTP JSON-RPC endpoint of the backing node.
    pub rpc_url: String,
    /// Explorer API base URL.
    pub explorer_api_url: String,
    /// Name of the IPC channel this bridge answers on.
    pub channel_name: String,
    /// How long a consent prompt may stay unanswered before the request is
    /// failed. `None` waits indefinitely.
    pub consent_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            explorer_api_url: DEFAULT_EXPLORER_API_URL.to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            consent_timeout: None,
        }
    }
}

impl BridgeConfig {
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_explorer_api_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_api_url = url.into();
        self
    }

    pub fn with_channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = name.into();
        self
    }

    pub fn with_consent_timeout(mut self, timeout: Duration) -> Self {
        self.consent_timeout = Some(timeout);
        self
    }
}
