//! Answers a fixed set of methods locally, from injected capabilities and
//! static network metadata, without touching the remote endpoint.

use crate::network::NetworkConfig;
use crate::provider::capabilities::WalletCapabilities;
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct StaticMethodInterceptor {
    capabilities: Arc<dyn WalletCapabilities>,
    network: NetworkConfig,
}

impl StaticMethodInterceptor {
    pub fn new(capabilities: Arc<dyn WalletCapabilities>, network: NetworkConfig) -> Self {
        Self {
            capabilities,
            network,
        }
    }

    /// Returns `Some(result)` for a recognized method, `None` to defer to the
    /// next pipeline stage. Capability failures propagate to the caller.
    pub async fn intercept(&self, method: &str, params: &Value) -> Result<Option<Value>> {
        let result = match method {
            "eth_syncing" => Value::Bool(false),
            "web3_clientVersion" => {
                json!(format!("MetaMask/v{}", self.capabilities.client_version()))
            }
            "eth_accounts" => json!(self.capabilities.get_accounts().await?),
            "eth_coinbase" => {
                let accounts = self.capabilities.get_accounts().await?;
                match accounts.into_iter().next() {
                    Some(address) => Value::String(address),
                    None => Value::Null,
                }
            }
            "eth_sendTransaction" => {
                self.capabilities
                    .process_transaction(params.clone())
                    .await?
            }
            "eth_chainId" => json!(self.network.chain_id()),
            "net_version" => json!(self.network.net_id()),
            _ => return Ok(None),
        };

        Ok(Some(result))
    }
}
