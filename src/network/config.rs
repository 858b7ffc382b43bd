//! Immutable per-network metadata: chain identifiers and the endpoint
//! template requests are sent to.

use anyhow::{bail, Result};

/// Template used for managed Infura-style networks. `{network}` is replaced
/// with the network name and `{credential}` with the project id.
pub const INFURA_ENDPOINT_TEMPLATE: &str = "https://{network}.infura.io/v3/{credential}";

/// Distinguishes managed networks (endpoint derived from the template) from
/// user-supplied ones (endpoint given verbatim at registration time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    Infura,
    Custom,
}

/// Chain metadata for one network. Values are fixed at construction and never
/// fetched over the network: `eth_chainId` and `net_version` are answered
/// from this struct alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    name: String,
    chain_id: String,
    net_id: String,
    endpoint_template: String,
    kind: NetworkKind,
}

impl NetworkConfig {
    /// Builds a managed network entry using the Infura endpoint template.
    pub fn infura(
        name: impl Into<String>,
        chain_id: impl Into<String>,
        net_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chain_id: chain_id.into(),
            net_id: net_id.into(),
            endpoint_template: INFURA_ENDPOINT_TEMPLATE.to_owned(),
            kind: NetworkKind::Infura,
        }
    }

    /// Builds a user-defined network with its own explicit chain/net ids and
    /// endpoint URL.
    pub fn custom(
        name: impl Into<String>,
        chain_id: impl Into<String>,
        net_id: impl Into<String>,
        endpoint_url: impl Into<String>,
    ) -> Result<Self> {
        let endpoint_url = endpoint_url.into();
        validate_url(&endpoint_url)?;

        Ok(Self {
            name: name.into(),
            chain_id: chain_id.into(),
            net_id: net_id.into(),
            endpoint_template: endpoint_url,
            kind: NetworkKind::Custom,
        })
    }

    /// Network name used for registry lookup and template filling.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hex-encoded chain id returned by `eth_chainId`.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Decimal net id returned by `net_version`.
    pub fn net_id(&self) -> &str {
        &self.net_id
    }

    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    /// Renders the concrete endpoint URL for this network. Custom endpoints
    /// carry no placeholders and pass through unchanged.
    pub fn endpoint_url(&self, credential: &str) -> String {
        self.endpoint_template
            .replace("{network}", &self.name)
            .replace("{credential}", credential)
    }
}

fn validate_url(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        bail!("endpoint URL cannot be empty");
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        bail!("endpoint URL must start with http:// or https://, got {trimmed}");
    }
    Ok(())
}
