//! Request-handling pipeline: an ordered list of interception stages with
//! explicit short-circuit, falling through to the retrying transport, plus
//! the factory that wires a (Provider, BlockPoller) pair for one network.

use crate::network::NetworkConfig;
use crate::provider::capabilities::WalletCapabilities;
use crate::provider::interceptor::StaticMethodInterceptor;
use crate::provider::poller::{BlockPoller, LatestBlock};
use crate::provider::settings::ProviderSettings;
use crate::rpc::helpers::format_quantity;
use crate::rpc::payload::{RpcRequest, RpcResponse};
use crate::rpc::transport::RetryingTransport;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

/// One interception stage. Stages are evaluated in declaration order; the
/// first stage producing a value answers the request and the rest are
/// skipped.
enum Stage {
    /// Locally-computed and chain-metadata answers.
    StaticMethods(StaticMethodInterceptor),
    /// Answers `eth_blockNumber` from the poller's shared height once the
    /// first probe has committed a value.
    BlockCache(Arc<LatestBlock>),
}

impl Stage {
    async fn handle(&self, request: &RpcRequest) -> Result<Option<Value>> {
        match self {
            Stage::StaticMethods(interceptor) => {
                interceptor.intercept(&request.method, &request.params).await
            }
            Stage::BlockCache(latest) => {
                if request.method != "eth_blockNumber" {
                    return Ok(None);
                }
                Ok(latest.current().map(|height| {
                    Value::String(format_quantity(height))
                }))
            }
        }
    }
}

/// The active request pipeline for one network. Cheap to share behind an
/// `Arc`; every submitted request runs the stages in fixed order and reaches
/// the transport only if no stage answered.
pub struct Provider {
    network: NetworkConfig,
    stages: Vec<Stage>,
    transport: Arc<RetryingTransport>,
}

impl Provider {
    /// Network this pipeline is bound to.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Submits one JSON-RPC request through the pipeline.
    pub async fn submit(&self, request: RpcRequest) -> Result<RpcResponse> {
        for stage in &self.stages {
            if let Some(result) = stage.handle(&request).await? {
                tracing::trace!(method = %request.method, "request answered locally");
                return Ok(RpcResponse::result(request.id, result));
            }
        }

        self.transport.call(&request).await
    }
}

/// Builds (pipeline, poller) pairs bound to a network. The factory carries
/// the construction-time settings (credential, intervals, transport knobs)
/// and the wallet capabilities reference.
pub struct ProviderFactory {
    settings: ProviderSettings,
    capabilities: Arc<dyn WalletCapabilities>,
}

impl ProviderFactory {
    pub fn new(settings: ProviderSettings, capabilities: Arc<dyn WalletCapabilities>) -> Self {
        Self {
            settings,
            capabilities,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Composes the stage list and transport for `network`. The returned
    /// poller shares its height cell with the pipeline's cache stage; the
    /// caller is responsible for starting it on activation and stopping it
    /// exactly once at teardown.
    pub fn build(&self, network: NetworkConfig) -> Result<(Provider, BlockPoller)> {
        let endpoint = network.endpoint_url(self.settings.credential());
        let transport = Arc::new(RetryingTransport::new(
            endpoint,
            self.settings.transport().clone(),
        )?);

        let latest = Arc::new(LatestBlock::new());
        let poller = BlockPoller::new(
            transport.clone(),
            latest.clone(),
            self.settings.poll_interval(),
        );

        let stages = vec![
            Stage::StaticMethods(StaticMethodInterceptor::new(
                self.capabilities.clone(),
                network.clone(),
            )),
            Stage::BlockCache(latest),
        ];

        let provider = Provider {
            network,
            stages,
            transport,
        };

        Ok((provider, poller))
    }
}
